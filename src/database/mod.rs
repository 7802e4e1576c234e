//! The Local Store: durable, transactional CRUD for notes, tags, and
//! their associations, backed by a single SQLite file

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqliteJournalMode;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Sqlite;
use sqlx::SqlitePool;
use sqlx::Transaction;

pub use form_types::*;
pub use Config as DatabaseConfig;

use crate::notes::Note;
use crate::tags::Tag;
use crate::tags::TagWithCount;
use types::AssociationRow;
use types::NoteRow;
use types::TagCountRow;
use types::TagRow;

mod form_types;
mod types;

/// Statements run on startup; idempotent, so no migration machinery
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        color TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS note_tags (
        note_id INTEGER NOT NULL REFERENCES notes (id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags (id) ON DELETE CASCADE,
        PRIMARY KEY (note_id, tag_id)
    )",
];

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("connection error: {0}")]
    Connection(String),

    /// The unique tag name is already taken
    #[error("a tag named \"{0}\" already exists")]
    DuplicateTagName(String),

    /// An association referenced tag IDs that do not exist
    #[error("unknown tag ids: {0:?}")]
    UnknownTags(Vec<i64>),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Database configuration
pub enum Config {
    /// Open (or create) the SQLite file at this path
    Path(PathBuf),

    /// Use an existing connection pool
    ExistingPool(SqlitePool),
}

/// SQLite storage
#[derive(Clone)]
pub struct Database {
    /// Pool of connections
    connection_pool: SqlitePool,
}

impl Database {
    /// Create a new SQLite storage
    ///
    /// The schema will be created when missing
    pub async fn from_config(config: Config) -> Result<Self> {
        match config {
            Config::Path(path) => Self::open(path).await,
            Config::ExistingPool(pool) => Self::with_pool(pool).await,
        }
    }

    async fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| Error::Connection(err.to_string()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let connection_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await
            .map_err(connection_error)?;

        Self::with_pool(connection_pool).await
    }

    async fn with_pool(connection_pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&connection_pool)
                .await
                .map_err(connection_error)?;
        }

        Ok(Self { connection_pool })
    }
}

impl Database {
    /// Find all notes, newest created first
    pub async fn find_all_notes(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query_as::<_, NoteRow>(
            "SELECT id, title, body, created_at, updated_at
            FROM notes
            ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        let mut associations = self.find_all_associations().await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = associations.remove(&row.id).unwrap_or_default();
                Note::from_row(row, tags)
            })
            .collect())
    }

    /// Find a single note by its ID
    pub async fn find_single_note_by_id(&self, id: i64) -> Result<Option<Note>> {
        let row = sqlx::query_as::<_, NoteRow>(
            "SELECT id, title, body, created_at, updated_at
            FROM notes
            WHERE id = ?1
            LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        match row {
            Some(row) => {
                let tags = self.find_tags_for_note(row.id).await?;
                Ok(Some(Note::from_row(row, tags)))
            }
            None => Ok(None),
        }
    }

    /// Create a note with its tag associations in one transaction
    pub async fn create_note(&self, values: &CreateNoteValues<'_>) -> Result<Note> {
        let mut tx = self.connection_pool.begin().await.map_err(connection_error)?;

        let now = Utc::now().naive_utc();
        let row = sqlx::query_as::<_, NoteRow>(
            "INSERT INTO notes (title, body, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, title, body, created_at, updated_at",
        )
        .bind(values.title)
        .bind(values.body)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(connection_error)?;

        Self::replace_associations(&mut tx, row.id, values.tag_ids).await?;

        tx.commit().await.map_err(connection_error)?;

        let tags = self.find_tags_for_note(row.id).await?;

        Ok(Note::from_row(row, tags))
    }

    /// Update a single note
    ///
    /// A supplied tag ID list replaces the full association set
    pub async fn update_note(&self, note: &Note, values: &UpdateNoteValues<'_>) -> Result<Note> {
        let mut tx = self.connection_pool.begin().await.map_err(connection_error)?;

        let now = Utc::now().naive_utc();
        let row = sqlx::query_as::<_, NoteRow>(
            "UPDATE notes
            SET title = ?1, body = ?2, updated_at = ?3
            WHERE id = ?4
            RETURNING id, title, body, created_at, updated_at",
        )
        .bind(values.title.unwrap_or(&note.title))
        .bind(values.body.unwrap_or(&note.body))
        .bind(now)
        .bind(note.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(connection_error)?;

        if let Some(tag_ids) = values.tag_ids {
            Self::replace_associations(&mut tx, note.id, tag_ids).await?;
        }

        tx.commit().await.map_err(connection_error)?;

        let tags = self.find_tags_for_note(note.id).await?;

        Ok(Note::from_row(row, tags))
    }

    /// Delete a note; associations cascade
    pub async fn delete_note(&self, note: &Note) -> Result<()> {
        sqlx::query("DELETE FROM notes WHERE id = ?1")
            .bind(note.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    /// Find all tags with their usage counts, ordered by name
    pub async fn find_all_tags(&self) -> Result<Vec<TagWithCount>> {
        let rows = sqlx::query_as::<_, TagCountRow>(
            "SELECT t.id, t.name, t.color, t.created_at, COUNT(nt.note_id) AS note_count
            FROM tags t
            LEFT JOIN note_tags nt ON nt.tag_id = t.id
            GROUP BY t.id
            ORDER BY t.name",
        )
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(rows.into_iter().map(TagWithCount::from_row).collect())
    }

    /// Find a single tag by its ID
    pub async fn find_single_tag_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>(
            "SELECT id, name, color, created_at
            FROM tags
            WHERE id = ?1
            LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(row.map(Tag::from_row))
    }

    /// Create a tag
    pub async fn create_tag(&self, values: &CreateTagValues<'_>) -> Result<Tag> {
        let now = Utc::now().naive_utc();
        let row = sqlx::query_as::<_, TagRow>(
            "INSERT INTO tags (name, color, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING id, name, color, created_at",
        )
        .bind(values.name)
        .bind(values.color)
        .bind(now)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| tag_write_error(err, values.name))?;

        Ok(Tag::from_row(row))
    }

    /// Update a single tag
    pub async fn update_tag(&self, tag: &Tag, values: &UpdateTagValues<'_>) -> Result<Tag> {
        let name = values.name.unwrap_or(&tag.name);
        let row = sqlx::query_as::<_, TagRow>(
            "UPDATE tags
            SET name = ?1, color = ?2
            WHERE id = ?3
            RETURNING id, name, color, created_at",
        )
        .bind(name)
        .bind(values.color.unwrap_or(&tag.color))
        .bind(tag.id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| tag_write_error(err, name))?;

        Ok(Tag::from_row(row))
    }

    /// Delete a tag; associations cascade, notes stay
    pub async fn delete_tag(&self, tag: &Tag) -> Result<()> {
        sqlx::query("DELETE FROM tags WHERE id = ?1")
            .bind(tag.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    /// Search notes by substring and tag membership
    ///
    /// Tags combine with OR among themselves and with AND against the
    /// query; results come back newest created first
    pub async fn search_notes(&self, filter: &SearchFilter<'_>) -> Result<Vec<Note>> {
        let query = filter
            .query
            .map(str::trim)
            .filter(|query| !query.is_empty());

        let mut sql = String::from(
            "SELECT DISTINCT n.id, n.title, n.body, n.created_at, n.updated_at FROM notes n",
        );

        if !filter.tag_ids.is_empty() {
            sql.push_str(" JOIN note_tags nt ON nt.note_id = n.id");
            sql.push_str(&format!(
                " WHERE nt.tag_id IN ({})",
                placeholders(filter.tag_ids.len())
            ));
        }

        if query.is_some() {
            sql.push_str(if filter.tag_ids.is_empty() {
                " WHERE"
            } else {
                " AND"
            });
            sql.push_str(" (lower(n.title) LIKE ? OR lower(n.body) LIKE ?)");
        }

        sql.push_str(" ORDER BY n.created_at DESC, n.id DESC");

        let mut statement = sqlx::query_as::<_, NoteRow>(&sql);

        for tag_id in filter.tag_ids {
            statement = statement.bind(*tag_id);
        }

        if let Some(query) = query {
            let pattern = format!("%{}%", query.to_lowercase());
            statement = statement.bind(pattern.clone()).bind(pattern);
        }

        let rows = statement
            .fetch_all(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        let mut associations = self.find_all_associations().await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = associations.remove(&row.id).unwrap_or_default();
                Note::from_row(row, tags)
            })
            .collect())
    }

    /// Whether the store holds no notes and no tags at all
    pub async fn is_empty(&self) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT (SELECT COUNT(*) FROM notes) + (SELECT COUNT(*) FROM tags)",
        )
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(count == 0)
    }

    /// Remove every note, tag, and association in one transaction
    pub async fn clear_all(&self) -> Result<()> {
        let mut tx = self.connection_pool.begin().await.map_err(connection_error)?;

        for statement in [
            "DELETE FROM note_tags",
            "DELETE FROM notes",
            "DELETE FROM tags",
        ] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(connection_error)?;
        }

        tx.commit().await.map_err(connection_error)
    }

    /// Replace the full association set of a note
    ///
    /// Unknown tag IDs fail the whole transaction
    async fn replace_associations(
        tx: &mut Transaction<'_, Sqlite>,
        note_id: i64,
        tag_ids: &[i64],
    ) -> Result<()> {
        if !tag_ids.is_empty() {
            let sql = format!(
                "SELECT id FROM tags WHERE id IN ({})",
                placeholders(tag_ids.len())
            );

            let mut statement = sqlx::query_scalar::<_, i64>(&sql);
            for tag_id in tag_ids {
                statement = statement.bind(*tag_id);
            }

            let known = statement
                .fetch_all(&mut **tx)
                .await
                .map_err(connection_error)?
                .into_iter()
                .collect::<HashSet<i64>>();

            let mut unknown = tag_ids
                .iter()
                .copied()
                .filter(|tag_id| !known.contains(tag_id))
                .collect::<Vec<i64>>();

            if !unknown.is_empty() {
                unknown.sort_unstable();
                unknown.dedup();

                return Err(Error::UnknownTags(unknown));
            }
        }

        sqlx::query("DELETE FROM note_tags WHERE note_id = ?1")
            .bind(note_id)
            .execute(&mut **tx)
            .await
            .map_err(connection_error)?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?1, ?2)")
                .bind(note_id)
                .bind(*tag_id)
                .execute(&mut **tx)
                .await
                .map_err(connection_error)?;
        }

        Ok(())
    }

    /// Tags of one note, ordered by name
    async fn find_tags_for_note(&self, note_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>(
            "SELECT t.id, t.name, t.color, t.created_at
            FROM tags t
            JOIN note_tags nt ON nt.tag_id = t.id
            WHERE nt.note_id = ?1
            ORDER BY t.name",
        )
        .bind(note_id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(rows.into_iter().map(Tag::from_row).collect())
    }

    /// All associations at once, grouped by note ID
    async fn find_all_associations(&self) -> Result<HashMap<i64, Vec<Tag>>> {
        let rows = sqlx::query_as::<_, AssociationRow>(
            "SELECT nt.note_id, t.id, t.name, t.color, t.created_at
            FROM note_tags nt
            JOIN tags t ON t.id = nt.tag_id
            ORDER BY nt.note_id, t.name",
        )
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        let mut associations: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in rows {
            associations
                .entry(row.note_id)
                .or_default()
                .push(Tag::from_association_row(row));
        }

        Ok(associations)
    }
}

/// Placeholder list for a dynamic `IN` clause
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Convert `SQLx` to storage connection error
fn connection_error(err: sqlx::Error) -> Error {
    Error::Connection(err.to_string())
}

/// Map unique violations on the tag name to a dedicated error
fn tag_write_error(err: sqlx::Error, name: &str) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::DuplicateTagName(name.to_string())
        }
        _ => connection_error(err),
    }
}
