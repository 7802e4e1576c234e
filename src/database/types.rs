//! Database row types

use chrono::NaiveDateTime;

use crate::notes::Note;
use crate::tags::Tag;
use crate::tags::TagWithCount;

/// `SQLx` row for a note, without its tags
#[derive(Debug, sqlx::FromRow)]
pub struct NoteRow {
    /// Note ID
    pub id: i64,

    /// Title
    pub title: String,

    /// Body text
    pub body: String,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: NaiveDateTime,
}

/// `SQLx` row for a tag
#[derive(Debug, sqlx::FromRow)]
pub struct TagRow {
    /// Tag ID
    pub id: i64,

    /// Unique name
    pub name: String,

    /// Hex color code
    pub color: String,

    /// Creation date
    pub created_at: NaiveDateTime,
}

/// `SQLx` row for a tag joined with its usage count
#[derive(Debug, sqlx::FromRow)]
pub struct TagCountRow {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub created_at: NaiveDateTime,
    pub note_count: i64,
}

/// `SQLx` row for one note/tag association, carrying the full tag
#[derive(Debug, sqlx::FromRow)]
pub struct AssociationRow {
    pub note_id: i64,
    pub id: i64,
    pub name: String,
    pub color: String,
    pub created_at: NaiveDateTime,
}

impl Note {
    /// Assemble a note from its row and its tags
    pub(super) fn from_row(row: NoteRow, tags: Vec<Tag>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
            tags,
        }
    }
}

impl Tag {
    /// Create a tag from its row
    pub(super) fn from_row(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
            created_at: row.created_at,
        }
    }

    /// Create a tag from an association row
    pub(super) fn from_association_row(row: AssociationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
            created_at: row.created_at,
        }
    }
}

impl TagWithCount {
    /// Create a counted tag from its row
    pub(super) fn from_row(row: TagCountRow) -> Self {
        Self {
            tag: Tag {
                id: row.id,
                name: row.name,
                color: row.color,
                created_at: row.created_at,
            },
            note_count: row.note_count,
        }
    }
}
