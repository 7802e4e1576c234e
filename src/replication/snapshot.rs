//! The snapshot document and the live snapshot file tier

use std::path::Path;
use std::path::PathBuf;

use axum::async_trait;
use chrono::NaiveDateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tokio::fs;

use crate::notes::Note;
use crate::tags::Tag;

use super::Result;
use super::Tier;

/// An immutable point-in-time export of the full collection
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// When the export was taken
    pub captured_at: NaiveDateTime,

    /// All notes, each carrying its tag IDs
    pub notes: Vec<NoteRecord>,

    /// All tags
    pub tags: Vec<TagRecord>,
}

/// One exported note
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub tag_ids: Vec<i64>,
}

/// One exported tag
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    pub id: i64,
    pub name: String,
    pub color: String,
}

impl Snapshot {
    /// Capture the current collection
    pub fn capture(notes: &[Note], tags: &[Tag]) -> Self {
        Self {
            captured_at: Utc::now().naive_utc(),
            notes: notes.iter().map(NoteRecord::from_note).collect(),
            tags: tags.iter().map(TagRecord::from_tag).collect(),
        }
    }

    /// A snapshot of nothing, the normal bootstrap state
    pub fn empty() -> Self {
        Self {
            captured_at: Utc::now().naive_utc(),
            notes: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Whether the snapshot holds no notes and no tags
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.tags.is_empty()
    }
}

impl NoteRecord {
    fn from_note(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            body: note.body.clone(),
            created_at: note.created_at,
            updated_at: note.updated_at,
            tag_ids: note.tags.iter().map(|tag| tag.id).collect(),
        }
    }
}

impl TagRecord {
    fn from_tag(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
            color: tag.color.clone(),
        }
    }
}

/// The single live snapshot file, overwritten on every save
pub struct SnapshotFile {
    /// Well-known path of the live snapshot
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Tier for SnapshotFile {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        write_atomically(&self.path, &bytes).await?;

        Ok(())
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Write to a sibling temp file and rename it into place, so a crash
/// mid-write never leaves a half-written file posing as a snapshot
pub(super) async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    fs::write(&temp_path, bytes).await?;
    fs::rename(&temp_path, path).await
}
