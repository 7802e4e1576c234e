//! API utilities

use crate::database;
use crate::database::Database;
use crate::notes::Note;
use crate::tags::Tag;

use super::response;

/// Map a storage failure onto an API error
pub fn storage_error(error: database::Error) -> response::Error {
    match error {
        database::Error::DuplicateTagName(name) => {
            response::Error::conflict(format!("A tag named `{name}` already exists"))
        }
        database::Error::UnknownTags(ids) => {
            let ids = ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");

            response::Error::bad_request(format!("Unknown tag ids: {ids}"))
        }
        database::Error::Connection(_) => {
            tracing::error!("storage failure: {error}");

            response::Error::internal_server_error("Storage unavailable")
        }
    }
}

pub async fn fetch_note(database: &Database, note_id: i64) -> Result<Note, response::Error> {
    database
        .find_single_note_by_id(note_id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| response::Error::not_found("Note not found"))
}

pub async fn fetch_tag(database: &Database, tag_id: i64) -> Result<Tag, response::Error> {
    database
        .find_single_tag_by_id(tag_id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| response::Error::not_found("Tag not found"))
}
