//! Note endpoints

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use crate::database::CreateNoteValues;
use crate::database::Database;
use crate::database::UpdateNoteValues;
use crate::notes::Note;

use super::request::parse_required_text;
use super::request::Form;
use super::request::PathParameters;
use super::response;
use super::tags::TagResponse;
use super::utils::fetch_note;
use super::utils::storage_error;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    id: i64,
    title: String,
    body: String,
    created_at: String,
    updated_at: String,
    tags: Vec<TagResponse>,
}

impl NoteResponse {
    pub fn from_note(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            body: note.body,
            created_at: note.created_at.and_utc().to_rfc3339(),
            updated_at: note.updated_at.and_utc().to_rfc3339(),
            tags: note.tags.into_iter().map(TagResponse::from_tag).collect(),
        }
    }

    pub fn from_note_multiple(notes: Vec<Note>) -> Vec<Self> {
        notes.into_iter().map(Self::from_note).collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteForm {
    title: String,
    // required, but an explicitly empty string is fine
    body: String,
    #[serde(default)]
    tag_ids: Vec<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteForm {
    title: Option<String>,
    body: Option<String>,
    tag_ids: Option<Vec<i64>>,
}

pub async fn list(
    Extension(database): Extension<Database>,
) -> Result<response::Success<Vec<NoteResponse>>, response::Error> {
    let notes = database.find_all_notes().await.map_err(storage_error)?;

    Ok(response::Success::ok(NoteResponse::from_note_multiple(
        notes,
    )))
}

pub async fn single(
    Extension(database): Extension<Database>,
    PathParameters(note_id): PathParameters<i64>,
) -> Result<response::Success<NoteResponse>, response::Error> {
    let note = fetch_note(&database, note_id).await?;

    Ok(response::Success::ok(NoteResponse::from_note(note)))
}

pub async fn create(
    Extension(database): Extension<Database>,
    Form(form): Form<CreateNoteForm>,
) -> Result<response::Success<NoteResponse>, response::Error> {
    let title = parse_required_text("title", &form.title)?;

    let values = CreateNoteValues {
        title,
        body: &form.body,
        tag_ids: &form.tag_ids,
    };

    let note = database.create_note(&values).await.map_err(storage_error)?;

    Ok(response::Success::created(NoteResponse::from_note(note)))
}

pub async fn update(
    Extension(database): Extension<Database>,
    PathParameters(note_id): PathParameters<i64>,
    Form(form): Form<UpdateNoteForm>,
) -> Result<response::Success<NoteResponse>, response::Error> {
    let note = fetch_note(&database, note_id).await?;

    if let Some(title) = &form.title {
        parse_required_text("title", title)?;
    }

    let values = UpdateNoteValues {
        title: form.title.as_ref(),
        body: form.body.as_ref(),
        tag_ids: form.tag_ids.as_deref(),
    };

    let note = database
        .update_note(&note, &values)
        .await
        .map_err(storage_error)?;

    Ok(response::Success::ok(NoteResponse::from_note(note)))
}

pub async fn delete(
    Extension(database): Extension<Database>,
    PathParameters(note_id): PathParameters<i64>,
) -> Result<response::Success<()>, response::Error> {
    let note = fetch_note(&database, note_id).await?;

    database.delete_note(&note).await.map_err(storage_error)?;

    Ok(response::Success::no_content())
}
