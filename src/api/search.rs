//! Note search endpoint

use axum::Extension;
use axum_extra::extract::Query;
use serde::Deserialize;

use crate::database::Database;
use crate::database::SearchFilter;

use super::notes::NoteResponse;
use super::response;
use super::utils::storage_error;

#[derive(Deserialize)]
pub struct SearchParameters {
    #[serde(default)]
    q: String,

    // repeatable, e.g. `?tag_id=1&tag_id=2`
    #[serde(default)]
    tag_id: Vec<i64>,
}

pub async fn search(
    Extension(database): Extension<Database>,
    Query(parameters): Query<SearchParameters>,
) -> Result<response::Success<Vec<NoteResponse>>, response::Error> {
    let query = parameters.q.trim();

    let filter = SearchFilter {
        query: (!query.is_empty()).then_some(query),
        tag_ids: &parameters.tag_id,
    };

    let notes = database
        .search_notes(&filter)
        .await
        .map_err(storage_error)?;

    Ok(response::Success::ok(NoteResponse::from_note_multiple(
        notes,
    )))
}
