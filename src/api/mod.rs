//! All API endpoints

use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;

mod maintenance;
mod notes;
mod request;
mod response;
mod search;
mod tags;
mod utils;

/// Routes of the JSON API
pub fn router() -> Router {
    Router::new()
        .route("/notes", get(notes::list).post(notes::create))
        .route(
            "/notes/:note",
            get(notes::single).put(notes::update).delete(notes::delete),
        )
        .route("/tags", get(tags::list).post(tags::create))
        .route("/tags/:tag", put(tags::update).delete(tags::delete))
        .route("/search", get(search::search))
        .route(
            "/backup",
            post(maintenance::create_backup).get(maintenance::latest_backup),
        )
        .route("/reset-data", post(maintenance::reset_data))
}
