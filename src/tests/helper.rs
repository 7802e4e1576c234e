use axum::body::Body;
use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Map;
use serde_json::Value;
use tempfile::TempDir;
use tower::Service;

use crate::config::Config;
use crate::database::DatabaseConfig;
use crate::replication;
use crate::setup_app;

/// Test helper version of the Note response
#[derive(Debug, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub tags: Vec<Tag>,
}

/// Test helper version of the Tag response
#[derive(Debug, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub note_count: Option<i64>,
}

/// Error response
#[derive(Debug, PartialEq, Eq)]
pub struct Error {
    pub error: String,
    pub description: Option<String>,
}

/// Setup the Jotter app against a throwaway data directory
///
/// The directory handle keeps the files alive for the duration of the
/// test; dropping it removes them
pub async fn setup_test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();

    let config = Config {
        database: DatabaseConfig::Path(dir.path().join("jotter.db")),
        replication: replication::Config {
            snapshot_path: dir.path().join("snapshot.json"),
            backup_dir: dir.path().join("backups"),
            backup_retention: 5,
            remote: None,
        },
        seed: false,
    };

    let app = setup_app(config).await.unwrap();

    (app, dir)
}

pub async fn list_notes(app: &mut Router) -> (StatusCode, Option<Vec<Note>>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/notes")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_notes(&body))
        } else {
            None
        },
    )
}

pub async fn single_note(app: &mut Router, id: i64) -> (StatusCode, Option<Note>, Option<String>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/notes/{id}"))
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_note(&body))
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST || status_code == StatusCode::NOT_FOUND {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_create_note(
    app: &mut Router,
    title: &str,
    body: &str,
    tag_ids: &[i64],
) -> (StatusCode, Option<Note>, Option<String>) {
    let mut payload = Map::new();
    payload.insert("title".to_string(), Value::String(title.to_string()));
    payload.insert("body".to_string(), Value::String(body.to_string()));
    payload.insert(
        "tagIds".to_string(),
        Value::Array(tag_ids.iter().map(|id| Value::from(*id)).collect()),
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/notes")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::CREATED {
            Some(get_note(&body))
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn create_note(app: &mut Router, title: &str, body: &str, tag_ids: &[i64]) -> Note {
    let (status_code, note, _) = maybe_create_note(app, title, body, tag_ids).await;

    assert_eq!(StatusCode::CREATED, status_code);

    note.unwrap()
}

pub async fn maybe_update_note(
    app: &mut Router,
    id: i64,
    payload: Map<String, Value>,
) -> (StatusCode, Option<Note>, Option<String>) {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(format!("/api/notes/{id}"))
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_note(&body))
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST || status_code == StatusCode::NOT_FOUND {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn delete_note(app: &mut Router, id: i64) -> StatusCode {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/notes/{id}"))
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();

    response.status()
}

pub async fn maybe_create_note_with_raw_body(
    app: &mut Router,
    body: &'static str,
    include_content_type: bool,
) -> (StatusCode, Option<Error>) {
    let mut builder = Request::builder().method(Method::POST).uri("/api/notes");

    if include_content_type {
        builder = builder.header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    }

    let request = builder.body(Body::from(body.as_bytes())).unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_error(&body))
        } else {
            None
        },
    )
}

pub async fn list_tags(app: &mut Router) -> (StatusCode, Option<Vec<Tag>>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/tags")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_tags(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_create_tag(
    app: &mut Router,
    name: &str,
    color: &str,
) -> (StatusCode, Option<Tag>, Option<String>) {
    let mut payload = Map::new();
    payload.insert("name".to_string(), Value::String(name.to_string()));
    payload.insert("color".to_string(), Value::String(color.to_string()));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tags")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::CREATED {
            Some(get_tag(&body))
        } else {
            None
        },
        if status_code != StatusCode::CREATED {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn create_tag(app: &mut Router, name: &str, color: &str) -> Tag {
    let (status_code, tag, _) = maybe_create_tag(app, name, color).await;

    assert_eq!(StatusCode::CREATED, status_code);

    tag.unwrap()
}

pub async fn maybe_update_tag(
    app: &mut Router,
    id: i64,
    payload: Map<String, Value>,
) -> (StatusCode, Option<Tag>, Option<String>) {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(format!("/api/tags/{id}"))
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_tag(&body))
        } else {
            None
        },
        if status_code != StatusCode::OK {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn delete_tag(app: &mut Router, id: i64) -> StatusCode {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/tags/{id}"))
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();

    response.status()
}

pub async fn search_notes(app: &mut Router, query: &str) -> (StatusCode, Option<Vec<Note>>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/search{query}"))
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_notes(&body))
        } else {
            None
        },
    )
}

pub async fn create_backup(app: &mut Router) -> (StatusCode, Option<Value>) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/backup")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_data(&body))
        } else {
            None
        },
    )
}

pub async fn latest_backup(app: &mut Router) -> (StatusCode, Option<Value>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/backup")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_data(&body))
        } else {
            None
        },
    )
}

pub async fn reset_data(app: &mut Router) -> StatusCode {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/reset-data")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();

    response.status()
}

fn value_to_tag(tag: &Map<String, Value>) -> Tag {
    Tag {
        id: tag["id"].as_i64().unwrap(),
        name: tag["name"].as_str().map(ToString::to_string).unwrap(),
        color: tag["color"].as_str().map(ToString::to_string).unwrap(),
        note_count: tag.get("noteCount").and_then(Value::as_i64),
    }
}

fn get_tag(body: &Bytes) -> Tag {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["data"]
        .as_object()
        .map(value_to_tag)
        .unwrap()
}

fn get_tags(body: &Bytes) -> Vec<Tag> {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_object().unwrap())
        .map(value_to_tag)
        .collect()
}

fn value_to_note(note: &Map<String, Value>) -> Note {
    Note {
        id: note["id"].as_i64().unwrap(),
        title: note["title"].as_str().map(ToString::to_string).unwrap(),
        body: note["body"].as_str().map(ToString::to_string).unwrap(),
        tags: note["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f.as_object().unwrap())
            .map(value_to_tag)
            .collect(),
    }
}

fn get_note(body: &Bytes) -> Note {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["data"]
        .as_object()
        .map(value_to_note)
        .unwrap()
}

fn get_notes(body: &Bytes) -> Vec<Note> {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_object().unwrap())
        .map(value_to_note)
        .collect()
}

fn get_data(body: &Bytes) -> Value {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["data"].clone()
}

fn value_to_error(error: &Map<String, Value>) -> Error {
    Error {
        error: error["error"].as_str().map(ToString::to_string).unwrap(),
        description: error
            .get("description")
            .and_then(Value::as_str)
            .map(ToString::to_string),
    }
}

fn get_error(body: &Bytes) -> Error {
    serde_json::from_slice::<Value>(&body[..])
        .unwrap()
        .as_object()
        .map(value_to_error)
        .unwrap()
}

fn get_error_message(body: &Bytes) -> String {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["error"]
        .as_str()
        .map(ToString::to_string)
        .unwrap()
}
