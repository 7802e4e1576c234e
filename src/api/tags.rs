//! Tag endpoints

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use crate::database::CreateTagValues;
use crate::database::Database;
use crate::database::UpdateTagValues;
use crate::tags::Tag;
use crate::tags::TagWithCount;

use super::request::parse_color;
use super::request::parse_required_text;
use super::request::Form;
use super::request::PathParameters;
use super::response;
use super::utils::fetch_tag;
use super::utils::storage_error;

#[derive(Serialize)]
pub struct TagResponse {
    id: i64,
    name: String,
    color: String,
}

impl TagResponse {
    pub fn from_tag(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWithCountResponse {
    id: i64,
    name: String,
    color: String,
    note_count: i64,
}

impl TagWithCountResponse {
    fn from_tag_with_count(tag: TagWithCount) -> Self {
        Self {
            id: tag.tag.id,
            name: tag.tag.name,
            color: tag.tag.color,
            note_count: tag.note_count,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateTagForm {
    name: String,
    color: String,
}

#[derive(Deserialize)]
pub struct UpdateTagForm {
    name: Option<String>,
    color: Option<String>,
}

pub async fn list(
    Extension(database): Extension<Database>,
) -> Result<response::Success<Vec<TagWithCountResponse>>, response::Error> {
    let tags = database.find_all_tags().await.map_err(storage_error)?;

    Ok(response::Success::ok(
        tags.into_iter()
            .map(TagWithCountResponse::from_tag_with_count)
            .collect(),
    ))
}

pub async fn create(
    Extension(database): Extension<Database>,
    Form(form): Form<CreateTagForm>,
) -> Result<response::Success<TagResponse>, response::Error> {
    let name = parse_required_text("name", &form.name)?;
    let color = parse_color(&form.color)?;

    let values = CreateTagValues { name, color };

    let tag = database.create_tag(&values).await.map_err(storage_error)?;

    Ok(response::Success::created(TagResponse::from_tag(tag)))
}

pub async fn update(
    Extension(database): Extension<Database>,
    PathParameters(tag_id): PathParameters<i64>,
    Form(form): Form<UpdateTagForm>,
) -> Result<response::Success<TagResponse>, response::Error> {
    let tag = fetch_tag(&database, tag_id).await?;

    if let Some(name) = &form.name {
        parse_required_text("name", name)?;
    }

    if let Some(color) = &form.color {
        parse_color(color)?;
    }

    let values = UpdateTagValues {
        name: form.name.as_ref(),
        color: form.color.as_ref(),
    };

    let tag = database
        .update_tag(&tag, &values)
        .await
        .map_err(storage_error)?;

    Ok(response::Success::ok(TagResponse::from_tag(tag)))
}

pub async fn delete(
    Extension(database): Extension<Database>,
    PathParameters(tag_id): PathParameters<i64>,
) -> Result<response::Success<()>, response::Error> {
    let tag = fetch_tag(&database, tag_id).await?;

    database.delete_tag(&tag).await.map_err(storage_error)?;

    Ok(response::Success::no_content())
}
