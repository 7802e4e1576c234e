//! API request helpers

use axum::async_trait;
use axum::extract::path::ErrorKind;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Json;
use axum::extract::Path;
use axum::extract::Request;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use super::response;

/// JSON body extractor with friendly error responses
pub struct Form<F>(pub F);

#[async_trait]
impl<S, F> FromRequest<S> for Form<F>
where
    S: Send + Sync,
    F: DeserializeOwned,
{
    type Rejection = response::Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<F>::from_request(req, state).await {
            Ok(Json(form)) => Ok(Self(form)),
            Err(rejection) => Err(rejection_to_error(&rejection)),
        }
    }
}

fn rejection_to_error(rejection: &JsonRejection) -> response::Error {
    match rejection {
        JsonRejection::JsonDataError(error) => {
            response::Error::bad_request("Data error").with_description(error.body_text())
        }
        JsonRejection::JsonSyntaxError(error) => {
            response::Error::bad_request("JSON syntax error").with_description(error.body_text())
        }
        JsonRejection::MissingJsonContentType(_) => {
            response::Error::bad_request("Missing `application/json` content type")
        }
        JsonRejection::BytesRejection(_) => {
            response::Error::bad_request("Unable to buffer request body")
        }
        _ => response::Error::bad_request("Unknown error"),
    }
}

/// Path parameter extractor with friendly error responses
pub struct PathParameters<P>(pub P);

#[async_trait]
impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = response::Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<P>::from_request_parts(parts, state).await {
            Ok(Path(parameters)) => Ok(Self(parameters)),
            Err(rejection) => Err(path_rejection_to_error(&rejection)),
        }
    }
}

fn path_rejection_to_error(rejection: &PathRejection) -> response::Error {
    match rejection {
        PathRejection::FailedToDeserializePathParams(inner) => match inner.kind() {
            ErrorKind::ParseError { value, expected_type } => response::Error::bad_request(
                "Invalid path parameter",
            )
            .with_description(format!("cannot parse `{value}` as {expected_type}")),
            kind => response::Error::bad_request("Invalid path parameter")
                .with_description(kind.to_string()),
        },
        _ => response::Error::bad_request("Invalid path parameter"),
    }
}

/// Require a non-empty value for a named text field
pub fn parse_required_text<'v>(
    field: &'static str,
    value: &'v str,
) -> Result<&'v str, response::Error> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(response::Error::bad_request(format!(
            "`{field}` must not be empty"
        )));
    }

    Ok(trimmed)
}

/// Validate a `#RRGGBB` hex color
pub fn parse_color(value: &str) -> Result<&str, response::Error> {
    let well_formed = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !well_formed {
        return Err(response::Error::bad_request(
            "`color` must be a hex color such as `#8b5cf6`",
        ));
    }

    Ok(value)
}
