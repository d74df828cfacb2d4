//! Validating extractors.
//!
//! Each extractor binds the request part with the matching axum extractor,
//! turns binding failures into a 422 [`AppError::Validation`], then runs the
//! target's [`Validate`] rules.

use std::fmt;

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    Form, Json,
};
use serde::{de, de::DeserializeOwned, Deserializer};
use serde_json::json;
use validator::Validate;

use crate::error::AppError;

/// Path parameters bound into `T` and validated.
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

/// Query string bound into `T` and validated.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

/// JSON body bound into `T` and validated.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

/// URL-encoded form body bound into `T` and validated.
#[derive(Debug, Clone)]
pub struct ValidForm<T>(pub T);

fn binding_error(location: &str, reason: String) -> AppError {
    AppError::validation(
        vec![json!({ "location": location, "message": reason })],
        format!("invalid {}", location),
    )
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        binding_error("path", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        binding_error("query", rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        binding_error("body", rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        binding_error("form", rejection.body_text())
    }
}

impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequest<S> for ValidForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Deserialize a boolean from `true/false`, `1/0`, `on/off`, `yes/no`,
/// `t/f` or `y/n`, ignoring case.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientBoolVisitor)
}

struct LenientBoolVisitor;

impl de::Visitor<'_> for LenientBoolVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a boolean such as true/false, 1/0, on/off or yes/no")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
        match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(de::Unexpected::Unsigned(value), &self)),
        }
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<bool, E> {
        match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(de::Unexpected::Signed(value), &self)),
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" | "t" | "y" => Ok(true),
            "false" | "0" | "off" | "no" | "f" | "n" => Ok(false),
            _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct Flag {
        #[serde(deserialize_with = "lenient_bool")]
        enabled: bool,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Page {
        #[validate(range(min = 1, max = 500))]
        page: i64,
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/flags",
                get(|ValidQuery(flag): ValidQuery<Flag>| async move { flag.enabled.to_string() }),
            )
            .route(
                "/pages/{page}",
                get(|ValidPath(p): ValidPath<Page>| async move { p.page.to_string() }),
            )
    }

    async fn call(uri: &str) -> (StatusCode, String) {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn lenient_bool_accepts_common_spellings() {
        for (raw, expected) in [("on", "true"), ("YES", "true"), ("0", "false"), ("f", "false")] {
            let (status, body) = call(&format!("/flags?enabled={}", raw)).await;
            assert_eq!(status, StatusCode::OK, "input {}", raw);
            assert_eq!(body, expected);
        }
    }

    #[tokio::test]
    async fn lenient_bool_rejects_garbage() {
        let (status, _) = call("/flags?enabled=maybe").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn path_type_mismatch_is_unprocessable() {
        let (status, body) = call("/pages/abc").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("\"location\":\"path\""));
    }

    #[tokio::test]
    async fn path_range_violation_is_unprocessable() {
        let (status, body) = call("/pages/501").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("\"field\":\"page\""));

        let (status, body) = call("/pages/500").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "500");
    }
}
