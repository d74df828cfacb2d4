use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use once_cell::sync::Lazy;
use primer_http::ValidJson;
use primer_kernel::Module;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

static USERNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

fn default_country() -> String {
    "IN".to_string()
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct User {
    #[validate(
        length(min = 3, max = 20, message = "username must be 3-20 characters"),
        regex(path = *USERNAME, message = "username may contain letters, digits, and underscores")
    )]
    username: String,
    #[validate(range(min = 13, max = 120, message = "age must be between 13 and 120"))]
    age: i64,
    #[validate(regex(path = *EMAIL, message = "email is not valid"))]
    email: String,
    /// Short profile bio
    #[validate(length(max = 160, message = "bio must be at most 160 characters"))]
    bio: Option<String>,
    #[serde(default = "default_country")]
    country: String,
}

/// Length, pattern, and range rules on body fields.
pub struct BodyValidationModule;

#[async_trait]
impl Module for BodyValidationModule {
    fn name(&self) -> &'static str {
        "body-validation"
    }

    fn routes(&self) -> Router {
        Router::new().route("/users", post(create_user))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Request body",
            &[RouteDoc::new("post", "/users", "Create a user with validated fields")],
        ))
    }
}

async fn create_user(ValidJson(user): ValidJson<User>) -> Json<Value> {
    Json(json!({ "created_user": user }))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BodyValidationModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::{Method, StatusCode};

    async fn post(body: Value) -> (StatusCode, Value) {
        testing::send_json(BodyValidationModule.routes(), Method::POST, "/users", body).await
    }

    #[tokio::test]
    async fn valid_user_gets_default_country() {
        let (status, body) = post(json!({
            "username": "api_user",
            "age": 25,
            "email": "user@example.com",
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["created_user"]["country"], "IN");
        assert_eq!(body["created_user"]["bio"], Value::Null);
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let (status, body) = post(json!({
            "username": "api_user",
            "age": 25,
            "email": "user.example.com",
        }))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(testing::first_detail_message(&body), "email is not valid");
    }

    #[tokio::test]
    async fn username_and_age_rules() {
        let (status, body) = post(json!({
            "username": "bad name!",
            "age": 12,
            "email": "user@example.com",
        }))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["error"]["details"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|d| d["field"].as_str())
            .collect();
        assert_eq!(fields, vec!["age", "username"]);
    }

    #[tokio::test]
    async fn long_bio_is_rejected() {
        let (status, _) = post(json!({
            "username": "api_user",
            "age": 30,
            "email": "user@example.com",
            "bio": "x".repeat(161),
        }))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
