use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use primer_http::ValidJson;
use primer_kernel::Module;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use validator::{Validate, ValidationError};

use crate::utils::{openapi_fragment, RouteDoc};

fn normalized_email<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_lowercase())
}

fn passwords_match(signup: &Signup) -> Result<(), ValidationError> {
    if signup.password != signup.confirm {
        return Err(ValidationError::new("password_mismatch")
            .with_message("password and confirm must match".into()));
    }
    Ok(())
}

/// Email is normalized while binding; the password pair is checked as a whole.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "passwords_match"))]
struct Signup {
    #[serde(deserialize_with = "normalized_email")]
    email: String,
    password: String,
    confirm: String,
}

pub struct CustomValidationModule;

#[async_trait]
impl Module for CustomValidationModule {
    fn name(&self) -> &'static str {
        "custom-validation"
    }

    fn routes(&self) -> Router {
        Router::new().route("/signup", post(signup))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Data validation",
            &[RouteDoc::new("post", "/signup", "Sign up with a confirmed password")],
        ))
    }
}

async fn signup(ValidJson(signup): ValidJson<Signup>) -> Json<Value> {
    Json(json!({ "email": signup.email, "status": "success" }))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(CustomValidationModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::{Method, StatusCode};

    async fn post(body: Value) -> (StatusCode, Value) {
        testing::send_json(CustomValidationModule.routes(), Method::POST, "/signup", body).await
    }

    #[tokio::test]
    async fn email_is_trimmed_and_lowercased() {
        let (status, body) = post(json!({
            "email": "  Alice@Example.COM ",
            "password": "hunter22",
            "confirm": "hunter22"
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"email": "alice@example.com", "status": "success"}));
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_rejected() {
        let (status, body) = post(json!({
            "email": "alice@example.com",
            "password": "hunter22",
            "confirm": "hunter23"
        }))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            testing::first_detail_message(&body),
            "password and confirm must match"
        );
    }
}
