use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use once_cell::sync::Lazy;
use primer_http::ValidPath;
use primer_kernel::Module;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

static USERNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

#[derive(Debug, Serialize, Deserialize, Validate)]
struct UsernamePath {
    #[validate(
        length(min = 3, max = 20, message = "username must be 3-20 characters"),
        regex(path = *USERNAME, message = "username may contain letters, numbers, or underscore")
    )]
    username: String,
}

/// Length and pattern checks on a string path parameter.
pub struct PathStringModule;

#[async_trait]
impl Module for PathStringModule {
    fn name(&self) -> &'static str {
        "path-string"
    }

    fn routes(&self) -> Router {
        Router::new().route("/users/by-name/{username}", get(by_name))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path validation",
            &[RouteDoc::new(
                "get",
                "/users/by-name/{username}",
                "3-20 characters: letters, numbers, or underscore",
            )],
        ))
    }
}

async fn by_name(ValidPath(path): ValidPath<UsernamePath>) -> Json<UsernamePath> {
    Json(path)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathStringModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn valid_username() {
        let (status, body) =
            testing::get(PathStringModule.routes(), "/users/by-name/fast_api_99").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "fast_api_99");
    }

    #[tokio::test]
    async fn too_short_username() {
        let (status, body) = testing::get(PathStringModule.routes(), "/users/by-name/ab").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            testing::first_detail_message(&body),
            "username must be 3-20 characters"
        );
    }

    #[tokio::test]
    async fn illegal_characters() {
        let (status, body) =
            testing::get(PathStringModule.routes(), "/users/by-name/john-doe").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["code"], "regex");
    }
}
