use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use primer_http::ValidPath;
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

/// System-generated numerical identifier
#[derive(Debug, Serialize, Deserialize, Validate)]
struct UserPath {
    user_id: i64,
}

/// A required integer path parameter.
pub struct PathBasicModule;

#[async_trait]
impl Module for PathBasicModule {
    fn name(&self) -> &'static str {
        "path-basic"
    }

    fn routes(&self) -> Router {
        Router::new().route("/users/{user_id}", get(read_user))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path validation",
            &[RouteDoc::new("get", "/users/{user_id}", "Fetch a user by numeric id")],
        ))
    }
}

async fn read_user(ValidPath(path): ValidPath<UserPath>) -> Json<UserPath> {
    Json(path)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathBasicModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn reads_numeric_id() {
        let (status, body) = testing::get(PathBasicModule.routes(), "/users/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"user_id": 42}));
    }

    #[tokio::test]
    async fn rejects_fractional_id() {
        let (status, _) = testing::get(PathBasicModule.routes(), "/users/4.2").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
