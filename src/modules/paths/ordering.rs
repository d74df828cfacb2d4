use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use primer_http::ValidPath;
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

#[derive(Debug, Serialize, Deserialize, Validate)]
struct UsernamePath {
    username: String,
}

/// A fixed `/users/me` segment next to a dynamic `/users/{username}`.
///
/// The router prefers static segments, so `me` never reaches `read_user`.
pub struct PathOrderingModule;

#[async_trait]
impl Module for PathOrderingModule {
    fn name(&self) -> &'static str {
        "path-ordering"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/users/me", get(read_me))
            .route("/users/{username}", get(read_user))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path validation",
            &[
                RouteDoc::new("get", "/users/me", "The current user"),
                RouteDoc::new("get", "/users/{username}", "A user by name"),
            ],
        ))
    }
}

async fn read_me() -> Json<Value> {
    Json(json!({ "me": true }))
}

async fn read_user(ValidPath(path): ValidPath<UsernamePath>) -> Json<UsernamePath> {
    Json(path)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathOrderingModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;

    #[tokio::test]
    async fn fixed_segment_wins() {
        let (_, body) = testing::get(PathOrderingModule.routes(), "/users/me").await;
        assert_eq!(body, json!({"me": true}));
    }

    #[tokio::test]
    async fn other_names_reach_the_dynamic_route() {
        let (_, body) = testing::get(PathOrderingModule.routes(), "/users/johndoe").await;
        assert_eq!(body, json!({"username": "johndoe"}));
    }
}
