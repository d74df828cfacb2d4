use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use primer_http::ValidPath;
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use super::UserId;
use crate::utils::{openapi_fragment, RouteDoc};

#[derive(Debug, Serialize, Deserialize, Validate)]
struct UserPath {
    user_id: UserId,
}

/// Reuses the constrained [`UserId`] type instead of repeating the bound.
pub struct PathAnnotatedModule;

#[async_trait]
impl Module for PathAnnotatedModule {
    fn name(&self) -> &'static str {
        "path-annotated"
    }

    fn routes(&self) -> Router {
        Router::new().route("/users/{user_id}", get(read_user))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path validation",
            &[RouteDoc::new("get", "/users/{user_id}", "Fetch a user, id >= 1")],
        ))
    }
}

async fn read_user(ValidPath(path): ValidPath<UserPath>) -> Json<UserPath> {
    Json(path)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathAnnotatedModule)
}
