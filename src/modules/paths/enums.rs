use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use primer_http::ValidPath;
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct RolePath {
    role: Role,
}

/// A path parameter restricted to a fixed set of values.
pub struct PathEnumModule;

#[async_trait]
impl Module for PathEnumModule {
    fn name(&self) -> &'static str {
        "path-enum"
    }

    fn routes(&self) -> Router {
        Router::new().route("/roles/{role}", get(get_role))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path validation",
            &[RouteDoc::new("get", "/roles/{role}", "admin, editor or viewer")],
        ))
    }
}

async fn get_role(ValidPath(path): ValidPath<RolePath>) -> Json<RolePath> {
    Json(path)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathEnumModule)
}
