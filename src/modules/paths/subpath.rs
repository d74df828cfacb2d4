use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use primer_http::ValidPath;
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

#[derive(Debug, Serialize, Deserialize, Validate)]
struct AssetPath {
    file_path: String,
}

/// Captures the rest of the URL, slashes included.
pub struct PathSubpathModule;

#[async_trait]
impl Module for PathSubpathModule {
    fn name(&self) -> &'static str {
        "path-subpath"
    }

    fn routes(&self) -> Router {
        Router::new().route("/assets/{*file_path}", get(read_asset))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path validation",
            &[RouteDoc::new("get", "/assets/{*file_path}", "Read a nested asset path")],
        ))
    }
}

async fn read_asset(ValidPath(path): ValidPath<AssetPath>) -> Json<AssetPath> {
    Json(path)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathSubpathModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;

    #[tokio::test]
    async fn nested_paths_are_captured_whole() {
        let (_, body) = testing::get(PathSubpathModule.routes(), "/assets/css/app/main.css").await;
        assert_eq!(body["file_path"], "css/app/main.css");

        let (_, body) =
            testing::get(PathSubpathModule.routes(), "/assets/images/users/profile.jpg").await;
        assert_eq!(body["file_path"], "images/users/profile.jpg");
    }
}
