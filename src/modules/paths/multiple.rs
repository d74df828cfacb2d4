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
struct ShopItemPath {
    #[validate(range(min = 1, message = "Shop ID must be >= 1"))]
    shop_id: i64,
    #[validate(range(min = 1, message = "Item ID must be >= 1"))]
    item_id: i64,
}

/// Two validated path parameters in one route.
pub struct PathMultipleModule;

#[async_trait]
impl Module for PathMultipleModule {
    fn name(&self) -> &'static str {
        "path-multiple"
    }

    fn routes(&self) -> Router {
        Router::new().route("/shops/{shop_id}/items/{item_id}", get(read_item))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path validation",
            &[RouteDoc::new(
                "get",
                "/shops/{shop_id}/items/{item_id}",
                "Fetch an item in a shop",
            )],
        ))
    }
}

async fn read_item(ValidPath(path): ValidPath<ShopItemPath>) -> Json<ShopItemPath> {
    Json(path)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathMultipleModule)
}
