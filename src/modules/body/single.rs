use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use primer_http::ValidJson;
use primer_kernel::Module;
use serde_json::{json, Value};

use super::models::Book;
use crate::utils::{openapi_fragment, RouteDoc};

/// One model as the whole request body.
pub struct BodySingleModule;

#[async_trait]
impl Module for BodySingleModule {
    fn name(&self) -> &'static str {
        "body-single"
    }

    fn routes(&self) -> Router {
        Router::new().route("/books", post(create_book))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Request body",
            &[RouteDoc::new("post", "/books", "Create a book from a JSON body")],
        ))
    }
}

async fn create_book(ValidJson(book): ValidJson<Book>) -> Json<Value> {
    Json(json!({ "created": book }))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BodySingleModule)
}
