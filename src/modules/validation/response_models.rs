use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use primer_http::ValidJson;
use primer_kernel::Module;
use serde::Serialize;
use serde_json::Value;

use crate::modules::body::models::Book;
use crate::utils::{openapi_fragment, RouteDoc};

/// The public projection of a [`Book`].
#[derive(Debug, Serialize)]
pub struct PublicBook {
    pub id: i64,
    pub title: String,
}

impl From<Book> for PublicBook {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
        }
    }
}

/// The response type filters the accepted model down to public fields.
pub struct ResponseModelsModule;

#[async_trait]
impl Module for ResponseModelsModule {
    fn name(&self) -> &'static str {
        "response-models"
    }

    fn routes(&self) -> Router {
        Router::new().route("/books", post(create_book))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Data validation",
            &[RouteDoc::new("post", "/books", "Create a book, returning public fields")],
        ))
    }
}

async fn create_book(ValidJson(book): ValidJson<Book>) -> Json<PublicBook> {
    Json(book.into())
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(ResponseModelsModule)
}
