use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use primer_http::{extract::lenient_bool, ValidJson, ValidPath, ValidQuery};
use primer_kernel::Module;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::models::Book;
use crate::utils::{openapi_fragment, RouteDoc};

#[derive(Debug, Deserialize, Validate)]
struct CatalogPath {
    catalog_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
struct FeaturedQuery {
    #[serde(default, deserialize_with = "lenient_bool")]
    featured: bool,
}

/// Path, query, and body bound in one handler.
pub struct BodyWithPathQueryModule;

#[async_trait]
impl Module for BodyWithPathQueryModule {
    fn name(&self) -> &'static str {
        "body-with-path-query"
    }

    fn routes(&self) -> Router {
        Router::new().route("/catalogs/{catalog_id}/books", post(add_book))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Request body",
            &[RouteDoc::new(
                "post",
                "/catalogs/{catalog_id}/books",
                "Add a book to a catalog, optionally featured",
            )],
        ))
    }
}

async fn add_book(
    ValidPath(path): ValidPath<CatalogPath>,
    ValidQuery(query): ValidQuery<FeaturedQuery>,
    ValidJson(book): ValidJson<Book>,
) -> Json<Value> {
    Json(json!({
        "catalog_id": path.catalog_id,
        "featured": query.featured,
        "book": book,
    }))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BodyWithPathQueryModule)
}
