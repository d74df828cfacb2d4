use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use primer_http::{ValidJson, ValidPath};
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use super::models::Book;
use crate::utils::{openapi_fragment, RouteDoc};

#[derive(Debug, Deserialize, Validate)]
struct CatalogPath {
    catalog_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct Shelf {
    #[validate(length(min = 1, message = "shelf name is required"))]
    name: String,
}

/// Several models in one body, each under its own key.
#[derive(Debug, Deserialize, Validate)]
struct Placement {
    #[validate(nested)]
    book: Book,
    #[validate(nested)]
    shelf: Shelf,
}

pub struct BodyMultipleModule;

#[async_trait]
impl Module for BodyMultipleModule {
    fn name(&self) -> &'static str {
        "body-multiple"
    }

    fn routes(&self) -> Router {
        Router::new().route("/catalogs/{catalog_id}/place", post(place_book))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Request body",
            &[RouteDoc::new(
                "post",
                "/catalogs/{catalog_id}/place",
                "Place a book on a shelf",
            )],
        ))
    }
}

async fn place_book(
    ValidPath(path): ValidPath<CatalogPath>,
    ValidJson(placement): ValidJson<Placement>,
) -> Json<Value> {
    Json(json!({
        "catalog_id": path.catalog_id,
        "book": placement.book,
        "shelf": placement.shelf,
    }))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BodyMultipleModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::{Method, StatusCode};

    fn book() -> Value {
        json!({"id": 2, "title": "APIs for Experts", "price": 49.9, "in_stock": true})
    }

    #[tokio::test]
    async fn book_and_shelf_are_bound_by_key() {
        let (status, body) = testing::send_json(
            BodyMultipleModule.routes(),
            Method::POST,
            "/catalogs/7/place",
            json!({"book": book(), "shelf": {"name": "Fiction"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["catalog_id"], 7);
        assert_eq!(body["book"], book());
        assert_eq!(body["shelf"]["name"], "Fiction");
    }

    #[tokio::test]
    async fn nested_errors_carry_dotted_field_paths() {
        let (status, body) = testing::send_json(
            BodyMultipleModule.routes(),
            Method::POST,
            "/catalogs/7/place",
            json!({"book": book(), "shelf": {"name": ""}}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["field"], "shelf.name");
    }

    #[tokio::test]
    async fn missing_shelf_is_unprocessable() {
        let (status, _) = testing::send_json(
            BodyMultipleModule.routes(),
            Method::POST,
            "/catalogs/7/place",
            json!({"book": book()}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
