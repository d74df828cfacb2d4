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
struct PagePath {
    #[validate(range(min = 1, max = 500, message = "page must be between 1 and 500"))]
    page: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct PricePath {
    #[validate(range(
        exclusive_min = 0.0,
        exclusive_max = 10000.0,
        message = "price must be above 0 and below 10000"
    ))]
    price: f64,
}

/// Inclusive and exclusive numeric bounds on path parameters.
pub struct PathNumericModule;

#[async_trait]
impl Module for PathNumericModule {
    fn name(&self) -> &'static str {
        "path-numeric"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/pages/{page}", get(read_page))
            .route("/products/{price}", get(product_by_price))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path validation",
            &[
                RouteDoc::new("get", "/pages/{page}", "1 <= page <= 500"),
                RouteDoc::new("get", "/products/{price}", "0 < price < 10000"),
            ],
        ))
    }
}

async fn read_page(ValidPath(path): ValidPath<PagePath>) -> Json<PagePath> {
    Json(path)
}

async fn product_by_price(ValidPath(path): ValidPath<PricePath>) -> Json<PricePath> {
    Json(path)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathNumericModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::StatusCode;

    async fn status_of(uri: &str) -> StatusCode {
        testing::get(PathNumericModule.routes(), uri).await.0
    }

    #[tokio::test]
    async fn page_bounds_are_inclusive() {
        assert_eq!(status_of("/pages/1").await, StatusCode::OK);
        assert_eq!(status_of("/pages/500").await, StatusCode::OK);
        assert_eq!(status_of("/pages/0").await, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of("/pages/501").await, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn price_bounds_are_exclusive() {
        assert_eq!(status_of("/products/0.01").await, StatusCode::OK);
        assert_eq!(status_of("/products/9999.99").await, StatusCode::OK);
        assert_eq!(status_of("/products/0").await, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of("/products/10000").await, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn price_is_echoed_as_float() {
        let (_, body) = testing::get(PathNumericModule.routes(), "/products/19.5").await;
        assert_eq!(body["price"], 19.5);
    }
}
