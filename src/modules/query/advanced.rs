use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts, routing::get, Json, Router};
use primer_http::{AppError, ValidQuery};
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::utils::{openapi_fragment, RouteDoc};

fn first_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize, Validate)]
struct PaginationParams {
    #[serde(default = "first_page")]
    #[validate(range(min = 1, message = "page must be >= 1"))]
    page: i64,
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    per_page: i64,
}

/// Reusable pagination dependency: any handler that takes a `Pagination`
/// gets validated `page` and `per_page` values.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ValidQuery(params) =
            ValidQuery::<PaginationParams>::from_request_parts(parts, state).await?;
        Ok(Pagination {
            page: params.page,
            per_page: params.per_page,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct RangeQuery {
    #[validate(range(min = 0, message = "start must be >= 0"))]
    start: i64,
    #[validate(range(min = 0, message = "end must be >= 0"))]
    end: i64,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("q cannot be blank".into()));
    }
    Ok(())
}

/// A model used as a bundle of query parameters.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(
        length(min = 1, message = "q must not be empty"),
        custom(function = "not_blank")
    )]
    pub q: String,
    #[validate(length(equal = 2, message = "lang must be a 2-letter code"))]
    pub lang: Option<String>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
}

/// Shared dependencies, cross-field checks, and query bundles.
pub struct QueryAdvancedModule;

#[async_trait]
impl Module for QueryAdvancedModule {
    fn name(&self) -> &'static str {
        "query-advanced"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/items-adv", get(items_adv))
            .route("/range", get(range_query))
            .route("/search-adv", get(search_adv))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Query parameters",
            &[
                RouteDoc::new("get", "/items-adv", "Paginated items via a shared dependency"),
                RouteDoc::new("get", "/range", "Ordered numeric range"),
                RouteDoc::new("get", "/search-adv", "Search parameters bundled in a model"),
            ],
        ))
    }
}

async fn items_adv(pagination: Pagination) -> Json<Pagination> {
    Json(pagination)
}

async fn range_query(ValidQuery(range): ValidQuery<RangeQuery>) -> Result<Json<RangeQuery>, AppError> {
    if range.start > range.end {
        return Err(AppError::bad_request("start must be <= end"));
    }
    Ok(Json(range))
}

async fn search_adv(ValidQuery(params): ValidQuery<SearchParams>) -> Json<SearchParams> {
    Json(params)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(QueryAdvancedModule)
}
