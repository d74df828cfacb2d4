use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use once_cell::sync::Lazy;
use primer_http::{AppError, ValidQuery};
use primer_kernel::Module;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

static SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

fn first_page() -> i64 {
    1
}

fn default_min_price() -> f64 {
    0.0
}

fn default_max_price() -> f64 {
    1000.0
}

fn default_feed_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct SearchTermQuery {
    /// Search term
    #[validate(length(min = 3, max = 50, message = "q must be 3-50 characters"))]
    q: String,
    /// 1-based page index
    #[serde(default = "first_page")]
    #[validate(range(min = 1, message = "page must be >= 1"))]
    page: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct TagQuery {
    #[validate(length(min = 1, max = 30, message = "tag must be 1-30 characters"))]
    tag: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct PriceRangeQuery {
    #[serde(default = "default_min_price")]
    #[validate(range(min = 0.0, message = "min_price must be >= 0"))]
    min_price: f64,
    #[serde(default = "default_max_price")]
    #[validate(range(max = 10000.0, message = "max_price must be <= 10000"))]
    max_price: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct SlugQuery {
    #[validate(regex(path = *SLUG, message = "slug may contain lower-case letters, digits, and hyphens"))]
    slug: String,
}

/// Query keys that are not valid identifiers are mapped by alias.
#[derive(Debug, Serialize, Deserialize, Validate)]
struct AnalyticsQuery {
    #[serde(rename(deserialize = "start-date"))]
    start: String,
    #[serde(rename(deserialize = "end-date"))]
    end: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct FeedQuery {
    /// Items per page
    #[serde(default = "default_feed_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    limit: i64,
    /// Pagination cursor
    cursor: Option<String>,
}

/// String length, numeric bounds, patterns, and aliased keys.
pub struct QueryValidationModule;

#[async_trait]
impl Module for QueryValidationModule {
    fn name(&self) -> &'static str {
        "query-validation"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/validate", get(validate))
            .route("/tags", get(tags))
            .route("/price-range", get(price_range))
            .route("/slugs", get(slugs))
            .route("/analytics", get(analytics))
            .route("/feed", get(feed))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Query validation",
            &[
                RouteDoc::new("get", "/validate", "Search term of 3-50 characters"),
                RouteDoc::new("get", "/tags", "Tag of 1-30 characters"),
                RouteDoc::new("get", "/price-range", "Bounded, ordered price range"),
                RouteDoc::new("get", "/slugs", "Slug matching ^[a-z0-9-]+$"),
                RouteDoc::new("get", "/analytics", "Date range via start-date and end-date"),
                RouteDoc::new("get", "/feed", "Cursor pagination"),
            ],
        ))
    }
}

async fn validate(ValidQuery(query): ValidQuery<SearchTermQuery>) -> Json<SearchTermQuery> {
    Json(query)
}

async fn tags(ValidQuery(query): ValidQuery<TagQuery>) -> Json<TagQuery> {
    Json(query)
}

async fn price_range(
    ValidQuery(query): ValidQuery<PriceRangeQuery>,
) -> Result<Json<PriceRangeQuery>, AppError> {
    if query.min_price > query.max_price {
        return Err(AppError::bad_request("min_price cannot exceed max_price"));
    }
    Ok(Json(query))
}

async fn slugs(ValidQuery(query): ValidQuery<SlugQuery>) -> Json<SlugQuery> {
    Json(query)
}

async fn analytics(ValidQuery(query): ValidQuery<AnalyticsQuery>) -> Json<AnalyticsQuery> {
    Json(query)
}

async fn feed(ValidQuery(query): ValidQuery<FeedQuery>) -> Json<FeedQuery> {
    Json(query)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(QueryValidationModule)
}
