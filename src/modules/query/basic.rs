use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use primer_http::{extract::lenient_bool, ValidQuery};
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

fn default_q() -> String {
    "all".to_string()
}

fn default_limit() -> i64 {
    10
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct ItemsQuery {
    #[serde(default = "default_q")]
    q: String,
    #[serde(default = "default_limit")]
    limit: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct SearchQuery {
    q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct ReportsQuery {
    year: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct PaginateQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_per_page")]
    per_page: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct ConvertQuery {
    count: i64,
    price: f64,
    #[serde(deserialize_with = "lenient_bool")]
    active: bool,
}

/// Defaults, optional values, and required typed query parameters.
pub struct QueryBasicModule;

#[async_trait]
impl Module for QueryBasicModule {
    fn name(&self) -> &'static str {
        "query-basic"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/items", get(list_items))
            .route("/search", get(search))
            .route("/reports", get(reports))
            .route("/paginate", get(paginate))
            .route("/convert", get(convert))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Query parameters",
            &[
                RouteDoc::new("get", "/items", "List items, q defaults to 'all'"),
                RouteDoc::new("get", "/search", "Optional search term"),
                RouteDoc::new("get", "/reports", "Reports for a required year"),
                RouteDoc::new("get", "/paginate", "Page and page size with defaults"),
                RouteDoc::new("get", "/convert", "Integer, float, and boolean conversion"),
            ],
        ))
    }
}

async fn list_items(ValidQuery(query): ValidQuery<ItemsQuery>) -> Json<ItemsQuery> {
    Json(query)
}

async fn search(ValidQuery(query): ValidQuery<SearchQuery>) -> Json<SearchQuery> {
    Json(query)
}

async fn reports(ValidQuery(query): ValidQuery<ReportsQuery>) -> Json<ReportsQuery> {
    Json(query)
}

async fn paginate(ValidQuery(query): ValidQuery<PaginateQuery>) -> Json<PaginateQuery> {
    Json(query)
}

async fn convert(ValidQuery(query): ValidQuery<ConvertQuery>) -> Json<ConvertQuery> {
    Json(query)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(QueryBasicModule)
}
