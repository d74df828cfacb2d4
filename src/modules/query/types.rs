use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use axum::{extract::Query, routing::get, Json, Router};
use primer_http::{extract::lenient_bool, AppError, ValidQuery};
use primer_kernel::Module;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

fn default_name() -> String {
    "world".to_string()
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
struct GreetQuery {
    #[serde(default = "default_name")]
    #[validate(length(min = 1, message = "name cannot be empty"))]
    name: String,
}

#[derive(Debug, Deserialize, Validate)]
struct SquareQuery {
    #[validate(range(min = 0, message = "n must be >= 0"))]
    n: i64,
}

#[derive(Debug, Deserialize, Validate)]
struct RatioQuery {
    #[validate(range(exclusive_min = 0.0, message = "x must be > 0"))]
    x: f64,
    #[validate(range(exclusive_min = 0.0, message = "y must be > 0"))]
    y: f64,
}

#[derive(Debug, Deserialize, Validate)]
struct FeaturesQuery {
    #[serde(default = "default_enabled", deserialize_with = "lenient_bool")]
    enabled: bool,
}

#[derive(Debug, Deserialize, Validate)]
struct CsvQuery {
    #[serde(default)]
    tags: String,
}

/// Pairs for a repeated key, in request order.
fn values_of<'a>(pairs: &'a [(String, String)], key: &'a str) -> impl Iterator<Item = &'a str> {
    pairs
        .iter()
        .filter(move |(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Strings, numbers, booleans, lists, sets, and comma-separated values.
pub struct QueryTypesModule;

#[async_trait]
impl Module for QueryTypesModule {
    fn name(&self) -> &'static str {
        "query-types"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/greet", get(greet))
            .route("/square", get(square))
            .route("/ratio", get(ratio))
            .route("/features", get(features))
            .route("/colors", get(colors))
            .route("/unique-tags", get(unique_tags))
            .route("/csv-tags", get(csv_tags))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Query parameters",
            &[
                RouteDoc::new("get", "/greet", "Greet a name, default 'world'"),
                RouteDoc::new("get", "/square", "Square a non-negative integer"),
                RouteDoc::new("get", "/ratio", "Ratio of two positive numbers"),
                RouteDoc::new("get", "/features", "Boolean flag, default true"),
                RouteDoc::new("get", "/colors", "Repeated tags, in order"),
                RouteDoc::new("get", "/unique-tags", "Repeated tags, sorted and deduplicated"),
                RouteDoc::new("get", "/csv-tags", "Comma-separated tags"),
            ],
        ))
    }
}

async fn greet(ValidQuery(query): ValidQuery<GreetQuery>) -> Json<Value> {
    Json(json!({ "message": format!("Hello, {}!", query.name) }))
}

async fn square(ValidQuery(query): ValidQuery<SquareQuery>) -> Result<Json<Value>, AppError> {
    let square = query
        .n
        .checked_mul(query.n)
        .ok_or_else(|| AppError::bad_request("n is too large to square"))?;
    Ok(Json(json!({ "n": query.n, "square": square })))
}

async fn ratio(ValidQuery(query): ValidQuery<RatioQuery>) -> Json<Value> {
    Json(json!({ "ratio": query.x / query.y }))
}

async fn features(ValidQuery(query): ValidQuery<FeaturesQuery>) -> Json<Value> {
    Json(json!({ "enabled": query.enabled }))
}

async fn colors(Query(pairs): Query<Vec<(String, String)>>) -> Json<Value> {
    let tags: Vec<&str> = values_of(&pairs, "tags").collect();
    Json(json!({ "tags": tags }))
}

async fn unique_tags(Query(pairs): Query<Vec<(String, String)>>) -> Json<Value> {
    let tags: BTreeSet<&str> = values_of(&pairs, "tags").collect();
    Json(json!({ "tags": tags }))
}

async fn csv_tags(ValidQuery(query): ValidQuery<CsvQuery>) -> Json<Value> {
    let tags: Vec<&str> = query.tags.split(',').filter(|t| !t.is_empty()).collect();
    Json(json!({ "tags": tags }))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(QueryTypesModule)
}
