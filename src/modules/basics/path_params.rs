use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use primer_http::{extract::lenient_bool, ValidPath, ValidQuery};
use primer_kernel::Module;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

#[derive(Debug, Deserialize, Validate)]
struct UserPath {
    user_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
struct OrderPath {
    user_id: i64,
    order_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
struct OrderQuery {
    #[serde(default, deserialize_with = "lenient_bool")]
    include_items: bool,
}

#[derive(Debug, Deserialize, Validate)]
struct FilePath {
    filename: String,
}

#[derive(Debug, Deserialize, Validate)]
struct TemperaturePath {
    celsius: f64,
}

#[derive(Debug, Deserialize, Validate)]
struct FeaturePath {
    #[serde(deserialize_with = "lenient_bool")]
    enabled: bool,
}

#[derive(Debug, Deserialize, Validate)]
struct PaymentPath {
    payment_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
struct StoragePath {
    file_path: String,
}

/// Path parameters converted to integers, floats, booleans, UUIDs, and
/// slash-containing sub-paths.
pub struct PathParamsModule;

#[async_trait]
impl Module for PathParamsModule {
    fn name(&self) -> &'static str {
        "path-params"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/users/{user_id}", get(get_user))
            .route("/users/{user_id}/orders/{order_id}", get(get_user_order))
            .route("/files/{filename}", get(get_file))
            .route("/temperature/{celsius}", get(convert_temperature))
            .route("/features/{enabled}", get(feature_status))
            .route("/payments/{payment_id}", get(get_payment))
            .route("/storage/{*file_path}", get(retrieve_deep_file))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path parameters",
            &[
                RouteDoc::new("get", "/users/{user_id}", "Fetch a user profile by integer id"),
                RouteDoc::new(
                    "get",
                    "/users/{user_id}/orders/{order_id}",
                    "Fetch one order of a user",
                ),
                RouteDoc::new("get", "/files/{filename}", "Request a file by name"),
                RouteDoc::new("get", "/temperature/{celsius}", "Convert Celsius to Fahrenheit"),
                RouteDoc::new("get", "/features/{enabled}", "Read a boolean feature flag"),
                RouteDoc::new("get", "/payments/{payment_id}", "Fetch a payment by UUID"),
                RouteDoc::new("get", "/storage/{*file_path}", "Retrieve a nested file path"),
            ],
        ))
    }
}

async fn get_user(ValidPath(path): ValidPath<UserPath>) -> Json<Value> {
    Json(json!({ "message": "User profile fetched", "user_id": path.user_id }))
}

async fn get_user_order(
    ValidPath(path): ValidPath<OrderPath>,
    ValidQuery(query): ValidQuery<OrderQuery>,
) -> Json<Value> {
    Json(json!({
        "message": "Order fetched",
        "user_id": path.user_id,
        "order_id": path.order_id,
        "include_items": query.include_items,
    }))
}

async fn get_file(ValidPath(path): ValidPath<FilePath>) -> Json<Value> {
    Json(json!({ "message": "File requested", "filename": path.filename }))
}

async fn convert_temperature(ValidPath(path): ValidPath<TemperaturePath>) -> Json<Value> {
    let fahrenheit = path.celsius * 9.0 / 5.0 + 32.0;
    Json(json!({ "celsius": path.celsius, "fahrenheit": fahrenheit }))
}

async fn feature_status(ValidPath(path): ValidPath<FeaturePath>) -> Json<Value> {
    Json(json!({ "feature_enabled": path.enabled }))
}

async fn get_payment(ValidPath(path): ValidPath<PaymentPath>) -> Json<Value> {
    Json(json!({ "payment_id": path.payment_id.to_string(), "status": "verified" }))
}

async fn retrieve_deep_file(ValidPath(path): ValidPath<StoragePath>) -> Json<Value> {
    Json(json!({ "file_path": path.file_path }))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathParamsModule)
}
