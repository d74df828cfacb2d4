//! Shared body schemas, plus a module that accepts the nested `Catalog`.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use primer_http::ValidJson;
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub in_stock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// A catalog mixing scalars, lists, maps, a set, and a nested model.
///
/// `unique_isbns` is a set: duplicates collapse and the output is sorted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Catalog {
    pub name: String,
    pub count: i64,
    pub rating: f64,
    pub live: bool,
    pub tags: Vec<String>,
    pub meta: BTreeMap<String, String>,
    pub unique_isbns: BTreeSet<String>,
    #[validate(nested)]
    pub author: Author,
    pub description: Option<String>,
}

pub struct BodyModelsModule;

#[async_trait]
impl Module for BodyModelsModule {
    fn name(&self) -> &'static str {
        "body-models"
    }

    fn routes(&self) -> Router {
        Router::new().route("/catalogs", post(create_catalog))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Request body",
            &[RouteDoc::new("post", "/catalogs", "Create a catalog from a nested model")],
        ))
    }
}

async fn create_catalog(ValidJson(catalog): ValidJson<Catalog>) -> Json<Value> {
    Json(json!({ "catalog": catalog }))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BodyModelsModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::{Method, StatusCode};

    fn catalog() -> Value {
        json!({
            "name": "Backend shelf",
            "count": 3,
            "rating": 4.5,
            "live": true,
            "tags": ["rust", "web"],
            "meta": {"floor": "2"},
            "unique_isbns": ["978-3", "978-1", "978-3"],
            "author": {"name": "Ada", "email": "ada@example.com"}
        })
    }

    #[tokio::test]
    async fn isbns_are_deduplicated_and_description_defaults_to_null() {
        let (status, body) =
            testing::send_json(BodyModelsModule.routes(), Method::POST, "/catalogs", catalog()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["catalog"]["unique_isbns"], json!(["978-1", "978-3"]));
        assert_eq!(body["catalog"]["description"], Value::Null);
        assert_eq!(body["catalog"]["author"]["name"], "Ada");
    }

    #[tokio::test]
    async fn missing_nested_model_is_unprocessable() {
        let mut payload = catalog();
        payload.as_object_mut().unwrap().remove("author");

        let (status, body) =
            testing::send_json(BodyModelsModule.routes(), Method::POST, "/catalogs", payload).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["location"], "body");
    }
}
