use std::{collections::HashMap, convert::Infallible, sync::Arc};

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts, routing::get, Json, Router};
use primer_http::{AppError, ValidPath};
use primer_kernel::{settings::AuthSettings, Module};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

const TOKEN_HEADER: &str = "x-token";

#[derive(Clone)]
struct DependencyState {
    api_token: Arc<str>,
}

/// Guard that admits requests whose `X-Token` header matches the configured
/// API token.
pub struct XToken(pub String);

impl FromRequestParts<DependencyState> for XToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &DependencyState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        match token {
            Some(token) if token == &*state.api_token => Ok(XToken(token.to_string())),
            _ => Err(AppError::unauthorized("Invalid token")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
}

/// Read-only book lookup, built fresh for every request.
pub struct Repo {
    db: HashMap<i64, BookRecord>,
}

impl Repo {
    fn seeded() -> Self {
        let mut db = HashMap::new();
        db.insert(
            1,
            BookRecord {
                id: 1,
                title: "A".to_string(),
            },
        );
        Self { db }
    }

    pub fn get(&self, id: i64) -> BookRecord {
        self.db.get(&id).cloned().unwrap_or_else(|| BookRecord {
            id,
            title: "Unknown".to_string(),
        })
    }
}

impl<S> FromRequestParts<S> for Repo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Repo::seeded())
    }
}

#[derive(Debug, Deserialize, Validate)]
struct BookPath {
    book_id: i64,
}

/// Header guard and per-request repository supplied as extractors.
pub struct DependenciesModule {
    api_token: Arc<str>,
}

impl DependenciesModule {
    pub fn new(auth: &AuthSettings) -> Self {
        Self {
            api_token: Arc::from(auth.api_token.as_str()),
        }
    }
}

#[async_trait]
impl Module for DependenciesModule {
    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/secure", get(secure_area))
            .route("/books/{book_id}", get(get_book))
            .with_state(DependencyState {
                api_token: self.api_token.clone(),
            })
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Dependencies",
            &[
                RouteDoc::new("get", "/secure", "Requires a matching X-Token header"),
                RouteDoc::new("get", "/books/{book_id}", "Look a book up through a repository"),
            ],
        ))
    }
}

async fn secure_area(_token: XToken) -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn get_book(ValidPath(path): ValidPath<BookPath>, repo: Repo) -> Json<BookRecord> {
    Json(repo.get(path.book_id))
}

pub fn create_module(auth: &AuthSettings) -> Arc<dyn Module> {
    Arc::new(DependenciesModule::new(auth))
}
