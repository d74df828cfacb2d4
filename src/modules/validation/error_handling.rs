use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use primer_http::{AppError, ValidPath, ValidQuery};
use primer_kernel::Module;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

const CREDIT_LIMIT: f64 = 100.0;

/// Errors owned by this module, answered with their own status and body
/// rather than the shared envelope.
#[derive(Debug, Error)]
pub enum ChargeError {
    #[error("amount {0} exceeds available credit")]
    OutOfCredit(f64),
}

impl IntoResponse for ChargeError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "charge rejected");
        match self {
            ChargeError::OutOfCredit(_) => (
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({ "detail": "Insufficient credit" })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
struct BookPath {
    book_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
struct ChargeQuery {
    amount: f64,
}

fn find_book(id: i64) -> Option<Value> {
    (id == 1).then(|| json!({ "id": 1, "title": "A" }))
}

pub struct ErrorHandlingModule;

#[async_trait]
impl Module for ErrorHandlingModule {
    fn name(&self) -> &'static str {
        "error-handling"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/books/{book_id}", get(get_book))
            .route("/charge", get(charge))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Error handling",
            &[
                RouteDoc::new("get", "/books/{book_id}", "Fetch a book or 404"),
                RouteDoc::new("get", "/charge", "Charge an amount, 402 above the credit limit"),
            ],
        ))
    }
}

async fn get_book(ValidPath(path): ValidPath<BookPath>) -> Result<Json<Value>, AppError> {
    find_book(path.book_id)
        .map(Json)
        .ok_or_else(|| AppError::not_found("Book not found"))
}

async fn charge(ValidQuery(query): ValidQuery<ChargeQuery>) -> Result<Json<Value>, ChargeError> {
    if query.amount > CREDIT_LIMIT {
        return Err(ChargeError::OutOfCredit(query.amount));
    }
    Ok(Json(json!({ "charged": query.amount })))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(ErrorHandlingModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;

    async fn get(uri: &str) -> (StatusCode, Value) {
        testing::get(ErrorHandlingModule.routes(), uri).await
    }

    #[tokio::test]
    async fn missing_book_is_not_found() {
        let (status, body) = get("/books/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "A");

        let (status, body) = get("/books/2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Book not found");
    }

    #[tokio::test]
    async fn charges_above_limit_need_payment() {
        let (status, body) = get("/charge?amount=42.5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"charged": 42.5}));

        let (status, body) = get("/charge?amount=100").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["charged"], 100.0);

        let (status, body) = get("/charge?amount=150").await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body, json!({"detail": "Insufficient credit"}));
    }

    #[tokio::test]
    async fn non_numeric_amount_is_unprocessable() {
        let (status, _) = get("/charge?amount=lots").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
