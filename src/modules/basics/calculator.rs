use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{
    extract::State,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use primer_http::{AppError, ValidJson, ValidQuery};
use primer_kernel::{InitCtx, Module};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

/// Two operands, read from the query string or a JSON body.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct Operation {
    pub a: f64,
    pub b: f64,
}

/// One completed calculation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryEntry {
    pub operation: &'static str,
    pub a: f64,
    pub b: f64,
    pub result: f64,
}

#[derive(Clone, Default)]
pub struct History(Arc<Mutex<Vec<HistoryEntry>>>);

impl History {
    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        // A poisoned list is still a valid list of entries.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Results that overflow to infinity or NaN are rejected and not recorded.
    fn record(
        &self,
        operation: &'static str,
        op: Operation,
        result: f64,
    ) -> Result<Json<Value>, AppError> {
        if !result.is_finite() {
            return Err(AppError::bad_request(format!(
                "{} result is not a finite number",
                operation
            )));
        }
        self.lock().push(HistoryEntry {
            operation,
            a: op.a,
            b: op.b,
            result,
        });
        Ok(Json(json!({ "operation": operation, "result": result })))
    }
}

/// One route per HTTP verb, backed by an in-memory calculation history.
pub struct CalculatorModule {
    history: History,
}

impl CalculatorModule {
    pub fn new() -> Self {
        Self {
            history: History::default(),
        }
    }
}

impl Default for CalculatorModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for CalculatorModule {
    fn name(&self) -> &'static str {
        "calculator"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "calculator ready with empty history");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/add", get(add))
            .route("/subtract", get(subtract))
            .route("/multiply", post(multiply))
            .route("/divide", put(divide))
            .route("/power", patch(power))
            .route("/clear-history", delete(clear_history))
            .route("/history", get(list_history))
            .with_state(self.history.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Calculator",
            &[
                RouteDoc::new("get", "/add", "Add two numbers from the query string"),
                RouteDoc::new("get", "/subtract", "Subtract b from a"),
                RouteDoc::new("post", "/multiply", "Multiply a JSON pair"),
                RouteDoc::new("put", "/divide", "Divide a by b"),
                RouteDoc::new("patch", "/power", "Raise a to the power b"),
                RouteDoc::new("delete", "/clear-history", "Clear calculation history"),
                RouteDoc::new("get", "/history", "List calculation history"),
            ],
        ))
    }
}

async fn add(
    State(history): State<History>,
    ValidQuery(op): ValidQuery<Operation>,
) -> Result<Json<Value>, AppError> {
    history.record("addition", op, op.a + op.b)
}

async fn subtract(
    State(history): State<History>,
    ValidQuery(op): ValidQuery<Operation>,
) -> Result<Json<Value>, AppError> {
    history.record("subtraction", op, op.a - op.b)
}

async fn multiply(
    State(history): State<History>,
    ValidJson(op): ValidJson<Operation>,
) -> Result<Json<Value>, AppError> {
    history.record("multiplication", op, op.a * op.b)
}

/// Division by zero answers with an error payload, not an error status.
async fn divide(
    State(history): State<History>,
    ValidJson(op): ValidJson<Operation>,
) -> Result<Json<Value>, AppError> {
    if op.b == 0.0 {
        return Ok(Json(json!({ "error": "Cannot divide by zero" })));
    }
    history.record("division", op, op.a / op.b)
}

async fn power(
    State(history): State<History>,
    ValidJson(op): ValidJson<Operation>,
) -> Result<Json<Value>, AppError> {
    history.record("power", op, op.a.powf(op.b))
}

async fn clear_history(State(history): State<History>) -> Json<Value> {
    let cleared = {
        let mut entries = history.lock();
        let count = entries.len();
        entries.clear();
        count
    };
    tracing::debug!(cleared, "calculation history cleared");
    Json(json!({ "message": "Calculation history cleared successfully" }))
}

async fn list_history(State(history): State<History>) -> Json<Vec<HistoryEntry>> {
    Json(history.lock().clone())
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(CalculatorModule::new())
}
