use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use primer_kernel::Module;
use serde_json::{json, Value};

use crate::utils::{openapi_fragment, RouteDoc};

const WELCOME_MESSAGE: &str = "Welcome to FastAPI! Your API is running successfully.";

/// The smallest possible application: one root endpoint.
pub struct WelcomeModule;

#[async_trait]
impl Module for WelcomeModule {
    fn name(&self) -> &'static str {
        "welcome"
    }

    fn routes(&self) -> Router {
        Router::new().route("/", get(read_root))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Welcome",
            &[RouteDoc::new("get", "/", "Root greeting")],
        ))
    }
}

async fn read_root() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(WelcomeModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn root_returns_greeting() {
        let (status, body) = testing::get(WelcomeModule.routes(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], WELCOME_MESSAGE);
    }
}
