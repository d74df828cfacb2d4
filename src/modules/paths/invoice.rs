use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use primer_http::ValidPath;
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

#[derive(Debug, Serialize, Deserialize, Validate)]
struct InvoicePath {
    invoice_id: Uuid,
}

/// UUID path parameter; any accepted spelling is echoed hyphenated and
/// lower-case.
pub struct PathUuidModule;

#[async_trait]
impl Module for PathUuidModule {
    fn name(&self) -> &'static str {
        "path-uuid"
    }

    fn routes(&self) -> Router {
        Router::new().route("/invoices/{invoice_id}", get(read_invoice))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path validation",
            &[RouteDoc::new("get", "/invoices/{invoice_id}", "Fetch an invoice by UUID")],
        ))
    }
}

async fn read_invoice(ValidPath(path): ValidPath<InvoicePath>) -> Json<InvoicePath> {
    Json(path)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathUuidModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn uuid_is_normalized() {
        let (status, body) = testing::get(
            PathUuidModule.routes(),
            "/invoices/8AA1B2F58E3D45A383B56C2A4E9623F7",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["invoice_id"], "8aa1b2f5-8e3d-45a3-83b5-6c2a4e9623f7");
    }

    #[tokio::test]
    async fn malformed_uuid_is_unprocessable() {
        let (status, _) = testing::get(PathUuidModule.routes(), "/invoices/12345").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
