//! Assembly of the top-level router: mounted modules, documentation routes,
//! the fallback, and the middleware stack.

use std::time::Duration;

use anyhow::Context;
use axum::{
    body::Body,
    http::Request,
    routing::{get, MethodRouter},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};
use utoipa::openapi::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use primer_kernel::{settings::ServerSettings, Module, ModuleRegistry};

use crate::{error::AppError, MakeRequestUuid, REQUEST_ID_HEADER};

const API_TITLE: &str = "primer API";
const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Layers wrap only the routes present when they are applied, so mount
/// everything before [`RouterBuilder::with_middleware`].
#[derive(Default)]
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, method_router: MethodRouter) -> Self {
        self.router = self.router.route(path, method_router);
        self
    }

    /// Nest a module's routes under its mount path
    pub fn mount(mut self, module: &dyn Module) -> Self {
        let mount_path = module.mount_path();
        tracing::debug!(module = module.name(), mount_path = %mount_path, "mounting module");
        self.router = self.router.nest(&mount_path, module.routes());
        self
    }

    /// Serve the merged OpenAPI document as raw JSON and through Swagger UI.
    ///
    /// Fails when the merged document does not fit utoipa's typed model.
    pub fn with_docs(mut self, registry: &ModuleRegistry) -> anyhow::Result<Self> {
        let document = merged_openapi(registry);
        let typed = typed_openapi(&document)?;

        self.router = self
            .router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", typed))
            .route("/docs/openapi.json", get(move || async move { Json(document) }));
        Ok(self)
    }

    /// Answer unmatched paths with the error envelope
    pub fn with_fallback(mut self) -> Self {
        self.router = self
            .router
            .fallback(|| async { AppError::not_found("route not found") });
        self
    }

    /// Request ids, tracing, CORS, and the request timeout, outermost first.
    ///
    /// The id is assigned before the trace span opens so every log line of a
    /// request carries it, and it is echoed back as `x-request-id`.
    pub fn with_middleware(mut self, server: &ServerSettings) -> Self {
        let trace = TraceLayer::new_for_http()
            .make_span_with(request_span)
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO));

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(trace)
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(cors)
            .layer(TimeoutLayer::new(Duration::from_millis(
                server.request_timeout_ms,
            )));

        self.router = self.router.layer(stack);
        self
    }

    pub fn build(self) -> Router {
        self.router
    }
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Convert the merged JSON document into utoipa's typed model
pub fn typed_openapi(document: &Value) -> anyhow::Result<OpenApi> {
    serde_json::from_value(document.clone())
        .context("merged OpenAPI document does not match the OpenAPI 3.1 model")
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "required": ["error"],
        "properties": {
            "error": {
                "type": "object",
                "required": ["code", "message", "trace_id", "timestamp"],
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "details": { "type": "array", "items": { "type": "object" } },
                    "trace_id": { "type": "string" },
                    "timestamp": { "type": "string" }
                }
            }
        }
    })
}

/// One OpenAPI document for the whole process.
///
/// Module paths are prefixed with the module's mount path; a module route at
/// `/` is listed at the bare mount path, where axum serves it. Schemas from
/// all modules share one namespace.
pub fn merged_openapi(registry: &ModuleRegistry) -> Value {
    let mut paths = Map::new();
    let mut schemas = Map::new();

    paths.insert(
        "/healthz".to_string(),
        json!({
            "get": {
                "summary": "Liveness probe",
                "responses": {
                    "200": {
                        "description": "Always `ok`",
                        "content": { "text/plain": { "schema": { "type": "string" } } }
                    }
                }
            }
        }),
    );
    schemas.insert("ErrorResponse".to_string(), error_schema());

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };
        let mount_path = module.mount_path();

        if let Some(module_paths) = fragment.get("paths").and_then(Value::as_object) {
            for (path, item) in module_paths {
                let full_path = match path.as_str() {
                    "/" => mount_path.clone(),
                    _ => format!("{}{}", mount_path, path),
                };
                paths.insert(full_path, item.clone());
            }
        }

        if let Some(module_schemas) = fragment
            .pointer("/components/schemas")
            .and_then(Value::as_object)
        {
            schemas.extend(module_schemas.clone());
        }
    }

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": API_TITLE,
            "version": API_VERSION,
            "description": "Small, independent HTTP API demonstrations"
        },
        "paths": paths,
        "components": { "schemas": schemas }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct EchoModule;

    #[async_trait::async_trait]
    impl Module for EchoModule {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn routes(&self) -> Router {
            Router::new()
                .route("/", get(|| async { "root" }))
                .route("/ping", get(|| async { "pong" }))
        }

        fn openapi(&self) -> Option<Value> {
            Some(json!({
                "paths": {
                    "/": { "get": { "summary": "Root" } },
                    "/ping": { "get": { "summary": "Ping" } }
                },
                "components": { "schemas": { "Pong": { "type": "string" } } }
            }))
        }
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn read_text(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router.oneshot(get_request(uri)).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn modules_are_served_under_their_mount_path() {
        let router = RouterBuilder::new().mount(&EchoModule).build();

        assert_eq!(
            read_text(router.clone(), "/api/echo/ping").await,
            (StatusCode::OK, "pong".to_string())
        );
        assert_eq!(
            read_text(router, "/api/echo").await,
            (StatusCode::OK, "root".to_string())
        );
    }

    #[tokio::test]
    async fn middleware_assigns_and_echoes_request_ids() {
        let router = RouterBuilder::new()
            .route("/health", get(|| async { "ok" }))
            .with_middleware(&ServerSettings::default())
            .build();

        let response = router.clone().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let generated = response.headers().get("x-request-id").unwrap();
        assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());

        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "caller-chosen")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("x-request-id").unwrap(), "caller-chosen");
    }

    #[tokio::test]
    async fn fallback_uses_error_envelope() {
        let router = RouterBuilder::new().with_fallback().build();

        let (status, body) = read_text(router, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[test]
    fn openapi_paths_are_prefixed() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(EchoModule)).unwrap();

        let doc = merged_openapi(&registry);
        assert!(doc["paths"]["/api/echo/ping"]["get"].is_object());
        assert!(doc["paths"]["/api/echo"]["get"].is_object());
        assert!(doc["paths"]["/healthz"].is_object());
        assert_eq!(doc["components"]["schemas"]["Pong"]["type"], "string");
        assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
    }

    #[test]
    fn merged_document_fits_the_typed_model() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(EchoModule)).unwrap();

        let doc = merged_openapi(&registry);
        let typed = typed_openapi(&doc).unwrap();
        assert_eq!(doc["openapi"], "3.1.0");
        assert_eq!(
            typed.paths.paths.len(),
            doc["paths"].as_object().unwrap().len()
        );
        assert!(typed.paths.paths.contains_key("/api/echo/ping"));
        assert!(typed
            .components
            .as_ref()
            .is_some_and(|components| components.schemas.contains_key("ErrorResponse")));
    }

    #[tokio::test]
    async fn swagger_document_lists_module_paths() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(EchoModule)).unwrap();
        let router = RouterBuilder::new().with_docs(&registry).unwrap().build();

        let (status, body) = read_text(router, "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert!(body["paths"]["/api/echo/ping"]["get"].is_object());
        assert!(body["paths"]["/healthz"]["get"].is_object());
    }
}
