use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use once_cell::sync::Lazy;
use primer_http::ValidPath;
use primer_kernel::Module;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use super::UserId;
use crate::utils::{openapi_fragment, RouteDoc};

static TAG_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]{1,30}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Archived,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct ProjectsPath {
    user_id: UserId,
    status: ProjectStatus,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct TagPath {
    #[validate(regex(path = *TAG_SLUG, message = "tag must be a 1-30 character slug"))]
    tag: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct ReportPath {
    #[validate(range(min = 2000, max = 2100))]
    year: i32,
    #[validate(range(min = 1, max = 4))]
    quarter: u8,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct InvoicePath {
    invoice_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct StoragePath {
    path: String,
}

/// Project management routes mixing every path technique in one app.
pub struct PathProjectModule;

#[async_trait]
impl Module for PathProjectModule {
    fn name(&self) -> &'static str {
        "path-project"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/users/me", get(me))
            .route("/users/{user_id}/projects/{status}", get(list_projects))
            .route("/tags/{tag}", get(by_tag))
            .route("/reports/{year}/{quarter}", get(report))
            .route("/invoices/{invoice_id}", get(invoice))
            .route("/storage/{*path}", get(storage))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Path validation",
            &[
                RouteDoc::new("get", "/users/me", "The current user"),
                RouteDoc::new(
                    "get",
                    "/users/{user_id}/projects/{status}",
                    "List a user's projects by status",
                ),
                RouteDoc::new("get", "/tags/{tag}", "Projects by slug tag"),
                RouteDoc::new("get", "/reports/{year}/{quarter}", "Quarterly report"),
                RouteDoc::new("get", "/invoices/{invoice_id}", "Fetch an invoice by UUID"),
                RouteDoc::new("get", "/storage/{*path}", "Read a stored file"),
            ],
        ))
    }
}

async fn me() -> Json<Value> {
    Json(json!({ "me": true }))
}

async fn list_projects(ValidPath(path): ValidPath<ProjectsPath>) -> Json<ProjectsPath> {
    Json(path)
}

async fn by_tag(ValidPath(path): ValidPath<TagPath>) -> Json<TagPath> {
    Json(path)
}

async fn report(ValidPath(path): ValidPath<ReportPath>) -> Json<ReportPath> {
    Json(path)
}

async fn invoice(ValidPath(path): ValidPath<InvoicePath>) -> Json<InvoicePath> {
    Json(path)
}

async fn storage(ValidPath(path): ValidPath<StoragePath>) -> Json<StoragePath> {
    Json(path)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PathProjectModule)
}
