use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use axum::{extract::State, routing::post, Json, Router};
use primer_http::{AppError, ValidQuery};
use primer_kernel::{InitCtx, Module};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{sync::mpsc, task::JoinHandle};
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

const SIGNUP_SUBJECT: &str = "Thanks for signing up";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
}

type Sender = Arc<Mutex<Option<mpsc::UnboundedSender<Email>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Deserialize, Validate)]
struct NotifyQuery {
    email: String,
}

/// Requests enqueue emails and return at once; a worker spawned in
/// [`Module::start`] delivers them afterwards.
#[derive(Default)]
pub struct BackgroundTasksModule {
    sender: Sender,
    worker: Mutex<Option<JoinHandle<()>>>,
    outbox: Arc<Mutex<Vec<Email>>>,
}

impl BackgroundTasksModule {
    /// Emails delivered so far.
    pub fn delivered(&self) -> Vec<Email> {
        lock(&self.outbox).clone()
    }
}

fn send_email(outbox: &Mutex<Vec<Email>>, email: Email) {
    tracing::info!(to = %email.to, subject = %email.subject, "sending email");
    lock(outbox).push(email);
}

#[async_trait]
impl Module for BackgroundTasksModule {
    fn name(&self) -> &'static str {
        "background-tasks"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/notify", post(notify))
            .with_state(self.sender.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Background tasks",
            &[RouteDoc::new("post", "/notify", "Queue a signup email")],
        ))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Email>();
        let outbox = self.outbox.clone();

        let handle = tokio::spawn(async move {
            while let Some(email) = rx.recv().await {
                send_email(&outbox, email);
            }
            tracing::debug!("email queue closed");
        });

        *lock(&self.sender) = Some(tx);
        *lock(&self.worker) = Some(handle);
        tracing::info!(module = self.name(), "email worker started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        // Dropping the sender lets the worker drain what is queued, then exit.
        lock(&self.sender).take();
        let handle = lock(&self.worker).take();

        if let Some(handle) = handle {
            handle.await.context("email worker terminated abnormally")?;
        }
        tracing::info!(module = self.name(), "email worker stopped");
        Ok(())
    }
}

async fn notify(
    State(sender): State<Sender>,
    ValidQuery(query): ValidQuery<NotifyQuery>,
) -> Result<Json<Value>, AppError> {
    let email = Email {
        to: query.email,
        subject: SIGNUP_SUBJECT.to_string(),
    };

    let guard = lock(&sender);
    let queue = guard
        .as_ref()
        .ok_or_else(|| anyhow!("email worker is not running"))?;
    queue
        .send(email)
        .map_err(|_| anyhow!("email queue is closed"))?;

    Ok(Json(json!({ "queued": true })))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BackgroundTasksModule::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::{Method, Request, StatusCode};
    use primer_kernel::Settings;

    fn notify_request(email: &str) -> Request<axum::body::Body> {
        Request::builder()
            .method(Method::POST)
            .uri(format!("/notify?email={}", email))
            .body(axum::body::Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn queued_emails_are_delivered_by_the_worker() {
        let module = BackgroundTasksModule::default();
        let settings = Settings::default();
        let pool = testing::memory_pool().await;
        module
            .start(&InitCtx {
                settings: &settings,
                db: &pool,
            })
            .await
            .unwrap();

        let (status, body) = testing::call(module.routes(), notify_request("ada@example.com")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"queued": true}));

        module.stop().await.unwrap();
        assert_eq!(
            module.delivered(),
            vec![Email {
                to: "ada@example.com".to_string(),
                subject: SIGNUP_SUBJECT.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn notify_without_worker_is_an_internal_error() {
        let module = BackgroundTasksModule::default();
        let (status, body) = testing::call(module.routes(), notify_request("ada@example.com")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "internal_error");
    }

    #[tokio::test]
    async fn email_is_required() {
        let module = BackgroundTasksModule::default();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/notify")
            .body(axum::body::Body::empty())
            .unwrap();
        let (status, _) = testing::call(module.routes(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
