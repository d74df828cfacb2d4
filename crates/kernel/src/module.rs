use async_trait::async_trait;
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::settings::Settings;

/// Shared resources handed to every module while the application boots.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
    pub db: &'a SqlitePool,
}

/// One forward-only schema change owned by a module.
///
/// `id` must sort in application order (`001_init`, `002_...`); the pair
/// `(module name, id)` is recorded once applied.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A self-contained example API.
///
/// Lifecycle, driven by the registry: `init` for every module, then all
/// pending migrations, then `start`; on shutdown `stop` in reverse order.
/// `routes` may be called at any point and must not depend on `init`
/// having run; handlers that need late-bound resources should fail with
/// an internal error instead.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique, URL-safe name; also the mount segment.
    fn name(&self) -> &'static str;

    /// Path prefix the module's routes are nested under.
    fn mount_path(&self) -> String {
        format!("/api/{}", self.name())
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to [`Module::mount_path`], with state already applied.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths`, optional `components.schemas`) with paths
    /// relative to the mount path.
    fn openapi(&self) -> Option<Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        Vec::new()
    }

    /// Spawn background work. Runs after migrations.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Release whatever `start` acquired.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
