//! primer application library
//!
//! Hosts every example module and the bootstrap that wires them to the
//! database and the HTTP server.

use anyhow::Context;
use primer_kernel::{InitCtx, ModuleRegistry, Settings};
use sqlx::SqlitePool;

pub mod modules;
pub mod utils;

/// Registry holding every example module
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings)?;
    Ok(registry)
}

/// Initialize modules, apply their migrations, then start them.
pub async fn bootstrap(settings: &Settings, pool: &SqlitePool) -> anyhow::Result<ModuleRegistry> {
    let registry = build_registry(settings)?;
    let ctx = InitCtx {
        settings,
        db: pool,
    };

    registry.init_all(&ctx).await?;

    let applied = primer_db::migrate(pool, &registry.collect_migrations())
        .await
        .context("failed to apply module migrations")?;
    tracing::info!(applied, "migrations complete");

    registry.start_all(&ctx).await?;
    Ok(registry)
}

/// Serve until a shutdown signal arrives, then stop every module.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let pool = primer_db::connect(&settings.database).await?;
    let registry = bootstrap(&settings, &pool).await?;

    let served =
        primer_http::start_server(&registry, &settings, primer_http::shutdown_signal()).await;
    let stopped = registry.stop_all().await;
    pool.close().await;

    served?;
    stopped
}

/// Apply pending migrations without starting anything.
pub async fn migrate_only(settings: &Settings) -> anyhow::Result<usize> {
    let pool = primer_db::connect(&settings.database).await?;
    let registry = build_registry(settings)?;
    let applied = primer_db::migrate(&pool, &registry.collect_migrations()).await;
    pool.close().await;
    applied
}
