//! SQLite connection factory and migration runner.

use anyhow::Context;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use primer_kernel::{settings::DatabaseSettings, Migration};

const LEDGER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS _primer_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Open a connection pool for the configured database URL.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    tracing::info!(target: "primer-db", url = %settings.url, "connecting to database");

    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await
        .with_context(|| format!("failed to connect to database at '{}'", settings.url))
}

/// Apply every migration not yet recorded in the ledger table.
///
/// Each migration runs in its own transaction together with its ledger row,
/// so a failed migration leaves no partial record behind. Returns the number
/// of migrations applied.
pub async fn migrate(pool: &SqlitePool, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
    sqlx::query(LEDGER_DDL)
        .execute(pool)
        .await
        .context("failed to create migration ledger")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM _primer_migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await
                .with_context(|| format!("failed to read ledger for {}/{}", module, migration.id))?;

        if already.is_some() {
            tracing::debug!(target: "primer-db", module = %module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await.context("failed to open transaction")?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;

        sqlx::query("INSERT INTO _primer_migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to record migration {}/{}", module, migration.id))?;

        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration {}/{}", module, migration.id))?;

        tracing::info!(target: "primer-db", module = %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        connect(&DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap()
    }

    fn widgets() -> Vec<(String, Migration)> {
        vec![
            (
                "widgets".to_string(),
                Migration {
                    id: "001_init",
                    up: "CREATE TABLE widgets (id INTEGER PRIMARY KEY, name TEXT NOT NULL);",
                },
            ),
            (
                "widgets".to_string(),
                Migration {
                    id: "002_index",
                    up: "CREATE INDEX ix_widgets_name ON widgets (name);",
                },
            ),
        ]
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let pool = memory_pool().await;

        assert_eq!(migrate(&pool, &widgets()).await.unwrap(), 2);
        assert_eq!(migrate(&pool, &widgets()).await.unwrap(), 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _primer_migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let pool = memory_pool().await;
        let broken = vec![(
            "broken".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE oops (",
            },
        )];

        let err = migrate(&pool, &broken).await.unwrap_err();
        assert!(err.to_string().contains("broken/001_init"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _primer_migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
