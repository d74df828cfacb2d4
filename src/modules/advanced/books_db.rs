use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    routing::get,
    Json, Router,
};
use once_cell::sync::OnceCell;
use primer_http::{AppError, ValidJson, ValidPath};
use primer_kernel::{InitCtx, Migration, Module};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{pool::PoolConnection, FromRow, Sqlite, SqlitePool};
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

const CREATE_BOOKS: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    title    TEXT    NOT NULL,
    price    REAL    NOT NULL,
    in_stock INTEGER NOT NULL DEFAULT 1
);
CREATE INDEX IF NOT EXISTS ix_books_title ON books (title);
"#;

type PoolCell = Arc<OnceCell<SqlitePool>>;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookCreate {
    pub title: String,
    pub price: f64,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

#[derive(Debug, Deserialize, Validate)]
struct BookPath {
    book_id: i64,
}

/// A pooled connection held for one request and returned on drop.
pub struct DbConn(pub PoolConnection<Sqlite>);

impl FromRequestParts<PoolCell> for DbConn {
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, pool: &PoolCell) -> Result<Self, Self::Rejection> {
        let pool = pool
            .get()
            .ok_or_else(|| anyhow!("books-db used before init"))?;
        let conn = pool
            .acquire()
            .await
            .map_err(|err| anyhow::Error::new(err).context("failed to acquire connection"))?;
        Ok(DbConn(conn))
    }
}

/// Books persisted in SQLite through a per-request connection.
#[derive(Default)]
pub struct BooksDbModule {
    pool: PoolCell,
}

#[async_trait]
impl Module for BooksDbModule {
    fn name(&self) -> &'static str {
        "books-db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.pool
            .set(ctx.db.clone())
            .map_err(|_| anyhow!("books-db initialized twice"))?;
        tracing::info!(module = self.name(), "database pool attached");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/books", get(list_books).post(create_book))
            .route("/books/{book_id}", get(get_book))
            .with_state(self.pool.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let mut fragment = openapi_fragment(
            "Database",
            &[
                RouteDoc::new("post", "/books", "Insert a book"),
                RouteDoc::new("get", "/books", "List books ordered by id"),
                RouteDoc::new("get", "/books/{book_id}", "Fetch one book"),
            ],
        );
        fragment["paths"]["/books"]["post"]["responses"]["201"] =
            serde_json::json!({ "description": "Created" });
        Some(fragment)
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: CREATE_BOOKS,
        }]
    }
}

fn db_error(err: sqlx::Error) -> AppError {
    AppError::Internal(anyhow::Error::new(err).context("books query failed"))
}

async fn create_book(
    DbConn(mut conn): DbConn,
    ValidJson(book): ValidJson<BookCreate>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let row: Book = sqlx::query_as(
        "INSERT INTO books (title, price, in_stock) VALUES (?, ?, ?) \
         RETURNING id, title, price, in_stock",
    )
    .bind(&book.title)
    .bind(book.price)
    .bind(book.in_stock)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error)?;

    tracing::info!(book_id = row.id, "book created");
    Ok((StatusCode::CREATED, Json(row)))
}

async fn list_books(DbConn(mut conn): DbConn) -> Result<Json<Vec<Book>>, AppError> {
    let rows = sqlx::query_as::<_, Book>("SELECT id, title, price, in_stock FROM books ORDER BY id")
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error)?;
    Ok(Json(rows))
}

async fn get_book(
    DbConn(mut conn): DbConn,
    ValidPath(path): ValidPath<BookPath>,
) -> Result<Json<Book>, AppError> {
    sqlx::query_as::<_, Book>("SELECT id, title, price, in_stock FROM books WHERE id = ?")
        .bind(path.book_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Book not found"))
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksDbModule::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing;
    use axum::http::Method;
    use primer_kernel::Settings;
    use serde_json::json;

    async fn ready_module() -> BooksDbModule {
        let module = BooksDbModule::default();
        let pool = testing::memory_pool().await;
        let settings = Settings::default();
        module
            .init(&InitCtx {
                settings: &settings,
                db: &pool,
            })
            .await
            .unwrap();

        let migrations: Vec<(String, Migration)> = module
            .migrations()
            .into_iter()
            .map(|m| (module.name().to_string(), m))
            .collect();
        primer_db::migrate(&pool, &migrations).await.unwrap();
        module
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let module = ready_module().await;

        let (status, created) = testing::send_json(
            module.routes(),
            Method::POST,
            "/books",
            json!({"title": "Mastering APIs", "price": 29.0}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            created,
            json!({"id": 1, "title": "Mastering APIs", "price": 29.0, "in_stock": true})
        );

        let (status, fetched) = testing::get(module.routes(), "/books/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let module = ready_module().await;
        for (title, price) in [("The Art of Testing", 17.99), ("Async Patterns", 18.0)] {
            testing::send_json(
                module.routes(),
                Method::POST,
                "/books",
                json!({"title": title, "price": price, "in_stock": false}),
            )
            .await;
        }

        let (status, body) = testing::get(module.routes(), "/books").await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|b| b["title"].as_str())
            .collect();
        assert_eq!(titles, vec!["The Art of Testing", "Async Patterns"]);
        assert_eq!(body[0]["in_stock"], false);
    }

    #[tokio::test]
    async fn unknown_book_is_not_found() {
        let module = ready_module().await;
        let (status, body) = testing::get(module.routes(), "/books/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Book not found");
    }

    #[tokio::test]
    async fn requests_before_init_fail_cleanly() {
        let (status, _) = testing::get(BooksDbModule::default().routes(), "/books").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn missing_price_is_unprocessable() {
        let module = ready_module().await;
        let (status, _) = testing::send_json(
            module.routes(),
            Method::POST,
            "/books",
            json!({"title": "No Price"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
