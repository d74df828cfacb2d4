//! Examples that need configuration or storage: an OAuth2 password flow with
//! signed tokens, and CRUD over SQLite.

pub mod books_db;
pub mod security;
