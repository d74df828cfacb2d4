//! Request bodies: single and multiple JSON models, bodies combined with path
//! and query parameters, and field-level body validation.

pub mod models;
pub mod multiple;
pub mod single;
pub mod validation;
pub mod with_path_query;
