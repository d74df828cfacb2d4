//! Query string parsing: defaults, optional values, typed conversion,
//! repeated keys, constraint checks, and reusable query dependencies.

pub mod advanced;
pub mod basic;
pub mod types;
pub mod validation;
