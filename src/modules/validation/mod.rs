//! Data validation and request plumbing: custom field types, cross-field
//! checks, response filtering, dependencies, custom errors, and work queued
//! to run after the response.

pub mod background_tasks;
pub mod custom_types;
pub mod custom_validation;
pub mod dependencies;
pub mod error_handling;
pub mod response_models;
