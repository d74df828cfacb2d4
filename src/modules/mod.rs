//! Every example module, grouped by topic.

pub mod advanced;
pub mod basics;
pub mod body;
pub mod paths;
pub mod query;
pub mod validation;

use primer_kernel::{ModuleRegistry, Settings};

/// Register all example modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let modules = [
        basics::welcome::create_module(),
        basics::calculator::create_module(),
        basics::path_params::create_module(),
        paths::basic::create_module(),
        paths::annotated::create_module(),
        paths::ordering::create_module(),
        paths::enums::create_module(),
        paths::multiple::create_module(),
        paths::numeric::create_module(),
        paths::project::create_module(),
        paths::string::create_module(),
        paths::subpath::create_module(),
        paths::invoice::create_module(),
        query::basic::create_module(),
        query::types::create_module(),
        query::validation::create_module(),
        query::advanced::create_module(),
        body::single::create_module(),
        body::multiple::create_module(),
        body::with_path_query::create_module(),
        body::validation::create_module(),
        body::models::create_module(),
        validation::custom_types::create_module(),
        validation::custom_validation::create_module(),
        validation::response_models::create_module(),
        validation::dependencies::create_module(&settings.auth),
        validation::error_handling::create_module(),
        validation::background_tasks::create_module(),
        advanced::security::create_module(&settings.auth),
        advanced::books_db::create_module(),
    ];

    for module in modules {
        registry.register(module)?;
    }

    Ok(())
}
