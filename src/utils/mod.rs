//! Helpers shared by the example modules.

use serde_json::{json, Map, Value};

/// One documented operation of a module.
pub struct RouteDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
}

impl RouteDoc {
    pub const fn new(method: &'static str, path: &'static str, summary: &'static str) -> Self {
        Self {
            method,
            path,
            summary,
        }
    }
}

/// Build a module OpenAPI fragment from a route table.
///
/// Catch-all segments (`{*rest}`) are documented as plain parameters.
pub fn openapi_fragment(tag: &str, routes: &[RouteDoc]) -> Value {
    let mut paths = Map::new();

    for route in routes {
        let doc_path = route.path.replace("{*", "{");
        let operation = json!({
            "summary": route.summary,
            "tags": [tag],
            "responses": {
                "200": { "description": "Successful response" },
                "422": {
                    "description": "Validation error",
                    "content": {
                        "application/json": {
                            "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                        }
                    }
                }
            }
        });

        let item = paths
            .entry(doc_path)
            .or_insert_with(|| Value::Object(Map::new()));
        item[route.method] = operation;
    }

    json!({ "paths": paths })
}

/// Capitalize the first letter of every alphabetic run and lower-case the
/// rest, so `"aLOK kumar"` becomes `"Alok Kumar"`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_alpha = false;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_is_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_alpha = true;
        } else {
            out.push(ch);
            previous_is_alpha = false;
        }
    }

    out
}
