use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::State, routing::post, Json, Router};
use primer_http::ValidJson;
use primer_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::utils::{openapi_fragment, title_case, RouteDoc};

fn non_empty_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Name cannot be empty".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
struct UserCreate {
    #[validate(custom(function = "non_empty_name"))]
    name: String,
    #[validate(email(message = "value is not a valid email address"))]
    email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub id: usize,
    pub name: String,
    pub email: String,
}

type UsersDb = Arc<Mutex<Vec<UserResponse>>>;

/// An email-typed field plus a normalizing name check, stored in a
/// process-wide list.
#[derive(Default)]
pub struct CustomTypesModule {
    users_db: UsersDb,
}

#[async_trait]
impl Module for CustomTypesModule {
    fn name(&self) -> &'static str {
        "custom-types"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/users/", post(create_user))
            .with_state(self.users_db.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment(
            "Data validation",
            &[RouteDoc::new("post", "/users/", "Create a user with a validated email")],
        ))
    }
}

async fn create_user(
    State(users_db): State<UsersDb>,
    ValidJson(user): ValidJson<UserCreate>,
) -> Json<UserResponse> {
    let mut users = users_db.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let created = UserResponse {
        id: users.len() + 1,
        name: title_case(&user.name),
        email: user.email,
    };
    users.push(created.clone());
    Json(created)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(CustomTypesModule::default())
}
