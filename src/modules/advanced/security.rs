//! OAuth2 password flow issuing HS256 access tokens.
//!
//! `POST /token` exchanges form credentials for a bearer token; `GET /me`
//! resolves the token back to its subject.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use primer_http::{AppError, ValidForm};
use primer_kernel::{settings::AuthSettings, Module};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use validator::Validate;

use crate::utils::{openapi_fragment, RouteDoc};

const BAD_CREDENTIALS: &str = "Incorrect username or password";

struct StoredUser {
    password: &'static str,
}

/// Plain-text credentials for the single demo account.
static FAKE_USER_DB: Lazy<HashMap<&'static str, StoredUser>> = Lazy::new(|| {
    let mut users = HashMap::new();
    users.insert("johndoe", StoredUser { password: "secret" });
    users
});

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

pub struct AuthState {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

impl AuthState {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            token_ttl: Duration::minutes(settings.token_ttl_minutes),
        }
    }

    pub fn issue(&self, subject: &str) -> Result<String, AppError> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (OffsetDateTime::now_utc() + self.token_ttl).unix_timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|err| AppError::Internal(anyhow::Error::new(err).context("failed to sign token")))
    }

    /// Verify signature and expiry, returning the subject.
    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock skew allowance.
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation).map_err(
            |err| {
                tracing::debug!(error = %err, "token rejected");
                AppError::unauthorized("Invalid token")
            },
        )?;
        Ok(data.claims.sub)
    }
}

type SharedAuth = Arc<AuthState>;

/// Subject of a verified bearer token.
pub struct CurrentUser(pub String);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<SharedAuth> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedAuth) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| AppError::unauthorized("Not authenticated"))?;
        state.verify(token).map(CurrentUser)
    }
}

#[derive(Debug, Deserialize, Validate)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
}

pub struct SecurityModule {
    auth: SharedAuth,
}

impl SecurityModule {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            auth: Arc::new(AuthState::new(settings)),
        }
    }
}

#[async_trait]
impl Module for SecurityModule {
    fn name(&self) -> &'static str {
        "security"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/token", post(login))
            .route("/me", get(me))
            .with_state(self.auth.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let mut fragment = openapi_fragment(
            "Security",
            &[
                RouteDoc::new("post", "/token", "Exchange username and password for a token"),
                RouteDoc::new("get", "/me", "Subject of the bearer token"),
            ],
        );
        fragment["paths"]["/token"]["post"]["responses"]["401"] =
            serde_json::json!({ "description": BAD_CREDENTIALS });
        fragment["paths"]["/me"]["get"]["responses"]["401"] =
            serde_json::json!({ "description": "Missing, invalid, or expired token" });
        Some(fragment)
    }
}

async fn login(
    State(auth): State<SharedAuth>,
    ValidForm(form): ValidForm<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let known = FAKE_USER_DB
        .get(form.username.as_str())
        .is_some_and(|user| user.password == form.password);
    if !known {
        tracing::info!(username = %form.username, "login rejected");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    }

    let access_token = auth.issue(&form.username)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

async fn me(CurrentUser(username): CurrentUser) -> Json<Value> {
    Json(serde_json::json!({ "username": username }))
}

pub fn create_module(settings: &AuthSettings) -> Arc<dyn Module> {
    Arc::new(SecurityModule::new(settings))
}
