use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::ApiError;
use crate::state::AppState;

pub const DEFAULT_ROLE: &str = "student";

#[derive(Error, Debug)]
pub enum AuthError {
    /// The identity service rejected the request; its message is kept.
    #[error("{0}")]
    Rejected(String),

    #[error("identity request failed: {0}")]
    Transport(String),
}

#[derive(Debug, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Map<String, Value>,
}

impl AuthUser {
    pub fn role(&self) -> &str {
        self.user_metadata
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_ROLE)
    }
}

#[derive(Debug, Deserialize)]
pub struct Session {
    /// Absent when the provider defers the session, e.g. pending email
    /// confirmation after sign-up.
    #[serde(default)]
    pub access_token: Option<String>,
    pub user: AuthUser,
}

/// Thin client for the hosted identity endpoints. Credentials and error
/// messages pass through untouched.
pub struct AuthClient {
    base: String,
    key: String,
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(base: &str, key: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response = self
            .http
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport)?;

        expect_json(response).await
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<Session, AuthError> {
        let response = self
            .http
            .post(self.endpoint("signup"))
            .header("apikey", &self.key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "role": role },
            }))
            .send()
            .await
            .map_err(transport)?;

        expect_json(response).await
    }

    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.endpoint("logout"))
            .header("apikey", &self.key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response).await)
        }
    }

    pub async fn user(&self, token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        expect_json(response).await
    }
}

fn transport(err: reqwest::Error) -> AuthError {
    AuthError::Transport(err.to_string())
}

async fn expect_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AuthError> {
    if response.status().is_success() {
        response.json().await.map_err(transport)
    } else {
        Err(rejection(response).await)
    }
}

/// Pulls a human-readable message out of the provider's error body. The
/// field name varies across endpoints.
async fn rejection(response: reqwest::Response) -> AuthError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|field| {
                    value
                        .get(field)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
        })
        .unwrap_or_else(|| format!("identity service returned {status}"));

    AuthError::Rejected(message)
}

pub fn parse_bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The authenticated caller, resolved from the bearer token through the
/// identity service.
pub struct AuthedUser {
    pub id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer)
            .ok_or(ApiError::Unauthorized)?;

        let user = state.auth.user(token).await.map_err(|err| {
            debug!("token rejected: {err}");
            ApiError::Unauthorized
        })?;

        Ok(AuthedUser { id: user.id })
    }
}
