use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{parse_bearer, DEFAULT_ROLE};
use crate::error::{ApiError, ApiResult};
use crate::routes::ok;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl Credentials {
    fn required(&self) -> Result<(&str, &str), ApiError> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(ApiError::BadRequest(
                "email and password are required".to_string(),
            )),
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> ApiResult<Json<Value>> {
    let (email, password) = body.required()?;

    let session = state.auth.sign_in(email, password).await?;
    info!("signed in {}", session.user.id);

    Ok(ok(json!({
        "user": {
            "id": session.user.id,
            "email": session.user.email,
            "role": session.user.role(),
        },
        "token": session.access_token,
    })))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> ApiResult<Json<Value>> {
    let (email, password) = body.required()?;
    let role = body.role.as_deref().unwrap_or(DEFAULT_ROLE);

    let session = state.auth.sign_up(email, password, role).await?;
    info!("signed up {}", session.user.id);

    Ok(ok(json!({
        "user": {
            "id": session.user.id,
            "email": session.user.email,
            "role": session.user.role(),
        },
        "token": session.access_token,
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer)
        .ok_or(ApiError::Unauthorized)?;

    state.auth.sign_out(token).await?;

    Ok(ok(json!({})))
}
