//! POST /register, POST /login, POST /logout.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};
use student_hub_core::auth::{self, LoginForm, RegisterForm};
use student_hub_core::{HubError, ValidationErrors};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

const REGISTER_FAILED: &str = "Đăng ký thất bại";
const LOGIN_FAILED: &str = "Đăng nhập thất bại";

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(form) = payload?;
    let registration = form.validate()?;

    ensure_email_free(&state, &registration.email, None, REGISTER_FAILED).await?;

    let is_admin = state.config.is_admin_email(&registration.email);
    let (user, token) = state
        .store
        .call(move |s| {
            let password_hash = auth::hash_password(&registration.password)?;
            let user = s.create_user(&registration.name, &registration.email, &password_hash, is_admin)?;
            let token = auth::issue_token(s, user.id)?;
            Ok((user, token))
        })
        .await
        .map_err(|e| ApiError::from_hub(&state, REGISTER_FAILED, e))?;

    tracing::info!(user_id = user.id, is_admin, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "user": user,
            "token": token,
            "message": "Registration successful",
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginForm>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(form) = payload?;
    let (email, password) = form.validate()?;

    let attempted = email.clone();
    let outcome = state
        .store
        .call(move |s| {
            let user = auth::login(s, &email, &password)?;
            let token = auth::issue_token(s, user.id)?;
            Ok((user, token))
        })
        .await;
    let (user, token) = match outcome {
        Ok(issued) => issued,
        Err(HubError::InvalidCredentials) => {
            tracing::warn!(email = %attempted, "authentication failed");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => return Err(ApiError::from_hub(&state, LOGIN_FAILED, e)),
    };

    tracing::info!(user_id = user.id, "login successful");
    Ok(Json(json!({
        "success": true,
        "user": user,
        "token": token,
        "message": "Login successful",
    })))
}

/// Revokes only the token that authenticated this request.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let token_id = auth.token_id;
    state
        .store
        .call(move |s| s.delete_token(token_id))
        .await
        .map_err(|e| ApiError::from_hub(&state, "Đăng xuất thất bại", e))?;
    tracing::info!(user_id = auth.user.id, "logout successful");
    Ok(Json(json!({
        "success": true,
        "message": "Logout successful",
    })))
}

/// Email uniqueness check shared with profile updates.
pub(crate) async fn ensure_email_free(
    state: &AppState,
    email: &str,
    except_user: Option<i64>,
    context: &'static str,
) -> Result<(), ApiError> {
    let email = email.to_string();
    let taken = state
        .store
        .call(move |s| s.email_taken(&email, except_user))
        .await
        .map_err(|e| ApiError::from_hub(state, context, e))?;
    if taken {
        return Err(ApiError::Validation(ValidationErrors::single(
            "email",
            "The email has already been taken.",
        )));
    }
    Ok(())
}
