use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::{done, success, success_with};
use crate::{
    extractors::{AuthGuard, JsonBody},
    models::{LoginBody, RegisterBody},
    names,
    rejections::{AppError, ResultExt},
    services::auth::{LoginOutcome, RegisterOutcome},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/validate", get(validate))
        .route("/auth/logout", post(logout))
}

async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterBody>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth
        .register(&body.email, &body.password, &body.name)
        .await
        .reject("could not register user")?;

    match outcome {
        RegisterOutcome::Registered { user, token } => Ok((
            StatusCode::CREATED,
            success_with(
                "User registered successfully",
                json!({ "user": user, "token": token }),
            ),
        )),
        RegisterOutcome::EmptyFields => Err(AppError::input("Please provide all required fields")),
        RegisterOutcome::WeakPassword => Err(AppError::input(format!(
            "Password must be at least {} characters",
            names::MIN_PASSWORD_LENGTH
        ))),
        RegisterOutcome::EmailTaken => Err(AppError::input("Email already registered")),
    }
}

async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginBody>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth
        .login(&body.email, &body.password)
        .await
        .reject("could not log in")?;

    match outcome {
        LoginOutcome::Success { user, token } => Ok(success_with(
            "Login successful",
            json!({ "user": user, "token": token }),
        )),
        LoginOutcome::EmptyFields => Err(AppError::input("Please provide email and password")),
        LoginOutcome::InvalidCredentials => Err(AppError::Unauthorized("Invalid credentials")),
    }
}

async fn me(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .db
        .find_user(user_id)
        .await
        .reject("could not load user")?
        .ok_or(AppError::NotFound("User"))?;

    Ok(success(json!({ "user": user })))
}

/// Like `me`, but a token for a deleted account is an auth failure.
async fn validate(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .db
        .find_user(user_id)
        .await
        .reject("could not load user")?
        .ok_or(AppError::Unauthorized("User not found"))?;

    Ok(success(json!({
        "user": { "id": user.id, "email": user.email, "name": user.name }
    })))
}

async fn logout(AuthGuard(user_id): AuthGuard) -> impl IntoResponse {
    tracing::info!("user {user_id} logged out");
    done("Logged out successfully")
}
