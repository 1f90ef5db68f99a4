use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    claims::TokenKind,
    dto::{
        AuthResponse, LoginRequest, RefreshRequest, SignupForm, SignupResponse, UserResponse,
        VerifyRequest,
    },
    extractors::AuthUser,
    jwt::JwtKeys,
    repo,
    services::{PendingSignup, SignupFlow},
    IdentityService, LocalIdentity,
};
use crate::{error::AppError, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/verify", post(verify))
        .route("/auth/resend", post(resend))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn flow(state: &AppState, identity: &Arc<LocalIdentity>) -> SignupFlow {
    SignupFlow::new(identity.clone(), state.store.clone())
}

fn respond(identity: &LocalIdentity, account: super::Account) -> Result<Json<AuthResponse>, AppError> {
    Ok(Json(AuthResponse {
        tokens: identity.issue_tokens()?,
        account,
    }))
}

#[instrument(skip(state, form))]
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let identity = Arc::new(state.identity());
    let started = flow(&state, &identity).begin(&form).await?;
    let account = identity.reload().await?;
    info!(
        user_id = %started.pending.user_id,
        code_sent = started.code_sent,
        "signup pending verification"
    );
    let Json(session) = respond(&identity, account)?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            session,
            verification_sent: started.code_sent,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn verify(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let identity = Arc::new(state.identity());
    let account = identity.resume(&user_id).await?;
    let pending = PendingSignup {
        user_id: account.uid,
        email: account.email,
        full_name: payload.full_name.trim().to_string(),
        phone_number: payload.phone_number.trim().to_string(),
    };
    let user = flow(&state, &identity)
        .confirm(&pending, payload.code.trim())
        .await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn resend(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, AppError> {
    let identity = Arc::new(state.identity());
    identity.resume(&user_id).await?;
    flow(&state, &identity).resend().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let identity = state.identity();
    let account = identity.sign_in(&payload.email, &payload.password).await?;
    respond(&identity, account)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_kind(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            AppError::Unauthenticated
        })?;

    let identity = state.identity();
    let account = identity.resume(&claims.sub).await?;
    respond(&identity, account)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = repo::find_user(state.store.as_ref(), &user_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;
    Ok(Json(user.into()))
}
