//! Authentication and account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{ProfileStatus, Role},
        user::{Login, LoginResponse, Me, MemberProfile, Signup, UpdateProfile},
    },
    AppState,
};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct SignupResponse {
    pub user_id: i64,
    pub message: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SetRole {
    pub role: Role,
}

#[derive(Deserialize, ToSchema)]
pub struct SetStatus {
    pub status: ProfileStatus,
}

/// Create a new account; an activation mail is queued
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = Signup,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<Signup>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.accounts.signup(request, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: user.id,
            message: "Account created, check your mailbox for the activation link".to_string(),
        }),
    ))
}

/// Activate an account with the emailed token
#[utoipa::path(
    get,
    path = "/auth/activate/{token}",
    tag = "auth",
    params(
        ("token" = String, Path, description = "Activation token")
    ),
    responses(
        (status = 200, description = "Account activated"),
        (status = 404, description = "Unknown token"),
        (status = 409, description = "Token expired or already used")
    )
)]
pub async fn activate(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    state.services.accounts.activate(&token, Utc::now()).await?;
    Ok(Json(serde_json::json!({ "status": "activated" })))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = Login,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<Login>,
) -> AppResult<Json<LoginResponse>> {
    let response = state.services.accounts.login(request, Utc::now()).await?;
    Ok(Json(response))
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Authenticated profile", body = Me),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Me>> {
    let me = state.services.accounts.me(claims.user_id).await?;
    Ok(Json(me))
}

/// Update the authenticated user's profile
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = MemberProfile),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateProfile>,
) -> AppResult<Json<MemberProfile>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = state
        .services
        .accounts
        .update_profile(claims.user_id, request)
        .await?;
    Ok(Json(profile))
}

/// Change a member's role (admin)
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    tag = "auth",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    request_body = SetRole,
    responses(
        (status = 200, description = "Role updated", body = MemberProfile),
        (status = 403, description = "Admin required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_role(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i64>,
    Json(request): Json<SetRole>,
) -> AppResult<Json<MemberProfile>> {
    claims.require_admin()?;
    let profile = state.services.accounts.set_role(user_id, request.role).await?;
    Ok(Json(profile))
}

/// Change a member's profile status (admin)
#[utoipa::path(
    put,
    path = "/users/{id}/status",
    tag = "auth",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    request_body = SetStatus,
    responses(
        (status = 200, description = "Status updated", body = MemberProfile),
        (status = 403, description = "Admin required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i64>,
    Json(request): Json<SetStatus>,
) -> AppResult<Json<MemberProfile>> {
    claims.require_admin()?;
    let profile = state
        .services
        .accounts
        .set_status(user_id, request.status)
        .await?;
    Ok(Json(profile))
}
