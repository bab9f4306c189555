//! Borrow request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        mail::{MailQueueEntry, MailReference},
        request::{
            ApprovalOutcome, BorrowRequest, BorrowRequestDetails, RejectRequest, RequestQuery,
            SubmitRequest,
        },
    },
    AppState,
};

use super::AuthenticatedUser;

/// Paginated request list
#[derive(Serialize, ToSchema)]
pub struct RequestList {
    pub items: Vec<BorrowRequest>,
    pub total: i64,
}

/// Submit a borrow request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = SubmitRequest,
    responses(
        (status = 201, description = "Request created", body = BorrowRequestDetails),
        (status = 400, description = "Invalid date range or lines"),
        (status = 404, description = "Referenced book not found")
    )
)]
pub async fn submit_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<SubmitRequest>,
) -> AppResult<(StatusCode, Json<BorrowRequestDetails>)> {
    let now = Utc::now();
    let details = state
        .services
        .borrowing
        .submit_request(claims.user_id, request, now.date_naive())
        .await?;
    Ok((StatusCode::CREATED, Json(details)))
}

/// List borrow requests. Admins see everything; users only their own.
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Requests", body = RequestList)
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<RequestQuery>,
) -> AppResult<Json<RequestList>> {
    if !claims.is_admin() {
        query.user_id = Some(claims.user_id);
    }
    let (items, total) = state.services.borrowing.list_requests(&query).await?;
    Ok(Json(RequestList { items, total }))
}

/// Get a request with its lines
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = BorrowRequestDetails),
        (status = 403, description = "Not the requester nor an admin"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<BorrowRequestDetails>> {
    let details = state.services.borrowing.get_request(id).await?;
    claims.require_self_or_admin(details.request.user_id)?;
    Ok(Json(details))
}

/// Approve a request (admin): allocate copies, or auto-reject on shortage
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Decision outcome", body = ApprovalOutcome),
        (status = 403, description = "Admin required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already decided")
    )
)]
pub async fn approve_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApprovalOutcome>> {
    claims.require_admin()?;
    let outcome = state
        .services
        .borrowing
        .approve_request(id, claims.user_id, Utc::now())
        .await?;
    Ok(Json(outcome))
}

/// Reject a request with a reason (admin)
#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Request ID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Request rejected", body = BorrowRequest),
        (status = 403, description = "Admin required"),
        (status = 409, description = "Request already decided")
    )
)]
pub async fn reject_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<RejectRequest>,
) -> AppResult<Json<BorrowRequest>> {
    claims.require_admin()?;
    let rejected = state
        .services
        .borrowing
        .reject_request(id, claims.user_id, &request.reason, Utc::now())
        .await?;
    Ok(Json(rejected))
}

/// Cancel an own PENDING request
#[utoipa::path(
    post,
    path = "/requests/{id}/cancel",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = BorrowRequest),
        (status = 403, description = "Not the requester"),
        (status = 409, description = "Request is not PENDING")
    )
)]
pub async fn cancel_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<BorrowRequest>> {
    let cancelled = state
        .services
        .borrowing
        .cancel_request(id, claims.user_id, Utc::now())
        .await?;
    Ok(Json(cancelled))
}

/// Notification mails triggered by a request (admin diagnostics)
#[utoipa::path(
    get,
    path = "/requests/{id}/mails",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Queued/sent mails", body = [MailQueueEntry]),
        (status = 403, description = "Admin required"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn request_mails(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<MailQueueEntry>>> {
    claims.require_admin()?;
    state.services.borrowing.get_request(id).await?;
    let mails = state
        .services
        .mailer
        .mails_for(MailReference::BorrowRequest(id))
        .await?;
    Ok(Json(mails))
}
