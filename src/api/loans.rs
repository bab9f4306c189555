//! Loan endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanDetails, ReturnLoan},
    AppState,
};

use super::AuthenticatedUser;

/// Record the return of a loaned copy (admin)
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Loan ID")),
    request_body = ReturnLoan,
    responses(
        (status = 200, description = "Loan closed", body = Loan),
        (status = 403, description = "Admin required"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<ReturnLoan>,
) -> AppResult<Json<Loan>> {
    claims.require_admin()?;
    let loan = state
        .services
        .borrowing
        .return_loan(id, request, Utc::now().date_naive())
        .await?;
    Ok(Json(loan))
}

/// Loans created by a request's approval
#[utoipa::path(
    get,
    path = "/requests/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Loans", body = [LoanDetails]),
        (status = 403, description = "Not the requester nor an admin"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn request_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let request = state.services.borrowing.get_request(id).await?;
    claims.require_self_or_admin(request.request.user_id)?;
    let loans = state.services.borrowing.request_loans(id).await?;
    Ok(Json(loans))
}

/// Loan history of a user
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Loans", body = [LoanDetails]),
        (status = 403, description = "Not the user nor an admin")
    )
)]
pub async fn user_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_self_or_admin(id)?;
    let loans = state.services.borrowing.user_loans(id).await?;
    Ok(Json(loans))
}
