//! Physical copy (item) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::item::{BookItem, CreateBookItem, UpdateBookItem},
    AppState,
};

use super::AuthenticatedUser;

/// List the copies of a book
#[utoipa::path(
    get,
    path = "/books/{id}/items",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Copies of the book", body = Vec<BookItem>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Vec<BookItem>>> {
    let items = state.services.catalog.list_items(book_id).await?;
    Ok(Json(items))
}

/// Add a barcoded copy to a book (admin)
#[utoipa::path(
    post,
    path = "/books/{id}/items",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = CreateBookItem,
    responses(
        (status = 201, description = "Copy created", body = BookItem),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Duplicate barcode")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i64>,
    Json(request): Json<CreateBookItem>,
) -> AppResult<(StatusCode, Json<BookItem>)> {
    claims.require_admin()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let item = state.services.catalog.create_item(book_id, request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Correct a copy's status or location (admin)
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Item ID")),
    request_body = UpdateBookItem,
    responses(
        (status = 200, description = "Copy updated", body = BookItem),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Active loan references the item")
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBookItem>,
) -> AppResult<Json<BookItem>> {
    claims.require_admin()?;
    let item = state.services.catalog.update_item(id, request).await?;
    Ok(Json(item))
}

/// Delete a copy (admin); refused while an active loan references it
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Active loan references the item")
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.catalog.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
