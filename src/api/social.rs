//! Social endpoints: favorites, follows, comments and ratings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::social::{
        BookComment, BookRating, CreateComment, FollowAuthor, FollowPublisher, RateBook,
        UserFavorite,
    },
    AppState,
};

use super::AuthenticatedUser;

/// Ratings of a book with their average
#[derive(Serialize, ToSchema)]
pub struct RatingList {
    pub ratings: Vec<BookRating>,
    pub average: Option<f64>,
}

/// Add a book to the caller's favorites
#[utoipa::path(
    post,
    path = "/books/{id}/favorite",
    tag = "social",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 201, description = "Favorite added", body = UserFavorite),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Already a favorite")
    )
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i64>,
) -> AppResult<(StatusCode, Json<UserFavorite>)> {
    let favorite = state
        .services
        .social
        .add_favorite(claims.user_id, book_id)
        .await?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

/// Remove a book from the caller's favorites
#[utoipa::path(
    delete,
    path = "/books/{id}/favorite",
    tag = "social",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 404, description = "Not a favorite")
    )
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .services
        .social
        .remove_favorite(claims.user_id, book_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the caller's favorites
#[utoipa::path(
    get,
    path = "/users/me/favorites",
    tag = "social",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Favorites", body = [UserFavorite])
    )
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<UserFavorite>>> {
    let favorites = state.services.social.list_favorites(claims.user_id).await?;
    Ok(Json(favorites))
}

/// Follow an author
#[utoipa::path(
    post,
    path = "/authors/{id}/follow",
    tag = "social",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 201, description = "Author followed", body = FollowAuthor),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Already following")
    )
)]
pub async fn follow_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(author_id): Path<i64>,
) -> AppResult<(StatusCode, Json<FollowAuthor>)> {
    let follow = state
        .services
        .social
        .follow_author(claims.user_id, author_id)
        .await?;
    Ok((StatusCode::CREATED, Json(follow)))
}

/// Unfollow an author
#[utoipa::path(
    delete,
    path = "/authors/{id}/follow",
    tag = "social",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author unfollowed"),
        (status = 404, description = "Not following")
    )
)]
pub async fn unfollow_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(author_id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .services
        .social
        .unfollow_author(claims.user_id, author_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Follow a publisher
#[utoipa::path(
    post,
    path = "/publishers/{id}/follow",
    tag = "social",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Publisher ID")),
    responses(
        (status = 201, description = "Publisher followed", body = FollowPublisher),
        (status = 404, description = "Publisher not found"),
        (status = 409, description = "Already following")
    )
)]
pub async fn follow_publisher(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(publisher_id): Path<i64>,
) -> AppResult<(StatusCode, Json<FollowPublisher>)> {
    let follow = state
        .services
        .social
        .follow_publisher(claims.user_id, publisher_id)
        .await?;
    Ok((StatusCode::CREATED, Json(follow)))
}

/// Unfollow a publisher
#[utoipa::path(
    delete,
    path = "/publishers/{id}/follow",
    tag = "social",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Publisher ID")),
    responses(
        (status = 204, description = "Publisher unfollowed"),
        (status = 404, description = "Not following")
    )
)]
pub async fn unfollow_publisher(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(publisher_id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .services
        .social
        .unfollow_publisher(claims.user_id, publisher_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Comment on a book
#[utoipa::path(
    post,
    path = "/books/{id}/comments",
    tag = "social",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment created", body = BookComment),
        (status = 404, description = "Book not found")
    )
)]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i64>,
    Json(request): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<BookComment>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let comment = state
        .services
        .social
        .add_comment(claims.user_id, book_id, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// List a book's comments
#[utoipa::path(
    get,
    path = "/books/{id}/comments",
    tag = "social",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Comments", body = [BookComment]),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Vec<BookComment>>> {
    let comments = state.services.social.list_comments(book_id).await?;
    Ok(Json(comments))
}

/// Delete a comment (author or admin)
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "social",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not the author nor an admin"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(comment_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.social.delete_comment(&claims, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rate a book (upserts the caller's rating)
#[utoipa::path(
    put,
    path = "/books/{id}/rating",
    tag = "social",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = RateBook,
    responses(
        (status = 200, description = "Rating recorded", body = BookRating),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn rate_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i64>,
    Json(request): Json<RateBook>,
) -> AppResult<Json<BookRating>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let rating = state
        .services
        .social
        .rate_book(claims.user_id, book_id, request.rating, request.review.as_deref())
        .await?;
    Ok(Json(rating))
}

/// A book's ratings and average
#[utoipa::path(
    get,
    path = "/books/{id}/ratings",
    tag = "social",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Ratings", body = RatingList),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_ratings(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<RatingList>> {
    let (ratings, average) = state.services.social.book_ratings(book_id).await?;
    Ok(Json(RatingList { ratings, average }))
}
