//! Social features service

use crate::{
    error::{AppError, AppResult},
    models::{
        social::{BookComment, BookRating, FollowAuthor, FollowPublisher, UserFavorite},
        user::Claims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SocialService {
    repository: Repository,
}

impl SocialService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn add_favorite(&self, user_id: i64, book_id: i64) -> AppResult<UserFavorite> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.social.add_favorite(user_id, book_id).await
    }

    pub async fn remove_favorite(&self, user_id: i64, book_id: i64) -> AppResult<()> {
        self.repository.social.remove_favorite(user_id, book_id).await
    }

    pub async fn list_favorites(&self, user_id: i64) -> AppResult<Vec<UserFavorite>> {
        self.repository.social.list_favorites(user_id).await
    }

    pub async fn follow_author(&self, user_id: i64, author_id: i64) -> AppResult<FollowAuthor> {
        self.repository.books.get_author(author_id).await?;
        self.repository.social.follow_author(user_id, author_id).await
    }

    pub async fn unfollow_author(&self, user_id: i64, author_id: i64) -> AppResult<()> {
        self.repository.social.unfollow_author(user_id, author_id).await
    }

    pub async fn follow_publisher(
        &self,
        user_id: i64,
        publisher_id: i64,
    ) -> AppResult<FollowPublisher> {
        self.repository.books.get_publisher(publisher_id).await?;
        self.repository
            .social
            .follow_publisher(user_id, publisher_id)
            .await
    }

    pub async fn unfollow_publisher(&self, user_id: i64, publisher_id: i64) -> AppResult<()> {
        self.repository
            .social
            .unfollow_publisher(user_id, publisher_id)
            .await
    }

    pub async fn add_comment(
        &self,
        user_id: i64,
        book_id: i64,
        content: &str,
    ) -> AppResult<BookComment> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.social.add_comment(user_id, book_id, content).await
    }

    pub async fn list_comments(&self, book_id: i64) -> AppResult<Vec<BookComment>> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.social.list_comments(book_id).await
    }

    /// Soft-delete a comment; only its author or an admin may delete.
    pub async fn delete_comment(&self, claims: &Claims, comment_id: i64) -> AppResult<()> {
        let comment = self.repository.social.get_comment(comment_id).await?;
        if comment.user_id != claims.user_id && !claims.is_admin() {
            return Err(AppError::Authorization(
                "Only the author or an administrator may delete a comment".to_string(),
            ));
        }
        self.repository.social.delete_comment(comment_id).await
    }

    pub async fn rate_book(
        &self,
        user_id: i64,
        book_id: i64,
        rating: i16,
        review: Option<&str>,
    ) -> AppResult<BookRating> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository
            .social
            .rate_book(user_id, book_id, rating, review)
            .await
    }

    pub async fn book_ratings(&self, book_id: i64) -> AppResult<(Vec<BookRating>, Option<f64>)> {
        self.repository.books.get_by_id(book_id).await?;
        let ratings = self.repository.social.list_ratings(book_id).await?;
        let average = self.repository.social.average_rating(book_id).await?;
        Ok((ratings, average))
    }
}
