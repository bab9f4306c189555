//! Social features repository: favorites, follows, comments, ratings

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::social::{BookComment, BookRating, FollowAuthor, FollowPublisher, UserFavorite},
};

#[derive(Clone)]
pub struct SocialRepository {
    pool: Pool<Postgres>,
}

impl SocialRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    pub async fn add_favorite(&self, user_id: i64, book_id: i64) -> AppResult<UserFavorite> {
        sqlx::query_as::<_, UserFavorite>(
            "INSERT INTO user_favorites (user_id, book_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Book is already in favorites".to_string())
            }
            _ => AppError::Database(e),
        })
    }

    pub async fn remove_favorite(&self, user_id: i64, book_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Favorite not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_favorites(&self, user_id: i64) -> AppResult<Vec<UserFavorite>> {
        Ok(sqlx::query_as::<_, UserFavorite>(
            "SELECT * FROM user_favorites WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // =========================================================================
    // Follows
    // =========================================================================

    pub async fn follow_author(&self, user_id: i64, author_id: i64) -> AppResult<FollowAuthor> {
        sqlx::query_as::<_, FollowAuthor>(
            "INSERT INTO follow_authors (user_id, author_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Already following this author".to_string())
            }
            _ => AppError::Database(e),
        })
    }

    pub async fn unfollow_author(&self, user_id: i64, author_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM follow_authors WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Follow not found".to_string()));
        }
        Ok(())
    }

    pub async fn follow_publisher(
        &self,
        user_id: i64,
        publisher_id: i64,
    ) -> AppResult<FollowPublisher> {
        sqlx::query_as::<_, FollowPublisher>(
            "INSERT INTO follow_publishers (user_id, publisher_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(publisher_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Already following this publisher".to_string())
            }
            _ => AppError::Database(e),
        })
    }

    pub async fn unfollow_publisher(&self, user_id: i64, publisher_id: i64) -> AppResult<()> {
        let result =
            sqlx::query("DELETE FROM follow_publishers WHERE user_id = $1 AND publisher_id = $2")
                .bind(user_id)
                .bind(publisher_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Follow not found".to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Comments
    // =========================================================================

    pub async fn add_comment(
        &self,
        user_id: i64,
        book_id: i64,
        content: &str,
    ) -> AppResult<BookComment> {
        Ok(sqlx::query_as::<_, BookComment>(
            r#"
            INSERT INTO book_comments (user_id, book_id, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn get_comment(&self, id: i64) -> AppResult<BookComment> {
        sqlx::query_as::<_, BookComment>("SELECT * FROM book_comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment with id {} not found", id)))
    }

    /// List visible comments of a book, newest first
    pub async fn list_comments(&self, book_id: i64) -> AppResult<Vec<BookComment>> {
        Ok(sqlx::query_as::<_, BookComment>(
            r#"
            SELECT * FROM book_comments
            WHERE book_id = $1 AND NOT is_deleted
            ORDER BY created_at DESC
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Soft-delete a comment
    pub async fn delete_comment(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE book_comments SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment with id {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // Ratings
    // =========================================================================

    /// Upsert the caller's rating for a book
    pub async fn rate_book(
        &self,
        user_id: i64,
        book_id: i64,
        rating: i16,
        review: Option<&str>,
    ) -> AppResult<BookRating> {
        Ok(sqlx::query_as::<_, BookRating>(
            r#"
            INSERT INTO book_ratings (user_id, book_id, rating, review)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, book_id)
            DO UPDATE SET rating = EXCLUDED.rating, review = EXCLUDED.review, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(rating)
        .bind(review)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn list_ratings(&self, book_id: i64) -> AppResult<Vec<BookRating>> {
        Ok(sqlx::query_as::<_, BookRating>(
            "SELECT * FROM book_ratings WHERE book_id = $1 ORDER BY updated_at DESC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Average rating of a book, if any
    pub async fn average_rating(&self, book_id: i64) -> AppResult<Option<f64>> {
        Ok(sqlx::query_scalar(
            "SELECT AVG(rating)::float8 FROM book_ratings WHERE book_id = $1",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?)
    }
}
