//! Book items (physical copies) repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::ItemStatus,
        item::{BookItem, CreateBookItem, UpdateBookItem},
    },
};

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List items of a book, barcode order
    pub async fn list_for_book(&self, book_id: i64) -> AppResult<Vec<BookItem>> {
        Ok(sqlx::query_as::<_, BookItem>(
            "SELECT * FROM book_items WHERE book_id = $1 ORDER BY barcode",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Create an item for a book
    pub async fn create(&self, book_id: i64, item: &CreateBookItem) -> AppResult<BookItem> {
        sqlx::query_as::<_, BookItem>(
            r#"
            INSERT INTO book_items (book_id, barcode, location_code)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(&item.barcode)
        .bind(&item.location_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Barcode {} already exists", item.barcode))
            }
            _ => AppError::Database(e),
        })
    }

    /// Admin status/location correction. Moving an item out of LOANED is
    /// refused while a live loan still references it.
    pub async fn update(&self, id: i64, update: &UpdateBookItem) -> AppResult<BookItem> {
        if let Some(status) = update.status {
            if status != ItemStatus::Loaned {
                let live_loans: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM loans WHERE book_item_id = $1 AND status <> 'RETURNED'",
                )
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
                if live_loans > 0 {
                    return Err(AppError::InvalidState(
                        "Item is referenced by an active loan".to_string(),
                    ));
                }
            }
        }

        sqlx::query_as::<_, BookItem>(
            r#"
            UPDATE book_items SET
                status = COALESCE($2, status),
                location_code = COALESCE($3, location_code)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.status)
        .bind(&update.location_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Delete an item. Refused while any non-RETURNED loan references it
    /// (backed by ON DELETE RESTRICT on the loans FK).
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let live_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE book_item_id = $1 AND status <> 'RETURNED'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if live_loans > 0 {
            return Err(AppError::InvalidState(
                "Item is referenced by an active loan".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM book_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item with id {} not found", id)));
        }
        Ok(())
    }
}
