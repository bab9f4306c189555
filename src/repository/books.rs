//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{
        Author, Book, BookDetails, BookQuery, Category, CreateAuthor, CreateBook, CreateCategory,
        CreatePublisher, Publisher, UpdateAuthor, UpdateBook, UpdateCategory, UpdatePublisher,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book with authors, categories and item availability
    pub async fn get_details(&self, id: i64) -> AppResult<BookDetails> {
        let book = self.get_by_id(id).await?;
        self.details_for(book).await
    }

    async fn details_for(&self, book: Book) -> AppResult<BookDetails> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT a.* FROM authors a
            JOIN book_authors ba ON ba.author_id = a.id
            WHERE ba.book_id = $1
            ORDER BY ba.author_order
            "#,
        )
        .bind(book.id)
        .fetch_all(&self.pool)
        .await?;

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.* FROM categories c
            JOIN book_categories bc ON bc.category_id = c.id
            WHERE bc.book_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(book.id)
        .fetch_all(&self.pool)
        .await?;

        let (items_total, items_available): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'AVAILABLE')
            FROM book_items WHERE book_id = $1
            "#,
        )
        .bind(book.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(BookDetails {
            book,
            authors,
            categories,
            items_total,
            items_available,
        })
    }

    /// List books with optional filters, paginated
    pub async fn list(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let title_filter = query.title.as_ref().map(|t| format!("%{}%", t));

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT DISTINCT b.* FROM books b
            LEFT JOIN book_authors ba ON ba.book_id = b.id
            LEFT JOIN book_categories bc ON bc.book_id = b.id
            WHERE ($1::text IS NULL OR b.title ILIKE $1)
              AND ($2::bigint IS NULL OR ba.author_id = $2)
              AND ($3::bigint IS NULL OR bc.category_id = $3)
            ORDER BY b.title
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&title_filter)
        .bind(query.author_id)
        .bind(query.category_id)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT b.id) FROM books b
            LEFT JOIN book_authors ba ON ba.book_id = b.id
            LEFT JOIN book_categories bc ON bc.book_id = b.id
            WHERE ($1::text IS NULL OR b.title ILIKE $1)
              AND ($2::bigint IS NULL OR ba.author_id = $2)
              AND ($3::bigint IS NULL OR bc.category_id = $3)
            "#,
        )
        .bind(&title_filter)
        .bind(query.author_id)
        .bind(query.category_id)
        .fetch_one(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(books.len());
        for book in books {
            details.push(self.details_for(book).await?);
        }

        Ok((details, total))
    }

    /// Create a book with its author and category links
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, description, isbn13, publish_year, pages,
                               cover_url, language_code, publisher_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(&book.isbn13)
        .bind(book.publish_year)
        .bind(book.pages)
        .bind(&book.cover_url)
        .bind(&book.language_code)
        .bind(book.publisher_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A book with this ISBN already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        for (order, author_id) in book.author_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO book_authors (book_id, author_id, author_order) VALUES ($1, $2, $3)",
            )
            .bind(created.id)
            .bind(author_id)
            .bind((order + 1) as i16)
            .execute(&mut *tx)
            .await?;
        }

        for category_id in &book.category_ids {
            sqlx::query("INSERT INTO book_categories (book_id, category_id) VALUES ($1, $2)")
                .bind(created.id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Update a book; replaces author/category links when provided
    pub async fn update(&self, id: i64, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                isbn13 = COALESCE($4, isbn13),
                publish_year = COALESCE($5, publish_year),
                pages = COALESCE($6, pages),
                cover_url = COALESCE($7, cover_url),
                language_code = COALESCE($8, language_code),
                publisher_id = COALESCE($9, publisher_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.isbn13)
        .bind(update.publish_year)
        .bind(update.pages)
        .bind(&update.cover_url)
        .bind(&update.language_code)
        .bind(update.publisher_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if let Some(author_ids) = &update.author_ids {
            sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for (order, author_id) in author_ids.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO book_authors (book_id, author_id, author_order) VALUES ($1, $2, $3)",
                )
                .bind(id)
                .bind(author_id)
                .bind((order + 1) as i16)
                .execute(&mut *tx)
                .await?;
            }
        }

        if let Some(category_ids) = &update.category_ids {
            sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for category_id in category_ids {
                sqlx::query("INSERT INTO book_categories (book_id, category_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(category_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a book (cascades items, links, comments, ratings). Refused by
    /// the loans FK while any copy has loan history.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::InvalidState(
                        "Book has copies with loan history and cannot be deleted".to_string(),
                    )
                }
                _ => AppError::Database(e),
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // Authors / publishers / categories
    // =========================================================================

    pub async fn get_author(&self, id: i64) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        Ok(
            sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn create_author(&self, author: &CreateAuthor) -> AppResult<Author> {
        Ok(sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, biography, birth_date, death_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&author.name)
        .bind(&author.biography)
        .bind(author.birth_date)
        .bind(author.death_date)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn update_author(&self, id: i64, update: &UpdateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors SET
                name = COALESCE($2, name),
                biography = COALESCE($3, biography),
                birth_date = COALESCE($4, birth_date),
                death_date = COALESCE($5, death_date)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.biography)
        .bind(update.birth_date)
        .bind(update.death_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    /// Delete an author; book links are removed by cascade.
    pub async fn delete_author(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Author with id {} not found",
                id
            )));
        }
        Ok(())
    }

    pub async fn get_publisher(&self, id: i64) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Publisher with id {} not found", id)))
    }

    pub async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        Ok(
            sqlx::query_as::<_, Publisher>("SELECT * FROM publishers ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn create_publisher(&self, publisher: &CreatePublisher) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>(
            r#"
            INSERT INTO publishers (name, description, founded_year, website)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&publisher.name)
        .bind(&publisher.description)
        .bind(publisher.founded_year)
        .bind(&publisher.website)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A publisher with this name already exists".to_string())
            }
            _ => AppError::Database(e),
        })
    }

    pub async fn update_publisher(&self, id: i64, update: &UpdatePublisher) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>(
            r#"
            UPDATE publishers SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                founded_year = COALESCE($4, founded_year),
                website = COALESCE($5, website)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.founded_year)
        .bind(&update.website)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A publisher with this name already exists".to_string())
            }
            _ => AppError::Database(e),
        })?
        .ok_or_else(|| AppError::NotFound(format!("Publisher with id {} not found", id)))
    }

    /// Delete a publisher; books keep their row with publisher_id set to NULL.
    pub async fn delete_publisher(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Publisher with id {} not found",
                id
            )));
        }
        Ok(())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn create_category(&self, category: &CreateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A category with this slug already exists".to_string())
            }
            _ => AppError::Database(e),
        })
    }

    pub async fn update_category(&self, id: i64, update: &UpdateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                parent_id = COALESCE($5, parent_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.slug)
        .bind(&update.description)
        .bind(update.parent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A category with this slug already exists".to_string())
            }
            _ => AppError::Database(e),
        })?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// Delete a category; book links are removed by cascade and child
    /// categories keep their row with parent_id set to NULL.
    pub async fn delete_category(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
