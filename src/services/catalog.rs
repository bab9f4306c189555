//! Catalog service: books, authors, publishers, categories and copies

use crate::{
    error::AppResult,
    models::{
        book::{
            Author, Book, BookDetails, BookList, BookQuery, Category, CreateAuthor, CreateBook,
            CreateCategory, CreatePublisher, Publisher, UpdateAuthor, UpdateBook, UpdateCategory,
            UpdatePublisher,
        },
        item::{BookItem, CreateBookItem, UpdateBookItem},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self, query: &BookQuery) -> AppResult<BookList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let (items, total) = self.repository.books.list(query).await?;
        Ok(BookList {
            items,
            total,
            page,
            per_page,
        })
    }

    pub async fn get_book(&self, id: i64) -> AppResult<BookDetails> {
        self.repository.books.get_details(id).await
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        self.repository.books.create(&book).await
    }

    pub async fn update_book(&self, id: i64, update: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &update).await
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.books.list_authors().await
    }

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        self.repository.books.create_author(&author).await
    }

    pub async fn update_author(&self, id: i64, update: UpdateAuthor) -> AppResult<Author> {
        self.repository.books.update_author(id, &update).await
    }

    pub async fn delete_author(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete_author(id).await
    }

    pub async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        self.repository.books.list_publishers().await
    }

    pub async fn create_publisher(&self, publisher: CreatePublisher) -> AppResult<Publisher> {
        self.repository.books.create_publisher(&publisher).await
    }

    pub async fn update_publisher(&self, id: i64, update: UpdatePublisher) -> AppResult<Publisher> {
        self.repository.books.update_publisher(id, &update).await
    }

    pub async fn delete_publisher(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete_publisher(id).await
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.books.list_categories().await
    }

    pub async fn create_category(&self, category: CreateCategory) -> AppResult<Category> {
        self.repository.books.create_category(&category).await
    }

    pub async fn update_category(&self, id: i64, update: UpdateCategory) -> AppResult<Category> {
        self.repository.books.update_category(id, &update).await
    }

    pub async fn delete_category(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete_category(id).await
    }

    pub async fn list_items(&self, book_id: i64) -> AppResult<Vec<BookItem>> {
        // Verify book exists
        self.repository.books.get_by_id(book_id).await?;
        self.repository.items.list_for_book(book_id).await
    }

    pub async fn create_item(&self, book_id: i64, item: CreateBookItem) -> AppResult<BookItem> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.items.create(book_id, &item).await
    }

    pub async fn update_item(&self, id: i64, update: UpdateBookItem) -> AppResult<BookItem> {
        self.repository.items.update(id, &update).await
    }

    pub async fn delete_item(&self, id: i64) -> AppResult<()> {
        self.repository.items.delete(id).await
    }
}
