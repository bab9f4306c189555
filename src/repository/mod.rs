//! Repository layer for database operations

pub mod books;
pub mod items;
pub mod loans;
pub mod mail;
pub mod requests;
pub mod social;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub items: items::ItemsRepository,
    pub users: users::UsersRepository,
    pub requests: requests::RequestsRepository,
    pub loans: loans::LoansRepository,
    pub mail: mail::MailRepository,
    pub social: social::SocialRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            items: items::ItemsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            mail: mail::MailRepository::new(pool.clone()),
            social: social::SocialRepository::new(pool.clone()),
            pool,
        }
    }
}
