// Store traits used by the bootstrap seeder, and their SQLite implementation

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::{self, Book, NewBook, NewUser, User};

/// Persistence for user accounts, keyed by unique username.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists_by_username(&self, username: &str) -> Result<bool>;

    /// Persist a new user. Errors on a username that is already taken.
    async fn save_user(&self, user: NewUser) -> Result<User>;
}

/// Persistence for catalog records, keyed by unique ISBN.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool>;

    /// Persist a new book. Errors on an ISBN that is already taken.
    async fn save_book(&self, book: NewBook) -> Result<Book>;
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        db::user_exists(&self.pool, username).await
    }

    async fn save_user(&self, user: NewUser) -> Result<User> {
        db::create_user(&self.pool, &user).await
    }
}

#[async_trait]
impl BookStore for SqliteStore {
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool> {
        db::book_exists(&self.pool, isbn).await
    }

    async fn save_book(&self, book: NewBook) -> Result<Book> {
        db::create_book(&self.pool, &book).await
    }
}
