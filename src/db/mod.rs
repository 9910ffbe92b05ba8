// Database module for users, sessions and the book catalog

pub mod seed;
pub mod store;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::{fmt, str::FromStr};

pub const MEMORY_DB: &str = ":memory:";

// Initialize database and run migrations
pub async fn init_db(db_path: &str) -> Result<SqlitePool> {
    let pool = if db_path == MEMORY_DB {
        // Every connection to :memory: opens its own database, so the pool
        // holds exactly one and never recycles it
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true))
            .await
            .context("Failed to open in-memory database")?
    } else {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))
            .context("Invalid database path")?
            .create_if_missing(true)
            .foreign_keys(true);
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?
    };

    run_migrations(&pool).await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let migration_sql = include_str!("../../migrations/001_initial_schema.sql");
    sqlx::query(migration_sql)
        .execute(pool)
        .await
        .context("Failed to run migration 001")?;

    Ok(())
}

// Account roles, stored as ADMIN / USER
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// User models
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

// Returns true when a user with this username exists (case-insensitive)
pub async fn user_exists(pool: &SqlitePool, username: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE username = ? COLLATE NOCASE"
    )
    .bind(username)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

// Create a new user with an explicit role
pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<User> {
    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?)"
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(user.role)
    .execute(pool)
    .await?;

    Ok(User {
        id: result.last_insert_rowid(),
        username: user.username.clone(),
        role: user.role,
    })
}

// Find user by username, returning (id, password_hash, role)
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<(i64, String, Role)>> {
    let result = sqlx::query(
        "SELECT id, password_hash, role FROM users WHERE username = ? COLLATE NOCASE"
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(result.map(|row| (
        row.get::<i64, _>("id"),
        row.get::<String, _>("password_hash"),
        row.get::<Role, _>("role"),
    )))
}

// Get user by ID
pub async fn get_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, role FROM users WHERE id = ?"
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

// List all users (admin only)
pub async fn list_all_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, role FROM users ORDER BY id"
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

// Session management
pub async fn create_session(pool: &SqlitePool, user_id: i64) -> Result<String> {
    let session_id = uuid::Uuid::new_v4().to_string();
    // Same lifetime as the session cookie
    let expires_at = chrono::Utc::now() + chrono::Duration::hours(24);

    sqlx::query(
        "INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)"
    )
    .bind(&session_id)
    .bind(user_id)
    // Same textual format as SQLite's datetime('now') so comparisons work
    .bind(expires_at.format("%Y-%m-%d %H:%M:%S").to_string())
    .execute(pool)
    .await?;

    Ok(session_id)
}

// Validate session and return user_id
pub async fn validate_session(pool: &SqlitePool, session_id: &str) -> Result<Option<i64>> {
    let result = sqlx::query(
        "SELECT user_id FROM sessions WHERE id = ? AND expires_at > datetime('now')"
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    Ok(result.map(|row| row.get("user_id")))
}

// Delete session (logout)
pub async fn delete_session(pool: &SqlitePool, session_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}

// Cleanup expired sessions
pub async fn cleanup_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < datetime('now')")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// Book models

// Literary genres of the catalog, stored as NOVEL / POETRY / ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookCategory {
    Novel,
    Poetry,
    Theater,
    Essay,
    Biography,
}

impl BookCategory {
    pub const ALL: [BookCategory; 5] = [
        BookCategory::Novel,
        BookCategory::Poetry,
        BookCategory::Theater,
        BookCategory::Essay,
        BookCategory::Biography,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookCategory::Novel => "NOVEL",
            BookCategory::Poetry => "POETRY",
            BookCategory::Theater => "THEATER",
            BookCategory::Essay => "ESSAY",
            BookCategory::Biography => "BIOGRAPHY",
        }
    }

    /// Display name shown in the catalog
    pub fn label(&self) -> &'static str {
        match self {
            BookCategory::Novel => "Roman",
            BookCategory::Poetry => "Poésie",
            BookCategory::Theater => "Théâtre",
            BookCategory::Essay => "Essai",
            BookCategory::Biography => "Biographie",
        }
    }
}

impl fmt::Display for BookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        BookCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown book category '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price_cents: i64,
    pub description: String,
    pub category: BookCategory,
    pub publication_year: i32,
    pub cover_url: Option<String>,
}

impl Book {
    /// Price formatted with two decimals, e.g. "19.90"
    pub fn price_display(&self) -> String {
        format_price(self.price_cents)
    }
}

pub fn format_price(price_cents: i64) -> String {
    format!("{}.{:02}", price_cents / 100, price_cents % 100)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price_cents: i64,
    pub description: String,
    pub category: BookCategory,
    pub publication_year: i32,
    pub cover_url: Option<String>,
}

const BOOK_COLUMNS: &str =
    "id, title, author, isbn, price_cents, description, category, publication_year, cover_url";

// Returns true when a book with this ISBN exists
pub async fn book_exists(pool: &SqlitePool, isbn: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE isbn = ?")
        .bind(isbn)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

// Insert a book; fails with a UNIQUE violation if the ISBN is taken
pub async fn create_book(pool: &SqlitePool, book: &NewBook) -> Result<Book> {
    let result = sqlx::query(
        "INSERT INTO books
         (title, author, isbn, price_cents, description, category, publication_year, cover_url)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.isbn)
    .bind(book.price_cents)
    .bind(&book.description)
    .bind(book.category)
    .bind(book.publication_year)
    .bind(&book.cover_url)
    .execute(pool)
    .await?;

    Ok(Book {
        id: result.last_insert_rowid(),
        title: book.title.clone(),
        author: book.author.clone(),
        isbn: book.isbn.clone(),
        price_cents: book.price_cents,
        description: book.description.clone(),
        category: book.category,
        publication_year: book.publication_year,
        cover_url: book.cover_url.clone(),
    })
}

pub async fn get_book_by_isbn(pool: &SqlitePool, isbn: &str) -> Result<Option<Book>> {
    let query = format!("SELECT {} FROM books WHERE isbn = ?", BOOK_COLUMNS);
    let book = sqlx::query_as::<_, Book>(&query)
        .bind(isbn)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

// List books ordered by title, optionally restricted to one category
pub async fn list_books(pool: &SqlitePool, category: Option<BookCategory>) -> Result<Vec<Book>> {
    let books = match category {
        Some(category) => {
            let query = format!(
                "SELECT {} FROM books WHERE category = ? ORDER BY title",
                BOOK_COLUMNS
            );
            sqlx::query_as::<_, Book>(&query)
                .bind(category)
                .fetch_all(pool)
                .await?
        }
        None => {
            let query = format!("SELECT {} FROM books ORDER BY title", BOOK_COLUMNS);
            sqlx::query_as::<_, Book>(&query).fetch_all(pool).await?
        }
    };

    Ok(books)
}

// Delete a book, returning whether a row was removed
pub async fn delete_book(pool: &SqlitePool, book_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(book_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_books(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
