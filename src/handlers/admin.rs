// Admin panel handlers

use askama::Template;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::common::{ErrorTemplate, SuccessTemplate};
use crate::{
    auth::middleware::AdminUser,
    db::{self, Book, BookCategory, NewBook, User},
    error::{AppError, DbResultExt},
    validation, AppState,
};

// Template struct
#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
    admin_name: String,
    users: Vec<User>,
    books: Vec<Book>,
    categories: Vec<(&'static str, &'static str)>,
}

// GET /admin - Admin panel
pub async fn admin_page(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    let users = db::list_all_users(&state.db_pool).await.db_err()?;
    let books = db::list_books(&state.db_pool, None).await.db_err()?;

    let template = AdminTemplate {
        admin_name: admin.username,
        users,
        books,
        categories: BookCategory::ALL
            .into_iter()
            .map(|c| (c.as_str(), c.label()))
            .collect(),
    };

    Ok(Html(template.render()?))
}

// Form struct for adding a book
#[derive(Deserialize)]
pub struct BookForm {
    title: String,
    author: String,
    isbn: String,
    price: String,
    description: String,
    category: String,
    publication_year: String,
    #[serde(default)]
    cover_url: String,
}

impl BookForm {
    // Validate every field and build the record to insert
    fn into_new_book(self) -> Result<NewBook, AppError> {
        validation::validate_not_empty("Title", &self.title)?;
        validation::validate_not_empty("Author", &self.author)?;
        validation::validate_not_empty("Description", &self.description)?;
        validation::validate_isbn(&self.isbn)?;
        let publication_year = self
            .publication_year
            .trim()
            .parse::<i32>()
            .map_err(|_| AppError::BadRequest("Publication year must be a number".to_string()))?;
        validation::validate_publication_year(publication_year)?;
        let price_cents = validation::parse_price(&self.price)?;
        let category = self
            .category
            .parse::<BookCategory>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let cover_url = match self.cover_url.trim() {
            "" => None,
            url => {
                validation::validate_cover_url(url)?;
                Some(url.to_string())
            }
        };

        Ok(NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            price_cents,
            description: self.description.trim().to_string(),
            category,
            publication_year,
            cover_url,
        })
    }
}

// POST /admin/books - Add a book to the catalog
pub async fn create_book(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<BookForm>,
) -> Result<impl IntoResponse, AppError> {
    let new_book = match form.into_new_book() {
        Ok(book) => book,
        Err(AppError::BadRequest(message)) => {
            let template = ErrorTemplate { message: &message };
            return Ok(Html(template.render()?));
        }
        Err(e) => return Err(e),
    };

    let book = db::create_book(&state.db_pool, &new_book)
        .await
        .unique_err("A book with this ISBN already exists")?;

    info!(admin = %admin.username, isbn = %book.isbn, "book added");

    let message = format!("Book '{}' added to the catalog", book.title);
    let template = SuccessTemplate { message: &message };
    Ok(Html(template.render()?))
}

// DELETE /admin/books/{id} - Remove a book
pub async fn delete_book(
    AdminUser(admin): AdminUser,
    Path(book_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = db::delete_book(&state.db_pool, book_id).await.db_err()?;
    if !deleted {
        return Err(AppError::NotFound(format!("No book with id {}", book_id)));
    }

    info!(admin = %admin.username, book_id, "book deleted");

    // Empty body: htmx swaps the table row out
    Ok(Html(String::new()))
}

// POST /admin/cleanup-sessions - Clean up expired sessions
pub async fn cleanup_sessions(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = db::cleanup_expired_sessions(&state.db_pool)
        .await
        .db_err()?;

    let message = format!("Cleaned up {} expired sessions", deleted);
    let template = SuccessTemplate { message: &message };
    Ok(Html(template.render()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> BookForm {
        BookForm {
            title: " Candide ".to_string(),
            author: "Voltaire".to_string(),
            isbn: "978-2070360024".to_string(),
            price: "7.90".to_string(),
            description: "Conte philosophique.".to_string(),
            category: "NOVEL".to_string(),
            publication_year: " 1759 ".to_string(),
            cover_url: String::new(),
        }
    }

    #[test]
    fn test_valid_form_builds_book() {
        let book = form().into_new_book().unwrap();
        assert_eq!(book.title, "Candide");
        assert_eq!(book.price_cents, 790);
        assert_eq!(book.category, BookCategory::Novel);
        assert_eq!(book.publication_year, 1759);
        assert_eq!(book.cover_url, None);
    }

    #[test]
    fn test_form_rejects_non_numeric_year() {
        let mut bad = form();
        bad.publication_year = "dix-huit".to_string();
        match bad.into_new_book() {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "Publication year must be a number")
            }
            other => panic!("unexpected: {:?}", other.map(|b| b.isbn)),
        }
    }

    #[test]
    fn test_form_rejects_bad_category() {
        let mut bad = form();
        bad.category = "COMIC".to_string();
        assert!(matches!(bad.into_new_book(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_form_rejects_unsafe_cover_url() {
        let mut bad = form();
        bad.cover_url = "javascript:alert(1)".to_string();
        assert!(matches!(bad.into_new_book(), Err(AppError::BadRequest(_))));
    }
}
