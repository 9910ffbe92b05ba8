// Public catalog handlers: HTML pages and the JSON API

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    auth::middleware::OptionalUser,
    db::{self, Book, BookCategory},
    error::{AppError, DbResultExt},
    AppState,
};

#[derive(Deserialize)]
pub struct CatalogParams {
    category: Option<String>,
}

struct CategoryOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "catalog.html")]
struct CatalogTemplate {
    books: Vec<Book>,
    categories: Vec<CategoryOption>,
    username: Option<String>,
    is_admin: bool,
}

#[derive(Template)]
#[template(path = "book.html")]
struct BookTemplate {
    book: Book,
    username: Option<String>,
}

// An empty or missing ?category= means no filter
fn parse_category_filter(raw: Option<&str>) -> Result<Option<BookCategory>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<BookCategory>()
            .map(Some)
            .map_err(|e| AppError::BadRequest(e.to_string())),
    }
}

async fn find_book(state: &AppState, isbn: &str) -> Result<Book, AppError> {
    db::get_book_by_isbn(&state.db_pool, isbn)
        .await
        .db_err()?
        .ok_or_else(|| AppError::NotFound(format!("No book with ISBN {}", isbn)))
}

// GET / - Catalog page
pub async fn catalog_page(
    OptionalUser(user): OptionalUser,
    Query(params): Query<CatalogParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    let filter = parse_category_filter(params.category.as_deref())?;
    let books = db::list_books(&state.db_pool, filter).await.db_err()?;

    let categories = BookCategory::ALL
        .into_iter()
        .map(|category| CategoryOption {
            value: category.as_str(),
            label: category.label(),
            selected: filter == Some(category),
        })
        .collect();

    let template = CatalogTemplate {
        books,
        categories,
        is_admin: user.as_ref().is_some_and(|u| u.is_admin()),
        username: user.map(|u| u.username),
    };
    Ok(Html(template.render()?))
}

// GET /books/{isbn} - Book detail page
pub async fn book_page(
    OptionalUser(user): OptionalUser,
    Path(isbn): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    let book = find_book(&state, &isbn).await?;

    let template = BookTemplate {
        book,
        username: user.map(|u| u.username),
    };
    Ok(Html(template.render()?))
}

// GET /api/books - JSON catalog
pub async fn list_books_json(
    Query(params): Query<CatalogParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Book>>, AppError> {
    let filter = parse_category_filter(params.category.as_deref())?;
    let books = db::list_books(&state.db_pool, filter).await.db_err()?;
    Ok(Json(books))
}

// GET /api/books/{isbn} - JSON book
pub async fn get_book_json(
    Path(isbn): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(find_book(&state, &isbn).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_filter() {
        assert_eq!(parse_category_filter(None).unwrap(), None);
        assert_eq!(parse_category_filter(Some("")).unwrap(), None);
        assert_eq!(
            parse_category_filter(Some("THEATER")).unwrap(),
            Some(BookCategory::Theater)
        );
        assert!(parse_category_filter(Some("MANGA")).is_err());
    }
}
