// Error handling for the bookstore web layer

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use askama::Template;
use std::fmt;

// Full-page error; the message is autoescaped since it may echo user input
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPageTemplate {
    status: String,
    message: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    TemplateRender(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::TemplateRender(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::TemplateRender(msg) => write!(f, "Template rendering error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Implement IntoResponse so Axum can convert errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Unauthorized carries the path to come back to after login
        if let AppError::Unauthorized(return_path) = &self {
            let redirect_url = if return_path.is_empty() || return_path == "/" {
                "/login".to_string()
            } else {
                format!("/login?return={}", urlencoding::encode(return_path))
            };
            return Redirect::to(&redirect_url).into_response();
        }

        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let page = ErrorPageTemplate {
            status: status.as_str().to_string(),
            message: self.to_string(),
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to render error page");
                (status, status.as_str().to_string()).into_response()
            }
        }
    }
}

// Helper to convert template errors
impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::TemplateRender(err.to_string())
    }
}

// Extension trait for database result handling
pub trait DbResultExt<T> {
    /// Convert database errors to AppError::Internal with "Database error: " prefix
    fn db_err(self) -> Result<T, AppError>;

    /// Like `db_err`, but a UNIQUE violation becomes a BadRequest with `message`
    fn unique_err(self, message: &str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Display> DbResultExt<T> for Result<T, E> {
    fn db_err(self) -> Result<T, AppError> {
        self.map_err(|e| AppError::Internal(format!("Database error: {}", e)))
    }

    fn unique_err(self, message: &str) -> Result<T, AppError> {
        self.map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::BadRequest(message.to_string())
            } else {
                AppError::Internal(format!("Database error: {}", e))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_redirects_with_return_path() {
        let response = AppError::Unauthorized("/admin".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/login?return=%2Fadmin"
        );
    }

    #[test]
    fn test_unique_err_maps_to_bad_request() {
        let result: Result<(), String> =
            Err("UNIQUE constraint failed: books.isbn".to_string());
        match result.unique_err("ISBN already exists") {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "ISBN already exists"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_page_escapes_message() {
        let response =
            AppError::NotFound("No book with ISBN <b>x</b>".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(body.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(!body.contains("<b>x</b>"));
    }

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("book".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
