// Validation functions for the bookstore
// Provides reusable validation logic for forms and user input

use crate::error::AppError;
use chrono::Datelike;
use url::Url;

/// Earliest publication year accepted for a catalog entry
pub const MIN_PUBLICATION_YEAR: i32 = -3000;

/// Validate that a string is not empty
///
/// Returns Ok(()) if non-empty, Err(AppError::BadRequest) if empty
pub fn validate_not_empty(field_name: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} cannot be empty", field_name)));
    }
    Ok(())
}

/// Validate that password and confirm_password match
pub fn validate_passwords_match(password: &str, confirm_password: &str) -> Result<(), AppError> {
    if password != confirm_password {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }
    Ok(())
}

/// Validate an ISBN: digits and hyphens only, 10 or 13 digits in total
pub fn validate_isbn(isbn: &str) -> Result<(), AppError> {
    let isbn = isbn.trim();
    if !isbn.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return Err(AppError::BadRequest(
            "ISBN can only contain digits and hyphens".to_string(),
        ));
    }

    let digits = isbn.chars().filter(|c| c.is_ascii_digit()).count();
    if digits != 10 && digits != 13 {
        return Err(AppError::BadRequest("ISBN must have 10 or 13 digits".to_string()));
    }
    Ok(())
}

/// Parse a price such as "19.90" or "14" into cents
///
/// Rejects negative values and more than two decimals
pub fn parse_price(price: &str) -> Result<i64, AppError> {
    let invalid = || AppError::BadRequest(format!("Invalid price '{}'", price));

    let price = price.trim().replace(',', ".");
    let (whole, fraction) = match price.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (price.as_str(), ""),
    };

    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(fraction))
        .ok_or_else(invalid)
}

/// Validate a publication year (no books from the future beyond next year)
pub fn validate_publication_year(year: i32) -> Result<(), AppError> {
    let max_year = chrono::Utc::now().year() + 1;
    if year < MIN_PUBLICATION_YEAR || year > max_year {
        return Err(AppError::BadRequest(format!(
            "Publication year must be between {} and {}",
            MIN_PUBLICATION_YEAR, max_year
        )));
    }
    Ok(())
}

/// Validate an optional cover URL; only absolute http(s) URLs are allowed
pub fn validate_cover_url(cover_url: &str) -> Result<(), AppError> {
    let url = cover_url
        .trim()
        .parse::<Url>()
        .map_err(|_| AppError::BadRequest("Invalid cover URL".to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(AppError::BadRequest(
            "Only http:// and https:// URLs are allowed".to_string(),
        )),
    }
}
