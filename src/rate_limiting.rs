// Rate limiting for the login and registration forms

use axum::{
    body::Body,
    http::{Response, StatusCode},
};
use tower_governor::GovernorError;

/// Requests allowed in a burst from one IP
pub const BURST_SIZE: u32 = 5;

/// Seconds to replenish one request of the burst
pub const REPLENISH_SECONDS: u64 = 12;

fn plain_response(status: StatusCode, message: String) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

/// Turn governor rejections into plain-text responses
pub fn rate_limit_error_handler(error: GovernorError) -> Response<Body> {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            tracing::warn!(wait_time, "login rate limit exceeded");

            let mut response = plain_response(
                StatusCode::TOO_MANY_REQUESTS,
                format!(
                    "Too many attempts. Please wait {} seconds before trying again.",
                    wait_time
                ),
            );
            if let Some(header_map) = headers {
                response.headers_mut().extend(header_map);
            }
            response
        }
        GovernorError::UnableToExtractKey => plain_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unable to extract client IP address".to_string(),
        ),
        GovernorError::Other { code, msg, headers } => {
            let mut response = plain_response(
                code,
                msg.unwrap_or_else(|| "Rate limiting error".to_string()),
            );
            if let Some(header_map) = headers {
                response.headers_mut().extend(header_map);
            }
            response
        }
    }
}
