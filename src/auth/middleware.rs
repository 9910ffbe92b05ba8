// Session-based extractors for handlers

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::db::{self, User};
use crate::error::{AppError, DbResultExt};
use crate::AppState;

pub const SESSION_COOKIE: &str = "session_id";

// Resolve the session cookie to a user; None when absent, unknown or expired
async fn session_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let Some(user_id) = db::validate_session(&state.db_pool, cookie.value())
        .await
        .db_err()?
    else {
        return Ok(None);
    };

    db::get_user_by_id(&state.db_pool, user_id).await.db_err()
}

// Extractor for current authenticated user
// Usage: async fn handler(CurrentUser(user): CurrentUser) { ... }
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        session_user(parts, &app_state)
            .await?
            .map(CurrentUser)
            // Keep the original path so login can send the user back
            .ok_or_else(|| AppError::Unauthorized(parts.uri.path().to_string()))
    }
}

// Optional user extractor (None if not logged in)
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        // A broken session never blocks public pages
        let user = session_user(parts, &app_state).await.ok().flatten();
        Ok(OptionalUser(user))
    }
}

// Extractor for ADMIN accounts; Forbidden for any other role
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(AdminUser(user))
    }
}
