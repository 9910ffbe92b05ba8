// Authentication handlers

use askama::Template;
use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::{
    auth::{self, middleware::SESSION_COOKIE},
    db::{self, NewUser, Role},
    error::{AppError, DbResultExt},
    validation, AppState,
};

// Template structs
#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: String,
    return_to: String,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    error: String,
}

// Form structs
#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
    #[serde(default, rename = "return")]
    return_to: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    username: String,
    password: String,
    confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginParams {
    #[serde(default, rename = "return")]
    return_to: String,
}

// Only same-site absolute paths are followed after login
fn safe_return_path(return_to: &str) -> &str {
    if return_to.starts_with('/') && !return_to.starts_with("//") {
        return_to
    } else {
        "/"
    }
}

fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(24))
        .build()
}

fn render_login(error: &str, return_to: &str) -> Result<Response, AppError> {
    let template = LoginTemplate {
        error: error.to_string(),
        return_to: return_to.to_string(),
    };
    Ok(Html(template.render()?).into_response())
}

fn render_register(error: &str) -> Result<Response, AppError> {
    let template = RegisterTemplate { error: error.to_string() };
    Ok(Html(template.render()?).into_response())
}

// GET /login - Show login page
pub async fn login_page(Query(params): Query<LoginParams>) -> Result<Response, AppError> {
    render_login("", safe_return_path(&params.return_to))
}

// POST /login - Process login
pub async fn login_submit(
    jar: CookieJar,
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let return_to = safe_return_path(&form.return_to);

    let Some((user_id, password_hash, _role)) =
        db::get_user_by_username(&state.db_pool, &form.username)
            .await
            .db_err()?
    else {
        return render_login("Invalid username or password", return_to);
    };

    let valid = auth::verify_password(&form.password, &password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;
    if !valid {
        return render_login("Invalid username or password", return_to);
    }

    let session_id = db::create_session(&state.db_pool, user_id)
        .await
        .map_err(|e| AppError::Internal(format!("Session creation error: {}", e)))?;

    info!(user_id, "user logged in");
    Ok((jar.add(session_cookie(session_id)), Redirect::to(return_to)).into_response())
}

// GET /register - Show registration page
pub async fn register_page() -> Result<Response, AppError> {
    render_register("")
}

// POST /register - Create a USER account and log it in
pub async fn register_submit(
    jar: CookieJar,
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Err(e) = validation::validate_passwords_match(&form.password, &form.confirm_password) {
        return render_register(&error_message(&e));
    }
    if let Err(e) = auth::validate_username(&form.username) {
        return render_register(&e.to_string());
    }
    if let Err(e) = auth::validate_password(&form.password) {
        return render_register(&e.to_string());
    }

    let password_hash = auth::hash_password(&form.password)
        .map_err(|e| AppError::Internal(format!("Password hashing error: {}", e)))?;

    // Self-registration never grants ADMIN
    let user = db::create_user(&state.db_pool, &NewUser {
        username: form.username.clone(),
        password_hash,
        role: Role::User,
    })
    .await
    .unique_err("Username already exists")?;

    let session_id = db::create_session(&state.db_pool, user.id)
        .await
        .map_err(|e| AppError::Internal(format!("Session creation error: {}", e)))?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((jar.add(session_cookie(session_id)), Redirect::to("/")).into_response())
}

// POST /logout - Logout user
pub async fn logout(jar: CookieJar, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = db::delete_session(&state.db_pool, cookie.value()).await {
            tracing::warn!(error = %e, "failed to delete session on logout");
        }
    }

    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    (jar, Redirect::to("/")).into_response()
}

// Message without the "Bad request: " prefix, for inline form errors
fn error_message(error: &AppError) -> String {
    match error {
        AppError::BadRequest(msg) => msg.clone(),
        other => other.to_string(),
    }
}
