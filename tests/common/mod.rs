// Common test utilities shared across test files

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, Response},
    Router,
};
use sqlx::SqlitePool;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower::ServiceExt;

/// Set up an empty in-memory SQLite database for testing
#[allow(dead_code)]
pub async fn setup_test_db() -> SqlitePool {
    edition::db::init_db(edition::db::MEMORY_DB)
        .await
        .expect("Failed to create in-memory database")
}

/// Seeded in-memory database plus a router over it
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, SqlitePool) {
    let pool = setup_test_db().await;
    edition::db::seed::seed_database(&pool)
        .await
        .expect("Failed to seed database");
    let app = edition::create_router(pool.clone()).expect("Failed to build router");
    (app, pool)
}

/// Attach a peer address, as axum::serve does with connect info
#[allow(dead_code)]
pub fn with_peer(mut req: Request<Body>, ip: [u8; 4]) -> Request<Body> {
    req.extensions_mut().insert(ConnectInfo(SocketAddr::new(
        IpAddr::V4(Ipv4Addr::new(ip[0], ip[1], ip[2], ip[3])),
        8000,
    )));
    req
}

#[allow(dead_code)]
pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// Log in through the form and return the "session_id=..." cookie pair
#[allow(dead_code)]
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let body = format!("username={}&password={}", username, password);
    let response = app
        .clone()
        .oneshot(with_peer(form_post("/login", &body), [10, 0, 0, 1]))
        .await
        .unwrap();

    assert!(
        response.status().is_redirection(),
        "login as {} failed with {}",
        username,
        response.status()
    );
    session_cookie(&response).expect("login did not set a session cookie")
}

#[allow(dead_code)]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("session_id="))
        .and_then(|value| value.split(';').next())
        .map(|pair| pair.to_string())
}

#[allow(dead_code)]
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
