// Rate limiting of credential posts

mod common;

use axum::http::StatusCode;
use edition::rate_limiting::BURST_SIZE;
use tower::ServiceExt;

fn bad_login(ip: [u8; 4]) -> axum::http::Request<axum::body::Body> {
    common::with_peer(
        common::form_post("/login", "username=admin&password=wrong"),
        ip,
    )
}

#[tokio::test]
async fn test_login_rate_limit_blocks_after_burst() {
    let (app, _pool) = common::create_test_app().await;

    for attempt in 1..=BURST_SIZE {
        let response = app.clone().oneshot(bad_login([192, 168, 1, 1])).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "attempt {} should not be rate limited",
            attempt
        );
    }

    let response = app.clone().oneshot(bad_login([192, 168, 1, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = common::body_string(response).await;
    assert!(body.contains("Too many attempts"));
}

#[tokio::test]
async fn test_rate_limit_is_per_ip() {
    let (app, _pool) = common::create_test_app().await;

    for _ in 0..=BURST_SIZE {
        let _ = app.clone().oneshot(bad_login([192, 168, 1, 2])).await.unwrap();
    }

    let response = app.oneshot(bad_login([192, 168, 1, 3])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_page_is_not_rate_limited() {
    let (app, _pool) = common::create_test_app().await;

    for _ in 0..(BURST_SIZE * 2) {
        let response = app.clone().oneshot(common::get("/login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
