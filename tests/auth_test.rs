// Login, registration and admin access

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use edition::db::{self, Role};
use tower::ServiceExt;

fn admin_request(method: &str, uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_login_page_loads() {
    let (app, _pool) = common::create_test_app().await;

    let response = app.oneshot(common::get("/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_string(response).await;
    assert!(body.contains("Connexion"));
}

#[tokio::test]
async fn test_wrong_password_shows_error() {
    let (app, _pool) = common::create_test_app().await;

    let response = app
        .oneshot(common::with_peer(
            common::form_post("/login", "username=admin&password=nope"),
            [10, 0, 0, 2],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::session_cookie(&response).is_none());
    let body = common::body_string(response).await;
    assert!(body.contains("Invalid username or password"));
}

#[tokio::test]
async fn test_login_returns_to_requested_page() {
    let (app, _pool) = common::create_test_app().await;

    let response = app
        .oneshot(common::with_peer(
            common::form_post("/login", "username=admin&password=admin123&return=%2Fadmin"),
            [10, 0, 0, 3],
        ))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/admin");
}

#[tokio::test]
async fn test_admin_requires_login() {
    let (app, _pool) = common::create_test_app().await;

    let response = app.oneshot(common::get("/admin")).await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login?return=%2Fadmin"
    );
}

#[tokio::test]
async fn test_demo_user_is_forbidden_from_admin() {
    let (app, _pool) = common::create_test_app().await;
    let cookie = common::login(&app, "user", "user123").await;

    let response = app
        .oneshot(common::get_with_cookie("/admin", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_panel_lists_seeded_data() {
    let (app, _pool) = common::create_test_app().await;
    let cookie = common::login(&app, "admin", "admin123").await;

    let response = app
        .oneshot(common::get_with_cookie("/admin", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_string(response).await;
    assert!(body.contains("Utilisateurs (2)"));
    assert!(body.contains("Catalogue (8)"));
    assert!(body.contains("978-1234567897"));
}

#[tokio::test]
async fn test_admin_adds_and_deletes_book() {
    let (app, pool) = common::create_test_app().await;
    let cookie = common::login(&app, "admin", "admin123").await;

    let form = "title=Candide&author=Voltaire&isbn=978-2070360024&price=7.90\
                &description=Conte+philosophique.&category=NOVEL&publication_year=1759&cover_url=";
    let response = app
        .clone()
        .oneshot(admin_request("POST", "/admin/books", &cookie, form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_string(response).await.contains("Candide"));

    let book = db::get_book_by_isbn(&pool, "978-2070360024")
        .await
        .unwrap()
        .expect("book was not inserted");
    assert_eq!(book.price_cents, 790);

    // Same ISBN again is rejected
    let response = app
        .clone()
        .oneshot(admin_request("POST", "/admin/books", &cookie, form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/admin/books/{}", book.id);
    let response = app
        .clone()
        .oneshot(admin_request("DELETE", &uri, &cookie, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(db::count_books(&pool).await.unwrap(), 8);

    let response = app
        .oneshot(admin_request("DELETE", &uri, &cookie, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_book_form_validation_error() {
    let (app, pool) = common::create_test_app().await;
    let cookie = common::login(&app, "admin", "admin123").await;

    let form = "title=Candide&author=Voltaire&isbn=123&price=7.90\
                &description=Conte&category=NOVEL&publication_year=1759";
    let response = app
        .oneshot(admin_request("POST", "/admin/books", &cookie, form))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_string(response).await.contains("ISBN must have 10 or 13 digits"));
    assert_eq!(db::count_books(&pool).await.unwrap(), 8);
}

#[tokio::test]
async fn test_admin_book_form_non_numeric_year() {
    let (app, pool) = common::create_test_app().await;
    let cookie = common::login(&app, "admin", "admin123").await;

    let form = "title=Candide&author=Voltaire&isbn=978-2070360024&price=7.90\
                &description=Conte&category=NOVEL&publication_year=abc";
    let response = app
        .oneshot(admin_request("POST", "/admin/books", &cookie, form))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_string(response).await.contains("Publication year must be a number"));
    assert_eq!(db::count_books(&pool).await.unwrap(), 8);
}

#[tokio::test]
async fn test_register_creates_user_account() {
    let (app, pool) = common::create_test_app().await;

    let response = app
        .oneshot(common::with_peer(
            common::form_post(
                "/register",
                "username=lectrice&password=longpassword&confirm_password=longpassword",
            ),
            [10, 0, 0, 4],
        ))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert!(common::session_cookie(&response).is_some());

    let (_, _, role) = db::get_user_by_username(&pool, "lectrice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(role, Role::User);
}

#[tokio::test]
async fn test_register_rejects_seeded_username() {
    let (app, _pool) = common::create_test_app().await;

    let response = app
        .oneshot(common::with_peer(
            common::form_post(
                "/register",
                "username=ADMIN&password=longpassword&confirm_password=longpassword",
            ),
            [10, 0, 0, 5],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let (app, _pool) = common::create_test_app().await;
    let cookie = common::login(&app, "admin", "admin123").await;

    let response = app
        .clone()
        .oneshot(admin_request("POST", "/logout", &cookie, ""))
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    let response = app
        .oneshot(common::get_with_cookie("/admin", &cookie))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
}
