//! Shared helpers for full-router integration tests.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use quill_server::{app, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret";

/// Builds the full application against a fresh on-disk database.
///
/// The temp dir must be kept alive for the duration of the test; dropping
/// it deletes the database file.
pub fn test_app() -> (Router, TempDir, String) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let db_path = dir
        .path()
        .join("quill.sqlite")
        .to_str()
        .expect("path should be valid utf-8")
        .to_string();

    let pool = quill_db::create_pool(&db_path, quill_db::PoolSettings::default())
        .expect("should create pool");
    {
        let conn = pool.get().expect("should get connection");
        quill_db::init_schema(&conn).expect("should init schema");
    }

    (app(AppState::new(pool, TEST_SECRET)), dir, db_path)
}

/// Sends a GET request, optionally with a session cookie.
pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).expect("valid request"))
        .await
        .expect("request should not fail")
}

/// Sends a form POST, optionally with a session cookie.
pub async fn post_form(
    app: &Router,
    uri: &str,
    form_body: &str,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(
            builder
                .body(Body::from(form_body.to_string()))
                .expect("valid request"),
        )
        .await
        .expect("request should not fail")
}

/// Extracts the `name=value` part of the session `Set-Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?;
    let set_cookie = set_cookie.to_str().ok()?;
    Some(set_cookie.split(';').next()?.to_string())
}

/// Reads the response body as a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

/// Registers and logs in a user, returning the logged-in session cookie.
pub async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let response = post_form(
        app,
        "/auth/register",
        &format!("username={username}&password={password}"),
        None,
    )
    .await;
    assert_eq!(
        response.status(),
        StatusCode::SEE_OTHER,
        "registration should redirect"
    );

    let response = post_form(
        app,
        "/auth/login",
        &format!("username={username}&password={password}"),
        None,
    )
    .await;
    assert_eq!(
        response.status(),
        StatusCode::SEE_OTHER,
        "login should redirect"
    );
    session_cookie(&response).expect("login should set a session cookie")
}

/// Counts rows in the `user` table matching a username.
pub fn count_users(db_path: &str, username: &str) -> i64 {
    let conn = rusqlite::Connection::open(db_path).expect("should open db");
    conn.query_row(
        "SELECT COUNT(*) FROM user WHERE username = ?1",
        [username],
        |row| row.get(0),
    )
    .expect("should count users")
}
