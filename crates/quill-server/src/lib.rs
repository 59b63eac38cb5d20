//! Quill server library logic.
//!
//! Wires configuration, the database pool, sessions, and the route groups
//! into one axum application.

pub mod config;
pub mod error;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod session;

use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use quill_db::DbPool;
use serde_json::{json, Value};
use session::SessionKey;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Key for signing session cookies.
    pub session_key: SessionKey,
}

impl AppState {
    pub fn new(pool: DbPool, secret_key: &str) -> Self {
        Self {
            pool,
            session_key: SessionKey::new(secret_key),
        }
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
///
/// The post create/update/delete routes sit behind the login guard; the
/// identity-loading middleware runs for every request before routing-level
/// layers, so the guard and all handlers see [`middleware::CurrentUser`].
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/create",
            get(routes::blog::create_form).post(routes::blog::create_submit),
        )
        .route(
            "/{id}/update",
            get(routes::blog::update_form).post(routes::blog::update_submit),
        )
        .route("/{id}/delete", post(routes::blog::delete_submit))
        .layer(axum::middleware::from_fn(middleware::require_login));

    Router::new()
        .route("/health", get(health))
        .route("/", get(routes::blog::index))
        .route(
            "/auth/register",
            get(routes::auth::register_form).post(routes::auth::register_submit),
        )
        .route(
            "/auth/login",
            get(routes::auth::login_form).post(routes::auth::login_submit),
        )
        .route("/auth/logout", get(routes::auth::logout))
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(middleware::load_identity))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let pool = quill_db::create_pool(
            ":memory:",
            quill_db::PoolSettings {
                busy_timeout_ms: 1_000,
                max_size: 1,
            },
        )
        .expect("should create pool");
        {
            let conn = pool.get().expect("should get connection");
            quill_db::init_schema(&conn).expect("should init schema");
        }
        AppState::new(pool, "test-secret")
    }

    #[tokio::test]
    async fn health_check_returns_ok() {
        let app = app(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn index_renders_without_a_session() {
        let app = app(test_state());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn guarded_route_redirects_anonymous_users_to_login() {
        let app = app(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/create")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/auth/login");
    }
}
