//! Request middleware: per-request identity loading and the login guard.

use axum::{
    body::Body,
    http::{header::COOKIE, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use quill_auth::User;
use std::sync::Arc;

use crate::error::AppError;
use crate::session::Session;
use crate::AppState;

/// The identity resolved for this request, stored in request extensions.
///
/// `None` means the request carries no valid logged-in session. This is
/// request-scoped state, not a process-wide global: it exists only for the
/// lifetime of the request that produced it.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

/// Middleware that runs before every handler: reads the session cookie,
/// resolves the stored user id against the user table, and inserts
/// [`CurrentUser`] into the request extensions.
///
/// A session pointing at a deleted or unknown user id resolves to no
/// identity rather than an error.
pub async fn load_identity(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("app state extension missing".to_string()))?;

    let header = req
        .headers()
        .get(COOKIE)
        .and_then(|value| value.to_str().ok());
    let session = Session::from_cookie_header(header, &state.session_key);

    let user = match session.user_id() {
        None => None,
        Some(user_id) => {
            tokio::task::spawn_blocking(move || -> Result<Option<User>, AppError> {
                let conn = state.pool.get()?;
                Ok(quill_auth::get_user_by_id(&conn, user_id)?)
            })
            .await??
        }
    };

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Middleware layered over the login-guarded routes.
///
/// When no identity was loaded, the request is redirected to the login page
/// instead of reaching the handler; otherwise it is passed through
/// unchanged.
pub async fn require_login(req: Request<Body>, next: Next) -> Response {
    match req.extensions().get::<CurrentUser>() {
        Some(CurrentUser(Some(_))) => next.run(req).await,
        _ => Redirect::to("/auth/login").into_response(),
    }
}
