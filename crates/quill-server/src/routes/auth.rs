//! Registration, login, and logout handlers.
//!
//! Validation and duplicate-username failures never propagate: they become a
//! flash message and a re-rendered form. Only unexpected storage faults turn
//! into a 500.

use axum::extract::{Extension, Form};
use axum::response::{Html, IntoResponse, Redirect, Response};
use quill_auth::{LoginError, RegisterError, User};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::render;
use crate::session::Session;
use crate::AppState;

/// Fields of the register and login forms.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /auth/register`
pub async fn register_form(
    Extension(state): Extension<Arc<AppState>>,
    mut session: Session,
) -> Response {
    let flashes = session.take_flashes();
    session.attach(&state.session_key, Html(render::register_page(&flashes)))
}

/// `POST /auth/register`
///
/// On success, redirects to the login page. On a validation or duplicate
/// error, flashes the message and re-renders the form.
pub async fn register_submit(
    Extension(state): Extension<Arc<AppState>>,
    mut session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let pool = state.pool.clone();
    let outcome = tokio::task::spawn_blocking(
        move || -> Result<Result<User, RegisterError>, AppError> {
            let conn = pool.get()?;
            Ok(quill_auth::register_user(
                &conn,
                &form.username,
                &form.password,
            ))
        },
    )
    .await??;

    match outcome {
        Ok(_) => Ok(Redirect::to("/auth/login").into_response()),
        Err(
            err @ (RegisterError::UsernameRequired
            | RegisterError::PasswordRequired
            | RegisterError::DuplicateUsername(_)),
        ) => {
            session.flash(err.to_string());
            let flashes = session.take_flashes();
            Ok(session.attach(&state.session_key, Html(render::register_page(&flashes))))
        }
        Err(RegisterError::Hash(e)) => {
            Err(AppError::Internal(format!("password hashing failed: {e}")))
        }
        Err(RegisterError::Database(e)) => Err(e.into()),
    }
}

/// `GET /auth/login`
pub async fn login_form(
    Extension(state): Extension<Arc<AppState>>,
    mut session: Session,
) -> Response {
    let flashes = session.take_flashes();
    session.attach(&state.session_key, Html(render::login_page(&flashes)))
}

/// `POST /auth/login`
///
/// On success, replaces the session with a fresh one holding the user id
/// and redirects home. The incorrect-username and incorrect-password flash
/// messages stay distinct (original behavior, preserved).
pub async fn login_submit(
    Extension(state): Extension<Arc<AppState>>,
    mut session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let pool = state.pool.clone();
    let outcome =
        tokio::task::spawn_blocking(move || -> Result<Result<User, LoginError>, AppError> {
            let conn = pool.get()?;
            Ok(quill_auth::authenticate(
                &conn,
                &form.username,
                &form.password,
            ))
        })
        .await??;

    match outcome {
        Ok(user) => {
            tracing::info!(user_id = user.id, "user logged in");
            session.log_in(user.id);
            Ok(session.attach(&state.session_key, Redirect::to("/")))
        }
        Err(err @ (LoginError::IncorrectUsername | LoginError::IncorrectPassword)) => {
            session.flash(err.to_string());
            let flashes = session.take_flashes();
            Ok(session.attach(&state.session_key, Html(render::login_page(&flashes))))
        }
        Err(LoginError::Hash(e)) => Err(AppError::Internal(format!(
            "password verification failed: {e}"
        ))),
        Err(LoginError::Database(e)) => Err(e.into()),
    }
}

/// `GET /auth/logout`
///
/// Unconditionally clears the session and redirects home.
pub async fn logout(Extension(state): Extension<Arc<AppState>>, mut session: Session) -> Response {
    session.clear();
    session.attach(&state.session_key, Redirect::to("/"))
}
