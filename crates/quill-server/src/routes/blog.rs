//! Post listing and CRUD handlers.
//!
//! The create/update/delete handlers sit behind the login guard, so a
//! missing identity here means the guard wasn't applied; that is an internal
//! error, not a user-facing one. Ownership violations map to 403 and
//! unknown post ids to 404.

use axum::extract::{Extension, Form, Path};
use axum::response::{Html, IntoResponse, Redirect, Response};
use quill_blog::{BlogError, Post};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::render;
use crate::session::Session;
use crate::AppState;

/// Fields of the create and update forms.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Maps post-ownership failures onto HTTP errors. Title validation is
/// recovered in the handlers and must not reach this function.
fn ownership_error(err: BlogError) -> AppError {
    match err {
        BlogError::NotFound(_) => AppError::NotFound(err.to_string()),
        BlogError::NotAuthor => {
            AppError::Forbidden("You can only modify your own posts.".to_string())
        }
        BlogError::TitleRequired => {
            AppError::Internal("title validation escaped the handler".to_string())
        }
        BlogError::Database(e) => e.into(),
    }
}

fn guarded_user(current: CurrentUser) -> Result<quill_auth::User, AppError> {
    current
        .0
        .ok_or_else(|| AppError::Internal("login guard not applied to this route".to_string()))
}

/// `GET /` — all posts, newest first.
pub async fn index(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    mut session: Session,
) -> Result<Response, AppError> {
    let pool = state.pool.clone();
    let posts = tokio::task::spawn_blocking(move || -> Result<Vec<Post>, AppError> {
        let conn = pool.get()?;
        quill_blog::list_posts(&conn).map_err(ownership_error)
    })
    .await??;

    let flashes = session.take_flashes();
    let page = render::index_page(current.0.as_ref(), &flashes, &posts);
    Ok(session.attach(&state.session_key, Html(page)))
}

/// `GET /create`
pub async fn create_form(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    mut session: Session,
) -> Result<Response, AppError> {
    let user = guarded_user(current)?;
    let flashes = session.take_flashes();
    let page = render::create_page(Some(&user), &flashes, "", "");
    Ok(session.attach(&state.session_key, Html(page)))
}

/// `POST /create`
pub async fn create_submit(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    mut session: Session,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let user = guarded_user(current)?;
    let author_id = user.id;
    let pool = state.pool.clone();
    let title = form.title.clone();
    let body = form.body.clone();

    let outcome =
        tokio::task::spawn_blocking(move || -> Result<Result<i64, BlogError>, AppError> {
            let conn = pool.get()?;
            Ok(quill_blog::create_post(&conn, author_id, &title, &body))
        })
        .await??;

    match outcome {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(err @ BlogError::TitleRequired) => {
            session.flash(err.to_string());
            let flashes = session.take_flashes();
            let page = render::create_page(Some(&user), &flashes, &form.title, &form.body);
            Ok(session.attach(&state.session_key, Html(page)))
        }
        Err(err) => Err(ownership_error(err)),
    }
}

/// `GET /{id}/update`
pub async fn update_form(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    mut session: Session,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let user = guarded_user(current)?;
    let user_id = user.id;
    let pool = state.pool.clone();

    let post = tokio::task::spawn_blocking(move || -> Result<Post, AppError> {
        let conn = pool.get()?;
        quill_blog::get_post_for_author(&conn, id, user_id).map_err(ownership_error)
    })
    .await??;

    let flashes = session.take_flashes();
    let page = render::update_page(Some(&user), &flashes, post.id, &post.title, &post.body);
    Ok(session.attach(&state.session_key, Html(page)))
}

/// `POST /{id}/update`
pub async fn update_submit(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    mut session: Session,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let user = guarded_user(current)?;
    let user_id = user.id;
    let pool = state.pool.clone();
    let title = form.title.clone();
    let body = form.body.clone();

    let outcome =
        tokio::task::spawn_blocking(move || -> Result<Result<(), BlogError>, AppError> {
            let conn = pool.get()?;
            Ok(quill_blog::update_post(&conn, id, user_id, &title, &body))
        })
        .await??;

    match outcome {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(err @ BlogError::TitleRequired) => {
            session.flash(err.to_string());
            let flashes = session.take_flashes();
            let page = render::update_page(Some(&user), &flashes, id, &form.title, &form.body);
            Ok(session.attach(&state.session_key, Html(page)))
        }
        Err(err) => Err(ownership_error(err)),
    }
}

/// `POST /{id}/delete`
pub async fn delete_submit(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let user = guarded_user(current)?;
    let user_id = user.id;
    let pool = state.pool.clone();

    tokio::task::spawn_blocking(move || -> Result<(), AppError> {
        let conn = pool.get()?;
        quill_blog::delete_post(&conn, id, user_id).map_err(ownership_error)
    })
    .await??;

    Ok(Redirect::to("/").into_response())
}
