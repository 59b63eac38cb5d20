//! Post storage for the quill blog.
//!
//! CRUD queries against the `post` table, joined with the author's username
//! for display. Update and delete enforce author ownership: editing someone
//! else's post is [`BlogError::NotAuthor`], which the server maps to 403.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

/// A blog post, joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Row id in the `post` table.
    pub id: i64,
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
    /// Creation time, converted from the stored timestamp column on read.
    pub created: DateTime<Utc>,
    /// Row id of the author in the `user` table.
    pub author_id: i64,
    /// The author's username.
    pub author_username: String,
}

/// Errors produced by post operations.
#[derive(Debug, Error)]
pub enum BlogError {
    /// The title field was empty. Shown to the user verbatim.
    #[error("Title is required.")]
    TitleRequired,
    /// No post with the given id exists.
    #[error("Post id {0} doesn't exist.")]
    NotFound(i64),
    /// The current user is not the post's author.
    #[error("not the author of this post")]
    NotAuthor,
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Shared SELECT head: post columns joined with the author's username.
const POST_SELECT: &str =
    "SELECT p.id, p.title, p.body, p.created, p.author_id, u.username
     FROM post p JOIN user u ON p.author_id = u.id";

fn post_from_row(row: &Row<'_>) -> Result<Post, rusqlite::Error> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        created: row.get(3)?,
        author_id: row.get(4)?,
        author_username: row.get(5)?,
    })
}

/// Lists all posts, newest first.
///
/// # Errors
///
/// Returns [`BlogError::Database`] on SQL failure.
pub fn list_posts(conn: &Connection) -> Result<Vec<Post>, BlogError> {
    let mut stmt = conn.prepare(&format!(
        "{POST_SELECT} ORDER BY p.created DESC, p.id DESC"
    ))?;
    let posts = stmt
        .query_map([], |row| post_from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

/// Fetches a single post by id.
///
/// # Errors
///
/// Returns [`BlogError::NotFound`] if the post doesn't exist.
pub fn get_post(conn: &Connection, id: i64) -> Result<Post, BlogError> {
    conn.query_row(&format!("{POST_SELECT} WHERE p.id = ?1"), [id], |row| {
        post_from_row(row)
    })
    .optional()?
    .ok_or(BlogError::NotFound(id))
}

/// Fetches a post and verifies the given user is its author.
///
/// # Errors
///
/// Returns [`BlogError::NotFound`] for an unknown id and
/// [`BlogError::NotAuthor`] when `user_id` doesn't match the author.
pub fn get_post_for_author(conn: &Connection, id: i64, user_id: i64) -> Result<Post, BlogError> {
    let post = get_post(conn, id)?;
    if post.author_id != user_id {
        return Err(BlogError::NotAuthor);
    }
    Ok(post)
}

/// Creates a post. The `created` column takes the database's current
/// timestamp.
///
/// # Errors
///
/// Returns [`BlogError::TitleRequired`] for an empty title.
pub fn create_post(
    conn: &Connection,
    author_id: i64,
    title: &str,
    body: &str,
) -> Result<i64, BlogError> {
    if title.is_empty() {
        return Err(BlogError::TitleRequired);
    }

    conn.execute(
        "INSERT INTO post (title, body, author_id) VALUES (?1, ?2, ?3)",
        params![title, body, author_id],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(post_id = id, author_id, "created post");
    Ok(id)
}

/// Updates a post's title and body. Only the author may update.
///
/// # Errors
///
/// Returns [`BlogError::TitleRequired`], [`BlogError::NotFound`], or
/// [`BlogError::NotAuthor`].
pub fn update_post(
    conn: &Connection,
    id: i64,
    user_id: i64,
    title: &str,
    body: &str,
) -> Result<(), BlogError> {
    get_post_for_author(conn, id, user_id)?;

    if title.is_empty() {
        return Err(BlogError::TitleRequired);
    }

    conn.execute(
        "UPDATE post SET title = ?1, body = ?2 WHERE id = ?3",
        params![title, body, id],
    )?;
    Ok(())
}

/// Deletes a post. Only the author may delete.
///
/// # Errors
///
/// Returns [`BlogError::NotFound`] or [`BlogError::NotAuthor`].
pub fn delete_post(conn: &Connection, id: i64, user_id: i64) -> Result<(), BlogError> {
    get_post_for_author(conn, id, user_id)?;

    conn.execute("DELETE FROM post WHERE id = ?1", [id])?;
    tracing::debug!(post_id = id, "deleted post");
    Ok(())
}
