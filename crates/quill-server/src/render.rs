//! HTML page rendering.
//!
//! Pages are assembled as strings around one shared chrome: a nav bar that
//! shows either the logged-in username with a logout link or the
//! register/login links, followed by any flash messages, followed by the
//! page body. All user-supplied text goes through [`escape_html`].

use axum::http::StatusCode;
use quill_auth::User;
use quill_blog::Post;

/// Escapes text for safe interpolation into HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps a page body in the shared chrome.
fn base(title: &str, current_user: Option<&User>, flashes: &[String], body: &str) -> String {
    let nav = match current_user {
        Some(user) => format!(
            r#"<span>{}</span> <a href="/auth/logout">Log Out</a>"#,
            escape_html(&user.username)
        ),
        None => r#"<a href="/auth/register">Register</a> <a href="/auth/login">Log In</a>"#
            .to_string(),
    };

    let mut flash_html = String::new();
    for message in flashes {
        flash_html.push_str(&format!(
            "<div class=\"flash\">{}</div>\n",
            escape_html(message)
        ));
    }

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title} - Quill</title>
</head>
<body>
<nav>
  <h1><a href="/">Quill</a></h1>
  {nav}
</nav>
<section class="content">
{flash_html}{body}
</section>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// The registration form.
pub fn register_page(flashes: &[String]) -> String {
    let body = r#"<header><h1>Register</h1></header>
<form method="post" action="/auth/register">
  <label for="username">Username</label>
  <input name="username" id="username" required>
  <label for="password">Password</label>
  <input type="password" name="password" id="password" required>
  <input type="submit" value="Register">
</form>"#;
    base("Register", None, flashes, body)
}

/// The login form.
pub fn login_page(flashes: &[String]) -> String {
    let body = r#"<header><h1>Log In</h1></header>
<form method="post" action="/auth/login">
  <label for="username">Username</label>
  <input name="username" id="username" required>
  <label for="password">Password</label>
  <input type="password" name="password" id="password" required>
  <input type="submit" value="Log In">
</form>"#;
    base("Log In", None, flashes, body)
}

/// The index: every post, newest first.
pub fn index_page(current_user: Option<&User>, flashes: &[String], posts: &[Post]) -> String {
    let mut body = String::from("<header><h1>Posts</h1>");
    if current_user.is_some() {
        body.push_str(r#" <a class="action" href="/create">New</a>"#);
    }
    body.push_str("</header>\n");

    for (i, post) in posts.iter().enumerate() {
        if i > 0 {
            body.push_str("<hr>\n");
        }
        body.push_str(&format!(
            r#"<article class="post">
<header>
  <h1>{title}</h1>
  <div class="about">by {author} on {date}</div>
</header>
<p class="body">{post_body}</p>
"#,
            title = escape_html(&post.title),
            author = escape_html(&post.author_username),
            date = post.created.format("%Y-%m-%d"),
            post_body = escape_html(&post.body),
        ));
        let is_author = current_user.is_some_and(|u| u.id == post.author_id);
        if is_author {
            body.push_str(&format!(
                "<a class=\"action\" href=\"/{}/update\">Edit</a>\n",
                post.id
            ));
        }
        body.push_str("</article>\n");
    }

    base("Posts", current_user, flashes, &body)
}

/// The new-post form. `title`/`post_body` carry the submitted values back on
/// a validation re-render.
pub fn create_page(
    current_user: Option<&User>,
    flashes: &[String],
    title: &str,
    post_body: &str,
) -> String {
    let body = format!(
        r#"<header><h1>New Post</h1></header>
<form method="post" action="/create">
  <label for="title">Title</label>
  <input name="title" id="title" value="{title}" required>
  <label for="body">Body</label>
  <textarea name="body" id="body">{post_body}</textarea>
  <input type="submit" value="Save">
</form>"#,
        title = escape_html(title),
        post_body = escape_html(post_body),
    );
    base("New Post", current_user, flashes, &body)
}

/// The edit form for an existing post, including its delete button.
pub fn update_page(
    current_user: Option<&User>,
    flashes: &[String],
    post_id: i64,
    title: &str,
    post_body: &str,
) -> String {
    let body = format!(
        r#"<header><h1>Edit "{heading}"</h1></header>
<form method="post" action="/{post_id}/update">
  <label for="title">Title</label>
  <input name="title" id="title" value="{title}" required>
  <label for="body">Body</label>
  <textarea name="body" id="body">{post_body}</textarea>
  <input type="submit" value="Save">
</form>
<hr>
<form method="post" action="/{post_id}/delete">
  <input class="danger" type="submit" value="Delete" onclick="return confirm('Are you sure?');">
</form>"#,
        heading = escape_html(title),
        title = escape_html(title),
        post_body = escape_html(post_body),
    );
    base("Edit Post", current_user, flashes, &body)
}

/// A bare error page for 403/404/500 responses.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let heading = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    let body = format!(
        "<header><h1>{heading}</h1></header>\n<p>{}</p>",
        escape_html(message)
    );
    base(&heading, None, &[], &body)
}
