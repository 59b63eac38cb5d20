//! User table operations.

use crate::{hash_password, verify_password, LoginError, RegisterError, User};
use rusqlite::{params, Connection, OptionalExtension};

/// Registers a new user.
///
/// Validates that both fields are present, hashes the password, and inserts
/// the row. A duplicate username is detected through the UNIQUE constraint
/// on `user.username` rather than a pre-check, so concurrent registrations
/// cannot race past validation.
///
/// # Errors
///
/// Returns [`RegisterError::UsernameRequired`] / [`RegisterError::PasswordRequired`]
/// for empty fields, [`RegisterError::DuplicateUsername`] when the username is
/// taken, and [`RegisterError::Database`] for any other SQL failure.
pub fn register_user(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<User, RegisterError> {
    if username.is_empty() {
        return Err(RegisterError::UsernameRequired);
    }
    if password.is_empty() {
        return Err(RegisterError::PasswordRequired);
    }

    let password_hash = hash_password(password)?;

    match conn.execute(
        "INSERT INTO user (username, password) VALUES (?1, ?2)",
        params![username, password_hash],
    ) {
        Ok(_) => {
            let id = conn.last_insert_rowid();
            tracing::info!(username, "registered new user");
            Ok(User {
                id,
                username: username.to_string(),
                password_hash,
            })
        }
        Err(rusqlite::Error::SqliteFailure(err, msg)) => {
            if err.code == rusqlite::ErrorCode::ConstraintViolation {
                Err(RegisterError::DuplicateUsername(username.to_string()))
            } else {
                Err(RegisterError::Database(rusqlite::Error::SqliteFailure(
                    err, msg,
                )))
            }
        }
        Err(e) => Err(RegisterError::Database(e)),
    }
}

/// Authenticates a username/password pair.
///
/// # Errors
///
/// Returns [`LoginError::IncorrectUsername`] when no such user exists and
/// [`LoginError::IncorrectPassword`] when the hash check fails. The two
/// cases are deliberately distinct (original behavior, preserved).
pub fn authenticate(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<User, LoginError> {
    let user = get_user_by_username(conn, username)?.ok_or(LoginError::IncorrectUsername)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(LoginError::IncorrectPassword);
    }

    Ok(user)
}

/// Looks up a user by username.
///
/// # Errors
///
/// Returns the underlying [`rusqlite::Error`] on SQL failure.
pub fn get_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, username, password FROM user WHERE username = ?1",
        [username],
        |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
            })
        },
    )
    .optional()
}

/// Looks up a user by row id. Used once per request to resolve the session's
/// stored user id into the current identity.
///
/// # Errors
///
/// Returns the underlying [`rusqlite::Error`] on SQL failure.
pub fn get_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, username, password FROM user WHERE id = ?1",
        [id],
        |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
            })
        },
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        quill_db::init_schema(&conn).expect("schema init should succeed");
        conn
    }

    fn user_count(conn: &Connection, username: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM user WHERE username = ?1",
            [username],
            |row| row.get(0),
        )
        .expect("should count users")
    }

    #[test]
    fn register_stores_a_hash_not_the_plaintext() {
        let conn = test_conn();
        let user = register_user(&conn, "alice", "wonderland").expect("register should succeed");

        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "wonderland");

        let stored: String = conn
            .query_row("SELECT password FROM user WHERE id = ?1", [user.id], |r| {
                r.get(0)
            })
            .expect("should read stored password");
        assert_eq!(stored, user.password_hash);
    }

    #[test]
    fn empty_username_is_rejected_without_insert() {
        let conn = test_conn();
        let err = register_user(&conn, "", "pw").expect_err("should reject empty username");
        assert!(matches!(err, RegisterError::UsernameRequired));
        assert_eq!(err.to_string(), "Username is required.");
        assert_eq!(user_count(&conn, ""), 0);
    }

    #[test]
    fn empty_password_is_rejected_without_insert() {
        let conn = test_conn();
        let err = register_user(&conn, "alice", "").expect_err("should reject empty password");
        assert!(matches!(err, RegisterError::PasswordRequired));
        assert_eq!(err.to_string(), "Password is required.");
        assert_eq!(user_count(&conn, "alice"), 0);
    }

    #[test]
    fn duplicate_username_is_caught_and_leaves_one_row() {
        let conn = test_conn();
        register_user(&conn, "alice", "pw1").expect("first register should succeed");

        let err =
            register_user(&conn, "alice", "pw2").expect_err("second register should be rejected");
        assert!(matches!(err, RegisterError::DuplicateUsername(_)));
        assert_eq!(err.to_string(), "User alice is already registered.");
        assert_eq!(user_count(&conn, "alice"), 1);
    }

    #[test]
    fn authenticate_roundtrip() {
        let conn = test_conn();
        let registered = register_user(&conn, "alice", "wonderland").expect("register");

        let user = authenticate(&conn, "alice", "wonderland").expect("login should succeed");
        assert_eq!(user.id, registered.id);
    }

    #[test]
    fn unknown_username_and_wrong_password_are_distinct_errors() {
        let conn = test_conn();
        register_user(&conn, "alice", "wonderland").expect("register");

        let err = authenticate(&conn, "bob", "wonderland").expect_err("unknown user");
        assert!(matches!(err, LoginError::IncorrectUsername));
        assert_eq!(err.to_string(), "Incorrect username.");

        let err = authenticate(&conn, "alice", "nope").expect_err("wrong password");
        assert!(matches!(err, LoginError::IncorrectPassword));
        assert_eq!(err.to_string(), "Incorrect password.");
    }

    #[test]
    fn get_user_by_id_resolves_registered_users() {
        let conn = test_conn();
        let registered = register_user(&conn, "alice", "pw").expect("register");

        let found = get_user_by_id(&conn, registered.id)
            .expect("lookup should succeed")
            .expect("user should exist");
        assert_eq!(found.username, "alice");

        let missing = get_user_by_id(&conn, 9999).expect("lookup should succeed");
        assert!(missing.is_none());
    }
}
