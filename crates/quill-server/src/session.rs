//! Client-side signed cookie sessions.
//!
//! The session lives entirely in the client's cookie store: a JSON payload
//! (the logged-in user id plus pending flash messages) is base64-encoded and
//! signed with HMAC-SHA256 under the configured secret key. A missing,
//! malformed, or tampered cookie degrades to an empty session rather than an
//! error. Handlers that mutate the session re-attach it as a `Set-Cookie`
//! header; logout clears it.

use axum::extract::FromRequestParts;
use axum::http::header::{HeaderValue, COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;

use crate::error::AppError;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "quill_session";

/// The HMAC signing key derived from the configured secret.
#[derive(Clone)]
pub struct SessionKey(Arc<[u8]>);

impl SessionKey {
    pub fn new(secret: &str) -> Self {
        Self(Arc::from(secret.as_bytes()))
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.0).expect("HMAC accepts any key length");
        mac.update(data);
        mac
    }

    /// Signs an encoded payload, producing the cookie value
    /// `<payload-b64>.<mac-b64>`.
    fn sign(&self, payload_b64: &str) -> String {
        let tag = self.mac(payload_b64.as_bytes()).finalize().into_bytes();
        format!("{payload_b64}.{}", URL_SAFE_NO_PAD.encode(tag))
    }

    /// Verifies a cookie value and returns the encoded payload on success.
    ///
    /// Verification is constant-time via the MAC's own comparison.
    fn verify<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (payload_b64, tag_b64) = value.split_once('.')?;
        let tag = URL_SAFE_NO_PAD.decode(tag_b64).ok()?;
        self.mac(payload_b64.as_bytes()).verify_slice(&tag).ok()?;
        Some(payload_b64)
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("SessionKey(..)")
    }
}

/// The serialized session payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
struct SessionData {
    /// The authenticated user's row id, if logged in.
    #[serde(default)]
    user_id: Option<i64>,
    /// Flash messages queued for the next rendered page.
    #[serde(default)]
    flashes: Vec<String>,
}

/// A decoded request session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    data: SessionData,
}

impl Session {
    /// Decodes the session from a request's `Cookie` header.
    ///
    /// Absent cookies, unparseable values, and bad signatures all yield the
    /// empty session.
    pub fn from_cookie_header(header: Option<&str>, key: &SessionKey) -> Self {
        let Some(header) = header else {
            return Self::default();
        };

        let value = header.split(';').map(str::trim).find_map(|pair| {
            pair.strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        });
        let Some(value) = value else {
            return Self::default();
        };

        let Some(payload_b64) = key.verify(value) else {
            tracing::debug!("session cookie failed signature check, discarding");
            return Self::default();
        };

        let data = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default();

        Self { data }
    }

    /// The stored user id, if any.
    pub fn user_id(&self) -> Option<i64> {
        self.data.user_id
    }

    /// Replaces the session with a fresh one holding only this user id.
    pub fn log_in(&mut self, user_id: i64) {
        self.data = SessionData {
            user_id: Some(user_id),
            flashes: Vec::new(),
        };
    }

    /// Clears the whole session: identity and pending flashes.
    pub fn clear(&mut self) {
        self.data = SessionData::default();
    }

    /// Queues a message for the next rendered page.
    pub fn flash(&mut self, message: impl Into<String>) {
        self.data.flashes.push(message.into());
    }

    /// Drains the queued flash messages. The caller must re-attach the
    /// session to the response so the client stops carrying them.
    pub fn take_flashes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.data.flashes)
    }

    /// Serializes and signs the session into a `Set-Cookie` header value.
    pub fn to_set_cookie(&self, key: &SessionKey) -> HeaderValue {
        let payload = serde_json::to_vec(&self.data)
            .expect("session payload serialization cannot fail");
        let token = key.sign(&URL_SAFE_NO_PAD.encode(payload));
        let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
        HeaderValue::from_str(&cookie).expect("base64 cookie value is a valid header")
    }

    /// Attaches this session to a response as a `Set-Cookie` header.
    pub fn attach(self, key: &SessionKey, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        response
            .headers_mut()
            .insert(SET_COOKIE, self.to_set_cookie(key));
        response
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = parts
            .extensions
            .get::<Arc<AppState>>()
            .ok_or_else(|| AppError::Internal("app state extension missing".to_string()))?;

        let header = parts
            .headers
            .get(COOKIE)
            .and_then(|value| value.to_str().ok());

        Ok(Session::from_cookie_header(header, &state.session_key))
    }
}
