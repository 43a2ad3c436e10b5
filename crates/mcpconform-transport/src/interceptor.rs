//! Session-affinity interceptor
//!
//! Wraps a dispatch function. Outbound requests get the accumulated cookies
//! and the current session token; inbound responses feed both. Responses are
//! returned untouched.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE, SET_COOKIE};
use tracing::{debug, warn};

use crate::cookie_jar::CookieJar;
use crate::dispatch::{HttpDispatch, HttpRequest, HttpResponse, SharedDispatch};
use crate::error::Result;
use crate::session_token::SessionToken;

/// Header carrying the session token in both directions
pub const SESSION_ID_HEADER: &str = "mcp-session-id";

/// Cookies and token accumulated for one connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffinityState {
    pub cookies: CookieJar,
    pub session: SessionToken,
}

/// Dispatch decorator that replays cookies and the session token
pub struct SessionAffinity {
    previous: SharedDispatch,
    state: Mutex<AffinityState>,
}

impl SessionAffinity {
    pub fn new(previous: SharedDispatch) -> Self {
        Self {
            previous,
            state: Mutex::new(AffinityState::default()),
        }
    }

    /// The dispatch this interceptor delegates to
    pub fn previous(&self) -> &SharedDispatch {
        &self.previous
    }

    pub fn snapshot(&self) -> AffinityState {
        self.state.lock().clone()
    }

    pub fn session_token(&self) -> Option<String> {
        self.state.lock().session.get().map(str::to_string)
    }

    /// Forget all cookies and the token.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.cookies.clear();
        state.session.clear();
    }

    fn decorate(&self, request: HttpRequest) -> HttpRequest {
        let HttpRequest {
            method,
            url,
            headers: caller_headers,
            body,
        } = request;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for name in caller_headers.keys() {
            headers.remove(name);
        }
        headers.extend(caller_headers);

        let state = self.state.lock();
        if let Some(cookies) = state.cookies.replay_value() {
            match isomorphic_encode(&cookies) {
                Some(value) => {
                    headers.insert(COOKIE, value);
                }
                None => warn!("Stored cookies are not a valid header value, not replaying"),
            }
        }
        if let Some(token) = state.session.get() {
            match isomorphic_encode(token) {
                Some(value) => {
                    headers.insert(HeaderName::from_static(SESSION_ID_HEADER), value);
                }
                None => warn!("Session token is not a valid header value, not replaying"),
            }
        }

        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    fn observe(&self, response: &HttpResponse) {
        // Repeated set-cookie headers read back as one comma-joined value.
        let set_cookie = response
            .headers
            .get_all(SET_COOKIE)
            .iter()
            .map(isomorphic_decode)
            .collect::<Vec<_>>()
            .join(", ");
        let session_id = response.headers.get(SESSION_ID_HEADER).map(isomorphic_decode);

        let mut state = self.state.lock();
        let added = state.cookies.absorb(&set_cookie);
        if added > 0 {
            debug!(added, total = state.cookies.len(), "Stored cookies from response");
        }
        if let Some(session_id) = session_id {
            if state.session.observe(&session_id) {
                debug!(session_id = %session_id, "Session token updated");
            }
        }
    }
}

/// One char per header byte (fetch's "isomorphic decode"), so obs-text and
/// UTF-8 values are kept instead of dropped.
fn isomorphic_decode(value: &HeaderValue) -> String {
    value.as_bytes().iter().copied().map(char::from).collect()
}

/// Inverse of [`isomorphic_decode`]; the bytes on the wire match what the
/// server sent.
fn isomorphic_encode(value: &str) -> Option<HeaderValue> {
    let bytes = value
        .chars()
        .map(|c| u8::try_from(c).ok())
        .collect::<Option<Vec<u8>>>()?;
    HeaderValue::from_bytes(&bytes).ok()
}

#[async_trait]
impl HttpDispatch for SessionAffinity {
    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.decorate(request);
        let response = self.previous.dispatch(request).await?;
        self.observe(&response);
        Ok(response)
    }
}
