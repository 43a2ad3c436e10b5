//! Scripted dispatch for exercising the interceptor without a network
//!
//! Records every request it is handed and answers from a queue of canned
//! responses, falling back to `202 Accepted` once the queue runs dry.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use mcpconform_transport::{HttpDispatch, HttpRequest, HttpResponse, SharedDispatch};
use parking_lot::Mutex;
use reqwest::header::{HeaderName, HeaderValue, SET_COOKIE};
use reqwest::StatusCode;

#[derive(Default)]
pub struct ScriptedDispatch {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<HttpResponse>>,
}

impl ScriptedDispatch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for the next unanswered request.
    pub fn respond(&self, response: HttpResponse) -> &Self {
        self.responses.lock().push_back(response);
        self
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.requests.lock()[index].clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn shared(self: &Arc<Self>) -> SharedDispatch {
        self.clone()
    }
}

#[async_trait]
impl HttpDispatch for ScriptedDispatch {
    async fn dispatch(&self, request: HttpRequest) -> mcpconform_transport::Result<HttpResponse> {
        self.requests.lock().push(request);
        Ok(self
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| HttpResponse::new(StatusCode::ACCEPTED)))
    }
}

/// `200 OK` carrying a `set-cookie` header
pub fn with_cookies(value: &'static str) -> HttpResponse {
    HttpResponse::new(StatusCode::OK).with_header(SET_COOKIE, HeaderValue::from_static(value))
}

/// `200 OK` carrying an `mcp-session-id` header
pub fn with_session_id(value: &'static str) -> HttpResponse {
    HttpResponse::new(StatusCode::OK).with_header(
        HeaderName::from_static(mcpconform_transport::SESSION_ID_HEADER),
        HeaderValue::from_static(value),
    )
}
