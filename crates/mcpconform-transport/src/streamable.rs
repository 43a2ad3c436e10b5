//! Session-less Streamable HTTP client transport
//!
//! Every outgoing JSON-RPC message is POSTed to the endpoint through a
//! [`HttpDispatch`]. Whatever the server answers with (a JSON body, a batch,
//! or an SSE stream that ends with the response) is decoded and queued for
//! [`Transport::receive`].
//!
//! Response bodies are read to the end before decoding, so a server must
//! close a POST's SSE stream once it has sent the response. A stream left
//! open stalls the exchange until `request_timeout` fires.
//!
//! The transport never tracks `mcp-session-id` or cookies itself: that is the
//! job of a dispatch decorator such as [`crate::interceptor::SessionAffinity`].

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use rmcp::service::{RxJsonRpcMessage, TxJsonRpcMessage};
use rmcp::transport::Transport;
use rmcp::RoleClient;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

use crate::dispatch::{HttpRequest, HttpResponse, SharedDispatch};
use crate::error::{Result, TransportError};
use crate::sse;

/// `accept` value required by Streamable HTTP servers on POST
pub const STREAMABLE_ACCEPT: &str = "application/json, text/event-stream";

/// Pass-through configuration for the base transport
#[derive(Clone, Default)]
pub struct TransportOptions {
    /// Extra headers sent with every request
    pub headers: HashMap<String, String>,
    /// Upper bound on a single HTTP exchange
    pub request_timeout: Option<Duration>,
    /// Dispatch to delegate to instead of the process default
    pub dispatch: Option<SharedDispatch>,
}

impl TransportOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_dispatch(mut self, dispatch: SharedDispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!(header = %name, "Skipping invalid custom header"),
            }
        }
        map
    }
}

impl fmt::Debug for TransportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportOptions")
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("request_timeout", &self.request_timeout)
            .field("dispatch", &self.dispatch.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// The part of the transport a `send` future carries with it
#[derive(Clone)]
struct Exchange {
    endpoint: Url,
    dispatch: SharedDispatch,
    headers: HeaderMap,
    timeout: Option<Duration>,
    inbound: mpsc::UnboundedSender<ServerJsonRpcMessage>,
    closed: Arc<AtomicBool>,
}

impl Exchange {
    async fn post(self, message: ClientJsonRpcMessage) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }

        let body = serde_json::to_vec(&message)?;
        let mut request = HttpRequest::post_json(self.endpoint.clone(), body)
            .with_header(ACCEPT, HeaderValue::from_static(STREAMABLE_ACCEPT));
        for (name, value) in &self.headers {
            request.headers.insert(name.clone(), value.clone());
        }

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.dispatch.dispatch(request))
                .await
                .map_err(|_| TransportError::Timeout(limit))??,
            None => self.dispatch.dispatch(request).await?,
        };

        let messages = decode_response(&response)?;
        debug!(
            status = %response.status,
            messages = messages.len(),
            "Streamable HTTP exchange complete"
        );
        for message in messages {
            if self.inbound.send(message).is_err() {
                debug!("Receiver gone, dropping server message");
                break;
            }
        }
        Ok(())
    }
}

/// Decode the server messages carried by one POST response.
pub fn decode_response(response: &HttpResponse) -> Result<Vec<ServerJsonRpcMessage>> {
    decode_values(response)?
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(TransportError::from))
        .collect()
}

/// Like [`decode_response`], but leaves each message as untyped JSON.
pub fn decode_values(response: &HttpResponse) -> Result<Vec<Value>> {
    if matches!(response.status, StatusCode::ACCEPTED | StatusCode::NO_CONTENT) {
        return Ok(Vec::new());
    }
    if !response.status.is_success() {
        return Err(TransportError::Status {
            status: response.status,
            body: response.text(),
        });
    }
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    match response.media_type().as_deref() {
        Some("text/event-stream") => sse::decode_events(&response.text())
            .iter()
            .map(|data| serde_json::from_str(data).map_err(TransportError::from))
            .collect(),
        Some("application/json") | None => match serde_json::from_slice::<Value>(&response.body)? {
            Value::Array(batch) => Ok(batch),
            single => Ok(vec![single]),
        },
        Some(other) => Err(TransportError::UnsupportedContentType(other.to_string())),
    }
}

/// Base Streamable HTTP transport over a pluggable dispatch
pub struct StreamableHttpTransport {
    exchange: Exchange,
    inbound_rx: mpsc::UnboundedReceiver<ServerJsonRpcMessage>,
}

impl StreamableHttpTransport {
    pub fn open(endpoint: Url, dispatch: SharedDispatch, options: &TransportOptions) -> Self {
        let (inbound, inbound_rx) = mpsc::unbounded_channel();
        debug!(endpoint = %endpoint, ?options, "Opening Streamable HTTP transport");
        Self {
            exchange: Exchange {
                endpoint,
                dispatch,
                headers: options.header_map(),
                timeout: options.request_timeout,
                inbound,
                closed: Arc::new(AtomicBool::new(false)),
            },
            inbound_rx,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.exchange.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.exchange.closed.load(Ordering::Acquire)
    }

    /// Stop accepting sends; queued messages can still be received.
    pub fn shutdown(&mut self) {
        self.exchange.closed.store(true, Ordering::Release);
        self.inbound_rx.close();
    }
}

impl Transport<RoleClient> for StreamableHttpTransport {
    type Error = TransportError;

    fn send(
        &mut self,
        item: TxJsonRpcMessage<RoleClient>,
    ) -> impl Future<Output = std::result::Result<(), Self::Error>> + Send + 'static {
        let exchange = self.exchange.clone();
        exchange.post(item)
    }

    fn receive(&mut self) -> impl Future<Output = Option<RxJsonRpcMessage<RoleClient>>> + Send {
        self.inbound_rx.recv()
    }

    fn close(&mut self) -> impl Future<Output = std::result::Result<(), Self::Error>> + Send {
        self.shutdown();
        std::future::ready(Ok(()))
    }
}
