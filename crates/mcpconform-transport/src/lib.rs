//! # mcpconform transport
//!
//! Session affinity for MCP clients over Streamable HTTP.
//!
//! Servers behind a load balancer or with stateful tools pin a client to a
//! session through a cookie, an `mcp-session-id` header, or both. This crate
//! decorates the HTTP layer of a Streamable HTTP transport so both are
//! captured from responses and replayed on every later request.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  SessionAffinityTransport                    │
//! │   rmcp Transport<RoleClient>  ─►  StreamableHttpTransport    │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ HttpRequest
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  SessionAffinity (HttpDispatch)                              │
//! │    decorate: defaults, caller headers, cookie, session id    │
//! │    observe:  set-cookie ─► CookieJar, mcp-session-id ─► token│
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!          previous dispatch (ReqwestDispatch by default)
//! ```
//!
//! The interceptor is either scoped to one connection or installed as the
//! process-wide dispatch hook; see [`DispatchScope`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mcpconform_transport::{SessionAffinityTransport, TransportOptions};
//! use rmcp::ServiceExt;
//!
//! let transport = SessionAffinityTransport::open(
//!     "http://localhost:8000/zmcp/test/test_icf_session",
//!     TransportOptions::default(),
//! )?;
//! let client = ().serve(transport).await?;
//! let tools = client.list_tools(Default::default()).await?;
//! client.cancel().await?;
//! ```

pub mod client;
pub mod cookie_jar;
pub mod dispatch;
pub mod error;
pub mod hook;
pub mod interceptor;
pub mod session_token;
pub mod sse;
pub mod streamable;
pub mod transport;

pub use client::{ConformanceClient, ConformanceClientHandler, ConformanceSession, SessionMode};
pub use cookie_jar::CookieJar;
pub use dispatch::{HttpDispatch, HttpRequest, HttpResponse, ReqwestDispatch, SharedDispatch};
pub use error::{Result, TransportError};
pub use interceptor::{AffinityState, SessionAffinity, SESSION_ID_HEADER};
pub use session_token::SessionToken;
pub use streamable::{StreamableHttpTransport, TransportOptions};
pub use transport::{DispatchScope, SessionAffinityTransport};
