//! MCP client sessions used by the conformance suite
//!
//! Wraps rmcp's `RunningService` the way a real client would hold it, over
//! one of three transports selected by [`SessionMode`].

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use mcpconform_core::ConformanceConfig;
use reqwest::header::{HeaderValue, ACCEPT};
use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, ClientInfo, GetPromptRequestParams,
        GetPromptResult, Implementation, ListPromptsResult, ListResourceTemplatesResult,
        ListResourcesResult, ListToolsResult, ReadResourceRequestParams, ReadResourceResult,
        ServerInfo,
    },
    service::RunningService,
    transport::StreamableHttpClientTransport,
    ClientHandler, RoleClient, ServiceExt,
};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::dispatch::{HttpDispatch, HttpRequest};
use crate::interceptor::{AffinityState, SessionAffinity};
use crate::streamable::{decode_values, TransportOptions, STREAMABLE_ACCEPT};
use crate::transport::{DispatchScope, SessionAffinityTransport};

/// Type alias for a connected conformance client
pub type ConformanceClient = RunningService<RoleClient, ConformanceClientHandler>;

/// How the client reaches the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// rmcp's own streamable HTTP client
    Plain,
    /// Session-affinity transport scoped to this connection
    #[default]
    Affinity,
    /// Session-affinity transport installed as the process-wide hook
    AffinityGlobal,
}

/// Client handler reporting the configured client name
#[derive(Clone)]
pub struct ConformanceClientHandler {
    info: ClientInfo,
}

impl ConformanceClientHandler {
    pub fn new(client_name: &str) -> Self {
        Self {
            info: ClientInfo {
                client_info: Implementation {
                    name: client_name.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }
}

impl ClientHandler for ConformanceClientHandler {
    fn get_info(&self) -> ClientInfo {
        self.info.clone()
    }
}

/// A connected MCP client session
pub struct ConformanceSession {
    endpoint: String,
    mode: SessionMode,
    timeout: Duration,
    affinity: Option<Arc<SessionAffinity>>,
    raw_ids: AtomicU64,
    client: ConformanceClient,
}

impl ConformanceSession {
    /// Connect and run the initialize handshake.
    pub async fn connect(
        endpoint: &str,
        mode: SessionMode,
        config: &ConformanceConfig,
    ) -> Result<Self> {
        info!(endpoint = %endpoint, ?mode, "Connecting to MCP server");

        let handler = ConformanceClientHandler::new(&config.client_name);
        let timeout = config.request_timeout;

        let (client, affinity) = match mode {
            SessionMode::Plain => {
                let transport = StreamableHttpClientTransport::from_uri(endpoint.to_string());
                let client = bounded(timeout, handler.serve(transport))
                    .await?
                    .context("Failed to initialize MCP client")?;
                (client, None)
            }
            SessionMode::Affinity | SessionMode::AffinityGlobal => {
                let scope = if mode == SessionMode::Affinity {
                    DispatchScope::Scoped
                } else {
                    DispatchScope::Global
                };
                let options = TransportOptions::default().with_timeout(timeout);
                let transport = SessionAffinityTransport::open_with_scope(endpoint, options, scope)
                    .with_context(|| format!("Failed to open transport for {}", endpoint))?;
                let affinity = transport.affinity();
                let client = bounded(timeout, handler.serve(transport))
                    .await?
                    .context("Failed to initialize MCP client")?;
                (client, Some(affinity))
            }
        };

        debug!(endpoint = %endpoint, peer_info = ?client.peer_info(), "Connected to MCP server");

        Ok(Self {
            endpoint: endpoint.to_string(),
            mode,
            timeout,
            affinity,
            raw_ids: AtomicU64::new(1),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Result of the initialize handshake
    pub fn server_info(&self) -> Option<ServerInfo> {
        self.client.peer_info().cloned()
    }

    /// Cookies and token held by the affinity transport; `None` in plain mode.
    pub fn affinity_state(&self) -> Option<AffinityState> {
        self.affinity.as_ref().map(|affinity| affinity.snapshot())
    }

    pub async fn list_tools(&self) -> Result<ListToolsResult> {
        bounded(self.timeout, self.client.peer().list_tools(Default::default()))
            .await?
            .context("Failed to list tools")
    }

    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<CallToolResult> {
        debug!(endpoint = %self.endpoint, tool = %name, "Calling tool");

        let params = CallToolRequestParams {
            name: name.to_string().into(),
            arguments: object(arguments),
            task: None,
            meta: None,
        };
        bounded(self.timeout, self.client.peer().call_tool(params))
            .await?
            .with_context(|| format!("Tool call failed: {}", name))
    }

    pub async fn list_prompts(&self) -> Result<ListPromptsResult> {
        bounded(self.timeout, self.client.peer().list_prompts(Default::default()))
            .await?
            .context("Failed to list prompts")
    }

    pub async fn get_prompt(&self, name: &str, arguments: Option<Value>) -> Result<GetPromptResult> {
        let params = GetPromptRequestParams {
            name: name.to_string().into(),
            arguments: object(arguments),
            meta: None,
        };
        bounded(self.timeout, self.client.peer().get_prompt(params))
            .await?
            .with_context(|| format!("Failed to get prompt: {}", name))
    }

    pub async fn list_resources(&self) -> Result<ListResourcesResult> {
        bounded(self.timeout, self.client.peer().list_resources(Default::default()))
            .await?
            .context("Failed to list resources")
    }

    pub async fn list_resource_templates(&self) -> Result<ListResourceTemplatesResult> {
        bounded(
            self.timeout,
            self.client.peer().list_resource_templates(Default::default()),
        )
        .await?
        .context("Failed to list resource templates")
    }

    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult> {
        let params = ReadResourceRequestParams {
            uri: uri.into(),
            meta: None,
        };
        bounded(self.timeout, self.client.peer().read_resource(params))
            .await?
            .with_context(|| format!("Failed to read resource: {}", uri))
    }

    /// Send one JSON-RPC request outside rmcp's typed model and return its
    /// `result` as plain JSON.
    ///
    /// Needed for wire fields the model drops, such as `_meta` on a prompt
    /// result. The request goes through this session's interceptor, so it
    /// carries the same cookies and `mcp-session-id`. Plain mode has no
    /// interceptor and is rejected.
    pub async fn raw_request(&self, method: &str, params: Value) -> Result<Value> {
        let Some(affinity) = &self.affinity else {
            bail!("Raw requests need an affinity session");
        };

        let id = Value::from(format!(
            "raw-{}",
            self.raw_ids.fetch_add(1, Ordering::Relaxed)
        ));
        let body = serde_json::to_vec(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))?;
        let request = HttpRequest::post_json(Url::parse(&self.endpoint)?, body)
            .with_header(ACCEPT, HeaderValue::from_static(STREAMABLE_ACCEPT));

        debug!(endpoint = %self.endpoint, method = %method, id = %id, "Raw request");
        let response = bounded(self.timeout, affinity.dispatch(request))
            .await?
            .with_context(|| format!("{} request failed", method))?;

        let reply = decode_values(&response)?
            .into_iter()
            .find(|message| message.get("id") == Some(&id))
            .with_context(|| format!("No reply to {} in response", method))?;
        if let Some(error) = reply.get("error") {
            bail!(
                "MCP error {}: {}",
                error["code"],
                error["message"].as_str().unwrap_or_default()
            );
        }
        reply
            .get("result")
            .cloned()
            .with_context(|| format!("Reply to {} carries no result", method))
    }

    /// Stop the service; the transport is closed on the way out.
    pub async fn close(self) -> Result<()> {
        info!(endpoint = %self.endpoint, "Disconnecting from MCP server");
        self.client
            .cancel()
            .await
            .context("Failed to cancel service")?;
        Ok(())
    }
}

fn object(arguments: Option<Value>) -> Option<Map<String, Value>> {
    arguments.and_then(|v| v.as_object().cloned())
}

async fn bounded<F: Future>(limit: Duration, future: F) -> Result<F::Output> {
    tokio::time::timeout(limit, future)
        .await
        .with_context(|| format!("Operation timed out after {:?}", limit))
}
