//! Session-affinity transport
//!
//! Decorates [`StreamableHttpTransport`] with a [`SessionAffinity`]
//! interceptor so a session-less client keeps its server-side session:
//! cookies from `set-cookie` and the `mcp-session-id` token are replayed on
//! every later request of the connection.
//!
//! Two ways of putting the interceptor in front of the network:
//!
//! - [`DispatchScope::Scoped`]: the interceptor is handed to this connection's
//!   base transport only. Nothing global changes; any number of instances can
//!   be open at once.
//! - [`DispatchScope::Global`]: the interceptor replaces the process-wide
//!   dispatch hook until `close()`, so every call routed through
//!   [`hook::GlobalDispatch`] is decorated, whoever issues it. Two global
//!   instances open at the same time cross-contaminate each other's cookies
//!   and token; that configuration is not supported.

use std::future::Future;
use std::sync::Arc;

use rmcp::service::{RxJsonRpcMessage, TxJsonRpcMessage};
use rmcp::transport::Transport;
use rmcp::RoleClient;
use tracing::{debug, info, warn};
use url::Url;

use crate::dispatch::SharedDispatch;
use crate::error::{Result, TransportError};
use crate::hook;
use crate::interceptor::{AffinityState, SessionAffinity};
use crate::streamable::{StreamableHttpTransport, TransportOptions};

/// Where the interceptor is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchScope {
    /// Injected into this connection only
    #[default]
    Scoped,
    /// Installed as the process-wide dispatch hook
    Global,
}

/// Streamable HTTP transport that keeps cookie and header-token affinity
pub struct SessionAffinityTransport {
    affinity: Arc<SessionAffinity>,
    base: StreamableHttpTransport,
    scope: DispatchScope,
    closed: bool,
}

impl SessionAffinityTransport {
    /// Open with the interceptor scoped to this connection.
    pub fn open(endpoint: &str, options: TransportOptions) -> Result<Self> {
        Self::open_with_scope(endpoint, options, DispatchScope::Scoped)
    }

    /// Open with the interceptor installed as the process-wide hook.
    pub fn open_global(endpoint: &str, options: TransportOptions) -> Result<Self> {
        Self::open_with_scope(endpoint, options, DispatchScope::Global)
    }

    pub fn open_with_scope(
        endpoint: &str,
        options: TransportOptions,
        scope: DispatchScope,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;

        let (affinity, base_dispatch): (Arc<SessionAffinity>, SharedDispatch) = match scope {
            DispatchScope::Scoped => {
                let previous = options
                    .dispatch
                    .clone()
                    .unwrap_or_else(hook::default_dispatch);
                let affinity = Arc::new(SessionAffinity::new(previous));
                (affinity.clone(), affinity)
            }
            DispatchScope::Global => {
                if options.dispatch.is_some() {
                    debug!("Global scope delegates to the installed hook; ignoring options.dispatch");
                }
                let affinity =
                    hook::install_with(|previous| Arc::new(SessionAffinity::new(previous)));
                (affinity, hook::GlobalDispatch::shared())
            }
        };

        let base = StreamableHttpTransport::open(endpoint, base_dispatch, &options);
        info!(endpoint = %base.endpoint(), ?scope, "Session affinity transport opened");

        Ok(Self {
            affinity,
            base,
            scope,
            closed: false,
        })
    }

    pub fn scope(&self) -> DispatchScope {
        self.scope
    }

    pub fn endpoint(&self) -> &Url {
        self.base.endpoint()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Cookies and token held right now
    pub fn state(&self) -> AffinityState {
        self.affinity.snapshot()
    }

    pub fn session_token(&self) -> Option<String> {
        self.affinity.session_token()
    }

    /// The dispatch the interceptor delegates to (and, for the global scope,
    /// the hook value restored on close)
    pub fn previous_dispatch(&self) -> SharedDispatch {
        self.affinity.previous().clone()
    }

    /// The interceptor, as installed
    pub fn interceptor(&self) -> SharedDispatch {
        self.affinity.clone()
    }

    /// Handle on the interceptor that outlives the transport
    pub fn affinity(&self) -> Arc<SessionAffinity> {
        self.affinity.clone()
    }

    fn release(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.affinity.reset();

        if self.scope == DispatchScope::Global {
            if !hook::is_installed(&self.interceptor()) {
                warn!(
                    endpoint = %self.base.endpoint(),
                    "Dispatch hook was replaced while this transport was open; restoring anyway"
                );
            }
            hook::install(self.previous_dispatch());
        }

        self.base.shutdown();
        info!(endpoint = %self.base.endpoint(), "Session affinity transport closed");
    }
}

impl Transport<RoleClient> for SessionAffinityTransport {
    type Error = TransportError;

    fn send(
        &mut self,
        item: TxJsonRpcMessage<RoleClient>,
    ) -> impl Future<Output = std::result::Result<(), Self::Error>> + Send + 'static {
        self.base.send(item)
    }

    fn receive(&mut self) -> impl Future<Output = Option<RxJsonRpcMessage<RoleClient>>> + Send {
        self.base.receive()
    }

    fn close(&mut self) -> impl Future<Output = std::result::Result<(), Self::Error>> + Send {
        self.release();
        self.base.close()
    }
}

impl Drop for SessionAffinityTransport {
    fn drop(&mut self) {
        self.release();
    }
}
