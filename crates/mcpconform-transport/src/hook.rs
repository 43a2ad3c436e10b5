//! Process-wide dispatch hook
//!
//! A single mutable slot holding "the function used to perform an HTTP call"
//! for code that does not carry its own dispatch. Whoever installs last owns
//! all traffic routed through [`GlobalDispatch`]. There is no arbitration
//! between owners: callers must ensure at most one owner at a time.

use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::dispatch::{HttpDispatch, HttpRequest, HttpResponse, ReqwestDispatch, SharedDispatch};
use crate::error::Result;

lazy_static! {
    static ref DEFAULT_DISPATCH: SharedDispatch = ReqwestDispatch::new().shared();
    static ref DISPATCH_HOOK: RwLock<SharedDispatch> = RwLock::new(DEFAULT_DISPATCH.clone());
}

/// The process default dispatch. Never replaced, unlike the hook.
pub fn default_dispatch() -> SharedDispatch {
    DEFAULT_DISPATCH.clone()
}

/// Currently installed dispatch
pub fn current() -> SharedDispatch {
    DISPATCH_HOOK.read().clone()
}

/// Install `dispatch`, returning the one it replaced.
pub fn install(dispatch: SharedDispatch) -> SharedDispatch {
    std::mem::replace(&mut *DISPATCH_HOOK.write(), dispatch)
}

/// Build the replacement from the current value and install it under one lock.
///
/// `build` receives the dispatch being replaced, typically to delegate to it.
/// Returns the installed dispatch.
pub fn install_with<D, F>(build: F) -> Arc<D>
where
    D: HttpDispatch + 'static,
    F: FnOnce(SharedDispatch) -> Arc<D>,
{
    let mut slot = DISPATCH_HOOK.write();
    let installed = build(slot.clone());
    *slot = installed.clone() as SharedDispatch;
    installed
}

/// Whether `dispatch` is the installed value (pointer identity)
pub fn is_installed(dispatch: &SharedDispatch) -> bool {
    Arc::ptr_eq(&*DISPATCH_HOOK.read(), dispatch)
}

/// Dispatch that forwards to whatever the hook holds at call time
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalDispatch;

impl GlobalDispatch {
    pub fn shared() -> SharedDispatch {
        Arc::new(GlobalDispatch)
    }
}

#[async_trait]
impl HttpDispatch for GlobalDispatch {
    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse> {
        let dispatch = current();
        dispatch.dispatch(request).await
    }
}

/// Serializes unit tests in this crate that touch the hook.
#[cfg(test)]
pub(crate) static TEST_HOOK_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());
