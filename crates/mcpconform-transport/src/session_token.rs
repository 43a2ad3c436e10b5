//! Single-slot session token (`mcp-session-id`)

/// Opaque token issued by the server. Last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToken(Option<String>);

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value seen on a response.
    ///
    /// Empty values are ignored. Returns true when the held value changed.
    pub fn observe(&mut self, value: &str) -> bool {
        if value.is_empty() || self.0.as_deref() == Some(value) {
            return false;
        }
        self.0 = Some(value.to_string());
        true
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}
