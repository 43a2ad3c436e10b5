//! Fixture servers exercised by the conformance suite
//!
//! Each fixture lives at a fixed path below the server's base URL, e.g.
//! `http://localhost:8000/zmcp` + `/test/test_full`.

use std::fmt;

/// A fixture server endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixture {
    /// No capabilities, just name and version
    Minimal,
    /// Tools, prompts, resources and instructions
    Full,
    /// Tools carrying hint annotations and annotated content
    Annotations,
    /// Counter kept in a header-token (`mcp-session-id`) session
    McpSession,
    /// Counter kept in a cookie session
    IcfSession,
}

impl Fixture {
    pub const ALL: [Fixture; 5] = [
        Fixture::Minimal,
        Fixture::Full,
        Fixture::Annotations,
        Fixture::McpSession,
        Fixture::IcfSession,
    ];

    /// Path below the base URL
    pub fn path(self) -> &'static str {
        match self {
            Fixture::Minimal => "/test/test_minimal",
            Fixture::Full => "/test/test_full",
            Fixture::Annotations => "/test/test_annotations",
            Fixture::McpSession => "/test/test_mcp_session",
            Fixture::IcfSession => "/test/test_icf_session",
        }
    }

    /// Join this fixture's path onto a base URL string.
    pub fn url_under(self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }

    /// True when state only survives between calls if the client replays
    /// cookies or the session token.
    pub fn is_stateful(self) -> bool {
        matches!(self, Fixture::McpSession | Fixture::IcfSession)
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
