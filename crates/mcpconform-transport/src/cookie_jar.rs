//! Crude cookie jar
//!
//! Cookies are kept as the raw strings the server sent, in receipt order.
//! Nothing is deduplicated, parsed or expired: the jar is only meant for
//! short sessions against a single endpoint.

/// Separator used when replaying cookies in a `cookie` request header
pub const REPLAY_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every token of a `set-cookie` value.
    ///
    /// The value is split on `,` and each token trimmed. An empty value
    /// leaves the jar untouched. Returns the number of tokens appended.
    pub fn absorb(&mut self, set_cookie: &str) -> usize {
        if set_cookie.is_empty() {
            return 0;
        }
        let before = self.cookies.len();
        self.cookies
            .extend(set_cookie.split(',').map(|token| token.trim().to_string()));
        self.cookies.len() - before
    }

    /// Value for the `cookie` request header, `None` while empty
    pub fn replay_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            None
        } else {
            Some(self.cookies.join(REPLAY_SEPARATOR))
        }
    }

    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }
}
