//! Built-in PLAIN mechanism.

use crate::core::TransportResult;
use crate::secure::context::SecurityContext;

/// The PLAIN mechanism (RFC 4616): a single identity/password token, no
/// challenges, no payload protection.
///
/// Useful against servers that accept PLAIN over an already-protected
/// channel, and as the reference implementation of [`SecurityContext`].
/// The initial token is `authzid NUL authcid NUL password`; negotiation is
/// complete as soon as it has been produced, and wrap/unwrap pass payloads
/// through untouched.
#[derive(Debug, Clone)]
pub struct PlainContext {
    authzid: String,
    username: String,
    password: String,
    complete: bool,
}

impl PlainContext {
    /// PLAIN credentials with an empty authorization identity.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_authzid("", username, password)
    }

    /// PLAIN credentials acting on behalf of `authzid`.
    pub fn with_authzid(
        authzid: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            authzid: authzid.into(),
            username: username.into(),
            password: password.into(),
            complete: false,
        }
    }
}

impl SecurityContext for PlainContext {
    fn mechanism(&self) -> &str {
        "PLAIN"
    }

    fn initial_token(&mut self) -> TransportResult<Vec<u8>> {
        let mut token = Vec::with_capacity(
            self.authzid.len() + self.username.len() + self.password.len() + 2,
        );
        token.extend_from_slice(self.authzid.as_bytes());
        token.push(0);
        token.extend_from_slice(self.username.as_bytes());
        token.push(0);
        token.extend_from_slice(self.password.as_bytes());
        self.complete = true;
        Ok(token)
    }

    fn process(&mut self, _challenge: &[u8]) -> TransportResult<Vec<u8>> {
        // PLAIN is single-shot; a server challenge gets an empty response.
        Ok(Vec::new())
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn wrap(&mut self, data: &[u8]) -> TransportResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn unwrap_received(&mut self, data: &[u8]) -> TransportResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn dispose(&mut self) {
        self.password.clear();
    }
}
