// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Immutable description of how to reach a gateway.

use std::fmt;

/// Where and how to reach a gateway.
///
/// A descriptor is produced by [`DiscoveryConfig::resolve`](super::DiscoveryConfig::resolve)
/// or built by hand when the caller already knows the gateway's address.
/// Once handed to a [`GatewayClient`](crate::GatewayClient) it is shared
/// read-only with every channel the client opens.
///
/// # Examples
///
/// ```
/// use webthings_lib::discovery::ConnectionDescriptor;
///
/// let descriptor = ConnectionDescriptor::new("gateway.local", 4443, "my-token")
///     .with_secure(true)
///     .with_skip_cert_validation(true);
///
/// assert_eq!(descriptor.base_url(), "https://gateway.local:4443");
/// assert_eq!(
///     descriptor.websocket_url(),
///     "wss://gateway.local:4443/things?jwt=my-token"
/// );
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    address: String,
    port: u16,
    secure: bool,
    skip_cert_validation: bool,
    token: String,
}

impl ConnectionDescriptor {
    /// Creates a plaintext descriptor with full certificate validation.
    #[must_use]
    pub fn new(address: impl Into<String>, port: u16, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port,
            secure: false,
            skip_cert_validation: false,
            token: token.into(),
        }
    }

    /// Selects TLS (`https`/`wss`) instead of plaintext.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Accepts any server certificate when `skip` is `true`.
    ///
    /// Only meaningful for secure descriptors.
    #[must_use]
    pub fn with_skip_cert_validation(mut self, skip: bool) -> Self {
        self.skip_cert_validation = skip;
        self
    }

    /// Returns the host name or IP address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether TLS is used.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Returns whether server certificates are accepted without validation.
    #[must_use]
    pub fn skip_cert_validation(&self) -> bool {
        self.skip_cert_validation
    }

    /// Returns the bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Base URL for HTTP requests, e.g. `http://localhost:8080`.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.address, self.port)
    }

    /// URL of the streaming endpoint, authenticated through the `jwt` query parameter.
    #[must_use]
    pub fn websocket_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!(
            "{scheme}://{}:{}/things?jwt={}",
            self.address,
            self.port,
            urlencoding::encode(&self.token)
        )
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("skip_cert_validation", &self.skip_cert_validation)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_to_plaintext_with_validation() {
        let descriptor = ConnectionDescriptor::new("localhost", 8080, "t");
        assert!(!descriptor.is_secure());
        assert!(!descriptor.skip_cert_validation());
        assert_eq!(descriptor.base_url(), "http://localhost:8080");
    }

    #[test]
    fn websocket_url_plaintext() {
        let descriptor = ConnectionDescriptor::new("localhost", 8080, "abc");
        assert_eq!(
            descriptor.websocket_url(),
            "ws://localhost:8080/things?jwt=abc"
        );
    }

    #[test]
    fn websocket_url_encodes_token() {
        let descriptor = ConnectionDescriptor::new("localhost", 8080, "a b+c");
        assert_eq!(
            descriptor.websocket_url(),
            "ws://localhost:8080/things?jwt=a%20b%2Bc"
        );
    }

    #[test]
    fn secure_urls() {
        let descriptor = ConnectionDescriptor::new("10.0.0.2", 4443, "t").with_secure(true);
        assert_eq!(descriptor.base_url(), "https://10.0.0.2:4443");
        assert!(descriptor.websocket_url().starts_with("wss://10.0.0.2:4443/things"));
    }

    #[test]
    fn debug_redacts_token() {
        let descriptor = ConnectionDescriptor::new("localhost", 8080, "super-secret");
        let debug = format!("{descriptor:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
