// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zero-configuration discovery of a local gateway.
//!
//! The gateway listens on a plaintext port and, when TLS is enabled,
//! redirects plaintext requests to a second port that serves a
//! self-signed certificate. [`DiscoveryConfig`] probes the plaintext port
//! once without following redirects and derives a [`ConnectionDescriptor`]
//! from the answer.
//!
//! The probe assumes a fixed pair of well-known ports. Gateways that were
//! configured differently need either custom ports on the config or a
//! hand-built descriptor.
//!
//! # Examples
//!
//! ```no_run
//! use webthings_lib::discovery::DiscoveryConfig;
//!
//! # async fn example() -> webthings_lib::Result<()> {
//! let descriptor = DiscoveryConfig::new("my-token")
//!     .with_host("192.168.1.20")
//!     .resolve()
//!     .await?;
//!
//! println!("gateway at {}", descriptor.base_url());
//! # Ok(())
//! # }
//! ```

mod descriptor;

pub use descriptor::ConnectionDescriptor;

use std::time::Duration;

use reqwest::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;

use crate::error::{Error, ProtocolError, Result};

/// Parameters of the discovery probe.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    host: String,
    plain_port: u16,
    secure_port: u16,
    timeout: Duration,
    certificate_validation: Option<bool>,
    token: String,
}

impl DiscoveryConfig {
    /// Default probe host.
    pub const DEFAULT_HOST: &'static str = "localhost";
    /// Default plaintext port.
    pub const DEFAULT_PLAIN_PORT: u16 = 8080;
    /// Default TLS port the gateway redirects to.
    pub const DEFAULT_SECURE_PORT: u16 = 4443;
    /// Default probe timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a probe configuration for the local gateway.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            plain_port: Self::DEFAULT_PLAIN_PORT,
            secure_port: Self::DEFAULT_SECURE_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
            certificate_validation: None,
            token: token.into(),
        }
    }

    /// Sets the host to probe.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the plaintext port to probe.
    #[must_use]
    pub fn with_plain_port(mut self, port: u16) -> Self {
        self.plain_port = port;
        self
    }

    /// Sets the TLS port used when the probe is redirected.
    #[must_use]
    pub fn with_secure_port(mut self, port: u16) -> Self {
        self.secure_port = port;
        self
    }

    /// Sets the probe timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Forces certificate validation on or off, overriding the heuristic.
    ///
    /// By default a redirect to TLS relaxes validation, since gateways
    /// ship with self-signed certificates.
    #[must_use]
    pub fn with_certificate_validation(mut self, validate: bool) -> Self {
        self.certificate_validation = Some(validate);
        self
    }

    /// Returns the probe host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the plaintext port.
    #[must_use]
    pub fn plain_port(&self) -> u16 {
        self.plain_port
    }

    /// Returns the TLS port.
    #[must_use]
    pub fn secure_port(&self) -> u16 {
        self.secure_port
    }

    /// Returns the probe timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probes the gateway and returns the descriptor to use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unreachable`] if the probe request fails, and
    /// [`ProtocolError::Http`] if the probe client cannot be built.
    pub async fn resolve(self) -> Result<ConnectionDescriptor> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        let url = format!("http://{}:{}", self.host, self.plain_port);
        tracing::debug!(url = %url, "Probing gateway");

        let response = client.get(&url).send().await.map_err(Error::Unreachable)?;
        let redirected = response.headers().contains_key(LOCATION);

        tracing::debug!(
            status = response.status().as_u16(),
            redirected,
            "Gateway probe answered"
        );

        Ok(self.descriptor_for(redirected))
    }

    /// Maps the probe outcome to a descriptor.
    fn descriptor_for(self, redirected: bool) -> ConnectionDescriptor {
        let (port, relaxed) = if redirected {
            (self.secure_port, true)
        } else {
            (self.plain_port, false)
        };
        let skip_cert_validation = self.certificate_validation.map_or(relaxed, |v| !v);

        ConnectionDescriptor::new(self.host, port, self.token)
            .with_secure(redirected)
            .with_skip_cert_validation(skip_cert_validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = DiscoveryConfig::new("t");
        assert_eq!(config.host(), "localhost");
        assert_eq!(config.plain_port(), 8080);
        assert_eq!(config.secure_port(), 4443);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn builder_chain() {
        let config = DiscoveryConfig::new("t")
            .with_host("gateway.local")
            .with_plain_port(80)
            .with_secure_port(443)
            .with_timeout(Duration::from_secs(2));

        assert_eq!(config.host(), "gateway.local");
        assert_eq!(config.plain_port(), 80);
        assert_eq!(config.secure_port(), 443);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn no_redirect_keeps_plaintext() {
        let descriptor = DiscoveryConfig::new("t").descriptor_for(false);
        assert_eq!(descriptor.port(), 8080);
        assert!(!descriptor.is_secure());
        assert!(!descriptor.skip_cert_validation());
        assert_eq!(descriptor.token(), "t");
    }

    #[test]
    fn redirect_switches_to_tls_and_relaxes_validation() {
        let descriptor = DiscoveryConfig::new("t").descriptor_for(true);
        assert_eq!(descriptor.port(), 4443);
        assert!(descriptor.is_secure());
        assert!(descriptor.skip_cert_validation());
    }

    #[test]
    fn caller_can_enforce_validation() {
        let descriptor = DiscoveryConfig::new("t")
            .with_certificate_validation(true)
            .descriptor_for(true);
        assert!(descriptor.is_secure());
        assert!(!descriptor.skip_cert_validation());
    }
}
