// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP request executor for the gateway REST API.

use std::sync::Arc;
use std::time::Duration;

use hyper::ext::ReasonPhrase;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::discovery::ConnectionDescriptor;
use crate::error::{Error, ProtocolError, Result};
use crate::protocol::RequestSpec;

/// HTTP client executing [`RequestSpec`]s against one gateway.
///
/// HTTP is stateless: each call is an independent request with its own
/// lifecycle, so a single client may be cloned and used from concurrent
/// tasks. Nothing is retried or cached.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use webthings_lib::discovery::ConnectionDescriptor;
/// use webthings_lib::protocol::{HttpClient, RequestSpec};
///
/// # async fn example() -> webthings_lib::Result<()> {
/// let descriptor = Arc::new(ConnectionDescriptor::new("localhost", 8080, "token"));
/// let client = HttpClient::new(descriptor, HttpClient::DEFAULT_TIMEOUT)?;
/// let things = client.execute(&RequestSpec::get("/things")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    descriptor: Arc<ConnectionDescriptor>,
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a client for the gateway described by `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be created.
    pub fn new(
        descriptor: Arc<ConnectionDescriptor>,
        timeout: Duration,
    ) -> std::result::Result<Self, ProtocolError> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(descriptor.skip_cert_validation())
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self {
            base_url: descriptor.base_url(),
            descriptor,
            client,
        })
    }

    /// Returns the descriptor this client talks to.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<ConnectionDescriptor> {
        &self.descriptor
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Executes one request.
    ///
    /// Returns `Ok(None)` only when the request accepts an empty answer and
    /// the gateway sent none (status 204, an empty body, or a non-JSON
    /// content type).
    ///
    /// # Errors
    ///
    /// - [`Error::HttpStatus`] for any status outside `[200, 300)`
    /// - [`Error::UnexpectedContentType`] if JSON was expected but not declared
    /// - [`Error::Parse`] if the body is not valid JSON
    /// - [`Error::Protocol`] if the request could not be sent
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, spec.path());

        tracing::debug!(method = %spec.method(), url = %url, "Sending HTTP request");

        let mut request = self
            .client
            .request(spec.method().as_reqwest(), &url)
            .header(ACCEPT, "application/json")
            .bearer_auth(self.descriptor.token());

        if let Some(body) = spec.body() {
            request = request
                .header(CONTENT_TYPE, body.content_type())
                .body(body.encode()?);
        }

        let response = request.send().await.map_err(ProtocolError::Http)?;
        let status = response.status();

        tracing::debug!(status = status.as_u16(), "Received HTTP response");

        if !status.is_success() {
            return Err(Error::HttpStatus {
                code: status.as_u16(),
                status_text: reason_phrase(&response),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let is_json = is_json_content_type(&content_type);

        if spec.expect_no_content() && (status == StatusCode::NO_CONTENT || !is_json) {
            return Ok(None);
        }

        if !is_json {
            return Err(Error::UnexpectedContentType {
                actual: content_type,
            });
        }

        let body = response.text().await.map_err(ProtocolError::Http)?;
        if spec.expect_no_content() && body.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&body)?))
    }
}

/// Returns the reason phrase the gateway sent, else the canonical one.
///
/// hyper only records the phrase when it differs from the canonical text.
fn reason_phrase(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned())
        .or_else(|| response.status().canonical_reason().map(str::to_string))
        .unwrap_or_default()
}

/// Matches `application/json`, ignoring parameters such as `charset`.
fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_type_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/JSON"));
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type(""));
    }

    #[test]
    fn base_url_from_descriptor() {
        let descriptor = Arc::new(ConnectionDescriptor::new("localhost", 8080, "t"));
        let client = HttpClient::new(descriptor, HttpClient::DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.descriptor().token(), "t");
    }

    #[test]
    fn builds_with_relaxed_certificates() {
        let descriptor = Arc::new(
            ConnectionDescriptor::new("localhost", 4443, "t")
                .with_secure(true)
                .with_skip_cert_validation(true),
        );
        let client = HttpClient::new(descriptor, Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://localhost:4443");
    }
}
