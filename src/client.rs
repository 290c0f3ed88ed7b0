// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Caller-facing client for one gateway.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::discovery::{ConnectionDescriptor, DiscoveryConfig};
use crate::error::{ParseError, Result};
use crate::protocol::{Channel, HttpClient, RequestSpec};
use crate::thing::Device;

/// Client for a gateway's device API.
///
/// Wraps the request executor and creates streaming channels sharing the
/// same [`ConnectionDescriptor`]. Cloning is cheap; clones share the
/// underlying HTTP connection pool.
///
/// # Examples
///
/// ```no_run
/// use webthings_lib::GatewayClient;
///
/// # async fn example() -> webthings_lib::Result<()> {
/// let client = GatewayClient::local("my-token").await?;
///
/// for device in client.list_devices().await? {
///     println!("{} ({})", device.title().unwrap_or("untitled"), device.id());
///     for property in device.properties() {
///         match property.value().await {
///             Ok(value) => println!("  {} = {value}", property.name()),
///             Err(e) => eprintln!("  {}: {e}", property.name()),
///         }
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: HttpClient,
}

impl GatewayClient {
    /// Discovers the gateway on `localhost` with default ports.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unreachable`](crate::Error::Unreachable) if the
    /// probe fails.
    pub async fn local(token: impl Into<String>) -> Result<Self> {
        Self::discover(DiscoveryConfig::new(token)).await
    }

    /// Discovers the gateway with a custom probe configuration.
    ///
    /// The probe timeout is reused as the request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unreachable`](crate::Error::Unreachable) if the
    /// probe fails.
    pub async fn discover(config: DiscoveryConfig) -> Result<Self> {
        let timeout = config.timeout();
        let descriptor = config.resolve().await?;
        Self::with_timeout(descriptor, timeout)
    }

    /// Creates a client for a known gateway.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(descriptor: ConnectionDescriptor) -> Result<Self> {
        Self::with_timeout(descriptor, HttpClient::DEFAULT_TIMEOUT)
    }

    /// Creates a client for a known gateway with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn with_timeout(descriptor: ConnectionDescriptor, timeout: Duration) -> Result<Self> {
        let http = HttpClient::new(Arc::new(descriptor), timeout)?;
        Ok(Self { http })
    }

    /// Returns the connection descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        self.http.descriptor()
    }

    /// Creates a disconnected streaming channel to this gateway.
    #[must_use]
    pub fn channel(&self) -> Channel {
        Channel::new(Arc::clone(self.http.descriptor()))
    }

    /// Executes a raw request.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::execute`].
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Option<Value>> {
        self.http.execute(spec).await
    }

    /// `GET path`, returning the JSON body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::execute`].
    pub async fn get(&self, path: &str) -> Result<Value> {
        let body = self.http.execute(&RequestSpec::get(path)).await?;
        Ok(body.unwrap_or(Value::Null))
    }

    /// `PUT path` with a JSON body, returning the JSON answer.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::execute`].
    pub async fn put(&self, path: &str, value: Value) -> Result<Value> {
        let body = self.http.execute(&RequestSpec::put(path, value)).await?;
        Ok(body.unwrap_or(Value::Null))
    }

    /// `POST path` with a JSON body, returning the JSON answer.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::execute`].
    pub async fn post(&self, path: &str, value: Value) -> Result<Value> {
        let body = self.http.execute(&RequestSpec::post(path, value)).await?;
        Ok(body.unwrap_or(Value::Null))
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::execute`].
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.http.execute(&RequestSpec::delete(path)).await?;
        Ok(())
    }

    /// Lists every device known to the gateway.
    ///
    /// # Errors
    ///
    /// Returns a request error, or [`ParseError`] if the answer is not a
    /// list of device descriptions.
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        let Value::Array(descriptions) = self.get("/things").await? else {
            return Err(ParseError::UnexpectedFormat("device list is not an array".to_string()).into());
        };

        tracing::debug!(count = descriptions.len(), "Listed devices");

        descriptions
            .into_iter()
            .map(|description| Device::from_value(self.clone(), description))
            .collect()
    }

    /// Fetches one device by id.
    ///
    /// # Errors
    ///
    /// Returns a request error (`HttpStatus` 404 for unknown ids), or
    /// [`ParseError`] if the answer is not a device description.
    pub async fn get_device(&self, id: &str) -> Result<Device> {
        let description = self
            .get(&format!("/things/{}", urlencoding::encode(id)))
            .await?;
        Device::from_value(self.clone(), description)
    }
}
