// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transports for talking to the gateway.
//!
//! # Transports
//!
//! - [`HttpClient`]: request/response calls against the REST API
//! - [`Channel`]: the persistent WebSocket carrying live notifications
//!
//! Both take their address, scheme and certificate policy from the same
//! [`ConnectionDescriptor`](crate::discovery::ConnectionDescriptor).

mod http;
mod outbound;
mod tls;
mod websocket;

pub use http::HttpClient;
pub use outbound::OutboundMessage;
pub use websocket::{Channel, ChannelState};

use std::fmt;

use serde_json::Value;

/// HTTP method of a [`RequestSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read a resource.
    Get,
    /// Replace a resource, used for property writes.
    Put,
    /// Create a resource, used for action requests.
    Post,
    /// Delete a resource.
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Put => reqwest::Method::PUT,
            Self::Post => reqwest::Method::POST,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// Payload of a [`RequestSpec`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON and sent with `Content-Type: application/json`.
    Json(Value),
    /// Sent verbatim with `Content-Type: text/plain`.
    Raw(String),
}

impl RequestBody {
    /// Returns the `Content-Type` header value for this body.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => "application/json",
            Self::Raw(_) => "text/plain",
        }
    }

    /// Encodes the body for the wire.
    ///
    /// # Errors
    ///
    /// Returns error if a JSON body cannot be serialized.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Json(value) => serde_json::to_string(value),
            Self::Raw(raw) => Ok(raw.clone()),
        }
    }
}

/// A single request/response call against the gateway.
///
/// # Examples
///
/// ```
/// use webthings_lib::protocol::{Method, RequestSpec};
/// use serde_json::json;
///
/// let read = RequestSpec::get("/things");
/// assert_eq!(read.method(), Method::Get);
/// assert!(read.body().is_none());
///
/// let write = RequestSpec::put("/things/lamp/properties/on", json!({"on": true}));
/// assert_eq!(write.body().unwrap().content_type(), "application/json");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: Method,
    path: String,
    body: Option<RequestBody>,
    expect_no_content: bool,
}

impl RequestSpec {
    /// Creates a body-less request expecting a JSON answer.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            expect_no_content: false,
        }
    }

    /// `GET path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `PUT path` with a JSON body.
    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(RequestBody::Json(body))
    }

    /// `POST path` with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(RequestBody::Json(body))
    }

    /// `DELETE path` with the empty raw payload the gateway expects.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
            .with_body(RequestBody::Raw(String::new()))
            .with_no_content()
    }

    /// Attaches a body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Accepts an empty or non-JSON success response.
    #[must_use]
    pub fn with_no_content(mut self) -> Self {
        self.expect_no_content = true;
        self
    }

    /// Returns the method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the path, relative to the gateway's base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Returns whether an empty success response is acceptable.
    #[must_use]
    pub fn expect_no_content(&self) -> bool {
        self.expect_no_content
    }
}
