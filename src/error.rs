// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `webthings_lib` library.
//!
//! This module provides the error hierarchy for failures across the
//! library: gateway discovery, request/response calls, the streaming
//! channel, and JSON parsing.

use thiserror::Error;

use crate::protocol::ChannelState;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The discovery probe against the gateway could not complete.
    #[error("gateway unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The gateway answered with a status code outside `[200, 300)`.
    #[error("HTTP {code} {status_text}")]
    HttpStatus {
        /// The numeric status code.
        code: u16,
        /// The canonical reason phrase, empty when unknown.
        status_text: String,
    },

    /// The gateway answered with a non-JSON body where JSON was expected.
    #[error("unexpected content type: {actual:?}")]
    UnexpectedContentType {
        /// The `Content-Type` the gateway declared (empty if missing).
        actual: String,
    },

    /// An operation required a connected channel.
    #[error("channel is not connected")]
    NotConnected,

    /// The channel cannot be connected from its current state.
    #[error("channel cannot connect while {0}")]
    InvalidChannelState(ChannelState),

    /// A write was attempted on a read-only property.
    #[error("property {0} is read-only")]
    ReadOnlyProperty(String),

    /// Error occurred in the underlying transport.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a gateway payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors raised by the HTTP and WebSocket transports.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket handshake or I/O failed.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// TLS configuration could not be built.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),
}

/// Errors related to parsing gateway payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected payload format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Protocol(ProtocolError::WebSocket(Box::new(err)))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(ParseError::Json(err))
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display() {
        let err = Error::HttpStatus {
            code: 404,
            status_text: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
    }

    #[test]
    fn unexpected_content_type_display() {
        let err = Error::UnexpectedContentType {
            actual: "text/html".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected content type: \"text/html\"");
    }

    #[test]
    fn invalid_channel_state_display() {
        let err = Error::InvalidChannelState(ChannelState::Connected);
        assert_eq!(err.to_string(), "channel cannot connect while connected");
    }

    #[test]
    fn error_from_parse_error() {
        let err: Error = ParseError::MissingField("on".to_string()).into();
        assert!(matches!(err, Error::Parse(ParseError::MissingField(ref f)) if f == "on"));
        assert_eq!(err.to_string(), "parse error: missing field in response: on");
    }

    #[test]
    fn error_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Parse(ParseError::Json(_))));
    }
}
