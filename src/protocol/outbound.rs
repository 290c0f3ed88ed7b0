// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frames the client writes to the streaming channel.

use serde_json::{Map, Value, json};

use crate::event::MessageType;

/// A frame sent from the client to the gateway.
///
/// All variants serialize to `{"messageType": …, "id": …, "data": …}`.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Subscribe to the named events of a device.
    AddEventSubscription {
        /// The device id.
        device_id: String,
        /// Event descriptors keyed by event name.
        events: Map<String, Value>,
    },

    /// Write one or more properties of a device.
    SetProperty {
        /// The device id.
        device_id: String,
        /// New values keyed by property name.
        properties: Map<String, Value>,
    },

    /// Request one or more actions of a device.
    RequestAction {
        /// The device id.
        device_id: String,
        /// Action requests keyed by action name, each `{"input": …}`.
        actions: Map<String, Value>,
    },
}

impl OutboundMessage {
    /// Returns the frame's `messageType`.
    #[must_use]
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::AddEventSubscription { .. } => MessageType::AddEventSubscription,
            Self::SetProperty { .. } => MessageType::SetProperty,
            Self::RequestAction { .. } => MessageType::RequestAction,
        }
    }

    /// Returns the target device id.
    #[must_use]
    pub fn device_id(&self) -> &str {
        match self {
            Self::AddEventSubscription { device_id, .. }
            | Self::SetProperty { device_id, .. }
            | Self::RequestAction { device_id, .. } => device_id,
        }
    }

    /// Serializes the frame.
    ///
    /// # Errors
    ///
    /// Returns error if a payload value cannot be serialized.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        let data = match self {
            Self::AddEventSubscription { events: data, .. }
            | Self::SetProperty {
                properties: data, ..
            }
            | Self::RequestAction { actions: data, .. } => data,
        };

        serde_json::to_string(&json!({
            "messageType": self.message_type().as_str(),
            "id": self.device_id(),
            "data": data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn set_property_frame() {
        let message = OutboundMessage::SetProperty {
            device_id: "lamp".to_string(),
            properties: map(json!({"on": true, "level": 40})),
        };
        assert_eq!(
            message.to_frame().unwrap(),
            r#"{"messageType":"setProperty","id":"lamp","data":{"on":true,"level":40}}"#
        );
    }

    #[test]
    fn request_action_frame() {
        let message = OutboundMessage::RequestAction {
            device_id: "lamp".to_string(),
            actions: map(json!({"fade": {"input": {"level": 0}}})),
        };
        assert_eq!(message.message_type(), MessageType::RequestAction);
        assert_eq!(message.device_id(), "lamp");
        assert_eq!(
            message.to_frame().unwrap(),
            r#"{"messageType":"requestAction","id":"lamp","data":{"fade":{"input":{"level":0}}}}"#
        );
    }
}
