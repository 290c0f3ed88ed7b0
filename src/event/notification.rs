// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed notifications emitted by the streaming channel.

use serde_json::Value;

/// A decoded notification from the streaming channel.
///
/// One inbound frame usually produces several notifications: a generic
/// [`Message`](Self::Message) followed by one specific notification per
/// changed property, action or event.
///
/// # Examples
///
/// ```
/// use webthings_lib::event::Notification;
/// use serde_json::json;
///
/// let change = Notification::PropertyChanged {
///     device_id: "lamp".to_string(),
///     name: "on".to_string(),
///     value: json!(true),
/// };
///
/// assert_eq!(change.name(), "propertyChanged");
/// assert_eq!(change.device_id(), Some("lamp"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Any per-device frame, raised before the specific notifications.
    Message {
        /// The device the frame is about.
        device_id: String,
        /// The frame's full `data` payload.
        data: Value,
    },

    /// A property reported a new value.
    PropertyChanged {
        /// The device owning the property.
        device_id: String,
        /// The property name.
        name: String,
        /// The new value.
        value: Value,
    },

    /// An action request changed status.
    ActionTriggered {
        /// The device owning the action.
        device_id: String,
        /// The action name.
        name: String,
        /// The action request description.
        value: Value,
    },

    /// A device raised an event.
    EventRaised {
        /// The device raising the event.
        device_id: String,
        /// The event name.
        name: String,
        /// The event description.
        value: Value,
    },

    /// A device became reachable or unreachable.
    ConnectStateChanged {
        /// The device.
        device_id: String,
        /// The connection payload, usually a boolean.
        data: Value,
    },

    /// A device's description was modified.
    DeviceModified {
        /// The device.
        device_id: String,
        /// The frame payload.
        data: Value,
    },

    /// A device was added to the gateway.
    DeviceAdded {
        /// The device.
        device_id: String,
        /// The frame payload.
        data: Value,
    },

    /// A device was removed from the gateway.
    DeviceRemoved {
        /// The device.
        device_id: String,
        /// The frame payload.
        data: Value,
    },

    /// Pairing progress, not tied to a device.
    Pair {
        /// The pairing payload.
        value: Value,
    },

    /// A frame whose `messageType` or shape is not recognized.
    Unknown {
        /// The raw `messageType`, if present.
        message_type: Option<String>,
        /// The `id`, if present.
        device_id: Option<String>,
        /// The `data`, if present.
        data: Option<Value>,
    },

    /// The transport reported an error.
    Error {
        /// The error description.
        reason: String,
    },

    /// The socket closed.
    Close,
}

impl Notification {
    /// Returns the protocol-level event name of this notification.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::PropertyChanged { .. } => "propertyChanged",
            Self::ActionTriggered { .. } => "actionTriggered",
            Self::EventRaised { .. } => "eventRaised",
            Self::ConnectStateChanged { .. } => "connectStateChanged",
            Self::DeviceModified { .. } => "deviceModified",
            Self::DeviceAdded { .. } => "deviceAdded",
            Self::DeviceRemoved { .. } => "deviceRemoved",
            Self::Pair { .. } => "pair",
            Self::Unknown { .. } => "unknown",
            Self::Error { .. } => "error",
            Self::Close => "close",
        }
    }

    /// Returns the device this notification is about, if any.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::Message { device_id, .. }
            | Self::PropertyChanged { device_id, .. }
            | Self::ActionTriggered { device_id, .. }
            | Self::EventRaised { device_id, .. }
            | Self::ConnectStateChanged { device_id, .. }
            | Self::DeviceModified { device_id, .. }
            | Self::DeviceAdded { device_id, .. }
            | Self::DeviceRemoved { device_id, .. } => Some(device_id),
            Self::Unknown { device_id, .. } => device_id.as_deref(),
            Self::Pair { .. } | Self::Error { .. } | Self::Close => None,
        }
    }

    /// Returns `true` for transport-level notifications (`error`, `close`).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_match_protocol_events() {
        let message = Notification::Message {
            device_id: "d".to_string(),
            data: json!({}),
        };
        assert_eq!(message.name(), "message");
        assert_eq!(Notification::Pair { value: json!(1) }.name(), "pair");
        assert_eq!(Notification::Close.name(), "close");
    }

    #[test]
    fn device_id_of_unknown() {
        let unknown = Notification::Unknown {
            message_type: Some("mystery".to_string()),
            device_id: Some("d1".to_string()),
            data: None,
        };
        assert_eq!(unknown.device_id(), Some("d1"));
        assert_eq!(Notification::Pair { value: json!(1) }.device_id(), None);
    }

    #[test]
    fn transport_notifications() {
        assert!(Notification::Close.is_transport());
        assert!(
            Notification::Error {
                reason: "reset".to_string()
            }
            .is_transport()
        );
        assert!(!Notification::Pair { value: json!(null) }.is_transport());
    }
}
