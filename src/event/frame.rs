// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing of inbound frames and their fan-out into notifications.
//!
//! The gateway multiplexes the live state of every device over one
//! socket and batches related changes into a single frame. A frame is
//! decoded in two steps: its shape (per-device, connection-scoped, or
//! neither) and `messageType` first, then the payload expected for that
//! type. [`InboundFrame::into_notifications`] expands batched frames into
//! one notification per changed key, in the order the keys were received.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::ParseError;

use super::Notification;

/// The `messageType` discriminator of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageType {
    /// Batched property values.
    PropertyStatus,
    /// Batched action request updates.
    ActionStatus,
    /// Batched device events.
    Event,
    /// Device reachability.
    Connected,
    /// Device description changed.
    ThingModified,
    /// Device added.
    ThingAdded,
    /// Device removed.
    ThingRemoved,
    /// Outbound: subscribe to device events.
    AddEventSubscription,
    /// Outbound: write properties.
    SetProperty,
    /// Outbound: request an action.
    RequestAction,
    /// Anything else.
    Other(String),
}

impl MessageType {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PropertyStatus => "propertyStatus",
            Self::ActionStatus => "actionStatus",
            Self::Event => "event",
            Self::Connected => "connected",
            Self::ThingModified => "thingModified",
            Self::ThingAdded => "thingAdded",
            Self::ThingRemoved => "thingRemoved",
            Self::AddEventSubscription => "addEventSubscription",
            Self::SetProperty => "setProperty",
            Self::RequestAction => "requestAction",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for MessageType {
    fn from(value: &str) -> Self {
        match value {
            "propertyStatus" => Self::PropertyStatus,
            "actionStatus" => Self::ActionStatus,
            "event" => Self::Event,
            "connected" => Self::Connected,
            "thingModified" => Self::ThingModified,
            "thingAdded" => Self::ThingAdded,
            "thingRemoved" => Self::ThingRemoved,
            "addEventSubscription" => Self::AddEventSubscription,
            "setProperty" => Self::SetProperty,
            "requestAction" => Self::RequestAction,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// A frame carrying both `id` and `data`.
    Device {
        /// The frame's `messageType`, if present.
        message_type: Option<MessageType>,
        /// The device id.
        device_id: String,
        /// The payload.
        data: Value,
    },

    /// A frame carrying `data` but no `id`.
    Connection {
        /// The frame's `messageType`, if present.
        message_type: Option<MessageType>,
        /// The payload.
        data: Value,
    },

    /// A JSON object matching neither shape.
    Unrecognized {
        /// The frame's `messageType`, if present.
        message_type: Option<MessageType>,
    },
}

impl InboundFrame {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not JSON or not a JSON object.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let Value::Object(mut object) = serde_json::from_str::<Value>(text)? else {
            return Err(ParseError::UnexpectedFormat(
                "frame is not a JSON object".to_string(),
            ));
        };

        let message_type = object
            .get("messageType")
            .and_then(Value::as_str)
            .map(MessageType::from);
        let device_id = match object.remove("id") {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        let data = object.remove("data").filter(|data| !data.is_null());

        Ok(match (device_id, data) {
            (Some(device_id), Some(data)) => Self::Device {
                message_type,
                device_id,
                data,
            },
            (None, Some(data)) => Self::Connection { message_type, data },
            (_, None) => Self::Unrecognized { message_type },
        })
    }

    /// Expands the frame into the notifications it raises, in emission order.
    #[must_use]
    pub fn into_notifications(self) -> Vec<Notification> {
        match self {
            Self::Device {
                message_type,
                device_id,
                data,
            } => device_notifications(message_type, device_id, data),
            Self::Connection { message_type, data } => {
                connection_notifications(message_type, data)
            }
            Self::Unrecognized { message_type } => {
                tracing::warn!(
                    message_type = message_type.as_ref().map(MessageType::as_str),
                    "Frame has neither id nor data"
                );
                vec![Notification::Unknown {
                    message_type: message_type.map(|t| t.as_str().to_string()),
                    device_id: None,
                    data: None,
                }]
            }
        }
    }
}

fn device_notifications(
    message_type: Option<MessageType>,
    device_id: String,
    data: Value,
) -> Vec<Notification> {
    let mut notifications = vec![Notification::Message {
        device_id: device_id.clone(),
        data: data.clone(),
    }];

    match message_type {
        Some(MessageType::PropertyStatus) => {
            fan_out(&device_id, data, &mut notifications, |device_id, name, value| {
                Notification::PropertyChanged {
                    device_id,
                    name,
                    value,
                }
            });
        }
        Some(MessageType::ActionStatus) => {
            fan_out(&device_id, data, &mut notifications, |device_id, name, value| {
                Notification::ActionTriggered {
                    device_id,
                    name,
                    value,
                }
            });
        }
        Some(MessageType::Event) => {
            fan_out(&device_id, data, &mut notifications, |device_id, name, value| {
                Notification::EventRaised {
                    device_id,
                    name,
                    value,
                }
            });
        }
        Some(MessageType::Connected) => {
            notifications.push(Notification::ConnectStateChanged { device_id, data });
        }
        Some(MessageType::ThingModified) => {
            notifications.push(Notification::DeviceModified { device_id, data });
        }
        Some(MessageType::ThingAdded) => {
            notifications.push(Notification::DeviceAdded { device_id, data });
        }
        Some(MessageType::ThingRemoved) => {
            notifications.push(Notification::DeviceRemoved { device_id, data });
        }
        other => {
            tracing::warn!(
                device_id = %device_id,
                message_type = other.as_ref().map(MessageType::as_str),
                "Unrecognized message type"
            );
            notifications.push(Notification::Unknown {
                message_type: other.map(|t| t.as_str().to_string()),
                device_id: Some(device_id),
                data: Some(data),
            });
        }
    }

    notifications
}

/// Pushes one notification per key of `data`, preserving key order.
fn fan_out<F>(device_id: &str, data: Value, notifications: &mut Vec<Notification>, make: F)
where
    F: Fn(String, String, Value) -> Notification,
{
    let Value::Object(entries) = data else {
        tracing::warn!(device_id = %device_id, "Batched frame data is not an object");
        return;
    };

    notifications.extend(
        entries
            .into_iter()
            .map(|(name, value)| make(device_id.to_string(), name, value)),
    );
}

fn connection_notifications(message_type: Option<MessageType>, data: Value) -> Vec<Notification> {
    if message_type == Some(MessageType::ActionStatus)
        && let Some(value) = single_pair_entry(&data)
    {
        return vec![Notification::Pair {
            value: value.clone(),
        }];
    }

    tracing::warn!(
        message_type = message_type.as_ref().map(MessageType::as_str),
        "Unrecognized connection-scoped frame"
    );
    vec![Notification::Unknown {
        message_type: message_type.map(|t| t.as_str().to_string()),
        device_id: None,
        data: Some(data),
    }]
}

/// Returns the value of `pair` when it is the object's only key.
fn single_pair_entry(data: &Value) -> Option<&Value> {
    let entries: &Map<String, Value> = data.as_object()?;
    if entries.len() == 1 {
        entries.get("pair")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notifications(text: &str) -> Vec<Notification> {
        InboundFrame::parse(text).unwrap().into_notifications()
    }

    #[test]
    fn message_type_round_trip_names() {
        assert_eq!(MessageType::from("propertyStatus"), MessageType::PropertyStatus);
        assert_eq!(MessageType::from("thingAdded").as_str(), "thingAdded");
        assert_eq!(
            MessageType::from("mystery"),
            MessageType::Other("mystery".to_string())
        );
    }

    #[test]
    fn gateway_error_type_is_not_special_cased() {
        assert_eq!(
            MessageType::from("error"),
            MessageType::Other("error".to_string())
        );
    }

    #[test]
    fn property_status_emits_message_then_each_property() {
        let result = notifications(
            r#"{"id":"d1","data":{"a":1,"b":2},"messageType":"propertyStatus"}"#,
        );

        assert_eq!(
            result,
            vec![
                Notification::Message {
                    device_id: "d1".to_string(),
                    data: json!({"a": 1, "b": 2}),
                },
                Notification::PropertyChanged {
                    device_id: "d1".to_string(),
                    name: "a".to_string(),
                    value: json!(1),
                },
                Notification::PropertyChanged {
                    device_id: "d1".to_string(),
                    name: "b".to_string(),
                    value: json!(2),
                },
            ]
        );
    }

    #[test]
    fn fan_out_keeps_received_key_order() {
        let result = notifications(
            r#"{"id":"d1","data":{"zeta":1,"alpha":2,"mid":3},"messageType":"event"}"#,
        );
        let names: Vec<&str> = result
            .iter()
            .filter_map(|n| match n {
                Notification::EventRaised { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn action_status_emits_action_triggered() {
        let result = notifications(
            r#"{"id":"lamp","messageType":"actionStatus","data":{"fade":{"status":"pending"}}}"#,
        );
        assert_eq!(result.len(), 2);
        assert_eq!(
            result[1],
            Notification::ActionTriggered {
                device_id: "lamp".to_string(),
                name: "fade".to_string(),
                value: json!({"status": "pending"}),
            }
        );
    }

    #[test]
    fn connected_passes_whole_payload_once() {
        let result = notifications(r#"{"id":"lamp","messageType":"connected","data":false}"#);
        assert_eq!(
            result,
            vec![
                Notification::Message {
                    device_id: "lamp".to_string(),
                    data: json!(false),
                },
                Notification::ConnectStateChanged {
                    device_id: "lamp".to_string(),
                    data: json!(false),
                },
            ]
        );
    }

    #[test]
    fn thing_lifecycle_frames() {
        let added = notifications(r#"{"id":"x","messageType":"thingAdded","data":{"title":"X"}}"#);
        assert!(matches!(added[1], Notification::DeviceAdded { .. }));

        let modified = notifications(r#"{"id":"x","messageType":"thingModified","data":{}}"#);
        assert!(matches!(modified[1], Notification::DeviceModified { .. }));

        let removed = notifications(r#"{"id":"x","messageType":"thingRemoved","data":{}}"#);
        assert!(matches!(removed[1], Notification::DeviceRemoved { .. }));
    }

    #[test]
    fn unknown_device_message_type_still_emits_message() {
        let result = notifications(r#"{"id":"d1","messageType":"mystery","data":{"a":1}}"#);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name(), "message");
        assert_eq!(
            result[1],
            Notification::Unknown {
                message_type: Some("mystery".to_string()),
                device_id: Some("d1".to_string()),
                data: Some(json!({"a": 1})),
            }
        );
    }

    #[test]
    fn missing_message_type_is_unknown() {
        let result = notifications(r#"{"id":"d1","data":{"a":1}}"#);
        assert!(matches!(
            result[1],
            Notification::Unknown {
                message_type: None,
                ..
            }
        ));
    }

    #[test]
    fn batched_non_object_data_emits_only_message() {
        let result = notifications(r#"{"id":"d1","messageType":"propertyStatus","data":5}"#);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name(), "message");
    }

    #[test]
    fn pair_frame_without_id() {
        let result = notifications(r#"{"data":{"pair":"xyz"},"messageType":"actionStatus"}"#);
        assert_eq!(
            result,
            vec![Notification::Pair {
                value: json!("xyz")
            }]
        );
    }

    #[test]
    fn pair_requires_single_key() {
        let result =
            notifications(r#"{"data":{"pair":"xyz","other":1},"messageType":"actionStatus"}"#);
        assert!(matches!(result[0], Notification::Unknown { .. }));
    }

    #[test]
    fn connection_frame_of_other_type_is_unknown() {
        let result =
            notifications(r#"{"messageType":"error","data":{"status":"400 Bad Request"}}"#);
        assert_eq!(
            result,
            vec![Notification::Unknown {
                message_type: Some("error".to_string()),
                device_id: None,
                data: Some(json!({"status": "400 Bad Request"})),
            }]
        );
    }

    #[test]
    fn frame_without_data_is_unrecognized() {
        let frame = InboundFrame::parse(r#"{"id":"d1","messageType":"connected"}"#).unwrap();
        assert_eq!(
            frame,
            InboundFrame::Unrecognized {
                message_type: Some(MessageType::Connected)
            }
        );
    }

    #[test]
    fn numeric_id_is_accepted() {
        let frame = InboundFrame::parse(r#"{"id":7,"messageType":"connected","data":true}"#)
            .unwrap();
        assert!(matches!(frame, InboundFrame::Device { ref device_id, .. } if device_id == "7"));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            InboundFrame::parse("not json"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(matches!(
            InboundFrame::parse("[1,2,3]"),
            Err(ParseError::UnexpectedFormat(_))
        ));
    }
}
