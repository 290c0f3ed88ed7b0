// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event subscription requests sent over the channel.

use serde_json::{Map, Value};

use crate::protocol::OutboundMessage;

/// Request to receive a device's events over the channel.
///
/// Without a subscription the gateway only pushes property, action and
/// connection updates; `event` frames are sent for subscribed events only.
///
/// # Examples
///
/// ```
/// use webthings_lib::subscription::SubscriptionRequest;
/// use serde_json::json;
///
/// let request = SubscriptionRequest::new("lamp")
///     .with_event("overheated", json!({"type": "number", "unit": "degree celsius"}));
///
/// assert_eq!(request.device_id(), "lamp");
/// assert_eq!(request.events().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRequest {
    device_id: String,
    events: Map<String, Value>,
}

impl SubscriptionRequest {
    /// Creates an empty request for `device_id`.
    #[must_use]
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            events: Map::new(),
        }
    }

    /// Creates a request from an existing name → descriptor mapping.
    #[must_use]
    pub fn with_events(device_id: impl Into<String>, events: Map<String, Value>) -> Self {
        Self {
            device_id: device_id.into(),
            events,
        }
    }

    /// Adds one event by name.
    #[must_use]
    pub fn with_event(mut self, name: impl Into<String>, descriptor: Value) -> Self {
        self.events.insert(name.into(), descriptor);
        self
    }

    /// Returns the device id.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the requested events, keyed by name.
    #[must_use]
    pub fn events(&self) -> &Map<String, Value> {
        &self.events
    }
}

impl From<SubscriptionRequest> for OutboundMessage {
    fn from(request: SubscriptionRequest) -> Self {
        Self::AddEventSubscription {
            device_id: request.device_id,
            events: request.events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_keep_insertion_order() {
        let request = SubscriptionRequest::new("d")
            .with_event("z", json!({}))
            .with_event("a", json!({}));
        let names: Vec<&String> = request.events().keys().collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn converts_to_outbound_message() {
        let request = SubscriptionRequest::new("lamp").with_event("ping", json!({}));
        let message: OutboundMessage = request.into();
        assert_eq!(
            message.to_frame().unwrap(),
            r#"{"messageType":"addEventSubscription","id":"lamp","data":{"ping":{}}}"#
        );
    }
}
