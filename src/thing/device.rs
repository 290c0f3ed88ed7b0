// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device view.

use serde_json::{Map, Value};

use crate::client::GatewayClient;
use crate::error::{ParseError, Result};
use crate::subscription::SubscriptionRequest;

use super::description::find_link;
use super::{Action, DeviceDescription, Event, Link, Property};

/// A device known to the gateway.
///
/// Obtained from [`GatewayClient::list_devices`] or
/// [`GatewayClient::get_device`].
///
/// # Examples
///
/// ```no_run
/// use webthings_lib::GatewayClient;
/// use serde_json::json;
///
/// # async fn example() -> webthings_lib::Result<()> {
/// let client = GatewayClient::local("my-token").await?;
/// let lamp = client.get_device("lamp").await?;
///
/// if let Some(on) = lamp.property("on") {
///     on.set_value(json!(true)).await?;
/// }
/// if let Some(fade) = lamp.action("fade") {
///     fade.execute(Some(json!({"level": 20, "duration": 1000}))).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Device {
    client: GatewayClient,
    id: String,
    description: DeviceDescription,
}

impl Device {
    /// Builds a view from a JSON description.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the description is malformed or carries
    /// neither `href` nor `id`.
    pub(crate) fn from_value(client: GatewayClient, description: Value) -> Result<Self> {
        let description: DeviceDescription = serde_json::from_value(description)?;
        let id = description
            .href
            .as_deref()
            .or(description.id.as_deref())
            .and_then(last_segment)
            .ok_or_else(|| ParseError::MissingField("href".to_string()))?
            .to_string();

        Ok(Self {
            client,
            id,
            description,
        })
    }

    /// Returns the short device id, as used in channel frames.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.description.title.as_deref()
    }

    /// Returns the semantic capability types.
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.description.types
    }

    /// Returns the device-level links.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.description.links
    }

    /// Returns the full description.
    #[must_use]
    pub fn description(&self) -> &DeviceDescription {
        &self.description
    }

    /// Returns the path of the device resource.
    #[must_use]
    pub fn href(&self) -> String {
        self.description
            .href
            .clone()
            .unwrap_or_else(|| format!("/things/{}", self.id))
    }

    /// Returns a view of the named property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<Property> {
        let description = self.description.properties.get(name)?;
        let href = self.resource_path(&description.links, "property", "properties", name);
        Some(Property::new(
            self.client.clone(),
            name.to_string(),
            href,
            description.clone(),
        ))
    }

    /// Returns views of every property.
    #[must_use]
    pub fn properties(&self) -> Vec<Property> {
        self.description
            .properties
            .keys()
            .filter_map(|name| self.property(name))
            .collect()
    }

    /// Returns a view of the named action.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<Action> {
        let description = self.description.actions.get(name)?;
        let href = self.resource_path(&description.links, "action", "actions", name);
        Some(Action::new(
            self.client.clone(),
            name.to_string(),
            href,
            description.clone(),
        ))
    }

    /// Returns views of every action.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.description
            .actions
            .keys()
            .filter_map(|name| self.action(name))
            .collect()
    }

    /// Returns views of every event.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.description
            .events
            .keys()
            .filter_map(|name| self.event(name))
            .collect()
    }

    /// Returns a view of the named event.
    #[must_use]
    pub fn event(&self, name: &str) -> Option<Event> {
        let description = self.description.events.get(name)?;
        let href = self.resource_path(&description.links, "event", "events", name);
        Some(Event::new(
            self.client.clone(),
            name.to_string(),
            href,
            description.clone(),
        ))
    }

    /// Builds a channel subscription for every event of this device.
    ///
    /// # Errors
    ///
    /// Returns error if an event description cannot be serialized.
    pub fn subscription_request(&self) -> Result<SubscriptionRequest> {
        let mut events = Map::new();
        for (name, description) in &self.description.events {
            events.insert(name.clone(), serde_json::to_value(description)?);
        }
        Ok(SubscriptionRequest::with_events(self.id.clone(), events))
    }

    /// Path of a member resource: its own link, else `{href}/{collection}/{name}`.
    fn resource_path(&self, links: &[Link], rel: &str, collection: &str, name: &str) -> String {
        find_link(links, rel).map_or_else(
            || format!("{}/{collection}/{}", self.href(), urlencoding::encode(name)),
            str::to_string,
        )
    }
}

/// Returns the last non-empty path segment of a path or URL.
fn last_segment(path: &str) -> Option<&str> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}
