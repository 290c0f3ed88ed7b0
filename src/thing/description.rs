// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serde models of the gateway's device descriptions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Relation, e.g. `property`, `properties`, `actions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    /// Target path or URL.
    pub href: String,
    /// Media type of the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// Returns the `href` of the first link with relation `rel`.
pub(crate) fn find_link<'a>(links: &'a [Link], rel: &str) -> Option<&'a str> {
    links
        .iter()
        .find(|link| link.rel.as_deref() == Some(rel))
        .map(|link| link.href.as_str())
}

/// A device as described by `GET /things/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    /// Device identifier, often an absolute URL.
    #[serde(default)]
    pub id: Option<String>,
    /// Path of the device resource, e.g. `/things/lamp`.
    #[serde(default)]
    pub href: Option<String>,
    /// Human-readable name.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Semantic capability types.
    #[serde(rename = "@type", default)]
    pub types: Vec<String>,
    /// Device-level links.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Properties keyed by name.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDescription>,
    /// Actions keyed by name.
    #[serde(default)]
    pub actions: BTreeMap<String, ActionDescription>,
    /// Events keyed by name.
    #[serde(default)]
    pub events: BTreeMap<String, EventDescription>,
}

/// A property description.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescription {
    /// Human-readable name.
    #[serde(default)]
    pub title: Option<String>,
    /// JSON type of the value (`boolean`, `number`, ...).
    #[serde(rename = "type", default)]
    pub value_type: Option<String>,
    /// Unit of numeric values.
    #[serde(default)]
    pub unit: Option<String>,
    /// Whether writes are rejected.
    #[serde(default)]
    pub read_only: bool,
    /// Property links.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// An action description.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescription {
    /// Human-readable name.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// JSON schema of the input.
    #[serde(default)]
    pub input: Option<Value>,
    /// Action links.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// An event description.
///
/// Unknown fields are kept so the description can be echoed back
/// verbatim in a subscription request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDescription {
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// JSON type of the event data.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Event links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_device_description() {
        let description: DeviceDescription = serde_json::from_value(json!({
            "id": "http://localhost:8080/things/lamp",
            "href": "/things/lamp",
            "title": "Lamp",
            "@type": ["Light", "OnOffSwitch"],
            "links": [{"rel": "properties", "href": "/things/lamp/properties"}],
            "properties": {
                "on": {
                    "type": "boolean",
                    "links": [{"rel": "property", "href": "/things/lamp/properties/on"}]
                },
                "power": {"type": "number", "unit": "watt", "readOnly": true}
            },
            "actions": {"fade": {"input": {"type": "object"}}},
            "events": {"overheated": {"type": "number", "unit": "degree celsius"}}
        }))
        .unwrap();

        assert_eq!(description.title.as_deref(), Some("Lamp"));
        assert_eq!(description.types, vec!["Light", "OnOffSwitch"]);
        assert!(description.properties["power"].read_only);
        assert_eq!(
            find_link(&description.properties["on"].links, "property"),
            Some("/things/lamp/properties/on")
        );
        assert!(description.actions["fade"].input.is_some());
        assert_eq!(
            description.events["overheated"].extra.get("unit"),
            Some(&json!("degree celsius"))
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let description: DeviceDescription =
            serde_json::from_value(json!({"href": "/things/x"})).unwrap();
        assert!(description.properties.is_empty());
        assert!(description.links.is_empty());
    }

    #[test]
    fn event_description_round_trips_unknown_fields() {
        let raw = json!({"type": "number", "unit": "degree celsius", "minimum": 0});
        let description: EventDescription = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&description).unwrap(), raw);
    }

    #[test]
    fn find_link_by_rel() {
        let links = vec![
            Link {
                rel: Some("properties".to_string()),
                href: "/p".to_string(),
                media_type: None,
            },
            Link {
                rel: Some("actions".to_string()),
                href: "/a".to_string(),
                media_type: None,
            },
        ];
        assert_eq!(find_link(&links, "actions"), Some("/a"));
        assert_eq!(find_link(&links, "events"), None);
    }
}
