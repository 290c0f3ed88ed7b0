// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed views over the gateway's device descriptions.
//!
//! A [`Device`] wraps the JSON description returned by the gateway and
//! hands out [`Property`], [`Action`] and [`Event`] views. Every read or
//! write goes through the [`GatewayClient`](crate::GatewayClient) the
//! device was fetched with; the views hold no state of their own.

mod action;
mod description;
mod device;
mod event;
mod property;

pub use action::Action;
pub use description::{
    ActionDescription, DeviceDescription, EventDescription, Link, PropertyDescription,
};
pub use device::Device;
pub use event::Event;
pub use property::Property;

use serde_json::{Map, Value};

use crate::error::{ParseError, Result};

/// Wraps `value` as `{name: value}`, the gateway's envelope for writes.
fn named(name: &str, value: Value) -> Value {
    let mut envelope = Map::new();
    envelope.insert(name.to_string(), value);
    Value::Object(envelope)
}

/// Unwraps `{name: value}`.
fn unwrap_named(body: Value, name: &str) -> Result<Value> {
    match body {
        Value::Object(mut envelope) => envelope
            .remove(name)
            .ok_or_else(|| ParseError::MissingField(name.to_string()).into()),
        other => Err(ParseError::UnexpectedFormat(format!(
            "expected an object keyed by {name}, got {other}"
        ))
        .into()),
    }
}

/// Requires a JSON array.
fn into_list(body: Value, what: &str) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        _ => Err(ParseError::UnexpectedFormat(format!("{what} is not an array")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn named_envelope() {
        assert_eq!(named("on", json!(true)), json!({"on": true}));
    }

    #[test]
    fn unwrap_named_value() {
        assert_eq!(unwrap_named(json!({"level": 5}), "level").unwrap(), json!(5));
    }

    #[test]
    fn unwrap_named_missing_field() {
        let err = unwrap_named(json!({"other": 5}), "level").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::MissingField(ref f)) if f == "level"));
    }

    #[test]
    fn unwrap_named_rejects_non_object() {
        let err = unwrap_named(json!(5), "level").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::UnexpectedFormat(_))));
    }

    #[test]
    fn into_list_requires_array() {
        assert_eq!(into_list(json!([1, 2]), "x").unwrap().len(), 2);
        assert!(into_list(json!({}), "x").is_err());
    }
}
