// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property view.

use serde_json::Value;

use crate::client::GatewayClient;
use crate::error::{Error, Result};

use super::{PropertyDescription, named, unwrap_named};

/// A readable, possibly writable attribute of a device.
#[derive(Debug, Clone)]
pub struct Property {
    client: GatewayClient,
    name: String,
    href: String,
    description: PropertyDescription,
}

impl Property {
    pub(crate) fn new(
        client: GatewayClient,
        name: String,
        href: String,
        description: PropertyDescription,
    ) -> Self {
        Self {
            client,
            name,
            href,
            description,
        }
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the resource path.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &PropertyDescription {
        &self.description
    }

    /// Returns `true` if the gateway rejects writes.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.description.read_only
    }

    /// Reads the current value.
    ///
    /// # Errors
    ///
    /// Returns a request error, or a parse error if the answer does not
    /// carry the property.
    pub async fn value(&self) -> Result<Value> {
        let body = self.client.get(&self.href).await?;
        unwrap_named(body, &self.name)
    }

    /// Writes a new value and returns the value the gateway reports back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnlyProperty`] without sending anything for
    /// read-only properties, otherwise a request or parse error.
    pub async fn set_value(&self, value: Value) -> Result<Value> {
        if self.is_read_only() {
            return Err(Error::ReadOnlyProperty(self.name.clone()));
        }

        tracing::debug!(property = %self.name, href = %self.href, "Writing property");

        let body = self.client.put(&self.href, named(&self.name, value)).await?;
        unwrap_named(body, &self.name)
    }
}
