// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event view.

use serde_json::Value;

use crate::client::GatewayClient;
use crate::error::Result;

use super::{EventDescription, into_list};

/// An occurrence a device can raise.
///
/// Live occurrences arrive over the channel after subscribing with
/// [`Device::subscription_request`](super::Device::subscription_request);
/// this view reads the gateway's log of past ones.
#[derive(Debug, Clone)]
pub struct Event {
    client: GatewayClient,
    name: String,
    href: String,
    description: EventDescription,
}

impl Event {
    pub(crate) fn new(
        client: GatewayClient,
        name: String,
        href: String,
        description: EventDescription,
    ) -> Self {
        Self {
            client,
            name,
            href,
            description,
        }
    }

    /// Returns the event name.
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
    pub fn description(&self) -> &EventDescription {
        &self.description
    }

    /// Lists past occurrences of this event.
    ///
    /// # Errors
    ///
    /// Returns a request error, or a parse error if the answer is not a list.
    pub async fn history(&self) -> Result<Vec<Value>> {
        let body = self.client.get(&self.href).await?;
        into_list(body, "event history")
    }
}
