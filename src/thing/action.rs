// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Action view.

use serde_json::{Map, Value};

use crate::client::GatewayClient;
use crate::error::Result;

use super::{ActionDescription, into_list, named};

/// An invocable operation of a device.
#[derive(Debug, Clone)]
pub struct Action {
    client: GatewayClient,
    name: String,
    href: String,
    description: ActionDescription,
}

impl Action {
    pub(crate) fn new(
        client: GatewayClient,
        name: String,
        href: String,
        description: ActionDescription,
    ) -> Self {
        Self {
            client,
            name,
            href,
            description,
        }
    }

    /// Returns the action name.
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
    pub fn description(&self) -> &ActionDescription {
        &self.description
    }

    /// Requests the action, returning the gateway's action request.
    ///
    /// The answer is `{name: {"input": …, "href": …, "status": …}}`; the
    /// inner request is returned when present, the whole answer otherwise.
    ///
    /// # Errors
    ///
    /// Returns a request error.
    pub async fn execute(&self, input: Option<Value>) -> Result<Value> {
        let mut request = Map::new();
        if let Some(input) = input {
            request.insert("input".to_string(), input);
        }

        tracing::debug!(action = %self.name, href = %self.href, "Requesting action");

        let body = self
            .client
            .post(&self.href, named(&self.name, Value::Object(request)))
            .await?;

        Ok(match body {
            Value::Object(mut envelope) if envelope.contains_key(&self.name) => {
                envelope.remove(&self.name).unwrap_or(Value::Null)
            }
            other => other,
        })
    }

    /// Lists the pending and recent requests of this action.
    ///
    /// # Errors
    ///
    /// Returns a request error, or a parse error if the answer is not a list.
    pub async fn requests(&self) -> Result<Vec<Value>> {
        let body = self.client.get(&self.href).await?;
        into_list(body, "action request list")
    }

    /// Cancels an action request by its `href`.
    ///
    /// # Errors
    ///
    /// Returns a request error.
    pub async fn cancel(&self, request_href: &str) -> Result<()> {
        self.client.delete(request_href).await
    }
}
