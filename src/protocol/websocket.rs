// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Streaming channel over a persistent WebSocket.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};

use crate::discovery::ConnectionDescriptor;
use crate::error::{Error, Result};
use crate::event::{InboundFrame, Notification, NotificationBus};
use crate::protocol::OutboundMessage;
use crate::protocol::tls;
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId, SubscriptionRequest};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// How long `disconnect` waits for the gateway to acknowledge the close.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of a [`Channel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No socket; `connect` may be called.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Socket open; frames are dispatched.
    Connected,
    /// The socket failed. Terminal: a new channel is needed.
    Failed,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        })
    }
}

/// Persistent notification channel to the gateway.
///
/// The channel owns at most one socket. The write half is used by
/// [`send`](Self::send); the read half is owned by a background task that
/// parses each text frame and dispatches its notifications, strictly in
/// arrival order, to the registered listeners and then to every
/// [`subscribe`](Self::subscribe) receiver.
///
/// No reconnection happens automatically. After a clean disconnect the
/// same channel may connect again; after a transport failure the channel
/// is [`ChannelState::Failed`] and a new one must be created.
///
/// # Examples
///
/// ```no_run
/// use webthings_lib::GatewayClient;
/// use webthings_lib::subscription::{Subscribable, SubscriptionRequest};
///
/// # async fn example() -> webthings_lib::Result<()> {
/// let client = GatewayClient::local("my-token").await?;
/// let channel = client.channel();
///
/// channel.on_property_changed(|device, name, value| {
///     println!("{device}: {name} -> {value}");
/// });
///
/// channel.connect().await?;
/// channel
///     .send(SubscriptionRequest::new("lamp").with_event("overheated", serde_json::json!({})))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Channel {
    descriptor: Arc<ConnectionDescriptor>,
    state: Arc<RwLock<ChannelState>>,
    sink: tokio::sync::Mutex<Option<WsSink>>,
    dispatcher: Dispatcher,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl Channel {
    /// Creates a disconnected channel for the gateway described by `descriptor`.
    #[must_use]
    pub fn new(descriptor: Arc<ConnectionDescriptor>) -> Self {
        Self {
            descriptor,
            state: Arc::new(RwLock::new(ChannelState::Disconnected)),
            sink: tokio::sync::Mutex::new(None),
            dispatcher: Dispatcher {
                listeners: Arc::new(CallbackRegistry::new()),
                bus: NotificationBus::new(),
            },
            reader: Mutex::new(None),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        *self.state.read()
    }

    /// Returns `true` while the socket is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ChannelState::Connected
    }

    /// Receives every notification from now on, for async consumers.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.dispatcher.bus.subscribe()
    }

    /// Opens the socket and starts dispatching frames.
    ///
    /// Resolves once the WebSocket handshake completes. Dropping the
    /// returned future mid-handshake abandons the attempt and returns the
    /// channel to `Disconnected`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidChannelState`] unless the channel is `Disconnected`
    /// - [`Error::Protocol`] if the handshake fails; the channel is then
    ///   `Disconnected` again and `connect` may be retried
    pub async fn connect(&self) -> Result<()> {
        let guard = self.begin_connect()?;

        let stream = match self.open().await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(
                    address = %self.descriptor.address(),
                    port = self.descriptor.port(),
                    error = %e,
                    "Channel connection failed"
                );
                return Err(e);
            }
        };

        let (sink, stream) = stream.split();
        *self.sink.lock().await = Some(sink);
        *self.state.write() = ChannelState::Connected;
        guard.disarm();

        let handle = tokio::spawn(read_frames(
            stream,
            self.dispatcher.clone(),
            Arc::clone(&self.state),
        ));
        if let Some(previous) = self.reader.lock().replace(handle) {
            previous.abort();
        }

        tracing::debug!(
            address = %self.descriptor.address(),
            port = self.descriptor.port(),
            "Channel connected"
        );
        Ok(())
    }

    fn begin_connect(&self) -> Result<ConnectingGuard<'_>> {
        let mut state = self.state.write();
        if *state != ChannelState::Disconnected {
            return Err(Error::InvalidChannelState(*state));
        }
        *state = ChannelState::Connecting;
        Ok(ConnectingGuard {
            state: &self.state,
            armed: true,
        })
    }

    async fn open(&self) -> Result<WsStream> {
        let connector = tls::connector_for(&self.descriptor)?;
        let (stream, response) =
            connect_async_tls_with_config(self.descriptor.websocket_url(), None, false, connector)
                .await?;

        tracing::debug!(status = ?response.status(), "WebSocket handshake complete");
        Ok(stream)
    }

    /// Sends an event subscription request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] unless connected, without writing
    /// anything, or a protocol error if the write fails.
    pub async fn send(&self, request: SubscriptionRequest) -> Result<()> {
        self.send_message(request.into()).await
    }

    /// Sends any outbound frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] unless connected, without writing
    /// anything, or a protocol error if the write fails.
    pub async fn send_message(&self, message: OutboundMessage) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let frame = message.to_frame()?;
        let mut sink = self.sink.lock().await;
        let sink = sink.as_mut().ok_or(Error::NotConnected)?;

        tracing::debug!(
            message_type = %message.message_type(),
            device_id = %message.device_id(),
            "Sending channel frame"
        );
        sink.send(Message::text(frame)).await?;
        Ok(())
    }

    /// Closes the socket.
    ///
    /// Waits for the reader task to observe the close, so the `close`
    /// notification has been delivered when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] unless connected, or a protocol
    /// error if the close frame cannot be written.
    pub async fn disconnect(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let sink = self.sink.lock().await.take();
        let Some(mut sink) = sink else {
            return Err(Error::NotConnected);
        };
        sink.close().await?;

        let reader = self.reader.lock().take();
        if let Some(mut reader) = reader
            && tokio::time::timeout(CLOSE_TIMEOUT, &mut reader).await.is_err()
        {
            reader.abort();
            tracing::warn!("Gateway did not acknowledge close in time");
            *self.state.write() = ChannelState::Disconnected;
            self.dispatcher.emit(Notification::Close);
        }
        Ok(())
    }
}

/// Returns a `Connecting` channel to `Disconnected` unless disarmed.
///
/// Covers both a failed handshake and a `connect` future dropped mid-await.
struct ConnectingGuard<'a> {
    state: &'a RwLock<ChannelState>,
    armed: bool,
}

impl ConnectingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.write();
        if *state == ChannelState::Connecting {
            *state = ChannelState::Disconnected;
            tracing::debug!("Abandoned channel connection attempt");
        }
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.get_mut().take() {
            reader.abort();
        }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("descriptor", &self.descriptor)
            .field("state", &self.state())
            .field("listeners", &self.dispatcher.listeners)
            .finish_non_exhaustive()
    }
}

/// Forwards listener registration to the channel's registry.
macro_rules! forward_listeners {
    ($($method:ident($($arg:ty),*);)*) => {
        $(
            fn $method<F>(&self, callback: F) -> SubscriptionId
            where
                F: Fn($($arg),*) + Send + Sync + 'static,
            {
                self.dispatcher.listeners.$method(callback)
            }
        )*
    };
}

impl Subscribable for Channel {
    forward_listeners! {
        on_notification(&Notification);
        on_message(&str, &Value);
        on_property_changed(&str, &str, &Value);
        on_action_triggered(&str, &str, &Value);
        on_event_raised(&str, &str, &Value);
        on_connect_state_changed(&str, &Value);
        on_device_modified(&str, &Value);
        on_device_added(&str, &Value);
        on_device_removed(&str, &Value);
        on_pair(&Value);
        on_error(&str);
        on_close();
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.dispatcher.listeners.unsubscribe(id)
    }
}

/// Delivers notifications to listeners, then to bus subscribers.
#[derive(Debug, Clone)]
struct Dispatcher {
    listeners: Arc<CallbackRegistry>,
    bus: NotificationBus,
}

impl Dispatcher {
    fn dispatch_text(&self, text: &str) {
        match InboundFrame::parse(text) {
            Ok(frame) => {
                for notification in frame.into_notifications() {
                    self.emit(notification);
                }
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring malformed frame"),
        }
    }

    fn emit(&self, notification: Notification) {
        self.listeners.dispatch(&notification);
        self.bus.publish(notification);
    }
}

/// Reads frames until the socket closes or fails.
async fn read_frames(
    mut stream: SplitStream<WsStream>,
    dispatcher: Dispatcher,
    state: Arc<RwLock<ChannelState>>,
) {
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => dispatcher.dispatch_text(text.as_str()),
            Ok(Message::Close(frame)) => tracing::debug!(?frame, "Close frame received"),
            Ok(_) => {}
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Channel transport error");
                *state.write() = ChannelState::Failed;
                dispatcher.emit(Notification::Error {
                    reason: e.to_string(),
                });
                dispatcher.emit(Notification::Close);
                return;
            }
        }
    }

    *state.write() = ChannelState::Disconnected;
    dispatcher.emit(Notification::Close);
}
