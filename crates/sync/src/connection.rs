// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection lifecycle management for the server event channel.
//!
//! One [`ConnectionManager`] owns at most one live transport at a time
//! and drives it through a state machine: `Idle → Connecting → Connected`,
//! re-entering `Connecting` through `Reconnecting` with exponential
//! backoff on unexpected closure, terminating in `Exhausted` after too
//! many failures or in `Disposed` on explicit teardown.
//!
//! Decoded events fan out through a broadcast channel in wire order
//! within one connection epoch. Across epochs there is no ordering
//! guarantee; consumers recover from the gap via cache invalidation and
//! refetch, not event replay.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tl_core::protocol::ClientMessage;
use tl_core::EventEnvelope;

use crate::error::SyncError;
use crate::transport::{Transport, WebSocketTransport};

/// Capacity of the decoded-event broadcast channel.
///
/// A subscriber that falls further behind than this sees a `Lagged`
/// error from its receiver and must treat it like a reconnect gap.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// State of the event channel connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, never started.
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// Live connection; events are flowing.
    Connected,
    /// Waiting out the backoff delay before attempt `attempt`.
    Reconnecting { attempt: u32 },
    /// Gave up after the configured number of attempts. Terminal unless
    /// the user asks for a manual [`ConnectionManager::reconnect`].
    Exhausted,
    /// Torn down on purpose. No outgoing transitions.
    Disposed,
}

/// Configuration for the connection manager.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Event channel endpoint.
    pub url: String,
    /// Failed attempts tolerated before giving up.
    pub max_attempts: u32,
    /// First backoff delay (milliseconds).
    pub base_delay_ms: u64,
    /// Growth factor applied per failed attempt.
    pub backoff_multiplier: f64,
    /// Ceiling on the backoff delay (milliseconds).
    pub max_delay_ms: u64,
    /// Send a keepalive probe immediately after the connection opens.
    pub probe_on_open: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:7411/events".to_string(),
            max_attempts: 10,
            base_delay_ms: 1000,
            backoff_multiplier: 1.5,
            max_delay_ms: 30_000,
            probe_on_open: true,
        }
    }
}

/// Compute the backoff delay before retry number `attempt + 1`.
///
/// `delay(0)` is the base delay; the sequence is non-decreasing and
/// capped at `max_delay_ms`.
// CORRECTNESS: the exponent is clamped so `powi` stays finite, and the
// product is capped at max_delay_ms before the cast back to integer ms
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn backoff_delay(config: &ConnectionConfig, attempt: u32) -> Duration {
    let exponent = attempt.min(60) as i32;
    let raw = (config.base_delay_ms as f64) * config.backoff_multiplier.powi(exponent);
    let capped = raw.min(config.max_delay_ms as f64);
    Duration::from_millis(capped as u64)
}

/// Commands from the public API to the driver task.
enum Command {
    /// Force-close the live connection and re-enter the reconnect path.
    ForceClose,
    /// Skip any pending backoff delay and retry immediately.
    SkipBackoff,
}

/// How the connected read loop ended.
enum ReadExit {
    /// `dispose()` was called (or the manager dropped).
    Disposed,
    /// The transport errored or the peer closed.
    ConnectionLost,
    /// Manual `reconnect()` while connected.
    ForcedClose,
}

/// Manages the single long-lived connection to the server event channel.
///
/// The manager spawns one driver task that owns the transport. Fresh
/// transports come from the factory on every attempt; closed handles are
/// never reused. Subscribers receive decoded [`EventEnvelope`]s and
/// [`ConnectionState`] transitions; neither can send or close the
/// transport.
pub struct ConnectionManager<T, F>
where
    T: Transport + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    config: ConnectionConfig,
    make_transport: Arc<F>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    event_tx: broadcast::Sender<EventEnvelope>,
    /// Command channel into the currently running driver, if any.
    cmd_tx: Mutex<Option<mpsc::UnboundedSender<Command>>>,
    cancel: CancellationToken,
}

impl ConnectionManager<WebSocketTransport, fn() -> WebSocketTransport> {
    /// Create a manager backed by real WebSocket transports.
    pub fn websocket(config: ConnectionConfig) -> Self {
        ConnectionManager::with_transport_factory(
            config,
            WebSocketTransport::new as fn() -> WebSocketTransport,
        )
    }
}

impl<T, F> ConnectionManager<T, F>
where
    T: Transport + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    /// Create a manager with a custom transport factory (for testing).
    pub fn with_transport_factory(config: ConnectionConfig, make_transport: F) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        ConnectionManager {
            config,
            make_transport: Arc::new(make_transport),
            state_tx: Arc::new(state_tx),
            event_tx,
            cmd_tx: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to decoded events.
    ///
    /// Within one connection epoch, events arrive in wire order.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.event_tx.subscribe()
    }

    /// Watch connection state transitions (for UI status indicators).
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Begin connecting. No-op unless `Idle`.
    pub fn start(&self) {
        if self.state() != ConnectionState::Idle {
            return;
        }
        self.spawn_driver();
    }

    /// Manually reconnect. User-initiated, so never throttled.
    ///
    /// When connected, force-closes the live connection so the normal
    /// close-then-reconnect path runs deterministically. When waiting in
    /// backoff, retries immediately. From `Exhausted`, starts over.
    pub fn reconnect(&self) {
        match self.state() {
            ConnectionState::Disposed => {}
            ConnectionState::Connected => self.send_command(Command::ForceClose),
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. } => {
                self.send_command(Command::SkipBackoff);
            }
            ConnectionState::Idle | ConnectionState::Exhausted => self.spawn_driver(),
        }
    }

    /// Tear down: cancel any pending reconnect timer and close the
    /// transport. Idempotent; no transitions are possible afterwards.
    pub fn dispose(&self) {
        publish_state(&self.state_tx, ConnectionState::Disposed);
        self.cancel.cancel();
    }

    /// Wait until the manager is connected.
    ///
    /// Errors when the manager gives up ([`SyncError::Exhausted`]) or is
    /// torn down ([`SyncError::Disposed`]) first.
    pub async fn wait_until_connected(&self) -> Result<(), SyncError> {
        let mut rx = self.state_tx.subscribe();
        loop {
            match *rx.borrow_and_update() {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Exhausted => {
                    return Err(SyncError::Exhausted {
                        attempts: self.config.max_attempts,
                    })
                }
                ConnectionState::Disposed => return Err(SyncError::Disposed),
                _ => {}
            }
            if rx.changed().await.is_err() {
                return Err(SyncError::Disposed);
            }
        }
    }

    fn send_command(&self, cmd: Command) {
        if let Ok(guard) = self.cmd_tx.lock() {
            if let Some(tx) = guard.as_ref() {
                let _ = tx.send(cmd);
            }
        }
    }

    fn spawn_driver(&self) {
        // Publish Connecting before the task is scheduled so a second
        // start() observes the transition and stays a no-op.
        publish_state(&self.state_tx, ConnectionState::Connecting);

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        if let Ok(mut guard) = self.cmd_tx.lock() {
            *guard = Some(cmd_tx);
        }

        let config = self.config.clone();
        let make_transport = Arc::clone(&self.make_transport);
        let state_tx = Arc::clone(&self.state_tx);
        let event_tx = self.event_tx.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            run_driver(config, make_transport, state_tx, event_tx, cmd_rx, cancel).await;
        });
    }
}

impl<T, F> Drop for ConnectionManager<T, F>
where
    T: Transport + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    fn drop(&mut self) {
        // The manager is the connection's only owner; dropping it must
        // not leave a driver task reconnecting forever.
        self.cancel.cancel();
    }
}

/// Publish a state transition. `Disposed` is terminal: once set, every
/// later transition is refused, which is what makes transport callbacks
/// and timer fires after `dispose()` harmless.
fn publish_state(state_tx: &watch::Sender<ConnectionState>, next: ConnectionState) {
    state_tx.send_if_modified(|current| {
        if *current == ConnectionState::Disposed || *current == next {
            return false;
        }
        *current = next;
        true
    });
}

/// The driver task: owns the transport, runs the state machine.
async fn run_driver<T, F>(
    config: ConnectionConfig,
    make_transport: Arc<F>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    event_tx: broadcast::Sender<EventEnvelope>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    cancel: CancellationToken,
) where
    T: Transport + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    // Failed attempts in the current disconnected stretch. Reset on
    // every successful open.
    let mut attempt: u32 = 0;
    let mut probe_id: u64 = 0;
    // When the last event was decoded, across epochs. Drives the
    // catch-up hint after a reconnect gap.
    let mut last_seen: Option<DateTime<Utc>> = None;

    loop {
        if cancel.is_cancelled() {
            return;
        }
        publish_state(&state_tx, ConnectionState::Connecting);

        // Fresh transport per attempt; closed handles are never reused.
        let mut transport = (*make_transport)();

        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = transport.connect(&config.url) => result,
        };

        match connected {
            Ok(()) => {
                attempt = 0;
                publish_state(&state_tx, ConnectionState::Connected);
                info!("connected to {}", config.url);

                let mut healthy = true;
                if config.probe_on_open {
                    probe_id = probe_id.wrapping_add(1);
                    if let Err(e) = transport.send(ClientMessage::probe(probe_id)).await {
                        // Fail fast on a dead socket instead of waiting
                        // for the platform's own timeout.
                        warn!("keepalive probe failed: {}", e);
                        healthy = false;
                    }
                }

                if healthy {
                    if let Some(since) = last_seen {
                        // Best-effort catch-up hint; the real gap recovery
                        // is idempotent invalidation and refetch.
                        if let Err(e) = transport.send(ClientMessage::resync(since)).await {
                            warn!("resync hint failed: {}", e);
                            healthy = false;
                        }
                    }
                }

                if healthy {
                    match read_loop(&mut transport, &event_tx, &mut cmd_rx, &mut last_seen, &cancel)
                        .await
                    {
                        ReadExit::Disposed => {
                            let _ = transport.disconnect().await;
                            return;
                        }
                        ReadExit::ConnectionLost | ReadExit::ForcedClose => {}
                    }
                }
                let _ = transport.disconnect().await;
            }
            Err(e) => {
                debug!("connect attempt failed: {}", e);
            }
        }

        // Close-then-reconnect path, shared by failed connects, lost
        // connections, and forced closes.
        attempt = attempt.saturating_add(1);
        if attempt > config.max_attempts {
            warn!(
                "giving up on {} after {} attempts",
                config.url, config.max_attempts
            );
            publish_state(&state_tx, ConnectionState::Exhausted);
            return;
        }
        publish_state(&state_tx, ConnectionState::Reconnecting { attempt });

        let delay = backoff_delay(&config, attempt - 1);
        debug!("reconnect attempt {} in {:?}", attempt, delay);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
            cmd = cmd_rx.recv() => {
                match cmd {
                    // Manual reconnect: skip the rest of the delay.
                    Some(Command::SkipBackoff) | Some(Command::ForceClose) => {}
                    None => return,
                }
            }
        }
    }
}

/// Pump frames off a live connection until it ends.
async fn read_loop<T: Transport>(
    transport: &mut T,
    event_tx: &broadcast::Sender<EventEnvelope>,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    last_seen: &mut Option<DateTime<Utc>>,
    cancel: &CancellationToken,
) -> ReadExit {
    loop {
        // Biased: disposal must win over a frame that is also ready, or
        // a subscriber could observe an event after dispose().
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return ReadExit::Disposed,
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(Command::ForceClose) => return ReadExit::ForcedClose,
                    // Nothing is pending while connected.
                    Some(Command::SkipBackoff) => {}
                    None => return ReadExit::Disposed,
                }
            }
            frame = transport.recv() => {
                match frame {
                    Ok(Some(raw)) => match EventEnvelope::decode(&raw) {
                        Ok(envelope) => {
                            *last_seen = Some(Utc::now());
                            // Subscribers see wire order; a send with no
                            // receivers is fine.
                            let _ = event_tx.send(envelope);
                        }
                        Err(e) => {
                            // Final for this frame; never redelivered.
                            warn!("dropping undecodable frame: {}", e);
                        }
                    },
                    Ok(None) => {
                        info!("server closed the event channel");
                        return ReadExit::ConnectionLost;
                    }
                    Err(e) => {
                        warn!("receive failed: {}", e);
                        return ReadExit::ConnectionLost;
                    }
                }
            }
        }
    }
}
