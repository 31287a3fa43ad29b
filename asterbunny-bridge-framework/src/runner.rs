//! Bridge runner for lifecycle management.

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::footprint::MemoryProbe;
use crate::manager::ManagerConnection;
use crate::notifier::{Notifier, notify_failure};
use crate::publisher::BrokerPublisher;
use crate::signal::shutdown_requested;
use crate::{Format, HeartbeatConfig, ManagerAction, ManagerMessage, NotifyConfig, OutboundMessage};

/// Idle and heartbeat counters of the bridge loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopState {
    /// Ticks since the last event or heartbeat.
    pub idle_ticks: u32,
    /// Heartbeats sent since the last event. Only used for elapsed-time reporting.
    pub heartbeat_intervals: u32,
}

impl LoopState {
    /// Count one idle tick. Returns `true` when `threshold` is reached, in
    /// which case the idle counter restarts and a new interval begins.
    pub fn tick(&mut self, threshold: u32) -> bool {
        self.idle_ticks += 1;
        if self.idle_ticks >= threshold {
            self.idle_ticks = 0;
            self.heartbeat_intervals += 1;
            true
        } else {
            false
        }
    }

    /// An event was forwarded.
    pub fn record_event(&mut self) {
        self.idle_ticks = 0;
        self.heartbeat_intervals = 0;
    }

    /// A heartbeat succeeded.
    pub fn record_heartbeat(&mut self) {
        self.idle_ticks = 0;
    }
}

/// Settings the runner takes from the bridge configuration.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub notify: NotifyConfig,
    pub heartbeat: HeartbeatConfig,
    pub format: Format,
}

impl RunnerOptions {
    pub fn from_config<C: BridgeConfig>(config: &C) -> Self {
        Self {
            notify: config.notify().clone(),
            heartbeat: *config.heartbeat(),
            format: config.amqp().serialization,
        }
    }
}

/// Bridge runner that owns both connections for the life of the process.
///
/// Handles:
/// - Opening the manager connection and the broker (with failure alerts)
/// - Forwarding every event to the exchange, in arrival order
/// - Heartbeats after a quiet period, republished as synthetic events
/// - Graceful shutdown when the shutdown flag is set
/// - Cleanup, alerting and error propagation when anything fails
///
/// # Example
///
/// ```ignore
/// let options = RunnerOptions::from_config(&config);
/// let runner = BridgeRunner::start("ami", client, publisher, notifier, options).await?;
/// runner.run(spawn_signal_listener()).await
/// ```
pub struct BridgeRunner<M, P, N> {
    /// Bridge name for logging and alerts.
    name: String,
    manager: M,
    publisher: P,
    notifier: N,
    options: RunnerOptions,
    state: LoopState,
    memory: MemoryProbe,
    /// Messages published so far.
    published: u64,
    closed: bool,
}

impl<M, P, N> BridgeRunner<M, P, N>
where
    M: ManagerConnection,
    P: BrokerPublisher,
    N: Notifier,
{
    /// Open both connections.
    ///
    /// Each failure alerts the operators and is returned as-is. A manager
    /// connection opened before a broker failure is dropped without logoff.
    pub async fn start(
        name: impl Into<String>,
        mut manager: M,
        mut publisher: P,
        notifier: N,
        options: RunnerOptions,
    ) -> Result<Self> {
        let name = name.into();

        info!(bridge = %name, version = env!("CARGO_PKG_VERSION"), "Starting bridge");

        info!(endpoint = %manager.endpoint(), "Opening manager connection...");
        if let Err(e) = manager.open().await {
            error!(error = %e, "Unable to open manager connection");
            notify_failure(
                &notifier,
                &options.notify,
                &name,
                "Unable to open manager connection",
                &e.to_string(),
            )
            .await;
            return Err(e);
        }
        info!(endpoint = %manager.endpoint(), "Manager connection open");

        info!(exchange = %publisher.exchange(), "Opening broker connection...");
        if let Err(e) = publisher.open().await {
            error!(error = %e, "Unable to open broker connection");
            notify_failure(
                &notifier,
                &options.notify,
                &name,
                "Unable to open broker connection",
                &e.to_string(),
            )
            .await;
            return Err(e);
        }
        info!(exchange = %publisher.exchange(), "Broker connection open");

        Ok(Self {
            name,
            manager,
            publisher,
            notifier,
            options,
            state: LoopState::default(),
            memory: MemoryProbe::new(),
            published: 0,
            closed: false,
        })
    }

    /// Get the bridge name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of messages published so far.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Run the bridge loop until the shutdown flag is set or an iteration fails.
    ///
    /// Returns `Ok(())` after a requested shutdown. On failure both
    /// connections are closed, the operators are alerted and the error is
    /// returned; nothing is retried.
    pub async fn run(mut self, shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            bridge = %self.name,
            exchange = %self.publisher.exchange(),
            idle_ticks = self.options.heartbeat.idle_ticks,
            "Listening for events. Press Ctrl+C to stop."
        );

        loop {
            if shutdown_requested(&shutdown) {
                info!(bridge = %self.name, "Shutting down");
                self.shutdown().await;
                info!(bridge = %self.name, published = self.published, "Goodbye!");
                return Ok(());
            }

            if let Err(e) = self.iterate().await {
                error!(bridge = %self.name, error = %e, "Bridge loop failed");
                self.shutdown().await;
                notify_failure(
                    &self.notifier,
                    &self.options.notify,
                    &self.name,
                    "Event bridge loop failed",
                    &e.to_string(),
                )
                .await;
                return Err(e);
            }
        }
    }

    /// One loop iteration: wait a tick, heartbeat when idle long enough,
    /// then forward whatever events are pending.
    async fn iterate(&mut self) -> Result<()> {
        tokio::time::sleep(self.options.heartbeat.tick()).await;

        if self.state.tick(self.options.heartbeat.idle_ticks) {
            self.heartbeat().await?;
        }

        for event in self.manager.process().await? {
            self.forward_event(&event).await?;
        }

        Ok(())
    }

    async fn heartbeat(&mut self) -> Result<()> {
        let waited = self.options.heartbeat.idle_period() * self.state.heartbeat_intervals;
        info!(seconds = waited.as_secs(), "Waiting for events... Ping...");

        let reply = self.manager.send(ManagerAction::ping()).await?;

        for event in &reply.events {
            self.forward_event(event).await?;
        }

        let response = reply.response;
        if !response.is_success() {
            return Err(BridgeError::protocol(format!(
                "Heartbeat failed: response={} message={}",
                response.get("response").unwrap_or("<missing>"),
                response.get("message").unwrap_or("<none>")
            )));
        }

        self.publish(&response).await?;
        self.state.record_heartbeat();
        info!("Pong");

        Ok(())
    }

    async fn forward_event(&mut self, event: &ManagerMessage) -> Result<()> {
        self.publish(event).await?;

        info!(
            time = %chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
            memory_bytes = self.memory.resident_bytes(),
            event = %event.display_name(),
            ">>"
        );

        self.state.record_event();
        Ok(())
    }

    async fn publish(&mut self, message: &ManagerMessage) -> Result<()> {
        let outbound = OutboundMessage::from_message(message, self.options.format)?;
        self.publisher.publish(&outbound).await?;
        self.published += 1;
        Ok(())
    }

    /// Close the manager connection, then the broker.
    ///
    /// Best effort: a failure closing one does not stop the other. Only the
    /// first call does anything.
    pub async fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        info!("Closing manager connection...");
        match self.manager.close().await {
            Ok(()) => info!("Manager connection closed"),
            Err(e) => warn!(error = %e, "Error closing manager connection"),
        }

        info!("Closing broker connection...");
        match self.publisher.close().await {
            Ok(()) => info!("Broker connection closed"),
            Err(e) => warn!(error = %e, "Error closing broker connection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_reaches_threshold() {
        let mut state = LoopState::default();

        for _ in 0..4 {
            assert!(!state.tick(5));
        }
        assert_eq!(state.idle_ticks, 4);

        assert!(state.tick(5));
        assert_eq!(state.idle_ticks, 0);
        assert_eq!(state.heartbeat_intervals, 1);
    }

    #[test]
    fn test_event_resets_both_counters() {
        let mut state = LoopState {
            idle_ticks: 9_999,
            heartbeat_intervals: 3,
        };

        state.record_event();

        assert_eq!(state, LoopState::default());
    }

    #[test]
    fn test_heartbeat_keeps_interval_count() {
        let mut state = LoopState::default();
        assert!(state.tick(1));
        state.record_heartbeat();
        assert!(state.tick(1));
        state.record_heartbeat();

        assert_eq!(state.idle_ticks, 0);
        assert_eq!(state.heartbeat_intervals, 2);
    }

    #[test]
    fn test_event_one_tick_early_postpones_heartbeat() {
        let mut state = LoopState::default();
        for _ in 0..9 {
            assert!(!state.tick(10));
        }
        state.record_event();

        for _ in 0..9 {
            assert!(!state.tick(10));
        }
        assert!(state.tick(10));
    }
}
