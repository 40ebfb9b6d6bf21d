//! State-transition events emitted by the supervisor
//!
//! The engine reports transitions through an injected sink rather than a
//! global logger, so callers decide where the audit trail goes and tests
//! can assert on it directly.

/// A state transition observed by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The configuration source produced a new desired-state snapshot.
    ConfigReloaded,
    /// A process entered the monitored set.
    ProcessAdded { name: String },
    /// A process left the monitored set. It is not terminated.
    ProcessDropped { name: String },
    /// The liveness sweep started (or restarted) a monitored process.
    ProcessStarted { name: String },
}

/// Observer capability for supervisor state transitions.
///
/// `record` takes `&self` so sinks that accumulate events can use interior
/// mutability.
pub trait EventSink {
    fn record(&self, event: WatchEvent);
}

/// Sink that writes transitions to the tracing log.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: WatchEvent) {
        match event {
            WatchEvent::ConfigReloaded => tracing::info!("configuration reloaded"),
            WatchEvent::ProcessAdded { name } => {
                tracing::info!(name = %name, "now supervising process");
            }
            WatchEvent::ProcessDropped { name } => {
                tracing::info!(name = %name, "stopped supervising process, left running");
            }
            WatchEvent::ProcessStarted { name } => {
                tracing::info!(name = %name, "started monitored process");
            }
        }
    }
}
