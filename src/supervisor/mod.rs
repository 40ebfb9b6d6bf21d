//! Reconciliation engine for the watchdog
//!
//! Each iteration runs four steps in a fixed order: absorb any pending
//! config change, synchronize the monitored set against the new snapshot,
//! sweep every monitored process for liveness, then re-assert the
//! foreground app. The order matters: a reload mutates the monitored set
//! before the sweep reads it, so a process added by the reload is
//! liveness-checked in the same iteration it was added.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::{ConfigSource, DesiredState, ProcessSpec};
use crate::events::{EventSink, WatchEvent};
use crate::platform::ProcessControl;

/// Tuning for the supervision loop.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Delay between reconcile iterations.
    pub poll_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// Cooperative cancellation token for a running supervisor.
///
/// Cloneable so a signal handler or another thread can request a stop.
/// The request is observed at the next iteration boundary; the loop is
/// never interrupted mid-iteration, so cancellation latency is bounded by
/// one iteration plus one poll interval.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to exit after the current iteration.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// The reconciliation engine.
///
/// Owns the monitored set: the processes it currently believes it is
/// responsible for, keyed by name. Liveness is never cached; every
/// iteration asks the process control port fresh, so a process dying at
/// any moment is restarted within one poll interval. No step surfaces an
/// error to the caller: every anomaly degrades to another attempt on the
/// next iteration, and the loop only ends on explicit cancellation.
pub struct Supervisor<C, P, S>
where
    C: ConfigSource,
    P: ProcessControl,
    S: EventSink,
{
    config: SupervisorConfig,
    source: C,
    control: P,
    sink: S,
    monitored: HashMap<String, ProcessSpec>,
    foreground: String,
}

impl<C, P, S> Supervisor<C, P, S>
where
    C: ConfigSource,
    P: ProcessControl,
    S: EventSink,
{
    /// Create a supervisor seeded from the source's startup snapshot.
    ///
    /// Nothing is started here; the first reconcile pass starts whatever
    /// is missing.
    pub fn new(config: SupervisorConfig, source: C, control: P, sink: S) -> Self {
        let state = source.current_state();
        let monitored = state
            .processes
            .iter()
            .map(|spec| (spec.name.clone(), spec.clone()))
            .collect();

        Self {
            config,
            source,
            control,
            sink,
            monitored,
            foreground: state.foreground,
        }
    }

    /// Names currently under supervision, sorted.
    pub fn monitored_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.monitored.keys().cloned().collect();
        names.sort();
        names
    }

    /// Run one reconcile iteration: reload check, diff and sync on change,
    /// liveness sweep, foreground enforcement.
    pub fn reconcile(&mut self) {
        if self.source.reload_if_changed() {
            let state = self.source.current_state();
            self.synchronize(state);
        }
        self.sweep();
        self.enforce_foreground();
    }

    /// Run until `keep_running` returns false, sleeping one poll interval
    /// between iterations. The predicate is checked once per iteration and
    /// is the only cancellation checkpoint.
    pub fn run<F>(&mut self, mut keep_running: F)
    where
        F: FnMut() -> bool,
    {
        while keep_running() {
            self.reconcile();
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Run until the stop handle is triggered.
    pub fn run_until_stopped(&mut self, stop: &StopHandle) {
        self.run(|| !stop.is_stopped());
    }

    /// Replace the monitored set with a new desired snapshot.
    ///
    /// Added processes are started unless something with that name is
    /// already running (a same-named unmanaged process counts as
    /// satisfied). Removed processes are dropped from supervision but
    /// never terminated. Specs for retained names are replaced wholesale,
    /// so an args-only change takes effect on the next forced restart
    /// rather than immediately.
    fn synchronize(&mut self, state: DesiredState) {
        self.sink.record(WatchEvent::ConfigReloaded);

        let mut next: HashMap<String, ProcessSpec> = HashMap::new();
        for spec in &state.processes {
            next.insert(spec.name.clone(), spec.clone());
        }

        for spec in &state.processes {
            if self.monitored.contains_key(&spec.name) {
                continue;
            }
            if !self.control.is_running(&spec.name) {
                self.control.start(&spec.name, &spec.args);
            }
            self.sink.record(WatchEvent::ProcessAdded {
                name: spec.name.clone(),
            });
        }

        for name in self.monitored.keys() {
            if !next.contains_key(name) {
                self.sink.record(WatchEvent::ProcessDropped { name: name.clone() });
            }
        }

        self.monitored = next;
        self.foreground = state.foreground;
    }

    /// Start every monitored process that is not currently running.
    fn sweep(&self) {
        for (name, spec) in &self.monitored {
            if !self.control.is_running(name) {
                self.control.start(name, &spec.args);
                self.sink.record(WatchEvent::ProcessStarted { name: name.clone() });
            }
        }
    }

    /// Re-assert the desired foreground app. Runs every iteration: the
    /// foreground is a continuously enforced invariant, not an edge.
    fn enforce_foreground(&self) {
        if self.foreground.is_empty() {
            return;
        }
        if !self.control.is_foreground(&self.foreground) {
            self.control.focus(&self.foreground);
        }
    }
}
