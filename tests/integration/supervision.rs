//! End-to-end supervision scenarios driven with in-memory collaborators
//!
//! These tests exercise the whole reconcile pipeline across several
//! iterations: initial start, self-healing after an external kill, config
//! reload with add/remove, and foreground switching.

use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use warden::config::FileConfigSource;
use warden::events::WatchEvent;
use warden::supervisor::{StopHandle, Supervisor, SupervisorConfig};

use crate::helpers::{desired, CollectingSink, FakeControl, MemorySource};

fn zero_interval() -> SupervisorConfig {
    SupervisorConfig {
        poll_interval: Duration::ZERO,
    }
}

#[test]
fn watchdog_lifecycle_end_to_end() {
    let source = MemorySource::new(desired(&[("alpha", ""), ("beta", "")], "alpha"));
    let control = FakeControl::default();
    let sink = CollectingSink::default();
    let mut supervisor = Supervisor::new(
        zero_interval(),
        source.clone(),
        control.clone(),
        sink.clone(),
    );

    // First iteration: both processes started, foreground asserted.
    supervisor.reconcile();
    assert_eq!(control.started_names(), vec!["alpha", "beta"]);
    assert_eq!(control.focused(), vec!["alpha"]);

    // Kill alpha externally: next iteration restarts it.
    control.kill_externally("alpha");
    supervisor.reconcile();
    assert_eq!(control.start_count("alpha"), 2);

    // Reload drops alpha and switches foreground to beta. Alpha is left
    // running: removal never terminates.
    source.replace(desired(&[("beta", "")], "beta"));
    supervisor.reconcile();
    assert!(control.terminated().is_empty());
    assert_eq!(supervisor.monitored_names(), vec!["beta"]);
    assert!(sink.events().contains(&WatchEvent::ProcessDropped {
        name: "alpha".to_string()
    }));
    assert_eq!(control.focused().last().map(String::as_str), Some("beta"));

    // Even with the leftover alpha gone, it is never started again.
    control.kill_externally("alpha");
    supervisor.reconcile();
    supervisor.reconcile();
    assert_eq!(control.start_count("alpha"), 2);
}

#[test]
fn run_loop_iterates_until_predicate_falls() {
    let source = MemorySource::new(desired(&[("alpha", "")], "alpha"));
    let control = FakeControl::default();
    let mut supervisor = Supervisor::new(
        zero_interval(),
        source.clone(),
        control.clone(),
        CollectingSink::default(),
    );

    let mut remaining = 4;
    supervisor.run(|| {
        if remaining == 0 {
            return false;
        }
        remaining -= 1;
        true
    });

    // Foreground is asserted once per iteration, so it counts iterations.
    assert_eq!(control.focused().len(), 4);
}

#[test]
fn stop_handle_ends_loop_without_further_iterations() {
    let source = MemorySource::new(desired(&[("alpha", "")], "alpha"));
    let control = FakeControl::default();
    let mut supervisor = Supervisor::new(
        zero_interval(),
        source,
        control.clone(),
        CollectingSink::default(),
    );

    let stop = StopHandle::new();
    stop.request_stop();
    supervisor.run_until_stopped(&stop);

    assert!(control.focused().is_empty());
    assert!(control.started_names().is_empty());
}

#[test]
fn file_backed_reload_lands_within_one_iteration() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "processes": [{ "name": "alpha" }], "foreground": "alpha" }"#,
    )
    .expect("Failed to write config");

    let source = FileConfigSource::load(&path);
    let control = FakeControl::default();
    let mut supervisor = Supervisor::new(
        zero_interval(),
        source,
        control.clone(),
        CollectingSink::default(),
    );

    supervisor.reconcile();
    assert_eq!(control.started_names(), vec!["alpha"]);
    assert_eq!(control.focused(), vec!["alpha"]);

    fs::write(
        &path,
        r#"{ "processes": [{ "name": "alpha" }, { "name": "beta", "args": "--fast" }], "foreground": "beta" }"#,
    )
    .expect("Failed to rewrite config");

    supervisor.reconcile();
    assert_eq!(control.started_names(), vec!["alpha", "beta"]);
    assert_eq!(supervisor.monitored_names(), vec!["alpha", "beta"]);
    assert_eq!(control.focused().last().map(String::as_str), Some("beta"));
}

#[test]
fn config_deletion_drops_all_supervision() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "processes": [{ "name": "alpha" }], "foreground": "alpha" }"#,
    )
    .expect("Failed to write config");

    let source = FileConfigSource::load(&path);
    let control = FakeControl::default();
    let sink = CollectingSink::default();
    let mut supervisor = Supervisor::new(
        zero_interval(),
        source,
        control.clone(),
        sink.clone(),
    );

    supervisor.reconcile();
    fs::remove_file(&path).expect("Failed to remove config");
    supervisor.reconcile();

    assert!(supervisor.monitored_names().is_empty());
    assert!(control.terminated().is_empty());
    assert!(sink.events().contains(&WatchEvent::ProcessDropped {
        name: "alpha".to_string()
    }));

    // Alpha dies later: nothing restarts it.
    control.kill_externally("alpha");
    supervisor.reconcile();
    assert_eq!(control.start_count("alpha"), 1);
}
