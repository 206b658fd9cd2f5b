//! Durability under a real `SIGKILL`, not just a dropped handle.
//!
//! Grounded on the fork-and-crash pattern used for crash-recovery testing
//! elsewhere in this corpus: fork a child that performs writes, but instead
//! of letting the child exit on its own, the parent sends it a real
//! `SIGKILL` once the child signals (via a sentinel file) that its writes
//! have returned. This exercises actual abrupt process termination rather
//! than a graceful `exit()`, which a dropped file handle could mask.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use serde_json::json;
use tempfile::tempdir;
use wardkv::engine::KvEngine;

fn wait_for_sentinel(path: &Path, timeout: Duration) {
    let start = Instant::now();
    while !path.exists() {
        if start.elapsed() > timeout {
            panic!("sentinel file {} never appeared", path.display());
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn kill_and_reap(pid: Pid) {
    kill(pid, Signal::SIGKILL).expect("failed to send SIGKILL");
    match waitpid(pid, None) {
        Ok(WaitStatus::Signaled(_, Signal::SIGKILL, _)) => {}
        Ok(other) => panic!("child exited unexpectedly: {other:?}"),
        Err(e) => panic!("waitpid failed: {e}"),
    }
}

/// Scenario 1 / invariant 1 (durability): every key the child successfully
/// wrote survives a SIGKILL and a fresh open.
#[test]
fn sigkill_after_acknowledged_writes_survives_restart() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().to_path_buf();
    let sentinel = data_dir.join("writes_done");

    match unsafe { fork() }.expect("fork failed") {
        ForkResult::Parent { child } => {
            wait_for_sentinel(&sentinel, Duration::from_secs(5));
            kill_and_reap(child);

            let engine = KvEngine::open(&data_dir).unwrap();
            assert_eq!(engine.get("k1"), Some(json!("v1")));
            assert_eq!(engine.get("k2"), Some(json!(42)));
        }
        ForkResult::Child => {
            let engine = KvEngine::open(&data_dir).unwrap();
            engine.set("k1".into(), json!("v1"), None).unwrap();
            engine.set("k2".into(), json!(42), None).unwrap();
            fs::write(&sentinel, b"done").unwrap();
            // Do not exit gracefully — wait to be killed, so the parent's
            // waitpid observes a real SIGKILL rather than a normal exit.
            loop {
                std::thread::sleep(Duration::from_secs(60));
            }
        }
    }
}

/// Scenario 4 / property 3 (bulk atomicity), full-commit boundary: a
/// SIGKILL sent only after `bulk_set` has returned must leave every key
/// present — the WAL record and its fsync are already durable by then.
#[test]
fn sigkill_after_bulk_set_returns_leaves_all_keys_present() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().to_path_buf();
    let sentinel = data_dir.join("bulk_done");

    match unsafe { fork() }.expect("fork failed") {
        ForkResult::Parent { child } => {
            wait_for_sentinel(&sentinel, Duration::from_secs(5));
            kill_and_reap(child);

            let engine = KvEngine::open(&data_dir).unwrap();
            let present = (0..30).filter(|i| engine.get(&format!("atomic_{i}")).is_some()).count();
            assert!(present == 0 || present == 30, "expected 0 or 30 keys present, got {present}");
            assert_eq!(present, 30, "a bulk_set that returned must be fully durable");
        }
        ForkResult::Child => {
            let engine = KvEngine::open(&data_dir).unwrap();
            let items: Vec<(String, serde_json::Value)> = (0..30)
                .map(|i| (format!("atomic_{i}"), json!(format!("v_atomic_{i}"))))
                .collect();
            engine.bulk_set(items, None).unwrap();
            fs::write(&sentinel, b"done").unwrap();
            loop {
                std::thread::sleep(Duration::from_secs(60));
            }
        }
    }
}

/// Scenario 4 / property 3, empty-commit boundary: a SIGKILL sent before
/// `bulk_set` is ever called must leave none of its keys present.
#[test]
fn sigkill_before_bulk_set_starts_leaves_no_keys_present() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().to_path_buf();
    let sentinel = data_dir.join("ready");

    match unsafe { fork() }.expect("fork failed") {
        ForkResult::Parent { child } => {
            wait_for_sentinel(&sentinel, Duration::from_secs(5));
            kill_and_reap(child);

            let engine = KvEngine::open(&data_dir).unwrap();
            let present = (0..30).filter(|i| engine.get(&format!("atomic_{i}")).is_some()).count();
            assert_eq!(present, 0);
        }
        ForkResult::Child => {
            // Open the engine (creating the data dir) but never call bulk_set.
            let _engine = KvEngine::open(&data_dir).unwrap();
            fs::write(&sentinel, b"ready").unwrap();
            loop {
                std::thread::sleep(Duration::from_secs(60));
            }
        }
    }
}

/// Scenario 5 / property 7 (flaky recovery): a write whose in-memory apply
/// was skipped is still recovered from the WAL after the process is killed
/// and reopened.
#[test]
fn sigkill_after_flaky_skipped_write_still_recovers_value() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().to_path_buf();
    let sentinel = data_dir.join("flaky_done");

    match unsafe { fork() }.expect("fork failed") {
        ForkResult::Parent { child } => {
            wait_for_sentinel(&sentinel, Duration::from_secs(5));
            kill_and_reap(child);

            let engine = KvEngine::open(&data_dir).unwrap();
            assert_eq!(engine.get("flaky_key"), Some(json!("flaky_value")));
        }
        ForkResult::Child => {
            let engine = KvEngine::open(&data_dir).unwrap();
            engine.set("flaky_key".into(), json!("flaky_value"), Some(1.0)).unwrap();
            fs::write(&sentinel, b"done").unwrap();
            loop {
                std::thread::sleep(Duration::from_secs(60));
            }
        }
    }
}
