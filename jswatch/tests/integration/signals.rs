//! The jswatch binary shutting down on SIGINT/SIGTERM

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use jswatch::process::is_process_alive;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use serial_test::serial;
use tempfile::TempDir;
use wait_timeout::ChildExt;

use super::helpers::{create_tree, fake_tool};

/// Remote backend without a DNS lookup, so startup needs neither java nor network
const CONFIG: &str = "backends = [\"remote\"]\n\n[remote]\nprobe = false\n";

fn path_with(dir: &Path) -> OsString {
    let mut dirs = vec![dir.to_path_buf()];
    if let Some(path) = env::var_os("PATH") {
        dirs.extend(env::split_paths(&path));
    }
    env::join_paths(dirs).expect("Invalid PATH")
}

/// Start jswatch on a fresh tree. Its inotifywait runs `setup`, records its
/// PID, and then sleeps. Returns the running binary, the fake watcher's PID,
/// and the temp dirs.
fn start_jswatch(setup: &str) -> (Child, u32, TempDir, TempDir) {
    let root = create_tree(&[(".jswatch.toml", CONFIG)]);
    let tools = TempDir::new().expect("Failed to create temp directory");
    let pid_file = tools.path().join("watch.pid");
    fake_tool(
        tools.path(),
        "inotifywait",
        &format!("{setup}\necho $$ > '{}'\nexec sleep 30", pid_file.display()),
    );

    let child = Command::new(env!("CARGO_BIN_EXE_jswatch"))
        .arg(root.path())
        .arg("--no-color")
        .env("PATH", path_with(tools.path()))
        .env_remove("JSWATCH_LOG")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to start jswatch");

    let watch_pid = wait_for_pid(&pid_file);
    (child, watch_pid, root, tools)
}

fn wait_for_pid(pid_file: &Path) -> u32 {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Ok(content) = fs::read_to_string(pid_file) {
            if content.ends_with('\n') {
                return content.trim().parse().expect("Invalid PID");
            }
        }
        assert!(Instant::now() < deadline, "Watch process never started");
        thread::sleep(Duration::from_millis(20));
    }
}

fn signal_and_wait(mut child: Child, signal: Signal) -> ExitStatus {
    let pid = i32::try_from(child.id()).expect("PID out of range");
    kill(Pid::from_raw(pid), signal).expect("Failed to signal jswatch");
    match child.wait_timeout(Duration::from_secs(10)).expect("Failed to wait") {
        Some(status) => status,
        None => {
            let _ = child.kill();
            panic!("jswatch did not exit after {signal:?}");
        }
    }
}

#[test]
#[serial]
fn test_sigterm_stops_watch_process_and_exits_zero() {
    let (child, watch_pid, _root, _tools) = start_jswatch(":");
    assert!(is_process_alive(watch_pid));

    let status = signal_and_wait(child, Signal::SIGTERM);

    assert_eq!(status.code(), Some(0));
    assert!(!is_process_alive(watch_pid));
}

#[test]
#[serial]
fn test_sigint_stops_watch_process_and_exits_zero() {
    let (child, watch_pid, _root, _tools) = start_jswatch(":");

    let status = signal_and_wait(child, Signal::SIGINT);

    assert_eq!(status.code(), Some(0));
    assert!(!is_process_alive(watch_pid));
}

#[test]
#[serial]
fn test_watch_process_ignoring_sigterm_is_killed() {
    let (child, watch_pid, _root, _tools) = start_jswatch("trap '' TERM");

    let started = Instant::now();
    let status = signal_and_wait(child, Signal::SIGTERM);

    assert_eq!(status.code(), Some(0));
    assert!(started.elapsed() < Duration::from_secs(8));
    assert!(!is_process_alive(watch_pid));
}
