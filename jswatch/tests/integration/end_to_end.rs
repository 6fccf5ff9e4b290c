//! A watched tree compiled through the monitor, watcher, and local backend

use std::fs;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use jswatch::monitor::{ChangeMonitor, InotifySource};
use jswatch::report::{RecordingReporter, ReportEvent};
use jswatch::watcher::{CompileWatcher, Watcher};
use serial_test::serial;

use super::helpers::{
    copying_backend, create_tree, fake_inotifywait, set_modified, ScriptedSource,
};

#[test]
fn test_scan_compiles_stale_sources_and_events_force_recompile() {
    let temp = create_tree(&[("a.js", "var a = 1;\n"), ("b.min.js", "var b=2;")]);
    let root = temp.path();
    let a = root.join("a.js");
    set_modified(&a, SystemTime::now() - Duration::from_secs(60));

    let source = ScriptedSource::new(vec![root.join("b-min.js"), a.clone()]);
    let reporter = Arc::new(RecordingReporter::new());
    let mut monitor = ChangeMonitor::with_source(root, source).unwrap();
    monitor.add_watcher(CompileWatcher::new(copying_backend(), reporter.clone()));

    monitor.run().unwrap();

    // Once from the scan, once from the event even though a.min.js was fresh
    assert_eq!(reporter.compiled_sources(), vec![a.clone(), a.clone()]);
    assert!(!root.join("b.min.min.js").exists());
    assert!(!root.join("b-min.min.js").exists());
    assert_eq!(
        fs::read_to_string(root.join("a.min.js")).unwrap(),
        "var a = 1;\n"
    );

    let check = CompileWatcher::new(copying_backend(), Arc::new(RecordingReporter::new()));
    assert!(check.check_file(&a));
}

#[test]
fn test_up_to_date_tree_compiles_nothing_on_scan() {
    let temp = create_tree(&[("lib/util.js", "x();"), ("lib/util.min.js", "x();")]);
    let root = temp.path();
    set_modified(
        &root.join("lib/util.js"),
        SystemTime::now() - Duration::from_secs(60),
    );

    let reporter = Arc::new(RecordingReporter::new());
    let mut monitor = ChangeMonitor::with_source(root, ScriptedSource::new(Vec::new())).unwrap();
    monitor.add_watcher(CompileWatcher::new(copying_backend(), reporter.clone()));

    monitor.run().unwrap();

    assert!(reporter.events().is_empty());
}

#[test]
fn test_failed_compile_reports_critical_and_keeps_watching() {
    let temp = create_tree(&[("a.js", "a();"), ("b.js", "b();")]);
    let root = temp.path();
    let a = root.join("a.js");
    let b = root.join("b.js");

    // Event for a file that is gone by the time it is compiled
    let gone = root.join("gone.js");
    let source = ScriptedSource::new(vec![gone.clone(), b.clone()]);
    let reporter = Arc::new(RecordingReporter::new());
    let mut monitor = ChangeMonitor::with_source(root, source).unwrap();
    monitor.add_watcher(CompileWatcher::new(copying_backend(), reporter.clone()));

    monitor.run().unwrap();

    assert_eq!(reporter.compiled_sources(), vec![a, b.clone(), b]);
    let events = reporter.events();
    assert!(events.contains(&ReportEvent::Compiling(gone)));
    assert!(events
        .iter()
        .any(|event| matches!(event, ReportEvent::Critical(_))));
}

#[test]
#[serial]
fn test_inotify_source_feeds_the_monitor() {
    let temp = create_tree(&[("src/app.js", "app();")]);
    let root = temp.path().join("src");
    let app = root.join("app.js");
    let tools = tempfile::TempDir::new().unwrap();
    let script = fake_inotifywait(tools.path(), &format!("echo '{}'", app.display()));

    let reporter = Arc::new(RecordingReporter::new());
    let source = InotifySource::with_program(&root, script);
    let mut monitor = ChangeMonitor::with_source(&root, source).unwrap();
    monitor.add_watcher(CompileWatcher::new(copying_backend(), reporter.clone()));

    monitor.run().unwrap();

    assert_eq!(reporter.compiled_sources(), vec![app.clone(), app]);
    assert!(!monitor.source().is_running());
    assert!(root.join("app.min.js").exists());
}
