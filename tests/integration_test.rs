//! Integration tests for nser
//!
//! These tests verify the integration between the crates:
//! - nser-tools: registry, health checks, runner and event bus
//! - nser-replay: run record storage and history

use std::sync::Arc;
use std::time::Duration;

use nser_replay::{RunStatus, RunStore};
use nser_tools::{
    register_builtins, EventBus, HealthProber, RunRequest, RunnerConfig, ToolCategory,
    ToolDefinition, ToolEvent, ToolRegistry, ToolRunner,
};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Catalog Integration Tests
// ============================================================================

#[test]
fn test_builtin_catalog_groups() {
    let registry = ToolRegistry::new();
    register_builtins(&registry);

    let groups = registry.group_by_category();
    assert!(groups[&ToolCategory::Recon].iter().any(|d| d.name == "subfinder"));
    assert!(groups[&ToolCategory::Scanning].iter().any(|d| d.name == "nmap"));
    assert!(groups[&ToolCategory::Exploit].iter().any(|d| d.name == "sqlmap"));
}

#[tokio::test]
async fn test_health_covers_every_tool() {
    let registry = ToolRegistry::new();
    register_builtins(&registry);

    let prober = HealthProber::default();
    let results = prober.check_all(&registry).await;
    assert_eq!(results.len(), registry.len());

    let names: Vec<&str> = results.iter().map(|h| h.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);

    for health in &results {
        assert_eq!(health.installed, !health.path.is_empty());
    }
}

// ============================================================================
// Runner + Store + Event Bus Integration Tests
// ============================================================================

#[cfg(unix)]
fn script_registry() -> Arc<ToolRegistry> {
    let registry = ToolRegistry::new();
    registry.register(
        ToolDefinition::new("lines", ToolCategory::Recon, "sh")
            .with_default_args(["-c", "for l in one two three; do echo \"$l $1\"; done", "nser"])
            .with_description("Echo three lines"),
    );
    registry.register(
        ToolDefinition::new("nope", ToolCategory::Scanning, "sh")
            .with_default_args(["-c", "echo 'no results' >&2; exit 3", "nser"]),
    );
    Arc::new(registry)
}

#[cfg(unix)]
#[tokio::test]
async fn test_blocking_and_streaming_share_history() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(RunStore::from_path(&dir.path().join("nser.db"), 1).await.unwrap());
    let bus = EventBus::new(64);
    let runner = ToolRunner::new(
        script_registry(),
        store.clone(),
        Arc::new(bus.clone()),
        RunnerConfig::default(),
    );
    let cancel = CancellationToken::new();

    // Blocking run
    let blocking = runner
        .run(RunRequest::new(5, "nope", "example.com"), &cancel)
        .await
        .unwrap();
    assert_eq!(blocking.status, RunStatus::Failed);
    assert_eq!(blocking.exit_code, 3);
    assert_eq!(blocking.output, "\n--- STDERR ---\nno results\n");

    // Streaming run
    let mut rx = bus.subscribe();
    let start = runner
        .run_streaming(RunRequest::new(5, "lines", "example.com"), &cancel)
        .await
        .unwrap();

    let mut lines = Vec::new();
    let result = loop {
        let event = tokio::time::timeout(Duration::from_secs(20), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.run_id(), start.run_id);
        match event {
            ToolEvent::Output { line, .. } => lines.push(line),
            ToolEvent::Done(result) => break result,
        }
    };
    assert_eq!(
        lines,
        vec!["one example.com", "two example.com", "three example.com"]
    );
    assert_eq!(result.status, RunStatus::Completed);

    // Both runs are in the workspace history, newest first
    let history = store.list_runs_by_workspace(5, 10, 0).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, start.run_id);
    assert_eq!(history[1].id, blocking.run_id);
    assert!(history.iter().all(|run| run.status.is_terminal()));

    let output = store.get_run_output(start.run_id).await.unwrap();
    assert_eq!(output, "one example.com\ntwo example.com\nthree example.com\n");

    // Nothing is left to reap
    let reaped = store
        .abandon_stale_runs(chrono::Utc::now() + chrono::Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(reaped, 0);
}

#[tokio::test]
async fn test_uninstalled_builtin_is_rejected_without_record() {
    let registry = ToolRegistry::new();
    registry.register(ToolDefinition::new(
        "phantom",
        ToolCategory::Exploit,
        "nser-phantom-binary",
    ));

    let store = Arc::new(RunStore::in_memory().await.unwrap());
    let runner = ToolRunner::new(
        Arc::new(registry),
        store.clone(),
        Arc::new(EventBus::default()),
        RunnerConfig::default(),
    );

    let err = runner
        .run(RunRequest::new(1, "phantom", "10.0.0.1"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, nser_tools::Error::NotInstalled { .. }));
    assert!(store.list_runs_by_workspace(1, 10, 0).await.unwrap().is_empty());
}
