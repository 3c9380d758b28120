//! End-to-end scenario tests against the scripted backend.

mod common;

use std::time::Duration;

use common::{snapshot, Harness};
use convergence_harness::domain::models::ReporterPolicy;
use convergence_harness::domain::ports::Level;
use convergence_harness::{
    KubectlPreset, Mutation, MutationTarget, PollError, Scenario, ScenarioError, ScenarioStep,
};
use serde_json::json;

fn relabel_scenario() -> Scenario {
    Scenario::new("relabel", "zgroup=testapp").step(ScenarioStep::new(
        "label pods",
        Mutation::each_tracked("kubectl label pod/{entity} foo=bar"),
    ))
}

#[tokio::test]
async fn test_scenario_converges_and_returns_new_baseline() {
    common::setup_test_logging();
    let harness = Harness::new().with_poll(180, 5);
    let before = snapshot(&[("pod1", "id-a"), ("pod2", "id-a")]);
    let after = snapshot(&[("pod1", "id-b"), ("pod2", "id-b")]);
    harness
        .backend
        .push_snapshots([before.clone(), before, after.clone()])
        .await;

    let report = harness
        .driver()
        .run(&relabel_scenario())
        .await
        .expect("scenario converges");

    assert_eq!(report.baseline, after);
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].baseline, after);
    assert_eq!(report.steps[0].elapsed, Duration::from_secs(5));
    assert_eq!(harness.clock.sleeps(), 1);

    let applied = harness.backend.applied_mutations().await;
    assert_eq!(
        applied,
        vec![
            (
                MutationTarget::Entity("pod1".into()),
                "kubectl label pod/{entity} foo=bar".to_string()
            ),
            (
                MutationTarget::Entity("pod2".into()),
                "kubectl label pod/{entity} foo=bar".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_baseline_is_threaded_between_steps() {
    let harness = Harness::new().with_poll(30, 5);
    // Tokens flip back and forth; every step only converges against the
    // snapshot produced by the step before it.
    harness
        .backend
        .push_snapshots([
            snapshot(&[("app1", "100"), ("app2", "100")]),
            snapshot(&[("app1", "200"), ("app2", "200")]),
            snapshot(&[("app1", "100"), ("app2", "100")]),
            snapshot(&[("app1", "200"), ("app2", "200")]),
            snapshot(&[("app1", "100"), ("app2", "100")]),
        ])
        .await;
    let scenario = KubectlPreset::new("default", "zgroup=testapp")
        .label_change_scenario()
        .expect_entities(["app1", "app2"]);

    let report = harness.driver().run(&scenario).await.expect("scenario converges");

    let tokens: Vec<_> = report
        .steps
        .iter()
        .map(|step| step.baseline.get(&"app1".into()).map(ToString::to_string))
        .collect();
    assert_eq!(
        tokens,
        vec![
            Some("200".to_string()),
            Some("100".to_string()),
            Some("200".to_string()),
            Some("100".to_string()),
        ]
    );
    assert_eq!(harness.clock.sleeps(), 0);

    let applied = harness.backend.applied_mutations().await;
    assert_eq!(applied.len(), 6);
    assert_eq!(applied[2].0, MutationTarget::Scope("default".to_string()));
    assert_eq!(applied[2].1, "kubectl label ns/{scope} foo-bar=new-label");
    assert_eq!(applied[3].1, "kubectl label ns/{scope} foo-bar-");
}

#[tokio::test]
async fn test_timeout_captures_failure_report_and_stops_reporter() {
    let harness = Harness::new()
        .with_poll(30, 5)
        .with_failure_report(&["cilium service list", "cilium endpoint list"]);
    harness
        .backend
        .push_snapshots([snapshot(&[("pod1", "id-a"), ("pod2", "id-a")])])
        .await;

    let result = harness.driver().run(&relabel_scenario()).await;

    match result {
        Err(ScenarioError::Convergence {
            step,
            source: PollError::Timeout { attempts, .. },
        }) => {
            assert_eq!(step, "label pods");
            assert_eq!(attempts, 7);
        }
        other => panic!("Expected convergence timeout, got {other:?}"),
    }

    let captured: Vec<_> = harness
        .logger
        .with_message("Diagnostic output")
        .await
        .into_iter()
        .filter_map(|record| record.fields.get("command").cloned())
        .collect();
    assert!(captured.contains(&json!("cilium service list")));
    assert!(captured.contains(&json!("cilium endpoint list")));
    assert_eq!(harness.logger.with_message("Scenario failed").await.len(), 1);

    let invocations = harness.backend.diagnostic_invocations();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.backend.diagnostic_invocations(), invocations);
}

#[tokio::test]
async fn test_unreachable_backend_aborts_step() {
    let harness = Harness::new().with_poll(30, 5);
    harness
        .backend
        .push_snapshots([snapshot(&[("pod1", "id-a")])])
        .await;
    harness.backend.push_unreachable("connection refused").await;

    let result = harness.driver().run(&relabel_scenario()).await;

    assert!(matches!(
        result,
        Err(ScenarioError::Convergence {
            source: PollError::Aborted(_),
            ..
        })
    ));
    assert_eq!(harness.clock.sleeps(), 0);
}

#[tokio::test]
async fn test_missing_entity_is_retried() {
    let harness = Harness::new().with_poll(30, 5);
    harness
        .backend
        .push_snapshots([
            snapshot(&[("pod1", "id-a"), ("pod2", "id-a")]),
            snapshot(&[("pod1", "id-b")]),
            snapshot(&[("pod1", "id-b"), ("pod2", "id-b")]),
        ])
        .await;

    let report = harness
        .driver()
        .run(&relabel_scenario())
        .await
        .expect("scenario converges");

    assert_eq!(report.baseline.len(), 2);
    assert_eq!(harness.clock.sleeps(), 1);

    let pending = harness.logger.with_message("Entity state not converged").await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].level, Level::Debug);
    assert_eq!(pending[0].fields["entity"], json!("pod2"));
    assert_eq!(pending[0].fields["pending"], json!({"reason": "missing"}));
}

#[tokio::test]
async fn test_required_reporter_failure_stops_scenario() {
    let harness = Harness::new().with_poll(30, 5);
    harness.backend.fail_diagnostics(true);

    let result = harness.driver().run(&relabel_scenario()).await;

    assert!(matches!(result, Err(ScenarioError::Reporter(_))));
    assert_eq!(harness.backend.snapshot_fetches(), 0);
}

#[tokio::test]
async fn test_best_effort_reporter_failure_continues() {
    let harness = Harness::new()
        .with_poll(30, 5)
        .with_policy(ReporterPolicy::BestEffort);
    harness.backend.fail_diagnostics(true);
    harness
        .backend
        .push_snapshots([
            snapshot(&[("pod1", "id-a")]),
            snapshot(&[("pod1", "id-b")]),
        ])
        .await;

    let report = harness
        .driver()
        .run(&relabel_scenario())
        .await
        .expect("scenario converges without reporter");

    assert_eq!(report.baseline, snapshot(&[("pod1", "id-b")]));
    let warnings = harness.logger.records_at(Level::Warn).await;
    assert!(warnings
        .iter()
        .any(|record| record.message.starts_with("Background reporter unavailable")));
}

#[tokio::test]
async fn test_every_record_carries_run_id() {
    let harness = Harness::new()
        .with_poll(30, 5)
        .with_failure_report(&["cilium endpoint list"]);
    harness
        .backend
        .push_snapshots([
            snapshot(&[("pod1", "id-a"), ("pod2", "")]),
            snapshot(&[("pod1", "id-a"), ("pod2", "id-a")]),
            snapshot(&[("pod1", "id-b"), ("pod2", "id-a")]),
            snapshot(&[("pod1", "id-b"), ("pod2", "id-b")]),
        ])
        .await;

    let report = harness
        .driver()
        .run(&relabel_scenario())
        .await
        .expect("scenario converges");

    let records = harness.logger.records().await;
    for message in [
        "Diagnostic output",
        "Found entities without a state",
        "Entity state not converged",
        "Scenario started",
        "Step converged",
        "Scenario converged",
    ] {
        assert!(
            records.iter().any(|record| record.message == message),
            "missing record {message}"
        );
    }
    for record in &records {
        assert_eq!(
            record.fields.get("run_id"),
            Some(&json!(report.run_id)),
            "record without run_id: {}",
            record.message
        );
    }
}

#[tokio::test]
async fn test_failure_capture_records_carry_run_id() {
    let harness = Harness::new()
        .with_poll(10, 5)
        .with_failure_report(&["cilium endpoint list"]);
    harness
        .backend
        .push_snapshots([snapshot(&[("pod1", "id-a")])])
        .await;

    let result = harness.driver().run(&relabel_scenario()).await;
    assert!(result.is_err());

    let failed = harness.logger.with_message("Scenario failed").await;
    let run_id = failed[0].fields["run_id"].clone();
    let captured: Vec<_> = harness
        .logger
        .with_message("Diagnostic output")
        .await
        .into_iter()
        .filter(|record| record.fields["command"] == json!("cilium endpoint list"))
        .collect();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].fields["run_id"], run_id);
}
