//! Integration tests for hook chain ordering and placement.

use serde_json::json;

use hookloom_kernel::{ErrorKind, HookContext, Placement};

use crate::helpers::{CallLog, TestKernel};

#[tokio::test]
async fn test_unplaced_handlers_run_in_registration_order() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;
    let log = CallLog::new();

    for id in ["A", "B", "C"] {
        svc.hook("h", "p", id, Placement::append(), log.step(id))
            .await
            .unwrap();
    }
    svc.execute_hook("h", &HookContext::new()).await.unwrap();

    assert_eq!(log.calls().await, ["A", "B", "C"]);
}

#[tokio::test]
async fn test_after_function_splices_next_to_target() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;
    let log = CallLog::new();

    svc.hook("h", "p", "A", Placement::append(), log.step("A"))
        .await
        .unwrap();
    svc.hook("h", "p", "B", Placement::append(), log.step("B"))
        .await
        .unwrap();
    svc.hook("h", "p", "C", Placement::after_function("A"), log.step("C"))
        .await
        .unwrap();
    svc.execute_hook("h", &HookContext::new()).await.unwrap();

    assert_eq!(log.calls().await, ["A", "C", "B"]);
}

#[tokio::test]
async fn test_plugin_level_placement() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;
    let log = CallLog::new();

    svc.hook("h", "auth", "a1", Placement::append(), log.step("a1"))
        .await
        .unwrap();
    svc.hook("h", "auth", "a2", Placement::append(), log.step("a2"))
        .await
        .unwrap();
    svc.hook("h", "audit", "log", Placement::append(), log.step("log"))
        .await
        .unwrap();
    svc.hook("h", "rate", "limit", Placement::before_plugin("auth"), log.step("limit"))
        .await
        .unwrap();
    svc.hook("h", "cache", "fill", Placement::after_plugin("auth"), log.step("fill"))
        .await
        .unwrap();

    svc.execute_hook("h", &HookContext::new()).await.unwrap();
    assert_eq!(log.calls().await, ["limit", "a1", "a2", "fill", "log"]);
    assert_eq!(
        svc.hook_order("h").await,
        [
            ("rate".to_string(), "limit".to_string()),
            ("auth".to_string(), "a1".to_string()),
            ("auth".to_string(), "a2".to_string()),
            ("cache".to_string(), "fill".to_string()),
            ("audit".to_string(), "log".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_conflicting_requests_resolve_by_last_registration() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;
    let log = CallLog::new();

    svc.hook("h", "p", "X", Placement::append(), log.step("X"))
        .await
        .unwrap();
    svc.hook("h", "p", "Y", Placement::before_function("X"), log.step("Y"))
        .await
        .unwrap();
    svc.hook("h", "p", "Z", Placement::before_function("X"), log.step("Z"))
        .await
        .unwrap();
    svc.execute_hook("h", &HookContext::new()).await.unwrap();

    assert_eq!(log.calls().await, ["Y", "Z", "X"]);
}

#[tokio::test]
async fn test_missing_target_leaves_chain_unchanged() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;
    let log = CallLog::new();

    svc.hook("h", "p", "A", Placement::append(), log.step("A"))
        .await
        .unwrap();
    let err = svc
        .hook("h", "p", "B", Placement::after_plugin("ghost"), log.step("B"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PlacementNotFound);

    let err = svc
        .hook("h", "p", "B", Placement::before_function("ghost"), log.step("B"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PlacementNotFound);

    assert_eq!(svc.handler_count("h").await, 1);
}

#[tokio::test]
async fn test_conflicting_directives_rejected() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;
    let log = CallLog::new();
    svc.hook("h", "p", "A", Placement::append(), log.step("A"))
        .await
        .unwrap();

    let both = Placement {
        before_plugin: Some("p".into()),
        after_plugin: Some("p".into()),
        ..Placement::default()
    };
    let err = svc.hook("h", "q", "B", both, log.step("B")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let mixed = Placement {
        before_plugin: Some("p".into()),
        after_function: Some("A".into()),
        ..Placement::default()
    };
    let err = svc.hook("h", "q", "B", mixed, log.step("B")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(svc.handler_count("h").await, 1);
}

#[tokio::test]
async fn test_halt_and_falsy_results() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;
    let log = CallLog::new();

    svc.hook("h", "p", "null", Placement::append(), log.handler("null", json!(null)))
        .await
        .unwrap();
    svc.hook("h", "p", "zero", Placement::append(), log.handler("zero", json!(0)))
        .await
        .unwrap();
    svc.hook("h", "p", "empty", Placement::append(), log.handler("empty", json!("")))
        .await
        .unwrap();
    svc.hook("h", "p", "stop", Placement::append(), log.handler("stop", json!(false)))
        .await
        .unwrap();
    svc.hook("h", "p", "never", Placement::append(), log.step("never"))
        .await
        .unwrap();

    let report = svc.dispatch_hook("h", &HookContext::new()).await.unwrap();
    assert_eq!(log.calls().await, ["null", "zero", "empty", "stop"]);
    assert_eq!(report.invoked, 4);
    assert_eq!(report.halted_by, Some(("p".to_string(), "stop".to_string())));

    // Halting affects only that invocation.
    svc.execute_hook("h", &HookContext::new()).await.unwrap();
    assert_eq!(log.calls().await.len(), 8);
}
