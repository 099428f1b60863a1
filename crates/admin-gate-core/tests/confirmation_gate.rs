// crates/admin-gate-core/tests/confirmation_gate.rs
// ============================================================================
// Module: Confirmation Gate Tests
// Description: Plan, execute and confirm flows against a recording downstream.
// Purpose: Validate default posture, re-guarding and fail-closed behavior.
// Dependencies: admin-gate-core, tokio
// ============================================================================

//! Confirmation gate tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap for clarity."
)]

mod common;

use std::sync::Arc;

use admin_gate_core::ConfirmationGate;
use admin_gate_core::DownstreamError;
use admin_gate_core::FixedClock;
use admin_gate_core::GateError;
use admin_gate_core::GateOptions;
use admin_gate_core::GateOutcome;
use admin_gate_core::GateSettings;
use admin_gate_core::Method;
use admin_gate_core::OperationDescriptor;
use admin_gate_core::PolicyGuard;
use admin_gate_core::TokenError;
use common::RecordingDownstream;
use common::T0;
use common::codec;
use common::gate;
use serde_json::json;

#[tokio::test]
async fn delete_is_planned_then_confirmed_once() {
    let clock = Arc::new(FixedClock::new(T0));
    let (gate, downstream) = gate(true, &clock);
    let op = OperationDescriptor::new(Method::Delete, "/admin/products/p1");

    let outcome = gate
        .plan_or_execute(
            op,
            GateOptions {
                require_confirm: Some(true),
                dry_run: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(downstream.call_count(), 0);
    let rendered = outcome.to_json();
    assert_eq!(rendered["mode"], "dry_run");
    assert_eq!(rendered["plan"]["method"], "DELETE");
    assert_eq!(rendered["plan"]["url"], "/admin/products/p1");
    assert_eq!(rendered["confirm_tool"], "admin_confirm");
    assert_eq!(rendered["ttl_seconds"], 300);
    let token = rendered["confirm_token"].as_str().unwrap().to_string();

    clock.advance(299);
    let execution = gate.confirm(&token).await.unwrap();
    let calls = downstream.recorded();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].operation.method, Method::Delete);
    assert_eq!(calls[0].operation.path, "/admin/products/p1");
    let confirmed = execution.to_confirm_json();
    assert_eq!(confirmed["mode"], "executed");
    assert_eq!(confirmed["executed"]["url"], "/admin/products/p1");
}

#[tokio::test]
async fn store_paths_never_reach_downstream() {
    let clock = Arc::new(FixedClock::new(T0));
    let (gate, downstream) = gate(false, &clock);
    for dry_run in [None, Some(true), Some(false)] {
        let err = gate
            .plan_or_execute(
                OperationDescriptor::new(Method::Get, "/store/x"),
                GateOptions::dry_run(dry_run),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Policy(_)));
    }
    assert!(matches!(
        gate.read(OperationDescriptor::new(Method::Get, "/store/x")).await,
        Err(GateError::Policy(_))
    ));
    assert_eq!(downstream.call_count(), 0);
}

#[tokio::test]
async fn encoded_traversal_never_reaches_downstream() {
    let clock = Arc::new(FixedClock::new(T0));
    let (gate, downstream) = gate(true, &clock);
    for path in [
        "/admin/%2e%2e/store/carts",
        "/admin\\..\\store\\carts",
        "/admin/.%2E/store/carts",
    ] {
        let err = gate
            .plan_or_execute(
                OperationDescriptor::new(Method::Delete, path),
                GateOptions::dry_run(Some(false)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Policy(_)), "{path}");
        let err = gate
            .plan_or_execute(
                OperationDescriptor::new(Method::Delete, path),
                GateOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Policy(_)), "{path}");
    }
    assert_eq!(downstream.call_count(), 0);
}

#[tokio::test]
async fn default_posture_is_dry_run() {
    let clock = Arc::new(FixedClock::new(T0));
    let (gate, downstream) = gate(true, &clock);
    let outcome = gate
        .plan_or_execute(
            OperationDescriptor::new(Method::Post, "admin/products").with_body(json!({"title": "Mug"})),
            GateOptions::default(),
        )
        .await
        .unwrap();
    assert!(outcome.is_dry_run());
    assert_eq!(downstream.call_count(), 0);
    let GateOutcome::DryRun(proposal) = outcome else {
        panic!("expected proposal");
    };
    assert_eq!(proposal.plan.path, "/admin/products");
}

#[tokio::test]
async fn explicit_dry_run_false_executes() {
    let clock = Arc::new(FixedClock::new(T0));
    let (gate, downstream) = gate(true, &clock);
    let outcome = gate
        .plan_or_execute(
            OperationDescriptor::new(Method::Put, "/admin/products/p1"),
            GateOptions::dry_run(Some(false)),
        )
        .await
        .unwrap();
    assert_eq!(outcome.to_json()["mode"], "executed");
    assert_eq!(downstream.call_count(), 1);
}

#[tokio::test]
async fn confirm_disabled_executes_by_default() {
    let clock = Arc::new(FixedClock::new(T0));
    let (gate, downstream) = gate(false, &clock);
    let outcome = gate
        .plan_or_execute(
            OperationDescriptor::new(Method::Post, "/admin/collections"),
            GateOptions::default(),
        )
        .await
        .unwrap();
    assert!(!outcome.is_dry_run());
    assert_eq!(downstream.call_count(), 1);
}

#[tokio::test]
async fn confirm_rechecks_current_allow_list() {
    let clock = Arc::new(FixedClock::new(T0));
    let (gate, _) = gate(true, &clock);
    let outcome = gate
        .plan_or_execute(
            OperationDescriptor::new(Method::Delete, "/auth/session"),
            GateOptions::default(),
        )
        .await
        .unwrap();
    let GateOutcome::DryRun(proposal) = outcome else {
        panic!("expected proposal");
    };

    let downstream = Arc::new(RecordingDownstream::default());
    let narrowed = ConfirmationGate::new(
        PolicyGuard::new(["/admin".to_string()]),
        Some(codec(&clock)),
        downstream.clone(),
        GateSettings::default(),
    );
    let err = narrowed.confirm(&proposal.confirm_token).await.unwrap_err();
    assert!(matches!(err, GateError::Policy(_)));
    assert_eq!(downstream.call_count(), 0);
}

#[tokio::test]
async fn expired_confirm_is_rejected_without_dispatch() {
    let clock = Arc::new(FixedClock::new(T0));
    let (gate, downstream) = gate(true, &clock);
    let GateOutcome::DryRun(proposal) = gate
        .plan_or_execute(
            OperationDescriptor::new(Method::Delete, "/admin/products/p1"),
            GateOptions::default(),
        )
        .await
        .unwrap()
    else {
        panic!("expected proposal");
    };
    clock.advance(301);
    let err = gate.confirm(&proposal.confirm_token).await.unwrap_err();
    assert!(matches!(err, GateError::Token(TokenError::Expired { .. })));
    assert_eq!(downstream.call_count(), 0);
}

#[tokio::test]
async fn double_confirm_within_ttl_executes_twice() {
    let clock = Arc::new(FixedClock::new(T0));
    let (gate, downstream) = gate(true, &clock);
    let GateOutcome::DryRun(proposal) = gate
        .plan_or_execute(
            OperationDescriptor::new(Method::Delete, "/admin/products/p1"),
            GateOptions::default(),
        )
        .await
        .unwrap()
    else {
        panic!("expected proposal");
    };
    gate.confirm(&proposal.confirm_token).await.unwrap();
    gate.confirm(&proposal.confirm_token).await.unwrap();
    assert_eq!(downstream.call_count(), 2);
}

#[tokio::test]
async fn missing_secret_fails_closed() {
    let downstream = Arc::new(RecordingDownstream::default());
    let gate = ConfirmationGate::new(
        PolicyGuard::default(),
        None,
        downstream.clone(),
        GateSettings::default(),
    );
    let err = gate
        .plan_or_execute(
            OperationDescriptor::new(Method::Delete, "/admin/products/p1"),
            GateOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, GateError::ConfirmUnavailable);
    assert_eq!(gate.confirm("a.b").await.unwrap_err(), GateError::ConfirmUnavailable);
    assert_eq!(downstream.call_count(), 0);
}

#[tokio::test]
async fn downstream_failure_surfaces_status() {
    let clock = Arc::new(FixedClock::new(T0));
    let (gate, downstream) = gate(false, &clock);
    *downstream.fail_with.lock().unwrap() = Some(DownstreamError::Rejected {
        status: 404,
        message: "Product not found".to_string(),
    });
    let err = gate
        .plan_or_execute(
            OperationDescriptor::new(Method::Delete, "/admin/products/missing"),
            GateOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.downstream_status(), Some(404));
    assert_eq!(downstream.call_count(), 1);
}
