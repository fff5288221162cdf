//! End-to-end scenarios combining registry, plugins, resources, and dispatch.

use std::time::Duration;

use serde_json::{Value, json};

use hookloom_core::config::kernel::KernelConfig;
use hookloom_kernel::{
    Component, ErrorKind, HookContext, HookRegistration, KernelError, Placement, Registry,
    ResourceOverrides, behavior_fn, handler_fn, hook_context, plugin_fn,
};

use crate::helpers::{CallLog, TestKernel};

#[tokio::test]
async fn test_three_plugins_with_after_function() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;
    let log = CallLog::new();

    svc.hook("h", "p1", "f1", Placement::append(), log.step("H1"))
        .await
        .unwrap();
    svc.hook("h", "p2", "f2", Placement::after_function("f1"), log.step("H2"))
        .await
        .unwrap();
    svc.hook("h", "p3", "f3", Placement::append(), log.step("H3"))
        .await
        .unwrap();

    svc.execute_hook("h", &HookContext::new()).await.unwrap();
    assert_eq!(log.calls().await, ["H1", "H2", "H3"]);
}

#[tokio::test]
async fn test_builder_hooks_and_behavior_pipeline() {
    let kernel = TestKernel::new();
    let log = CallLog::new();
    let checkout = kernel
        .registry
        .create(
            Component::builder("checkout")
                .version("2.1.0")
                .constant("currency", json!("EUR"))
                .hook("before_pay", log.step("validate"))
                .hook(
                    "before_pay",
                    HookRegistration::new(log.step("fraud"))
                        .with_id("fraud")
                        .placed(Placement::before_function("before_pay")),
                )
                .implement(
                    "pay",
                    behavior_fn(|ctx: HookContext| async move {
                        let component = ctx
                            .component()
                            .await
                            .ok_or_else(|| KernelError::handler("missing component"))?;
                        let report = component.dispatch_hook("before_pay", &ctx).await?;
                        if report.halted() {
                            return Ok::<_, KernelError>(json!({ "status": "blocked" }));
                        }
                        let currency = component.execute("currency", &ctx).await?;
                        let amount = ctx.get("amount").await.unwrap_or(Value::Null);
                        Ok::<_, KernelError>(json!({
                            "status": "paid",
                            "amount": amount,
                            "currency": currency,
                        }))
                    }),
                ),
        )
        .await
        .unwrap();

    let ctx = hook_context!({ "amount" => json!(40) });
    let result = checkout.execute("pay", &ctx).await.unwrap();

    assert_eq!(
        result,
        json!({ "status": "paid", "amount": 40, "currency": "EUR" })
    );
    assert_eq!(log.calls().await, ["fraud", "validate"]);

    let found = kernel.registry.get("checkout", "^2").await.unwrap();
    assert_eq!(found.hook_order("before_pay").await.len(), 2);
}

#[tokio::test]
async fn test_plugin_halts_behavior_pipeline() {
    let kernel = TestKernel::new();
    let checkout = kernel
        .registry
        .create(Component::builder("checkout").implement(
            "pay",
            behavior_fn(|ctx: HookContext| async move {
                let component = ctx
                    .component()
                    .await
                    .ok_or_else(|| KernelError::handler("missing component"))?;
                let report = component.dispatch_hook("before_pay", &ctx).await?;
                Ok::<_, KernelError>(json!(!report.halted()))
            }),
        ))
        .await
        .unwrap();

    let limit = plugin_fn("limits", |component, options, own_name| async move {
        let max = options["max"].as_i64().unwrap_or(0);
        component
            .hook(
                "before_pay",
                &own_name,
                "max_amount",
                Placement::append(),
                handler_fn(move |ctx: HookContext| async move {
                    let amount = ctx.get("amount").await.and_then(|v| v.as_i64()).unwrap_or(0);
                    Ok::<_, KernelError>(amount <= max)
                }),
            )
            .await?;
        Ok::<_, KernelError>(())
    });
    checkout.use_plugin(limit, json!({ "max": 100 })).await.unwrap();

    let small = hook_context!({ "amount" => json!(40) });
    let large = hook_context!({ "amount" => json!(400) });
    assert_eq!(checkout.execute("pay", &small).await.unwrap(), json!(true));
    assert_eq!(checkout.execute("pay", &large).await.unwrap(), json!(false));
}

#[tokio::test]
async fn test_seal_on_first_dispatch_closes_registration() {
    let registry = Registry::with_config(KernelConfig {
        seal_on_first_dispatch: true,
        ..KernelConfig::default()
    });
    let svc = registry.create(Component::builder("svc")).await.unwrap();
    svc.add_resource("orders", Value::Null, ResourceOverrides::new())
        .await
        .unwrap();

    svc.execute_hook("noop", &HookContext::new()).await.unwrap();

    let err = svc
        .add_resource("invoices", Value::Null, ResourceOverrides::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RegistrationClosed);

    let err = svc
        .use_plugin(
            plugin_fn("late", |_c, _o, _n| async { Ok::<_, KernelError>(()) }),
            Value::Null,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RegistrationClosed);
    assert!(svc.installed_plugins().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slow_behavior_times_out() {
    let registry = Registry::with_config(KernelConfig {
        handler_timeout_ms: Some(100),
        ..KernelConfig::default()
    });
    let svc = registry
        .create(Component::builder("svc").implement(
            "slow",
            behavior_fn(|_ctx| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, KernelError>(Value::Null)
            }),
        ))
        .await
        .unwrap();

    let err = svc.execute("slow", &HookContext::new()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Timeout);
}
