//! Integration tests for resource scopes and priority resolution.

use serde_json::{Value, json};

use hookloom_kernel::{
    Component, ErrorKind, HookContext, HookRegistration, KernelError, Resolution,
    ResourceOverrides, Scope, behavior_fn, hook_context,
};

use crate::helpers::{CallLog, TestKernel};

#[tokio::test]
async fn test_resource_constant_beats_component_behavior() {
    let kernel = TestKernel::new();
    let svc = kernel
        .registry
        .create(Component::builder("svc").implement(
            "limit",
            behavior_fn(|_ctx| async { Ok::<_, KernelError>(json!("from behavior")) }),
        ))
        .await
        .unwrap();

    let orders = svc
        .add_resource(
            "orders",
            Value::Null,
            ResourceOverrides::new().constant("limit", json!(10)),
        )
        .await
        .unwrap();

    let ctx = HookContext::new();
    assert_eq!(orders.call_method("limit", &ctx).await.unwrap(), json!(10));
    assert_eq!(svc.execute("limit", &ctx).await.unwrap(), json!("from behavior"));
}

#[tokio::test]
async fn test_precedence_independent_of_registration_order() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;

    // Resource first, component behavior afterwards.
    let orders = svc
        .add_resource(
            "orders",
            Value::Null,
            ResourceOverrides::new().constant("limit", json!(10)),
        )
        .await
        .unwrap();
    svc.implement(
        "limit",
        behavior_fn(|_ctx| async { Ok::<_, KernelError>(json!("from behavior")) }),
    )
    .await
    .unwrap();

    assert!(matches!(orders.resolve("limit").await, Resolution::Constant(_)));
    assert!(matches!(
        svc.resolve(Scope::Component, "limit").await.unwrap(),
        Resolution::Behavior(_)
    ));
}

#[tokio::test]
async fn test_resource_behavior_sees_resource_and_component() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "2.0.0").await;
    svc.add_constant("page_size", json!(25)).await.unwrap();
    let orders = svc
        .add_resource(
            "orders",
            json!({ "table": "orders" }),
            ResourceOverrides::new().implement(
                "describe",
                behavior_fn(|ctx: HookContext| async move {
                    let component = ctx
                        .component()
                        .await
                        .ok_or_else(|| KernelError::handler("missing component"))?;
                    let resource = ctx.resource().await.unwrap_or_default();
                    let view = component
                        .resource(&resource)
                        .await
                        .ok_or_else(|| KernelError::handler("missing resource"))?;
                    Ok::<_, KernelError>(json!({
                        "resource": resource,
                        "table": view.options()["table"].clone(),
                        "page_size": view.get_constant("page_size").await,
                    }))
                }),
            ),
        )
        .await
        .unwrap();

    let result = orders
        .call_method("describe", &HookContext::new())
        .await
        .unwrap();
    assert_eq!(
        result,
        json!({ "resource": "orders", "table": "orders", "page_size": 25 })
    );
}

#[tokio::test]
async fn test_resource_hooks_only_run_for_their_resource() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;
    let log = CallLog::new();

    let orders = svc
        .add_resource(
            "orders",
            Value::Null,
            ResourceOverrides::new()
                .hook("before_save", log.step("orders"))
                .hook(
                    "before_save",
                    HookRegistration::new(log.step("orders-audit"))
                        .with_id("audit")
                        .component_wide(),
                ),
        )
        .await
        .unwrap();
    svc.add_resource(
        "invoices",
        Value::Null,
        ResourceOverrides::new().hook("before_save", log.step("invoices")),
    )
    .await
    .unwrap();

    orders
        .execute_hook("before_save", &HookContext::new())
        .await
        .unwrap();
    assert_eq!(log.calls().await, ["orders", "orders-audit"]);

    svc.execute_hook("before_save", &hook_context!(resource: "invoices", {}))
        .await
        .unwrap();
    assert_eq!(
        log.calls().await,
        ["orders", "orders-audit", "orders-audit", "invoices"]
    );

    assert_eq!(
        svc.hooks_owned_by("orders").await,
        [
            ("before_save".to_string(), "audit".to_string()),
            ("before_save".to_string(), "before_save".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_duplicate_resource_registers_nothing() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;
    let log = CallLog::new();

    svc.add_resource("orders", Value::Null, ResourceOverrides::new())
        .await
        .unwrap();
    let err = svc
        .add_resource(
            "orders",
            Value::Null,
            ResourceOverrides::new().hook("before_save", log.step("second")),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Duplicate);
    assert_eq!(svc.handler_count("before_save").await, 0);
    assert_eq!(svc.resource_names().await, ["orders"]);
}

#[tokio::test]
async fn test_unknown_resource_and_missing_method() {
    let kernel = TestKernel::new();
    let svc = kernel.component("svc", "1.0.0").await;

    let err = svc
        .execute_in(Scope::Resource("ghost"), "anything", &HookContext::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let orders = svc
        .add_resource("orders", Value::Null, ResourceOverrides::new())
        .await
        .unwrap();
    let err = orders
        .call_method("anything", &HookContext::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::MethodNotFound);
    assert!(err.message.contains("resource 'orders'"));
}
