//! Integration tests for plugin installation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use hookloom_kernel::{
    Component, ErrorKind, HookContext, KernelError, KernelResult, Placement, Plugin,
    ResourceOverrides, behavior_fn, handler_fn, plugin_fn,
};

use crate::helpers::{CallLog, TestKernel};

/// Stamps every `before_save` context with a tenant id taken from options.
struct TenantPlugin;

#[async_trait]
impl Plugin for TenantPlugin {
    fn name(&self) -> &str {
        "tenant"
    }

    async fn install(
        &self,
        component: &Arc<Component>,
        options: &Value,
        own_name: &str,
    ) -> KernelResult<()> {
        let tenant = options
            .get("tenant")
            .cloned()
            .ok_or_else(|| KernelError::validation("tenant option is required"))?;
        component
            .hook(
                "before_save",
                own_name,
                "stamp",
                Placement::append(),
                handler_fn(move |ctx: HookContext| {
                    let tenant = tenant.clone();
                    async move {
                        ctx.set("tenant", tenant).await;
                        Ok::<_, KernelError>(())
                    }
                }),
            )
            .await?;
        Ok(())
    }
}

/// Rejects saves without a tenant; must run after the tenant stamp.
struct GuardPlugin;

#[async_trait]
impl Plugin for GuardPlugin {
    fn name(&self) -> &str {
        "guard"
    }

    fn dependencies(&self) -> Vec<String> {
        vec!["tenant".to_string()]
    }

    async fn install(
        &self,
        component: &Arc<Component>,
        _options: &Value,
        own_name: &str,
    ) -> KernelResult<()> {
        component
            .hook(
                "before_save",
                own_name,
                "require_tenant",
                Placement::after_plugin("tenant"),
                handler_fn(|ctx: HookContext| async move {
                    Ok::<_, KernelError>(ctx.contains("tenant").await)
                }),
            )
            .await?;
        Ok(())
    }
}

#[tokio::test]
async fn test_trait_plugins_with_dependencies() {
    let kernel = TestKernel::new();
    let store = kernel.component("store", "1.0.0").await;

    let err = store
        .use_plugin(Arc::new(GuardPlugin), Value::Null)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DependencyMissing);
    assert!(store.installed_plugins().await.is_empty());

    store
        .use_plugin(Arc::new(TenantPlugin), json!({ "tenant": "acme" }))
        .await
        .unwrap();
    store
        .use_plugin(Arc::new(GuardPlugin), Value::Null)
        .await
        .unwrap();
    assert_eq!(store.installed_plugins().await, ["tenant", "guard"]);

    let ctx = HookContext::new();
    let report = store.dispatch_hook("before_save", &ctx).await.unwrap();
    assert!(!report.halted());
    assert_eq!(ctx.get("tenant").await, Some(json!("acme")));
}

#[tokio::test]
async fn test_install_error_names_plugin() {
    let kernel = TestKernel::new();
    let store = kernel.component("store", "1.0.0").await;

    let err = store
        .use_plugin(Arc::new(TenantPlugin), Value::Null)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InstallFailed);
    assert!(err.message.contains("'tenant'"));
    assert!(err.message.contains("tenant option is required"));
    assert!(!store.has_plugin("tenant").await);
}

#[tokio::test]
async fn test_double_install_leaves_set_unchanged() {
    let kernel = TestKernel::new();
    let store = kernel.component("store", "1.0.0").await;
    let log = CallLog::new();
    let handler = log.step("metrics");
    let plugin = plugin_fn("metrics", move |component, _options, own_name| {
        let handler = handler.clone();
        async move {
            component
                .hook("after_save", &own_name, "count", Placement::append(), handler)
                .await?;
            Ok::<_, KernelError>(())
        }
    });

    store.use_plugin(plugin.clone(), Value::Null).await.unwrap();
    let err = store.use_plugin(plugin, Value::Null).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Duplicate);
    assert_eq!(store.installed_plugins().await, ["metrics"]);

    // The second install never ran, so the handler is registered once.
    store
        .execute_hook("after_save", &HookContext::new())
        .await
        .unwrap();
    assert_eq!(log.calls().await, ["metrics"]);
}

#[tokio::test]
async fn test_plugin_contributes_resources_and_behaviors() {
    let kernel = TestKernel::new();
    let store = kernel.component("store", "1.0.0").await;
    let plugin = plugin_fn("orders", |component, options, _own_name| async move {
        component
            .implement(
                "count",
                behavior_fn(|_ctx| async { Ok::<_, KernelError>(json!(0)) }),
            )
            .await?;
        component
            .add_resource(
                "orders",
                options,
                ResourceOverrides::new().constant("table", json!("orders_v2")),
            )
            .await?;
        Ok::<_, KernelError>(())
    });

    store
        .use_plugin(plugin, json!({ "shard": 3 }))
        .await
        .unwrap();

    let orders = store.resource("orders").await.unwrap();
    assert_eq!(orders.options(), &json!({ "shard": 3 }));
    assert_eq!(orders.get_constant("table").await, Some(json!("orders_v2")));
    assert_eq!(
        orders.call_method("count", &HookContext::new()).await.unwrap(),
        json!(0)
    );
}
