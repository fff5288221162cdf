//! Convenience macros for handler and host code.

/// Builds a [`HookContext`](crate::HookContext) from key/value pairs.
///
/// # Example
/// ```rust,ignore
/// let ctx = hook_context!({
///     "user_id" => json!("u-1"),
///     "amount" => json!(40),
/// });
/// let scoped = hook_context!(resource: "orders", { "id" => json!(7) });
/// ```
#[macro_export]
macro_rules! hook_context {
    () => {
        $crate::HookContext::new()
    };
    ({ $($key:expr => $value:expr),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut data = ::serde_json::Map::new();
        $(
            data.insert($key.to_string(), $value);
        )*
        $crate::HookContext::from_map(data)
    }};
    (resource: $resource:expr, { $($key:expr => $value:expr),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut data = ::serde_json::Map::new();
        $(
            data.insert($key.to_string(), $value);
        )*
        $crate::HookContext::for_resource_with($resource, data)
    }};
}
