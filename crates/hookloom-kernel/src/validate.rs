//! Identifier checks shared by every registration path.

use hookloom_core::{KernelError, KernelResult};

/// Requires a non-empty identifier without whitespace or control characters.
pub(crate) fn identifier(kind: &str, value: &str) -> KernelResult<()> {
    if value.is_empty() {
        return Err(KernelError::validation(format!("{kind} must not be empty")));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(KernelError::validation(format!(
            "{kind} '{}' must not contain whitespace or control characters",
            value.escape_debug()
        )));
    }
    Ok(())
}
