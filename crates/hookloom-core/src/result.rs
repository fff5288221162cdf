//! Convenience result type alias for hookloom.

use crate::error::KernelError;

/// A specialized `Result` type for kernel operations.
///
/// Defined so that registration and dispatch code does not need to
/// write `Result<T, KernelError>` explicitly.
pub type KernelResult<T> = Result<T, KernelError>;
