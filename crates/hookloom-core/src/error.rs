//! Unified kernel error types for hookloom.
//!
//! Registration, plugin installation, and dispatch all surface failures as
//! [`KernelError`] so callers can propagate them with the `?` operator and
//! branch on [`ErrorKind`] where they need to.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed constructor options, hook arguments, or plugin shape.
    Validation,
    /// A placement directive named an owner or handler absent from the chain.
    PlacementNotFound,
    /// An exact name+version, resource, handler, behavior, or constant
    /// was registered twice.
    Duplicate,
    /// A plugin declared a dependency that is not installed yet.
    DependencyMissing,
    /// A plugin's `install` step failed.
    InstallFailed,
    /// `execute` could not resolve a name through the priority chain.
    MethodNotFound,
    /// A named resource or component does not exist.
    NotFound,
    /// The component no longer accepts registrations.
    RegistrationClosed,
    /// A handler or behavior exceeded the configured time budget.
    Timeout,
    /// A hook handler or behavior reported a failure of its own.
    Handler,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::PlacementNotFound => write!(f, "PLACEMENT_NOT_FOUND"),
            Self::Duplicate => write!(f, "DUPLICATE"),
            Self::DependencyMissing => write!(f, "DEPENDENCY_MISSING"),
            Self::InstallFailed => write!(f, "INSTALL_FAILED"),
            Self::MethodNotFound => write!(f, "METHOD_NOT_FOUND"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::RegistrationClosed => write!(f, "REGISTRATION_CLOSED"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Handler => write!(f, "HANDLER"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// The unified error used throughout hookloom.
///
/// Errors raised by external handler and behavior code are expected to be
/// built with [`KernelError::handler`] (or wrapped with
/// [`KernelError::with_source`]) so the kernel can propagate them untouched.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct KernelError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl KernelError {
    /// Create a new kernel error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new kernel error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns whether this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a placement-not-found error.
    pub fn placement_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PlacementNotFound, message)
    }

    /// Create a duplicate-registration error.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Duplicate, message)
    }

    /// Create a dependency-missing error.
    pub fn dependency_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DependencyMissing, message)
    }

    /// Create a method-not-found error.
    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodNotFound, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a registration-closed error.
    pub fn registration_closed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RegistrationClosed, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a handler error. Used by handler and behavior implementations.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Handler, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl Clone for KernelError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for KernelError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for KernelError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
