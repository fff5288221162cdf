//! # hookloom-core
//!
//! Core crate for hookloom. Contains the unified error system and the
//! configuration schemas shared by the kernel and the host binary.
//!
//! This crate has **no** internal dependencies on other hookloom crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{ErrorKind, KernelError};
pub use result::KernelResult;
