//! # sdrs-core
//!
//! Core crate for the Storage Data Retention Service. Contains the
//! configuration schemas, the transfer collaborator trait and its boundary
//! types, request-independent validation, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SDRS crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod validation;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
