//! # sdrs-transfer
//!
//! Transfer collaborator implementations for SDRS. An in-memory client backs
//! development and tests; the HTTP client talks to the Storage Transfer
//! REST API.

pub mod manager;
pub mod providers;
#[cfg(feature = "http")]
pub mod wire;

pub use manager::connect;
pub use providers::InMemoryTransferClient;
#[cfg(feature = "http")]
pub use providers::HttpTransferClient;
