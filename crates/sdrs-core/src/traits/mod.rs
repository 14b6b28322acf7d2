//! Core traits defined in `sdrs-core` and implemented by other crates.

pub mod transfer;

pub use transfer::TransferClient;
