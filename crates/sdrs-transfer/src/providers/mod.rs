//! Transfer client implementations.

#[cfg(feature = "http")]
pub mod http;
pub mod memory;

#[cfg(feature = "http")]
pub use http::HttpTransferClient;
pub use memory::InMemoryTransferClient;
