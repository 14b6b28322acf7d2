//! Retention job entities.

pub mod model;

pub use model::RetentionJob;
