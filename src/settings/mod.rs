// Settings — persisted capture, overlay, and failure-policy configuration.

pub mod error;
pub mod store;
pub mod types;
