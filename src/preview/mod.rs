// Preview pipeline — buffer pool, frame sources, and frame delivery.

pub mod error;
pub mod pipeline;
pub mod pool;
pub mod source;
pub mod types;
