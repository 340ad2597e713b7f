// Diagnostics — per-session frame and drop counters.

pub mod stats;
