pub mod cli;
pub mod diagnostics;
pub mod filter;
pub mod overlay;
pub mod preview;
pub mod settings;
