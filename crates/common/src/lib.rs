//! Shared building blocks for the catering admin workspace: health payload and logging setup.

pub mod types;
pub mod utils;
