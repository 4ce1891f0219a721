//! Command-line handlers.

pub mod process;
