//! Batch pipeline components.
//!
//! - **discovery**: Resolve `--image` or the input directory to image paths
//! - **driver**: Run each image through vision, prompt, generation and output

pub mod discovery;
pub mod driver;

// Re-exports for convenient access
pub use discovery::{discover, InputSource, SUPPORTED_EXTENSIONS};
pub use driver::{
    BatchDriver, BatchSummary, CompletedImage, FailedImage, FailurePolicy, ProgressEvent,
};
