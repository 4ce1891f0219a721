//! Scribe Core - describe images with cloud vision analysis and text generation.
//!
//! Scribe sends each image to an image-analysis service, turns the returned
//! captions, tags and objects into a prompt for a chat-completion deployment,
//! and saves the combined result as one JSON file per image.
//!
//! # Architecture
//!
//! ```text
//! Image → Vision (analyze) → Prompt → Generation (generate) → ProcessingRecord → JSON
//! ```
//!
//! Both services sit behind one-method traits (`VisionAnalyzer`,
//! `TextGenerator`), so the batch driver can run against fakes in tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use scribe_core::{Config, FailurePolicy, InputSource, Scribe};
//!
//! #[tokio::main]
//! async fn main() -> scribe_core::Result<()> {
//!     let config = Config::load_from("config.json".as_ref())?;
//!     let scribe = Scribe::new(&config);
//!     let mut driver = scribe.driver("output", FailurePolicy::Continue);
//!
//!     let summary = driver.run(&InputSource::Directory("input".into())).await?;
//!     println!("{} image(s) described", summary.succeeded.len());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod vision;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, FailureKind, GenerationServiceError, InputError, Result, ScribeError,
    VisionServiceError,
};
pub use llm::{AzureOpenAiClient, Prompt, TextGenerator};
pub use output::RecordWriter;
pub use pipeline::{BatchDriver, BatchSummary, FailurePolicy, InputSource, ProgressEvent};
pub use types::{AnalysisResult, BoundingBox, Caption, DetectedObject, ProcessingRecord, Tag};
pub use vision::{AzureVisionClient, VisionAnalyzer};

use std::path::PathBuf;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The production service clients, built once from a `Config`.
pub struct Scribe {
    vision: AzureVisionClient,
    generator: AzureOpenAiClient,
    language: String,
}

impl Scribe {
    /// Build both service clients. No network traffic happens here.
    pub fn new(config: &Config) -> Self {
        tracing::debug!("Initializing Scribe v{}", VERSION);
        let timeout = config.request_timeout();
        Self {
            vision: AzureVisionClient::new(&config.vision, timeout),
            generator: AzureOpenAiClient::new(&config.openai, timeout),
            language: config.vision.language.clone(),
        }
    }

    /// A batch driver writing records to `output_dir`, asking for answers in
    /// the configured analysis language.
    pub fn driver(
        &self,
        output_dir: impl Into<PathBuf>,
        policy: FailurePolicy,
    ) -> BatchDriver<'_> {
        BatchDriver::new(
            &self.vision,
            &self.generator,
            RecordWriter::new(output_dir),
            policy,
        )
        .with_answer_language(&self.language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_missing_image_leaves_no_output_dir() {
        let mut config = Config::template();
        config.vision.endpoint = "http://127.0.0.1:9".into();
        config.openai.endpoint = "http://127.0.0.1:9".into();
        let scribe = Scribe::new(&config);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        let mut driver = scribe.driver(&out, FailurePolicy::Continue);
        assert_eq!(driver.output_dir(), out.as_path());

        let err = driver
            .run(&InputSource::File(dir.path().join("ghost.jpg")))
            .await
            .unwrap_err();
        assert!(matches!(err, ScribeError::Input(InputError::NotFound(_))));
        assert!(!out.exists());
    }
}
