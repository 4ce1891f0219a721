//! Batch driver - runs every discovered image through analysis, prompt
//! building, generation and persistence, one image at a time.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{InputError, Result, ScribeError};
use crate::llm::{Prompt, TextGenerator};
use crate::output::RecordWriter;
use crate::types::ProcessingRecord;
use crate::vision::VisionAnalyzer;

use super::discovery::{discover, InputSource};

/// What to do when one image of a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure, record it in the summary, move on
    #[default]
    Continue,
    /// Stop the batch and return the first failure
    Abort,
}

/// An image that produced a record.
#[derive(Debug, Clone)]
pub struct CompletedImage {
    pub image: PathBuf,
    /// Path of the JSON record written for it
    pub output: PathBuf,
}

/// An image that produced no record.
#[derive(Debug)]
pub struct FailedImage {
    pub image: PathBuf,
    pub error: ScribeError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<CompletedImage>,
    pub failed: Vec<FailedImage>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when every discovered image produced a record.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum ProgressEvent<'a> {
    /// Discovery finished; `total` images will be attempted
    Started { total: usize },
    /// One image finished, successfully or not
    Finished { image: &'a Path, ok: bool },
}

type ProgressFn = Box<dyn Fn(&ProgressEvent<'_>) + Send + Sync>;

/// Sequential batch driver over the two service adapters.
pub struct BatchDriver<'a> {
    vision: &'a dyn VisionAnalyzer,
    generator: &'a dyn TextGenerator,
    writer: RecordWriter,
    policy: FailurePolicy,
    answer_language: Option<String>,
    on_progress: Option<ProgressFn>,
}

impl<'a> BatchDriver<'a> {
    pub fn new(
        vision: &'a dyn VisionAnalyzer,
        generator: &'a dyn TextGenerator,
        writer: RecordWriter,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            vision,
            generator,
            writer,
            policy,
            answer_language: None,
            on_progress: None,
        }
    }

    /// Ask the generator to answer in the analysis language.
    pub fn with_answer_language(mut self, language: impl Into<String>) -> Self {
        self.answer_language = Some(language.into());
        self
    }

    /// Register a callback for progress events (e.g. a progress bar).
    pub fn with_progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(&ProgressEvent<'_>) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    /// Process every image of `source`.
    ///
    /// Input errors are returned before any service is called. Per-image
    /// failures are logged and then handled according to the failure policy.
    pub async fn run(&mut self, source: &InputSource) -> Result<BatchSummary> {
        let images = discover(source)?;
        tracing::info!(
            "Found {} image(s) to process in {:?}",
            images.len(),
            source.path()
        );
        self.emit(&ProgressEvent::Started {
            total: images.len(),
        });

        let start = Instant::now();
        let mut summary = BatchSummary::default();

        for image in images {
            match self.process_one(&image).await {
                Ok(output) => {
                    self.emit(&ProgressEvent::Finished {
                        image: &image,
                        ok: true,
                    });
                    summary.succeeded.push(CompletedImage { image, output });
                }
                Err(error) => {
                    log_failure(&image, &error);
                    self.emit(&ProgressEvent::Finished {
                        image: &image,
                        ok: false,
                    });
                    if self.policy == FailurePolicy::Abort || error.is_fatal() {
                        return Err(error);
                    }
                    summary.failed.push(FailedImage { image, error });
                }
            }
        }

        summary.elapsed = start.elapsed();
        tracing::info!(
            "Processing finished: {} succeeded, {} failed in {:?} ({} record(s) written)",
            summary.succeeded.len(),
            summary.failed.len(),
            summary.elapsed,
            self.writer.records_written()
        );
        Ok(summary)
    }

    /// Run one image through the full pipeline and persist its record.
    pub async fn process_one(&mut self, image: &Path) -> Result<PathBuf> {
        if image.to_str().is_none() {
            return Err(InputError::NonUtf8Path(image.to_path_buf()).into());
        }
        let start = Instant::now();
        tracing::info!("Analyzing image: {:?}", image);

        let analysis = self.vision.analyze(image).await?;
        tracing::trace!("  Analysis: {:?}", start.elapsed());

        let mut prompt = Prompt::from_analysis(&analysis);
        if let Some(language) = &self.answer_language {
            prompt = prompt.answer_in(language);
        }
        tracing::info!("Generating description for {:?}", image);
        let generated_text = self.generator.generate(&prompt).await?;
        tracing::trace!("  Generation: {:?}", start.elapsed());

        let record = ProcessingRecord::new(image.to_path_buf(), analysis, generated_text);
        let output = self.writer.write(&record)?;

        tracing::debug!("Processed {:?} in {:?}", image, start.elapsed());
        Ok(output)
    }

    /// Directory the records are written to.
    pub fn output_dir(&self) -> &Path {
        self.writer.output_dir()
    }

    fn emit(&self, event: &ProgressEvent<'_>) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(event);
        }
    }
}

fn log_failure(image: &Path, error: &ScribeError) {
    match error {
        ScribeError::Vision(e) => {
            tracing::error!("Failed: {:?} - vision ({} failure): {}", image, e.kind(), e)
        }
        ScribeError::Generation(e) => {
            tracing::error!(
                "Failed: {:?} - generation ({} failure): {}",
                image,
                e.kind(),
                e
            )
        }
        other => tracing::error!("Failed: {:?} - {}", image, other),
    }
}
