//! Processing images: config loading, input selection, and the batch run.

mod batch;

use clap::Args;
use scribe_core::config::{expand_path, DEFAULT_CONFIG_FILE};
use scribe_core::{Config, ConfigError, FailurePolicy, InputSource, Scribe};
use std::path::PathBuf;

use batch::{create_progress_bar, print_summary};

/// Arguments for processing images.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Process a single image instead of the input directory
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Path to the JSON config file with service credentials
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory scanned for images when --image is not given
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    /// Directory the JSON results are written to
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Abort on the first failed image instead of continuing
    #[arg(long)]
    pub strict: bool,
}

/// Values match the clap `#[arg(default_value = ...)]` annotations above.
impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            image: None,
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            strict: false,
        }
    }
}

impl ProcessArgs {
    /// `--image` wins over the input directory.
    pub fn input_source(&self) -> InputSource {
        match &self.image {
            Some(image) => InputSource::File(expand_path(image)),
            None => InputSource::Directory(expand_path(&self.input_dir)),
        }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.strict {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        }
    }
}

/// Load the config, or write a template and fail if there is none yet.
pub fn load_config(args: &ProcessArgs) -> anyhow::Result<Config> {
    let path = expand_path(&args.config);
    match Config::load_from(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(path)) => {
            Config::write_template(&path)?;
            anyhow::bail!(
                "Config file not found: {}\n\n  \
                 A template was written there. Fill in your vision and OpenAI \
                 credentials and run again.",
                path.display()
            );
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!(
            "Failed to load config from {}",
            path.display()
        ))),
    }
}

/// Execute a processing run with an already loaded config.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<()> {
    let source = args.input_source();
    let scribe = Scribe::new(&config);
    let mut driver = scribe.driver(expand_path(&args.output_dir), args.failure_policy());

    let progress = match source {
        InputSource::Directory(_) => Some(create_progress_bar()),
        InputSource::File(_) => None,
    };
    if let Some(pb) = progress.clone() {
        driver = driver.with_progress(move |event| match event {
            scribe_core::ProgressEvent::Started { total } => pb.set_length(*total as u64),
            scribe_core::ProgressEvent::Finished { image, .. } => {
                pb.set_message(
                    image
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
                pb.inc(1);
            }
        });
    }

    let result = driver.run(&source).await;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    let summary = result?;

    print_summary(&summary, driver.output_dir());

    if !summary.all_succeeded() {
        anyhow::bail!(
            "{} of {} image(s) failed",
            summary.failed.len(),
            summary.total()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::{InputError, ScribeError};

    async fn load_and_execute(args: ProcessArgs) -> anyhow::Result<()> {
        let config = load_config(&args)?;
        execute(args, config).await
    }

    fn write_config(dir: &std::path::Path, content: &str) -> PathBuf {
        let path = dir.join("config.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Config whose endpoints refuse connections.
    const UNREACHABLE_CONFIG: &str = r#"{
        "vision": {"endpoint": "http://127.0.0.1:9", "api_key": "k"},
        "openai": {"endpoint": "http://127.0.0.1:9", "api_key": "k", "deployment_name": "gpt-4o"},
        "limits": {"request_timeout_ms": 2000}
    }"#;

    #[test]
    fn process_args_defaults() {
        let args = ProcessArgs::default();
        assert!(args.image.is_none());
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert_eq!(args.input_dir, PathBuf::from("input"));
        assert_eq!(args.output_dir, PathBuf::from("output"));
        assert!(!args.strict);
    }

    #[test]
    fn input_source_prefers_image() {
        let args = ProcessArgs {
            image: Some(PathBuf::from("photos/cat.jpg")),
            ..Default::default()
        };
        assert_eq!(
            args.input_source(),
            InputSource::File(PathBuf::from("photos/cat.jpg"))
        );
        assert_eq!(
            ProcessArgs::default().input_source(),
            InputSource::Directory(PathBuf::from("input"))
        );
    }

    #[test]
    fn strict_selects_abort_policy() {
        let args = ProcessArgs {
            strict: true,
            ..Default::default()
        };
        assert_eq!(args.failure_policy(), FailurePolicy::Abort);
        assert_eq!(
            ProcessArgs::default().failure_policy(),
            FailurePolicy::Continue
        );
    }

    #[tokio::test]
    async fn missing_config_writes_template_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        let args = ProcessArgs {
            config: config.clone(),
            output_dir: dir.path().join("output"),
            ..Default::default()
        };

        let err = load_and_execute(args).await.unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
        assert!(config.exists());
        assert!(!dir.path().join("output").exists());
    }

    #[tokio::test]
    async fn malformed_config_fails_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("cat.jpg"), b"img").unwrap();

        let args = ProcessArgs {
            config: write_config(dir.path(), "{ \"vision\": "),
            input_dir: input,
            output_dir: dir.path().join("output"),
            ..Default::default()
        };

        let err = load_and_execute(args).await.unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(config_err, ConfigError::ParseError(_)));
        assert!(!dir.path().join("output").exists());
    }

    #[tokio::test]
    async fn missing_image_is_input_error_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let args = ProcessArgs {
            image: Some(dir.path().join("ghost.jpg")),
            config: write_config(dir.path(), UNREACHABLE_CONFIG),
            output_dir: dir.path().join("output"),
            ..Default::default()
        };

        let err = load_and_execute(args).await.unwrap_err();
        let scribe_err = err.downcast_ref::<ScribeError>().unwrap();
        assert!(matches!(
            scribe_err,
            ScribeError::Input(InputError::NotFound(_))
        ));
        assert!(!dir.path().join("output").exists());
    }

    #[tokio::test]
    async fn unreachable_service_reports_failed_images() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("a.jpg"), b"img").unwrap();
        std::fs::write(input.join("b.png"), b"img").unwrap();

        let args = ProcessArgs {
            config: write_config(dir.path(), UNREACHABLE_CONFIG),
            input_dir: input,
            output_dir: dir.path().join("output"),
            ..Default::default()
        };

        let err = load_and_execute(args).await.unwrap_err();
        assert!(err.to_string().contains("2 of 2 image(s) failed"));
        assert!(!dir.path().join("output").exists());
    }

    #[tokio::test]
    async fn execute_uses_the_config_it_is_given() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("cat.jpg");
        std::fs::write(&image, b"img").unwrap();
        let config = Config::from_json(UNREACHABLE_CONFIG).unwrap();

        let config_path = dir.path().join("never-read.json");
        let args = ProcessArgs {
            image: Some(image),
            config: config_path.clone(),
            output_dir: dir.path().join("output"),
            ..Default::default()
        };

        let err = execute(args, config).await.unwrap_err();
        assert!(err.to_string().contains("1 of 1 image(s) failed"));
        // The config path is not consulted, so no template appears there
        assert!(!config_path.exists());
    }
}
