//! Scribe CLI - describe images with cloud vision analysis and text generation.
//!
//! Each image is analyzed by the vision service, the resulting captions, tags
//! and objects are turned into a prompt for the chat-completion deployment,
//! and the combined result is saved as one JSON file per image.
//!
//! # Usage
//!
//! ```bash
//! # Process every image in ./input, writing results to ./output
//! scribe
//!
//! # Process a single image with an alternate config file
//! scribe --image photos/cat.jpg --config ~/scribe.json
//!
//! # Stop at the first failure instead of skipping it
//! scribe --input-dir ./photos --strict
//! ```

use clap::Parser;

mod cli;
mod logging;

/// Scribe - describe images with cloud vision analysis and text generation.
#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,

    #[command(flatten)]
    process: cli::process::ProcessArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging settings live in the config file; a missing or broken config
    // still gets default logging before its error is reported.
    let config = cli::process::load_config(&cli.process);
    let logging = config
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    logging::init_from_config(&logging, cli.verbose, cli.json_logs);

    tracing::debug!("Scribe v{}", scribe_core::VERSION);

    cli::process::execute(cli.process, config?).await
}
