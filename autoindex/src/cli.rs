///
/// This module implements the CLI interface for autoindex: command parsing, config
/// resolution, and the async entrypoint used by both `main()` and the integration tests.
///
/// All pipeline logic (listing, classification, tree building, rendering) lives in the
/// [`autoindex-core`] crate. This module only wires the S3 client and the templates into it.
///
/// ## How To Use
/// - From the shell: `autoindex generate --base-dir www/files --bucket caian-org`
///   or `autoindex generate --config autoindex.yaml`.
/// - Programmatically: call [`run`] with a constructed [`Cli`].
///
/// [`autoindex-core`]: ../../autoindex-core/
/// [`Cli`]: struct.Cli.html
/// [`run`]: fn.run.html
use crate::load_config::resolve_config;
use crate::s3::S3Lister;
use anyhow::Result;
use autoindex_core::autoindex::generate;
use autoindex_core::render::MustacheRenderer;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for autoindex: regenerate the directory listing of an S3 bucket.
#[derive(Parser)]
#[clap(
    name = "autoindex",
    version,
    about = "Regenerate browsable directory listing pages for the objects of an S3 bucket"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the bucket and write one index page per directory into the base directory
    Generate {
        /// Path to a YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Directory receiving the index pages (overrides the config file)
        #[clap(long)]
        base_dir: Option<PathBuf>,
        /// Bucket to index (overrides the config file)
        #[clap(long)]
        bucket: Option<String>,
    },
}

/// Resolve the config, build the S3 lister and renderer, and run one generation.
pub async fn run(cli: Cli) -> Result<()> {
    // First event of every run.
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Generate {
            config,
            base_dir,
            bucket,
        } => {
            let config = resolve_config(config.as_deref(), base_dir, bucket)?;
            tracing::info!(command = "generate", bucket = %config.bucket, "Starting autoindex");

            let renderer = match &config.template {
                Some(path) => MustacheRenderer::from_page_file(path)?,
                None => MustacheRenderer::with_default_templates()?,
            };
            let lister = S3Lister::new_from_env(&config.region).await;

            match generate(&config, &lister, &renderer).await {
                Ok(report) => {
                    tracing::info!(
                        command = "generate",
                        objects = report.objects,
                        files = report.files,
                        directories = report.directories,
                        pages = report.written.len(),
                        "Autoindex complete"
                    );
                    println!(
                        "Wrote {} listing pages for {} objects from bucket \"{}\"",
                        report.written.len(),
                        report.objects,
                        report.bucket
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "generate", error = %e, "Autoindex failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
