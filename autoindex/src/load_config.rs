/// `load_config` module: loads a YAML config file and merges CLI overrides into the core
/// [`AutoindexConfig`].
///
/// # Responsibilities
/// - Parse user-supplied YAML into the strongly-typed core config
/// - Apply `--base-dir` / `--bucket` overrides from the command line
/// - Reject configs that cannot run (no bucket, no base directory, unknown timezone) with
///   clear diagnostics before any network or filesystem work starts
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
///
/// Accepted YAML keys mirror [`AutoindexConfig`]:
///
/// ```yaml
/// base_dir: www/files
/// bucket: caian-org
/// region: us-east-1            # optional
/// timezone: America/Sao_Paulo  # optional
/// public_url_base: https://caian-org.s3.amazonaws.com  # optional
/// site_prefix: /files          # optional
/// index_file_name: index.pug   # optional
/// template: build/files-template.pug  # optional
/// ```
use anyhow::Result;
use autoindex_core::config::AutoindexConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Loads and validates a YAML config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AutoindexConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: AutoindexConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    validate(config)
}

/// Builds the run configuration from an optional file plus command-line overrides.
///
/// Without a file, both `base_dir` and `bucket` must be given on the command line.
pub fn resolve_config(
    config_path: Option<&Path>,
    base_dir: Option<PathBuf>,
    bucket: Option<String>,
) -> Result<AutoindexConfig> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => match (&base_dir, &bucket) {
            (Some(base_dir), Some(bucket)) => AutoindexConfig::new(base_dir, bucket),
            _ => {
                error!("Neither --config nor both --base-dir and --bucket were given");
                anyhow::bail!("Either --config or both --base-dir and --bucket are required");
            }
        },
    };

    if let Some(base_dir) = base_dir {
        info!(base_dir = %base_dir.display(), "Overriding base_dir from command line");
        config.base_dir = base_dir;
    }
    if let Some(bucket) = bucket {
        info!(bucket = %bucket, "Overriding bucket from command line");
        config.bucket = bucket;
    }

    let config = validate(config)?;
    config.trace_loaded();
    Ok(config)
}

fn validate(config: AutoindexConfig) -> Result<AutoindexConfig> {
    if config.bucket.trim().is_empty() {
        error!("Config has an empty bucket name");
        anyhow::bail!("bucket must not be empty");
    }
    if config.base_dir.as_os_str().is_empty() {
        error!("Config has an empty base_dir");
        anyhow::bail!("base_dir must not be empty");
    }
    if let Err(e) = config.display_timezone() {
        error!(error = %e, "Config has an invalid timezone");
        anyhow::bail!(e);
    }
    Ok(config)
}
