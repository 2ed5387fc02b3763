//! High-level pipeline: list -> classify -> build structure -> render.
//!
//! This module wires the components of the crate into a single run that regenerates the
//! listing pages for one bucket:
//!   - Lists every object of the bucket through an [`ObjectLister`]
//!   - Classifies the objects into file and directory rows
//!   - Rebuilds the directory tree, one level per directory plus the root
//!   - Renders each level through a [`PageRenderer`] into `base_dir`
//!
//! # Error Handling
//! Every phase runs to completion before the next starts. A listing failure aborts before
//! anything is written; a filesystem or template failure aborts the remaining writes and
//! leaves earlier pages in place. Runs are idempotent, so the caller simply re-runs.
//!
//! # Navigation
//! - Main entrypoint: [`generate`]
//! - Supporting types: [`AutoindexReport`], [`AutoindexError`]

use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::classify::{objects_to_directories, objects_to_files, process_objects};
use crate::config::AutoindexConfig;
use crate::contract::{ListError, ObjectLister, PageRenderer};
use crate::listing::list_all_objects;
use crate::render::{render_structure, ListingWriter, RenderError};
use crate::structure::build_structure;

#[derive(Debug, Error)]
pub enum AutoindexError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to list bucket `{bucket}`: {source}")]
    Listing {
        bucket: String,
        #[source]
        source: ListError,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct AutoindexReport {
    pub bucket: String,
    pub objects: usize,
    pub files: usize,
    pub directories: usize,
    /// Index documents written, root level first.
    pub written: Vec<PathBuf>,
}

pub async fn generate<L, R>(
    config: &AutoindexConfig,
    lister: &L,
    renderer: &R,
) -> Result<AutoindexReport, AutoindexError>
where
    L: ObjectLister + ?Sized,
    R: PageRenderer + ?Sized,
{
    info!(bucket = %config.bucket, base_dir = %config.base_dir.display(), "[AUTOINDEX] Starting");

    let classify_options = config.classify_options().map_err(|e| {
        error!(error = %e, "[AUTOINDEX][ERROR] Invalid display timezone");
        AutoindexError::Config(e)
    })?;
    let url_options = config.url_options();

    // --- Step 1: List ---
    let raw = list_all_objects(lister, &config.bucket).await.map_err(|source| {
        error!(bucket = %config.bucket, error = %source, "[AUTOINDEX][ERROR] Listing failed");
        AutoindexError::Listing {
            bucket: config.bucket.clone(),
            source,
        }
    })?;

    // --- Step 2: Classify ---
    let objects = process_objects(&raw, &classify_options);
    let directories = objects_to_directories(&objects, &url_options);
    let files = objects_to_files(&objects, &url_options);
    info!(
        bucket = %config.bucket,
        objects = objects.len(),
        files = files.len(),
        directories = directories.len(),
        "[AUTOINDEX] Got objects from bucket"
    );

    // --- Step 3: Structure ---
    let structure = build_structure(&directories, &files);
    info!(levels = structure.len(), "[AUTOINDEX] File structure generated");
    match serde_json::to_string_pretty(&structure) {
        Ok(json) => debug!(json = %json, "[AUTOINDEX][DEBUG] Structure as JSON"),
        Err(e) => debug!(error = ?e, "[AUTOINDEX][DEBUG] Failed to serialize structure"),
    }

    // --- Step 4: Render ---
    let writer = ListingWriter::new(renderer, &config.base_dir, &config.index_file_name);
    let written = render_structure(&writer, &structure).map_err(|e| {
        error!(error = %e, "[AUTOINDEX][ERROR] Writing listings failed");
        e
    })?;
    info!(pages = written.len(), "[AUTOINDEX] Done");

    Ok(AutoindexReport {
        bucket: config.bucket.clone(),
        objects: objects.len(),
        files: files.len(),
        directories: directories.len(),
        written,
    })
}
