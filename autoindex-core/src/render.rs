//! Writes one listing page per structure level.
//!
//! Rows and pages go through a [`PageRenderer`]; [`MustacheRenderer`] is the default one and
//! ships with pug templates that are later compiled by the site generator. Output is trusted
//! markup, so every substitution in the templates is unescaped (`{{{ }}}`).

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::contract::{PageContext, PageRenderer, RowContext, TemplateError};
use crate::structure::{Structure, StructureLevel};

pub const DEFAULT_PAGE_TEMPLATE: &str = include_str!("../templates/files-template.pug");
pub const DEFAULT_ROW_TEMPLATE: &str = include_str!("../templates/index-item.pug");

pub const HOME_LABEL: &str = "Home&#x5BB6;&#x306B;&#x5E30;&#x308B;";
pub const BACK_LABEL: &str = "Back&#x623B;&#x308B;";

/// Rows nest under the `tbody` of the page template.
const ROW_INDENT: usize = 8;
const ROW_STYLES: usize = 4;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template {}: {source}", path.display())]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to compile {what} template: {message}")]
    Compile { what: &'static str, message: String },
    #[error("failed to render {what}: {source}")]
    Template {
        what: &'static str,
        #[source]
        source: TemplateError,
    },
    #[error("level key {key:?} does not map to a directory below the base directory")]
    UnsafeKey { key: String },
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// [`PageRenderer`] backed by compiled mustache templates.
pub struct MustacheRenderer {
    page: mustache::Template,
    row: mustache::Template,
}

impl MustacheRenderer {
    pub fn new(page_template: &str, row_template: &str) -> Result<Self, RenderError> {
        let page = mustache::compile_str(page_template).map_err(|e| RenderError::Compile {
            what: "page",
            message: e.to_string(),
        })?;
        let row = mustache::compile_str(row_template).map_err(|e| RenderError::Compile {
            what: "row",
            message: e.to_string(),
        })?;
        Ok(Self { page, row })
    }

    pub fn with_default_templates() -> Result<Self, RenderError> {
        Self::new(DEFAULT_PAGE_TEMPLATE, DEFAULT_ROW_TEMPLATE)
    }

    /// Page template from disk, default row template.
    pub fn from_page_file(path: &Path) -> Result<Self, RenderError> {
        let page_template = fs::read_to_string(path).map_err(|source| {
            error!(error = ?source, path = %path.display(), "Failed to read page template");
            RenderError::ReadTemplate {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %path.display(), "Loaded page template from disk");
        Self::new(&page_template, DEFAULT_ROW_TEMPLATE)
    }
}

impl PageRenderer for MustacheRenderer {
    fn render_row(&self, row: &RowContext) -> Result<String, TemplateError> {
        self.row
            .render_to_string(row)
            .map_err(|e| TemplateError::from(e.to_string()))
    }

    fn render_page(&self, page: &PageContext) -> Result<String, TemplateError> {
        self.page
            .render_to_string(page)
            .map_err(|e| TemplateError::from(e.to_string()))
    }
}

fn indent(text: &str, level: usize) -> String {
    let pad = " ".repeat(level);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn back_label(is_root_level: bool) -> &'static str {
    if is_root_level {
        HOME_LABEL
    } else {
        BACK_LABEL
    }
}

/// Renders structure levels and writes them below `base_dir`.
pub struct ListingWriter<'r, R: PageRenderer + ?Sized> {
    renderer: &'r R,
    base_dir: PathBuf,
    index_file_name: String,
}

impl<'r, R: PageRenderer + ?Sized> ListingWriter<'r, R> {
    pub fn new(
        renderer: &'r R,
        base_dir: impl Into<PathBuf>,
        index_file_name: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            base_dir: base_dir.into(),
            index_file_name: index_file_name.into(),
        }
    }

    /// Directory receiving the page of level `key`. Keys that are not plain relative paths
    /// (`..`, `.`, absolute) are refused.
    pub fn destination(&self, key: &str) -> Result<PathBuf, RenderError> {
        if key.is_empty() {
            return Ok(self.base_dir.clone());
        }
        let relative = Path::new(key);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            error!(key, "Refusing to write a level outside the base directory");
            return Err(RenderError::UnsafeKey { key: key.to_string() });
        }
        Ok(self.base_dir.join(relative))
    }

    /// Site path of a destination directory: relative to `base_dir`, rooted at `/`.
    pub fn dir_level(&self, destination: &Path) -> String {
        let relative = destination.strip_prefix(&self.base_dir).unwrap_or(destination);
        let segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        format!("/{}", segments.join("/"))
    }

    /// Render the page for one level without touching the filesystem.
    pub fn render_level(
        &self,
        dir_level: String,
        level: &StructureLevel,
    ) -> Result<String, RenderError> {
        let mut rendered_list = String::new();
        for (i, entry) in level.children().enumerate() {
            let row = RowContext {
                idx: (i % ROW_STYLES) + 1,
                icon: if entry.is_directory() { "dir" } else { "file" },
                url: entry.url.clone(),
                name: entry.name.clone(),
                size: entry.size.clone(),
                last_modified: entry.last_modified.clone(),
            };
            let markup = self
                .renderer
                .render_row(&row)
                .map_err(|source| RenderError::Template { what: "row", source })?;
            rendered_list.push_str(&indent(&markup, ROW_INDENT));
        }

        let page = PageContext {
            dir_level,
            back_label: back_label(level.is_root_level).to_string(),
            rendered_list,
        };
        self.renderer
            .render_page(&page)
            .map_err(|source| RenderError::Template { what: "page", source })
    }

    /// Render one level and write it as the index document of its directory.
    pub fn write_level(&self, key: &str, level: &StructureLevel) -> Result<PathBuf, RenderError> {
        let destination = self.destination(key)?;
        fs::create_dir_all(&destination).map_err(|source| {
            error!(error = ?source, path = %destination.display(), "Failed to create listing directory");
            RenderError::CreateDir {
                path: destination.clone(),
                source,
            }
        })?;

        let content = self.render_level(self.dir_level(&destination), level)?;

        let index_path = destination.join(&self.index_file_name);
        info!(path = %self.display_path(&index_path).display(), "Writing listing");
        fs::write(&index_path, content).map_err(|source| {
            error!(error = ?source, path = %index_path.display(), "Failed to write listing");
            RenderError::Write {
                path: index_path.clone(),
                source,
            }
        })?;
        Ok(index_path)
    }

    /// Path relative to the output root, the parent of `base_dir`.
    fn display_path<'p>(&self, path: &'p Path) -> &'p Path {
        self.base_dir
            .parent()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
    }
}

/// Write every level of the structure. Stops at the first failure.
pub fn render_structure<R: PageRenderer + ?Sized>(
    writer: &ListingWriter<'_, R>,
    structure: &Structure,
) -> Result<Vec<PathBuf>, RenderError> {
    let mut written = Vec::with_capacity(structure.len());
    for (key, level) in structure.iter() {
        written.push(writer.write_level(key, level)?);
    }
    Ok(written)
}
