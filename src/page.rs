//! Page loading and document generation

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::component::{build_instances, Instance};
use crate::error::{format_markup_errors, MarkupError};
use crate::parser;
use crate::renderer::{wrap_document, RenderError, Renderer, TemplateEngine};

/// Tag name every page file must use as its root element
pub const PAGE_TAG: &str = "page";

/// Errors that can occur while loading a page
#[derive(Debug, Error)]
pub enum PageError {
    /// Page file could not be read
    #[error("error reading page file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Page is not well-formed markup
    #[error("malformed page {}: {}", .path.display(), format_markup_errors(.errors, .text))]
    Markup {
        path: PathBuf,
        text: String,
        errors: Vec<MarkupError>,
    },

    /// Root element is not `<page>`
    #[error("root element of {} must be 'page', got '{}'", .path.display(), .found)]
    InvalidRootElement { path: PathBuf, found: String },
}

/// One output document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    /// Document title, empty when the page does not set one
    pub title: String,
    /// Explicit output location, as written in the `path` attribute
    pub path: Option<String>,
    /// Root-level instances of the page body
    pub components: Vec<Instance>,
}

impl Page {
    /// Parse a page from markup; `file` is only used for error context
    pub fn from_source(source: &str, file: &Path) -> Result<Self, PageError> {
        let markup_error = |errors: Vec<MarkupError>| PageError::Markup {
            path: file.to_path_buf(),
            text: source.to_string(),
            errors,
        };

        let root = parser::parse_root(source).map_err(markup_error)?;
        if root.name != PAGE_TAG {
            return Err(PageError::InvalidRootElement {
                path: file.to_path_buf(),
                found: root.name,
            });
        }

        let components = build_instances(source, root.content.clone()).map_err(markup_error)?;
        debug!(
            path = %file.display(),
            instances = components.len(),
            "loaded page"
        );

        Ok(Self {
            title: root.attr("title").unwrap_or_default().to_string(),
            path: root.attr("path").map(str::to_string),
            components,
        })
    }

    /// Read and parse a page file
    pub fn load(path: &Path) -> Result<Self, PageError> {
        let text = std::fs::read_to_string(path).map_err(|source| PageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(&text, path)
    }

    /// Where this page should be written, relative to the output directory
    ///
    /// An explicit `path` attribute wins; otherwise the source file's location
    /// under `pages_root` is reused with an `.html` extension.
    pub fn output_path(&self, source_file: &Path, pages_root: &Path) -> PathBuf {
        match &self.path {
            Some(explicit) => {
                let normalized = explicit.replace('\\', "/");
                PathBuf::from(normalized.trim_start_matches('/'))
            }
            None => source_file
                .strip_prefix(pages_root)
                .unwrap_or(source_file)
                .with_extension("html"),
        }
    }

    /// Render the page body and wrap it in the document skeleton
    pub fn generate<E: TemplateEngine>(&self, renderer: &Renderer<'_, E>) -> Result<String, RenderError> {
        let body = renderer.render_all(&self.components)?;
        Ok(wrap_document(&self.title, &body))
    }
}
