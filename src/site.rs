//! Whole-site build
//!
//! Loads the component registry once, then renders every page under the
//! pages directory independently. A page that fails is reported and skipped;
//! a definition that fails stops the build before any page is written.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::component::{DefinitionLoadError, Registry};
use crate::config::SiteConfig;
use crate::page::{Page, PageError};
use crate::renderer::{RenderError, Renderer};
use crate::vars::Variables;

/// Extension of page source files
pub const PAGE_EXTENSION: &str = "hcml";

/// Errors that stop the whole build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to load components: {0}")]
    Components(#[from] DefinitionLoadError),

    #[error("failed to discover pages: {0}")]
    Pages(#[from] walkdir::Error),
}

/// Why a single page was not written
#[derive(Debug, Error)]
pub enum PageBuildError {
    #[error(transparent)]
    Load(#[from] PageError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A page that could not be built
#[derive(Debug)]
pub struct PageFailure {
    /// Page source file
    pub source: PathBuf,
    pub error: PageBuildError,
}

/// Outcome of a build
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Output files written, in page order
    pub written: Vec<PathBuf>,
    /// Pages that failed, in page order
    pub failures: Vec<PageFailure>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A site ready to be built
#[derive(Debug, Clone)]
pub struct Site {
    config: SiteConfig,
    variables: Variables,
}

impl Site {
    pub fn new(config: SiteConfig) -> Self {
        let variables = config.variables();
        Self { config, variables }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Page source files under the pages directory, sorted by path
    pub fn discover_pages(&self) -> Result<Vec<PathBuf>, walkdir::Error> {
        let mut pages = Vec::new();
        for entry in WalkDir::new(&self.config.pages).sort_by_file_name() {
            let entry = entry?;
            let is_page = entry.path().extension().and_then(|ext| ext.to_str()) == Some(PAGE_EXTENSION);
            if entry.file_type().is_file() && is_page {
                pages.push(entry.into_path());
            }
        }
        Ok(pages)
    }

    /// Build every page into the output directory
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let registry = Registry::load_all(&self.config.components)?;
        let pages = self.discover_pages()?;
        info!(
            pages = pages.len(),
            components = registry.len(),
            output = %self.config.output.display(),
            "building site"
        );

        let results: Vec<_> = pages
            .par_iter()
            .map_init(
                || Renderer::new(&registry, &self.variables),
                |renderer, source| (source, self.build_page(renderer, source)),
            )
            .collect();

        let mut report = BuildReport::default();
        for (source, result) in results {
            match result {
                Ok(written) => report.written.push(written),
                Err(error) => {
                    warn!(page = %source.display(), error = %error, "failed to build page");
                    report.failures.push(PageFailure {
                        source: source.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            written = report.written.len(),
            failed = report.failures.len(),
            "build finished"
        );
        Ok(report)
    }

    fn build_page(&self, renderer: &Renderer<'_>, source: &Path) -> Result<PathBuf, PageBuildError> {
        let page = Page::load(source)?;
        let html = page.generate(renderer)?;

        let out = self
            .config
            .output
            .join(page.output_path(source, &self.config.pages));
        let write_error = |err: std::io::Error| PageBuildError::Write {
            path: out.clone(),
            source: err,
        };
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(&out, html).map_err(write_error)?;

        debug!(page = %source.display(), path = %out.display(), "wrote page");
        Ok(out)
    }
}
