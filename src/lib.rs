//! Staticgen - a component-based static HTML generator
//!
//! Components are defined once as named templates; pages reference them as
//! namespaced tags, pass attributes, fill named slots and nest them. This
//! library provides the markup parser, the component registry, the renderer
//! and a site build driver.
//!
//! # Example
//!
//! ```rust
//! use staticgen::{render_page, Definition, Registry, Variables};
//!
//! let mut builder = Registry::builder();
//! builder.register(Definition::new("greeting", "<h1>Hello, {{Name}}!</h1>"));
//! let registry = builder.finish();
//!
//! let html = render_page(
//!     r#"<page title="Home"><c:greeting name="World" /></page>"#,
//!     &registry,
//!     &Variables::new(),
//! )
//! .unwrap();
//! assert!(html.contains("<title>Home</title>"));
//! assert!(html.contains("<h1>Hello, World!</h1>"));
//! ```

pub mod component;
pub mod config;
pub mod error;
pub mod page;
pub mod parser;
pub mod renderer;
pub mod site;
pub mod vars;

pub use component::{ComponentInstance, Definition, DefinitionLoadError, Instance, Registry};
pub use config::{ConfigError, SiteConfig};
pub use error::MarkupError;
pub use page::{Page, PageError};
pub use renderer::{HandlebarsEngine, RenderError, Renderer, TemplateEngine};
pub use site::{BuildError, BuildReport, Site};
pub use vars::Variables;

use std::path::Path;

use thiserror::Error;

/// Errors from the one-shot [`render_page`] pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Error loading the page
    #[error(transparent)]
    Page(#[from] PageError),

    /// Error rendering the page
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Render page markup to a complete HTML document
///
/// Parses the page, builds its instance tree and renders it against
/// `registry` and `variables` with the default template engine.
pub fn render_page(source: &str, registry: &Registry, variables: &Variables) -> Result<String, Error> {
    let page = Page::from_source(source, Path::new("<page>"))?;
    let html = page.generate(&Renderer::new(registry, variables))?;
    Ok(html)
}
