//! Component registry for storing and retrieving component definitions

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{format_markup_errors, MarkupError};
use crate::parser;

/// File extensions recognised as component definition files
pub const DEFINITION_EXTENSIONS: &[&str] = &["hcml", "xml"];

/// Errors that can occur while loading component definitions
#[derive(Debug, Error)]
pub enum DefinitionLoadError {
    /// Definition file could not be read
    #[error("error reading definition file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Definitions directory could not be walked
    #[error("error walking definitions directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Definition file is not well-formed markup
    #[error("malformed definition file {}: {}", .path.display(), format_markup_errors(.errors, .text))]
    Markup {
        path: PathBuf,
        text: String,
        errors: Vec<MarkupError>,
    },
}

/// A named, reusable component template
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// Component name, taken from the root tag of the definition
    pub name: String,
    /// Namespace declared on the root tag
    pub namespace: Option<String>,
    /// Template text: the trimmed inner content of the root tag
    pub template: String,
    /// File the definition was loaded from
    pub source_path: Option<PathBuf>,
}

impl Definition {
    /// Create a definition directly from a name and template text
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            template: template.into(),
            source_path: None,
        }
    }

    /// Parse a definition from markup with a single root element
    pub fn from_source(source: &str) -> Result<Self, Vec<MarkupError>> {
        let root = parser::parse_root(source)?;
        Ok(Self {
            name: root.name.clone(),
            namespace: root.namespace.clone(),
            template: root.content(source).trim().to_string(),
            source_path: None,
        })
    }

    /// Read and parse a definition file
    pub fn from_file(path: &Path) -> Result<Self, DefinitionLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| DefinitionLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match Self::from_source(&text) {
            Ok(mut def) => {
                def.source_path = Some(path.to_path_buf());
                Ok(def)
            }
            Err(errors) => Err(DefinitionLoadError::Markup {
                path: path.to_path_buf(),
                text,
                errors,
            }),
        }
    }
}

/// Read-only table of component definitions
///
/// Built once through a [`RegistryBuilder`] and never mutated afterwards, so a
/// single registry can be shared by every page of a build.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    definitions: HashMap<String, Definition>,
}

impl Registry {
    /// Start building a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Load every definition file under `dir` into a new registry
    pub fn load_all(dir: impl AsRef<Path>) -> Result<Self, DefinitionLoadError> {
        let mut builder = RegistryBuilder::new();
        builder.load_all(dir)?;
        Ok(builder.finish())
    }

    /// Get a definition by name
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    /// Check if a definition exists
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Get all definition names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Mutable phase of a [`Registry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: HashMap<String, Definition>,
}

impl RegistryBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, returning the one it replaced (last write wins)
    pub fn register(&mut self, def: Definition) -> Option<Definition> {
        debug!(name = %def.name, "registered component definition");
        self.definitions.insert(def.name.clone(), def)
    }

    /// Recursively load all definition files under `dir`
    ///
    /// Stops at the first unreadable or malformed file. Returns the number of
    /// files loaded.
    pub fn load_all(&mut self, dir: impl AsRef<Path>) -> Result<usize, DefinitionLoadError> {
        let dir = dir.as_ref();
        let mut count = 0;

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_definition_file(entry.path()) {
                continue;
            }

            let def = Definition::from_file(entry.path())?;
            if let Some(previous) = self.register(def) {
                debug!(
                    name = %previous.name,
                    path = %entry.path().display(),
                    "definition replaced by later file"
                );
            }
            count += 1;
        }

        info!(count, dir = %dir.display(), "loaded component definitions");
        Ok(count)
    }

    /// Freeze the builder into a read-only registry
    pub fn finish(self) -> Registry {
        Registry {
            definitions: self.definitions,
        }
    }
}

fn is_definition_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DEFINITION_EXTENSIONS.contains(&ext))
}
