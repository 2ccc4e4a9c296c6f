//! HTML renderer for instance trees
//!
//! Walks an instance tree depth-first, expanding every component instance
//! through its definition's template. Rendering is a pure function of the
//! tree, the registry and the variables; nothing is cached between calls.

mod document;
mod engine;
mod scope;

pub use document::{escape_text, wrap_document};
pub use engine::HandlebarsEngine;
pub use scope::{
    placeholder_name, EvaluationError, Scope, TemplateEngine, CHILDREN_KEY, SLOT_HELPER,
    VAR_HELPER,
};

use thiserror::Error;
use tracing::trace;

use crate::component::{ComponentInstance, Instance, Registry};
use crate::vars::Variables;

/// Errors that abort rendering of a page
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    /// A component instance names a definition the registry does not hold
    #[error("component definition not found: {name}")]
    ComponentNotFound { name: String },

    /// A definition's template failed to evaluate
    #[error("error rendering component {component}: {message}")]
    Template { component: String, message: String },
}

/// Renders instance trees against a registry and a variable store
#[derive(Debug)]
pub struct Renderer<'a, E: TemplateEngine = HandlebarsEngine> {
    registry: &'a Registry,
    variables: &'a Variables,
    engine: E,
}

impl<'a> Renderer<'a> {
    /// Create a renderer using the default template engine
    pub fn new(registry: &'a Registry, variables: &'a Variables) -> Self {
        Self::with_engine(registry, variables, HandlebarsEngine::new())
    }
}

impl<'a, E: TemplateEngine> Renderer<'a, E> {
    pub fn with_engine(registry: &'a Registry, variables: &'a Variables, engine: E) -> Self {
        Self {
            registry,
            variables,
            engine,
        }
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn variables(&self) -> &Variables {
        self.variables
    }

    /// Render a single instance
    pub fn render(&self, instance: &Instance) -> Result<String, RenderError> {
        match instance {
            Instance::Raw(html) => Ok(html.clone()),
            Instance::Component(component) => self.render_component(component),
        }
    }

    /// Render a sequence of instances and concatenate the output in order
    pub fn render_all(&self, instances: &[Instance]) -> Result<String, RenderError> {
        let mut out = String::new();
        for instance in instances {
            out.push_str(&self.render(instance)?);
        }
        Ok(out)
    }

    fn render_component(&self, component: &ComponentInstance) -> Result<String, RenderError> {
        let definition =
            self.registry
                .get(&component.name)
                .ok_or_else(|| RenderError::ComponentNotFound {
                    name: component.name.clone(),
                })?;

        let children = self.render_all(&component.children)?;
        let scope = Scope::new(component, children, self.variables);

        trace!(component = %component.name, "evaluating template");
        self.engine
            .render(&definition.template, &scope)
            .map_err(|e| RenderError::Template {
                component: component.name.clone(),
                message: e.message,
            })
    }
}
