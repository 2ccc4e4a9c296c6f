//! Evaluation scope handed to the template engine

use std::collections::BTreeMap;

use thiserror::Error;

use crate::component::{ComponentInstance, Slots};
use crate::vars::Variables;

/// Placeholder name under which rendered children are exposed
pub const CHILDREN_KEY: &str = "Children";

/// Helper name for slot lookups: `{{Slot "header"}}`
pub const SLOT_HELPER: &str = "Slot";

/// Helper name for variable lookups: `{{Var "siteName" "default"}}`
pub const VAR_HELPER: &str = "Var";

/// Error reported by a template engine
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct EvaluationError {
    pub message: String,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything a component template can see while it is evaluated
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    /// Component being rendered
    pub component: &'a str,
    /// Attributes keyed by their placeholder name (first letter upper-cased)
    pub attributes: BTreeMap<String, &'a str>,
    /// Concatenated output of the component's children
    pub children: String,
    /// Slot contents of the component
    pub slots: &'a Slots,
    /// Page variables
    pub variables: &'a Variables,
}

impl<'a> Scope<'a> {
    pub fn new(instance: &'a ComponentInstance, children: String, variables: &'a Variables) -> Self {
        Self {
            component: &instance.name,
            attributes: instance
                .attributes
                .iter()
                .map(|(name, value)| (placeholder_name(name), value.as_str()))
                .collect(),
            children,
            slots: &instance.slots,
            variables,
        }
    }

    /// Attribute value by placeholder name
    pub fn attribute(&self, placeholder: &str) -> Option<&'a str> {
        self.attributes.get(placeholder).copied()
    }

    /// Slot content, empty when the slot was never assigned
    pub fn slot(&self, name: &str) -> &'a str {
        self.slots.get(name)
    }

    /// Variable value, falling back to `default` and then to the empty string
    pub fn var<'d>(&self, name: &str, default: Option<&'d str>) -> &'d str
    where
        'a: 'd,
    {
        self.variables.get(name).or(default).unwrap_or_default()
    }
}

/// Placeholder name for an attribute: the first character upper-cased
pub fn placeholder_name(attribute: &str) -> String {
    let mut chars = attribute.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Expands a template's placeholders against a [`Scope`]
pub trait TemplateEngine {
    fn render(&self, template: &str, scope: &Scope<'_>) -> Result<String, EvaluationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_name() {
        assert_eq!(placeholder_name("icon"), "Icon");
        assert_eq!(placeholder_name("Text"), "Text");
        assert_eq!(placeholder_name("siteName"), "SiteName");
        assert_eq!(placeholder_name("éclair"), "Éclair");
        assert_eq!(placeholder_name(""), "");
    }

    #[test]
    fn test_scope_lookups() {
        let instance = ComponentInstance::new("titleBar")
            .with_attribute("icon", "fa-user")
            .with_slot("actions", "<button>Go</button>");
        let mut vars = Variables::new();
        vars.set("siteName", "Site");

        let scope = Scope::new(&instance, "<p>child</p>".to_string(), &vars);
        assert_eq!(scope.component, "titleBar");
        assert_eq!(scope.attribute("Icon"), Some("fa-user"));
        assert_eq!(scope.attribute("icon"), None);
        assert_eq!(scope.children, "<p>child</p>");
        assert_eq!(scope.slot("actions"), "<button>Go</button>");
        assert_eq!(scope.slot("missing"), "");
        assert_eq!(scope.var("siteName", None), "Site");
        assert_eq!(scope.var("year", Some("2026")), "2026");
        assert_eq!(scope.var("year", None), "");
    }
}
