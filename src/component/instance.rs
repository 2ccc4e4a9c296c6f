//! Instance tree construction
//!
//! Turns parsed markup into the tree the renderer walks. Every element is
//! classified exactly once: namespaced tags are component references, plain
//! tags with a `slot` attribute fill a slot of their parent component, and
//! everything else is passed through as raw HTML.

use std::collections::BTreeMap;

use crate::error::MarkupError;
use crate::parser::{self, Element, MarkupNode, Span};

/// Attribute that turns a plain element into a slot assignment
pub const SLOT_ATTR: &str = "slot";

/// A node of a page's render tree
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    /// Use of a registered component definition
    Component(ComponentInstance),
    /// Literal markup emitted as-is
    Raw(String),
}

/// One use of a component definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentInstance {
    /// Name of the definition to render
    pub name: String,
    /// Attributes as written on the tag, namespace declarations removed
    pub attributes: BTreeMap<String, String>,
    /// Child instances in document order, excluding slot assignments
    pub children: Vec<Instance>,
    /// Slot contents keyed by slot name
    pub slots: Slots,
}

impl ComponentInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Instance) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_slot(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.slots.insert(name, content);
        self
    }
}

impl From<ComponentInstance> for Instance {
    fn from(instance: ComponentInstance) -> Self {
        Instance::Component(instance)
    }
}

/// Named markup fragments assigned to a component
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slots(BTreeMap<String, String>);

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a slot, replacing any earlier content with the same name
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.0.insert(name.into(), content.into());
    }

    /// Content of the named slot; undefined slots are empty
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(|s| s.as_str()).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How an element takes part in the instance tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    /// Namespaced tag naming a component definition
    ComponentRef,
    /// Plain tag whose inner content fills the named slot
    SlotAssignment { slot: &'a str },
    /// Plain tag reproduced verbatim
    RawHtml,
}

impl<'a> NodeKind<'a> {
    /// Classify an element; the component check always comes first
    pub fn of(element: &'a Element) -> Self {
        if element.namespace.is_some() {
            NodeKind::ComponentRef
        } else if let Some(slot) = element.attr(SLOT_ATTR) {
            NodeKind::SlotAssignment { slot }
        } else {
            NodeKind::RawHtml
        }
    }
}

/// Result of building one node, before slot assignments are folded into their parent
enum Built {
    Instance(Instance),
    Slot { name: String, content: String },
}

/// Build the instance list for the markup in `range` of `source`
///
/// Slot assignments at this level have no parent component to bind to; their
/// inner content is kept as raw HTML.
pub fn build_instances(source: &str, range: Span) -> Result<Vec<Instance>, Vec<MarkupError>> {
    Ok(build_nodes(source, range)?
        .into_iter()
        .map(|built| match built {
            Built::Instance(instance) => instance,
            Built::Slot { content, .. } => Instance::Raw(content),
        })
        .collect())
}

/// Build the instance list for a standalone markup fragment
pub fn build_fragment(source: &str) -> Result<Vec<Instance>, Vec<MarkupError>> {
    build_instances(source, 0..source.len())
}

fn build_nodes(source: &str, range: Span) -> Result<Vec<Built>, Vec<MarkupError>> {
    let mut built = Vec::new();
    for node in parser::parse_range(source, range)? {
        match node {
            MarkupNode::Text(text) => {
                if !text.node.trim().is_empty() {
                    built.push(Built::Instance(Instance::Raw(text.node)));
                }
            }
            MarkupNode::Element(element) => built.push(build_element(source, &element)?),
        }
    }
    Ok(built)
}

fn build_element(source: &str, element: &Element) -> Result<Built, Vec<MarkupError>> {
    match NodeKind::of(element) {
        NodeKind::ComponentRef => {
            let mut instance = ComponentInstance::new(element.name.clone());
            instance.attributes = element
                .attributes
                .iter()
                .map(|a| (a.name.clone(), a.value.clone()))
                .collect();

            for child in build_nodes(source, element.content.clone())? {
                match child {
                    Built::Instance(child) => instance.children.push(child),
                    Built::Slot { name, content } => instance.slots.insert(name, content),
                }
            }
            Ok(Built::Instance(Instance::Component(instance)))
        }
        NodeKind::SlotAssignment { slot } => Ok(Built::Slot {
            name: slot.to_string(),
            content: element.content(source).to_string(),
        }),
        NodeKind::RawHtml => Ok(Built::Instance(Instance::Raw(reconstruct_html(source, element)))),
    }
}

/// Rebuild the literal markup of a plain element
///
/// Attribute values are written exactly as they appeared in the source, and
/// an element without content is written in self-closing form.
pub fn reconstruct_html(source: &str, element: &Element) -> String {
    let mut html = String::new();
    html.push('<');
    html.push_str(&element.qualified_name);
    for attr in element.attributes.iter() {
        html.push(' ');
        html.push_str(&attr.name);
        html.push('=');
        html.push_str(&attr.raw);
    }

    if element.is_empty() {
        html.push_str(" />");
        return html;
    }

    html.push('>');
    html.push_str(element.content(source));
    html.push_str("</");
    html.push_str(&element.qualified_name);
    html.push('>');
    html
}
