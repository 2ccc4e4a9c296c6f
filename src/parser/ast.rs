//! Syntax tree types for component markup

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Attribute carrying the default namespace for component tags
pub const NAMESPACE_ATTR: &str = "xmlns";

/// Reserved marker attribute that also flags a tag as a component
pub const MARKER_ATTR: &str = "hcmlns";

/// Node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A single `name="value"` pair on a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Name as written, including any prefix
    pub name: String,
    /// Value with entity references decoded
    pub value: String,
    /// Value exactly as written in the source, quotes included
    pub raw: String,
}

impl Attribute {
    /// Build an attribute from a quoted literal as produced by the lexer
    pub fn from_quoted(name: impl Into<String>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let inner = raw
            .get(1..raw.len().saturating_sub(1))
            .unwrap_or_default();
        Self {
            name: name.into(),
            value: decode_entities(inner),
            raw,
        }
    }

    /// True for `xmlns`, `xmlns:*` and the component marker attribute
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == NAMESPACE_ATTR
            || self.name == MARKER_ATTR
            || self.name.starts_with("xmlns:")
    }
}

/// Attribute list with unique names; a later duplicate replaces the earlier value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, replacing any existing one with the same name
    pub fn insert(&mut self, attr: Attribute) {
        match self.0.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => *existing = attr,
            None => self.0.push(attr),
        }
    }

    /// Decoded value of the named attribute
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        let mut attrs = Attributes::new();
        for attr in iter {
            attrs.insert(attr);
        }
        attrs
    }
}

/// A parsed element
///
/// The inner content is not turned into nodes here; `content` is the byte
/// range of everything between the opening and closing tag so callers can
/// re-parse it (or use it verbatim) as they see fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written (`c:greeting`)
    pub qualified_name: String,
    /// Local part of the name (`greeting`)
    pub name: String,
    /// Namespace the element belongs to, if any
    pub namespace: Option<String>,
    /// Attributes with namespace declarations removed
    pub attributes: Attributes,
    /// Byte range of the inner content
    pub content: Span,
    /// Byte range of the whole element
    pub span: Span,
}

impl Element {
    /// Build an element from its tag parts, resolving and stripping namespace declarations
    pub fn new(qualified_name: String, raw_attributes: Vec<Attribute>, content: Span, span: Span) -> Self {
        let (prefix, name) = match qualified_name.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, qualified_name.clone()),
        };

        let declared = |attr_name: &str| {
            raw_attributes
                .iter()
                .rev()
                .find(|a| a.name == attr_name)
                .map(|a| a.value.clone())
        };

        let namespace = match &prefix {
            Some(prefix) => Some(declared(&format!("xmlns:{}", prefix)).unwrap_or_else(|| prefix.clone())),
            None => declared(NAMESPACE_ATTR)
                .filter(|ns| !ns.is_empty())
                .or_else(|| declared(MARKER_ATTR)),
        };

        let attributes = raw_attributes
            .into_iter()
            .filter(|a| !a.is_namespace_declaration())
            .collect();

        Self {
            qualified_name,
            name,
            namespace,
            attributes,
            content,
            span,
        }
    }

    /// Inner content as a slice of the source the element was parsed from
    pub fn content<'s>(&self, source: &'s str) -> &'s str {
        &source[self.content.clone()]
    }

    /// Check whether the element has any inner content at all
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Decoded attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }
}

/// Top-level node of a parsed markup fragment
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element(Element),
    Text(Spanned<String>),
}

impl MarkupNode {
    pub fn span(&self) -> Span {
        match self {
            MarkupNode::Element(el) => el.span.clone(),
            MarkupNode::Text(text) => text.span.clone(),
        }
    }
}

/// Decode XML predefined entities and numeric character references
///
/// Unknown or malformed references are left untouched.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
