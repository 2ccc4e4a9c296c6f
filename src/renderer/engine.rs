//! Handlebars-backed template engine
//!
//! Templates see one flat context: every attribute under its placeholder
//! name, plus `Children`. Slots and variables are reached through the `Slot`
//! and `Var` helpers so that they cannot collide with attribute names.
//! Output is never HTML-escaped: attribute values, children and slot content
//! are all markup the page author wrote.

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderError as HandlebarsError,
};
use serde_json::{Map, Value};

use super::scope::{EvaluationError, Scope, TemplateEngine, CHILDREN_KEY, SLOT_HELPER, VAR_HELPER};

/// Default [`TemplateEngine`]
///
/// A fresh registry is set up for every render so the `Slot` and `Var`
/// helpers can borrow the scope they answer for.
#[derive(Debug, Default, Clone, Copy)]
pub struct HandlebarsEngine;

impl HandlebarsEngine {
    pub fn new() -> Self {
        Self
    }

    fn registry<'s>(&self, scope: &'s Scope<'_>) -> Handlebars<'s> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(false);
        registry.register_helper(SLOT_HELPER, Box::new(SlotHelper { scope }));
        registry.register_helper(VAR_HELPER, Box::new(VarHelper { scope }));
        registry
    }
}

impl TemplateEngine for HandlebarsEngine {
    fn render(&self, template: &str, scope: &Scope<'_>) -> Result<String, EvaluationError> {
        self.registry(scope)
            .render_template(template, &context_data(scope))
            .map_err(|e| EvaluationError::new(e.to_string()))
    }
}

fn context_data(scope: &Scope<'_>) -> Value {
    let mut data = Map::new();
    for (name, value) in &scope.attributes {
        data.insert(name.clone(), Value::String(value.to_string()));
    }
    data.insert(
        CHILDREN_KEY.to_string(),
        Value::String(scope.children.clone()),
    );
    Value::Object(data)
}

/// String parameter at `index`, if present
fn string_param<'a>(h: &'a Helper<'_, '_>, index: usize) -> Result<Option<&'a str>, HandlebarsError> {
    match h.param(index) {
        None => Ok(None),
        Some(param) => match param.value() {
            Value::String(s) => Ok(Some(s.as_str())),
            other => Err(HandlebarsError::new(format!(
                "{} expects a string argument, found {}",
                h.name(),
                other
            ))),
        },
    }
}

/// `{{Slot "name"}}`: content assigned to the named slot, empty if none
struct SlotHelper<'s, 'a> {
    scope: &'s Scope<'a>,
}

impl HelperDef for SlotHelper<'_, '_> {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        // Without an argument this is a plain `slot` attribute placeholder
        let content = match string_param(h, 0)? {
            Some(name) => self.scope.slot(name),
            None => self.scope.attribute(SLOT_HELPER).unwrap_or_default(),
        };
        out.write(content)?;
        Ok(())
    }
}

/// `{{Var "name" "default"}}`: page variable, else the default, else empty
struct VarHelper<'s, 'a> {
    scope: &'s Scope<'a>,
}

impl HelperDef for VarHelper<'_, '_> {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let value = match string_param(h, 0)? {
            Some(name) => self.scope.var(name, string_param(h, 1)?),
            None => self.scope.attribute(VAR_HELPER).unwrap_or_default(),
        };
        out.write(value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentInstance;
    use crate::vars::Variables;

    fn render(template: &str, instance: &ComponentInstance, children: &str, vars: &Variables) -> String {
        let scope = Scope::new(instance, children.to_string(), vars);
        HandlebarsEngine::new()
            .render(template, &scope)
            .expect("Should render")
    }

    #[test]
    fn test_attribute_placeholders() {
        let instance = ComponentInstance::new("greeting")
            .with_attribute("name", "World")
            .with_attribute("message", "Hi");
        let out = render("<h1>{{Message}}, {{Name}}!</h1>", &instance, "", &Variables::new());
        assert_eq!(out, "<h1>Hi, World!</h1>");
    }

    #[test]
    fn test_children_are_not_escaped() {
        let instance = ComponentInstance::new("box");
        let out = render("<div>{{Children}}</div>", &instance, "<p>a & b</p>", &Variables::new());
        assert_eq!(out, "<div><p>a & b</p></div>");
    }

    #[test]
    fn test_missing_attribute_renders_empty() {
        let instance = ComponentInstance::new("greeting");
        let out = render("<h1>Hello, {{Name}}!</h1>", &instance, "", &Variables::new());
        assert_eq!(out, "<h1>Hello, !</h1>");
    }

    #[test]
    fn test_slot_helper() {
        let instance = ComponentInstance::new("card").with_slot("header", "<h2>T</h2>");
        let out = render(
            r#"<header>{{Slot "header"}}</header><footer>{{Slot "footer"}}</footer>"#,
            &instance,
            "",
            &Variables::new(),
        );
        assert_eq!(out, "<header><h2>T</h2></header><footer></footer>");
    }

    #[test]
    fn test_var_helper_with_default() {
        let vars: Variables = [("siteName", "My Awesome Site")].into_iter().collect();
        let instance = ComponentInstance::new("footer");
        let out = render(
            r#"{{Var "siteName"}} / {{Var "year" "2026"}} / [{{Var "author"}}]"#,
            &instance,
            "",
            &vars,
        );
        assert_eq!(out, "My Awesome Site / 2026 / []");
    }

    #[test]
    fn test_attribute_named_like_helper() {
        let instance = ComponentInstance::new("nav").with_attribute("slot", "menu");
        let out = render("[{{Slot}}]", &instance, "", &Variables::new());
        assert_eq!(out, "[menu]");
    }

    #[test]
    fn test_slot_named_like_attribute_is_not_an_attribute() {
        let instance = ComponentInstance::new("card")
            .with_attribute("header", "attr")
            .with_slot("Header", "slot");
        let out = render(r#"{{Header}} {{Slot "Header"}}"#, &instance, "", &Variables::new());
        assert_eq!(out, "attr slot");
    }

    #[test]
    fn test_non_string_helper_argument_is_error() {
        let instance = ComponentInstance::new("card");
        let vars = Variables::new();
        let scope = Scope::new(&instance, String::new(), &vars);
        let result = HandlebarsEngine::new().render("{{Slot 3}}", &scope);
        assert!(result.is_err());
    }

    #[test]
    fn test_unclosed_block_is_error() {
        let instance = ComponentInstance::new("card");
        let vars = Variables::new();
        let scope = Scope::new(&instance, String::new(), &vars);
        let result = HandlebarsEngine::new().render("{{#if Name}}open", &scope);
        assert!(result.is_err());
    }
}
