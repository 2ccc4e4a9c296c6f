//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::MarkupError;
use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Deepest element nesting accepted in one document
pub const MAX_NESTING_DEPTH: usize = 64;

/// What follows the attribute list of an opening tag
#[derive(Debug, Clone)]
enum TagBody {
    /// `/>`
    Empty,
    /// `> ... </name>`
    Content { inner: Span, close: Spanned<String> },
}

/// Parse a markup fragment into its top-level nodes
pub fn parse(input: &str) -> Result<Vec<MarkupNode>, Vec<MarkupError>> {
    parse_range(input, 0..input.len())
}

/// Parse a sub-range of `input`, keeping spans relative to the whole input
pub fn parse_range(input: &str, range: Span) -> Result<Vec<MarkupNode>, Vec<MarkupError>> {
    let offset = range.start;
    let end = range.end;

    // Create the markup lexer and shift spans back into the full source
    let tokens: Vec<(Token, SimpleSpan)> = crate::parser::lexer::lex(&input[range])
        .map(|(tok, span)| (tok, (span.start + offset..span.end + offset).into()))
        .collect();
    check_nesting(&tokens)?;

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(tokens.into_iter())
        // Split (Token, SimpleSpan) into token and span parts
        .map((end..end).into(), |(t, s): (_, _)| (t, s));

    fragment_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Reject input nested deeper than [`MAX_NESTING_DEPTH`] before it reaches
/// the recursive parser
fn check_nesting(tokens: &[(Token, SimpleSpan)]) -> Result<(), Vec<MarkupError>> {
    let mut depth = 0usize;
    for (tok, span) in tokens {
        match tok {
            Token::TagOpen => {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(vec![MarkupError::syntax(
                        span_range(span),
                        format!("elements nested more than {} levels deep", MAX_NESTING_DEPTH),
                    )]);
                }
            }
            Token::SelfClose | Token::CloseOpen => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Parse a document that must consist of exactly one root element
///
/// Whitespace, comments and declarations may surround the root element.
pub fn parse_root(input: &str) -> Result<Element, Vec<MarkupError>> {
    let mut root = None;
    for node in parse(input)? {
        match node {
            MarkupNode::Text(text) if text.node.trim().is_empty() => {}
            MarkupNode::Element(el) if root.is_none() => root = Some(el),
            other => {
                return Err(vec![MarkupError::syntax(
                    other.span(),
                    "unexpected content outside the root element",
                )])
            }
        }
    }
    root.ok_or_else(|| vec![MarkupError::syntax(input.len()..input.len(), "missing root element")])
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn fragment_parser<'a, I>() -> impl Parser<'a, I, Vec<MarkupNode>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let name = select! {
        Token::Name(n) => n,
    }
    .map_with(|n, e| Spanned::new(n, span_range(&e.span())));

    let attribute = select! {
        Token::Name(n) => n,
    }
    .then_ignore(just(Token::Equals))
    .then(select! { Token::Value(v) => v })
    .map(|(name, raw)| Attribute::from_quoted(name, raw));

    // CDATA sections pass through as text, markers included
    let text = select! {
        Token::Text(t) => t,
        Token::CData(t) => t,
    }
    .map_with(|t, e| Spanned::new(t, span_range(&e.span())));

    // Comments, declarations and doctypes carry no content of interest
    let misc = select! {
        Token::Comment => (),
        Token::Declaration => (),
        Token::Directive => (),
    };

    // Recursive element parser
    let element = recursive(|element| {
        let open_tag = just(Token::TagOpen)
            .ignore_then(name.clone())
            .then(attribute.repeated().collect::<Vec<_>>());

        // Children are only checked for well-formedness here; callers
        // re-parse the inner range when they need the nodes
        let content = just(Token::TagEnd)
            .map_with(|_, e| span_range(&e.span()))
            .then_ignore(
                choice((
                    element.clone().ignored(),
                    text.clone().ignored(),
                    misc.clone().ignored(),
                ))
                .repeated(),
            )
            .then(just(Token::CloseOpen).map_with(|_, e| span_range(&e.span())))
            .then(name.clone())
            .then_ignore(just(Token::TagEnd))
            .map(|((open_end, close_start), close)| TagBody::Content {
                inner: open_end.end..close_start.start,
                close,
            });

        open_tag
            .then(choice((just(Token::SelfClose).to(TagBody::Empty), content)))
            .try_map(|((name, attributes), body), span: SimpleSpan| {
                let span = span_range(&span);
                let inner = match body {
                    TagBody::Empty => span.end..span.end,
                    TagBody::Content { inner, close } => {
                        if close.node != name.node {
                            return Err(Rich::custom(
                                SimpleSpan::from(close.span),
                                format!(
                                    "mismatched closing tag: expected </{}>, found </{}>",
                                    name.node, close.node
                                ),
                            ));
                        }
                        inner
                    }
                };
                Ok(Element::new(name.node, attributes, inner, span))
            })
            .boxed()
    });

    // A fragment is a list of elements, text runs and ignorable markup
    choice((
        element.map(|el| Some(MarkupNode::Element(el))),
        text.map(|t| Some(MarkupNode::Text(t))),
        misc.to(Option::<MarkupNode>::None),
    ))
    .repeated()
    .collect::<Vec<_>>()
    .then_ignore(end())
    .map(|nodes| nodes.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(nodes: &[MarkupNode]) -> Vec<&Element> {
        nodes
            .iter()
            .filter_map(|n| match n {
                MarkupNode::Element(el) => Some(el),
                MarkupNode::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_single_element() {
        let src = r#"<div class="box">hello</div>"#;
        let nodes = parse(src).expect("Should parse");
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            MarkupNode::Element(el) => {
                assert_eq!(el.name, "div");
                assert_eq!(el.attr("class"), Some("box"));
                assert_eq!(el.content(src), "hello");
                assert_eq!(el.span, 0..src.len());
            }
            _ => panic!("Expected element"),
        }
    }

    #[test]
    fn test_parse_keeps_inner_content_verbatim() {
        let src = r#"<section><h3>More</h3>  <ul><li>A</li></ul></section>"#;
        let nodes = parse(src).expect("Should parse");
        let el = elements(&nodes)[0];
        assert_eq!(el.content(src), "<h3>More</h3>  <ul><li>A</li></ul>");
    }

    #[test]
    fn test_parse_self_closing_has_empty_content() {
        let src = r#"<c:greeting name="World"/>"#;
        let nodes = parse(src).expect("Should parse");
        let el = elements(&nodes)[0];
        assert!(el.is_empty());
        assert_eq!(el.namespace.as_deref(), Some("c"));
        assert_eq!(el.name, "greeting");
    }

    #[test]
    fn test_parse_mixed_fragment_in_order() {
        let src = "\n  <p>one</p>\n  text\n  <!-- skip --><br />";
        let nodes = parse(src).expect("Should parse");
        assert_eq!(nodes.len(), 4);
        assert!(matches!(&nodes[0], MarkupNode::Text(t) if t.node.trim().is_empty()));
        assert!(matches!(&nodes[1], MarkupNode::Element(el) if el.name == "p"));
        assert!(matches!(&nodes[2], MarkupNode::Text(t) if t.node.trim() == "text"));
        assert!(matches!(&nodes[3], MarkupNode::Element(el) if el.name == "br"));
    }

    #[test]
    fn test_parse_range_spans_are_absolute() {
        let src = r#"<page><p>x</p></page>"#;
        let root = parse_root(src).expect("Should parse");
        let nodes = parse_range(src, root.content.clone()).expect("Should parse");
        assert_eq!(nodes[0].span(), 6..14);
    }

    #[test]
    fn test_mismatched_closing_tag_is_error() {
        let errs = parse("<div><p>x</div></p>").unwrap_err();
        assert!(!errs.is_empty());
    }

    #[test]
    fn test_mismatched_closing_tag_message() {
        let errs = parse("<div>x</span>").unwrap_err();
        assert!(
            errs.iter().any(|e| e.to_string().contains("mismatched closing tag")),
            "got {:?}",
            errs
        );
    }

    #[test]
    fn test_unterminated_element_is_error() {
        assert!(parse("<div><p>x</p>").is_err());
    }

    #[test]
    fn test_stray_closing_tag_is_error() {
        assert!(parse("text</div>").is_err());
    }

    #[test]
    fn test_parse_root_with_prolog() {
        let src = "<?xml version=\"1.0\"?>\n<page title=\"Home\">\n</page>\n";
        let root = parse_root(src).expect("Should parse");
        assert_eq!(root.name, "page");
        assert_eq!(root.attr("title"), Some("Home"));
    }

    #[test]
    fn test_parse_root_with_doctype() {
        let src = "<!DOCTYPE page>\n<page title=\"x\"></page>";
        let root = parse_root(src).expect("Should parse");
        assert_eq!(root.name, "page");
        assert_eq!(root.attr("title"), Some("x"));
    }

    #[test]
    fn test_cdata_content_is_verbatim() {
        let inner = "<script><![CDATA[ if (a < b && c[0]] > 1) {} ]]></script>";
        let src = format!("<script_box>{}</script_box>", inner);
        let root = parse_root(&src).expect("Should parse");
        assert_eq!(root.content(&src), inner);

        let nodes = parse_range(&src, root.content.clone()).expect("Should parse");
        let script = elements(&nodes)[0];
        let cdata = parse_range(&src, script.content.clone()).expect("Should parse");
        assert!(matches!(
            &cdata[..],
            [MarkupNode::Text(t)] if t.node == "<![CDATA[ if (a < b && c[0]] > 1) {} ]]>"
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}x{}", "<d>".repeat(depth), "</d>".repeat(depth));
        assert!(parse(&nested(MAX_NESTING_DEPTH)).is_ok());

        let errs = parse(&nested(1000)).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].to_string().contains("nested more than 64 levels"));
    }

    #[test]
    fn test_parse_root_rejects_two_roots() {
        assert!(parse_root("<a/><b/>").is_err());
    }

    #[test]
    fn test_parse_root_rejects_empty_input() {
        assert!(parse_root("   ").is_err());
    }
}
