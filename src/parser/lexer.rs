//! Lexer for component markup using logos
//!
//! Markup is context sensitive: text between tags may contain anything except
//! `<`, while the inside of a tag is a sequence of names, `=` and quoted values.
//! Two logos lexers cover the two modes and the [`MarkupLexer`] morphs between
//! them whenever a tag opens or closes.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Tokens produced from markup source
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<` starting an opening tag
    TagOpen,
    /// `</` starting a closing tag
    CloseOpen,
    /// `>` ending a tag
    TagEnd,
    /// `/>` ending a self-closing tag
    SelfClose,
    /// `=` between an attribute name and its value
    Equals,
    /// Tag or attribute name, possibly prefixed (`c:greeting`)
    Name(String),
    /// Attribute value including its surrounding quotes
    Value(String),
    /// Character data between tags
    Text(String),
    /// `<!-- ... -->`
    Comment,
    /// `<? ... ?>`
    Declaration,
    /// `<!DOCTYPE ...>` and other `<!` directives
    Directive,
    /// `<![CDATA[ ... ]]>`, kept verbatim
    CData(String),
    /// Input the lexer could not make sense of
    Error(String),
}

#[derive(Logos, Debug, Clone, PartialEq)]
enum ContentToken {
    #[token("<")]
    TagOpen,
    #[token("</")]
    CloseOpen,
    #[regex(r"<!--([^-]|-[^-])*-->")]
    Comment,
    #[regex(r"<\?[^?]*\?>")]
    Declaration,
    #[regex(r"<![^-\[][^>]*>")]
    Directive,
    #[regex(r"<!\[CDATA\[([^\]]|\][^\]]|\]\]+[^\]>])*\]\]+>")]
    CData,
    #[regex(r"[^<]+")]
    Text,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum TagToken {
    #[token(">")]
    TagEnd,
    #[token("/>")]
    SelfClose,
    #[token("=")]
    Equals,
    #[regex(r"[\p{L}_][\p{L}\p{N}_.\-]*(:[\p{L}_][\p{L}\p{N}_.\-]*)?")]
    Name,
    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Value,
}

enum Mode<'s> {
    Content(logos::Lexer<'s, ContentToken>),
    Tag(logos::Lexer<'s, TagToken>),
}

/// Iterator over markup tokens that switches between content and tag mode
pub struct MarkupLexer<'s> {
    mode: Option<Mode<'s>>,
}

impl<'s> MarkupLexer<'s> {
    pub fn new(input: &'s str) -> Self {
        Self {
            mode: Some(Mode::Content(ContentToken::lexer(input))),
        }
    }
}

impl<'s> Iterator for MarkupLexer<'s> {
    type Item = (Token, Span);

    fn next(&mut self) -> Option<Self::Item> {
        match self.mode.take()? {
            Mode::Content(mut lexer) => {
                let result = lexer.next()?;
                let span = lexer.span();
                let token = match result {
                    Ok(ContentToken::TagOpen) => {
                        self.mode = Some(Mode::Tag(lexer.morph()));
                        return Some((Token::TagOpen, span));
                    }
                    Ok(ContentToken::CloseOpen) => {
                        self.mode = Some(Mode::Tag(lexer.morph()));
                        return Some((Token::CloseOpen, span));
                    }
                    Ok(ContentToken::Comment) => Token::Comment,
                    Ok(ContentToken::Declaration) => Token::Declaration,
                    Ok(ContentToken::Directive) => Token::Directive,
                    Ok(ContentToken::CData) => Token::CData(lexer.slice().to_string()),
                    Ok(ContentToken::Text) => Token::Text(lexer.slice().to_string()),
                    Err(()) => Token::Error(lexer.slice().to_string()),
                };
                self.mode = Some(Mode::Content(lexer));
                Some((token, span))
            }
            Mode::Tag(mut lexer) => {
                let result = lexer.next()?;
                let span = lexer.span();
                let token = match result {
                    Ok(TagToken::TagEnd) => {
                        self.mode = Some(Mode::Content(lexer.morph()));
                        return Some((Token::TagEnd, span));
                    }
                    Ok(TagToken::SelfClose) => {
                        self.mode = Some(Mode::Content(lexer.morph()));
                        return Some((Token::SelfClose, span));
                    }
                    Ok(TagToken::Equals) => Token::Equals,
                    Ok(TagToken::Name) => Token::Name(lexer.slice().to_string()),
                    Ok(TagToken::Value) => Token::Value(lexer.slice().to_string()),
                    Err(()) => Token::Error(lexer.slice().to_string()),
                };
                self.mode = Some(Mode::Tag(lexer));
                Some((token, span))
            }
        }
    }
}

/// Tokenize markup source, yielding tokens with their byte spans
pub fn lex(input: &str) -> MarkupLexer<'_> {
    MarkupLexer::new(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            tokens(r#"<a href="/x">hi</a>"#),
            vec![
                Token::TagOpen,
                Token::Name("a".to_string()),
                Token::Name("href".to_string()),
                Token::Equals,
                Token::Value("\"/x\"".to_string()),
                Token::TagEnd,
                Token::Text("hi".to_string()),
                Token::CloseOpen,
                Token::Name("a".to_string()),
                Token::TagEnd,
            ]
        );
    }

    #[test]
    fn test_self_closing_with_prefix() {
        assert_eq!(
            tokens(r#"<c:greeting name='World' />"#),
            vec![
                Token::TagOpen,
                Token::Name("c:greeting".to_string()),
                Token::Name("name".to_string()),
                Token::Equals,
                Token::Value("'World'".to_string()),
                Token::SelfClose,
            ]
        );
    }

    #[test]
    fn test_text_keeps_quotes_and_equals() {
        // Outside of a tag these are plain character data
        assert_eq!(
            tokens(r#"<p>a = "b"</p>"#)[3],
            Token::Text(r#"a = "b""#.to_string())
        );
    }

    #[test]
    fn test_comment_and_declaration() {
        assert_eq!(
            tokens("<?xml version=\"1.0\"?><!-- note --><br/>"),
            vec![
                Token::Declaration,
                Token::Comment,
                Token::TagOpen,
                Token::Name("br".to_string()),
                Token::SelfClose,
            ]
        );
    }

    #[test]
    fn test_doctype_is_directive() {
        assert_eq!(
            tokens("<!DOCTYPE page>\n<page/>"),
            vec![
                Token::Directive,
                Token::Text("\n".to_string()),
                Token::TagOpen,
                Token::Name("page".to_string()),
                Token::SelfClose,
            ]
        );
    }

    #[test]
    fn test_cdata_is_kept_verbatim() {
        let src = "<script><![CDATA[ if (a < b && c[0]] > 1) {} ]]></script>";
        assert_eq!(
            tokens(src)[3],
            Token::CData("<![CDATA[ if (a < b && c[0]] > 1) {} ]]>".to_string())
        );
        assert_eq!(tokens(src)[4], Token::CloseOpen);
    }

    #[test]
    fn test_unicode_names() {
        assert_eq!(
            tokens(r#"<café crème="x"/>"#)[1..3],
            [Token::Name("café".to_string()), Token::Name("crème".to_string())]
        );
    }

    #[test]
    fn test_whitespace_inside_tag_is_skipped() {
        assert_eq!(
            tokens("<div\n   class=\"x\"\t>"),
            vec![
                Token::TagOpen,
                Token::Name("div".to_string()),
                Token::Name("class".to_string()),
                Token::Equals,
                Token::Value("\"x\"".to_string()),
                Token::TagEnd,
            ]
        );
    }

    #[test]
    fn test_template_placeholders_are_text() {
        assert_eq!(
            tokens(r#"<h1>Hello, {{Name}} {{Var "year"}}</h1>"#)[3],
            Token::Text(r#"Hello, {{Name}} {{Var "year"}}"#.to_string())
        );
    }

    #[test]
    fn test_invalid_tag_content_is_error_token() {
        let toks = tokens("<div !>");
        assert!(toks.iter().any(|t| matches!(t, Token::Error(_))));
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let spans: Vec<_> = lex("<b>x</b>").map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..1, 1..2, 2..3, 3..4, 4..6, 6..7, 7..8]);
    }
}
