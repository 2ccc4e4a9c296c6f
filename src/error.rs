//! Markup syntax errors

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupError {
    #[error("syntax error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl MarkupError {
    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        MarkupError::Syntax {
            span,
            message: message.into(),
            expected: Vec::new(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            MarkupError::Syntax { span, .. } => span,
        }
    }

    /// The offending source text, clipped to a single short line
    pub fn excerpt<'s>(&self, source: &'s str) -> &'s str {
        let span = self.span();
        let start = span.start.min(source.len());
        let end = span.end.clamp(start, source.len());
        let line_end = source[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(source.len());
        let end = if end == start { line_end } else { end.min(line_end) };
        let excerpt = source.get(start..end).unwrap_or_default();
        match excerpt.char_indices().nth(60) {
            Some((cut, _)) => &excerpt[..cut],
            None => excerpt,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            MarkupError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
                if written.is_err() {
                    return format!("{}: {}", filename, self);
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for MarkupError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        MarkupError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Join several markup errors into one line, quoting the offending source text
pub fn format_markup_errors(errors: &[MarkupError], source: &str) -> String {
    errors
        .iter()
        .map(|e| match e.excerpt(source) {
            "" => e.to_string(),
            excerpt => format!("{} (near {:?})", e, excerpt),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::Token;
    match tok {
        Token::TagOpen => "'<'".to_string(),
        Token::CloseOpen => "'</'".to_string(),
        Token::TagEnd => "'>'".to_string(),
        Token::SelfClose => "'/>'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::Name(n) => format!("name '{}'", n),
        Token::Value(v) => format!("value {}", v),
        Token::Text(t) => format!("text {:?}", t.trim()),
        Token::Comment => "comment".to_string(),
        Token::Declaration => "declaration".to_string(),
        Token::Directive => "directive".to_string(),
        Token::CData(_) => "CDATA section".to_string(),
        Token::Error(s) => format!("invalid input {:?}", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_clips_to_span() {
        let source = "<page>\n  <div class=\"x\">\n</page>";
        let err = MarkupError::syntax(9..24, "unclosed");
        assert_eq!(err.excerpt(source), "<div class=\"x\">");
    }

    #[test]
    fn test_excerpt_of_empty_span_runs_to_line_end() {
        let source = "abc <oops\nnext";
        let err = MarkupError::syntax(4..4, "bad");
        assert_eq!(err.excerpt(source), "<oops");
    }

    #[test]
    fn test_one_line_format_quotes_source() {
        let source = "<a></b>";
        let errors = vec![
            MarkupError::syntax(3..7, "mismatched closing tag"),
            MarkupError::syntax(7..7, "missing root element"),
        ];
        assert_eq!(
            format_markup_errors(&errors, source),
            "syntax error at 3..7: mismatched closing tag (near \"</b>\"); \
             syntax error at 7..7: missing root element"
        );
    }

    #[test]
    fn test_format_includes_message() {
        let source = "<a></b>";
        let err = MarkupError::syntax(3..7, "mismatched closing tag");
        let report = err.format(source, "page.hcml");
        assert!(report.contains("mismatched closing tag"));
    }
}
