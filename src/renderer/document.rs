//! HTML document skeleton around a rendered page body

/// Wrap a rendered body in a minimal HTML5 document
pub fn wrap_document(title: &str, body: &str) -> String {
    let title = escape_text(title);
    let mut html = String::with_capacity(body.len() + title.len() + 96);
    html.push_str("<!DOCTYPE html><html><head><title>");
    html.push_str(&title);
    html.push_str("</title></head><body>");
    html.push_str(body);
    html.push_str("</body></html>");
    html
}

/// Escape text for use as HTML character data
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_document() {
        assert_eq!(
            wrap_document("Home", "<p>hi</p>"),
            "<!DOCTYPE html><html><head><title>Home</title></head><body><p>hi</p></body></html>"
        );
    }

    #[test]
    fn test_title_is_escaped() {
        let html = wrap_document("Fish & <Chips>", "");
        assert!(html.contains("<title>Fish &amp; &lt;Chips&gt;</title>"));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(
            wrap_document("", ""),
            "<!DOCTYPE html><html><head><title></title></head><body></body></html>"
        );
    }
}
