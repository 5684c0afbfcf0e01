use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// Render server-supplied text into styled lines.
///
/// Markdown-lite only: `**bold**`, `*italic*`, and newlines, checked in that
/// precedence. Everything else is literal text. The output is styled spans,
/// never markup, so arbitrary server text cannot smuggle anything into the
/// page.
pub fn format_content(text: &str) -> Vec<Line<'static>> {
    text.split('\n').map(parse_markdown_line).collect()
}

/// Parse one line, converting `**bold**` and `*italic*` runs to styled
/// spans. Unclosed markers render literally.
pub fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current = String::new();

    while let Some(c) = chars.next() {
        if c != '*' {
            current.push(c);
            continue;
        }

        if chars.peek() == Some(&'*') {
            // Bold: consume the second * and scan for the closing pair
            chars.next();

            let mut inner = String::new();
            let mut closed = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    closed = true;
                    break;
                }
                inner.push(c);
            }

            if closed && !inner.is_empty() {
                if !current.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current)));
                }
                spans.push(Span::styled(
                    inner,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                current.push_str("**");
                current.push_str(&inner);
                // An empty pair still consumed its closing marker
                if closed {
                    current.push_str("**");
                }
            }
        } else {
            // Italic: scan for the closing single *
            let mut inner = String::new();
            let mut closed = false;

            for c in chars.by_ref() {
                if c == '*' {
                    closed = true;
                    break;
                }
                inner.push(c);
            }

            if closed && !inner.is_empty() {
                if !current.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current)));
                }
                spans.push(Span::styled(
                    inner,
                    Style::default().add_modifier(Modifier::ITALIC),
                ));
            } else {
                current.push('*');
                current.push_str(&inner);
            }
        }
    }

    if !current.is_empty() {
        spans.push(Span::raw(current));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn span_text<'a>(span: &'a Span) -> &'a str {
        span.content.as_ref()
    }

    #[test]
    fn bold_italic_and_newline_in_substitution_order() {
        let lines = format_content("**bold** and *italic*\nnext line");
        assert_eq!(lines.len(), 2);

        let spans = &lines[0].spans;
        assert_eq!(spans.len(), 3);

        assert_eq!(span_text(&spans[0]), "bold");
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));

        assert_eq!(span_text(&spans[1]), " and ");
        assert_eq!(spans[1].style, Style::default());

        assert_eq!(span_text(&spans[2]), "italic");
        assert!(spans[2].style.add_modifier.contains(Modifier::ITALIC));

        assert_eq!(span_text(&lines[1].spans[0]), "next line");
    }

    #[test]
    fn unclosed_bold_renders_literally() {
        let line = parse_markdown_line("**never closed");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(span_text(&line.spans[0]), "**never closed");
        assert_eq!(line.spans[0].style, Style::default());
    }

    #[test]
    fn empty_bold_pair_renders_all_four_markers() {
        let line = parse_markdown_line("****");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(span_text(&line.spans[0]), "****");
    }

    #[test]
    fn empty_bold_pair_mid_text_keeps_surroundings() {
        let line = parse_markdown_line("a****b");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(span_text(&line.spans[0]), "a****b");
    }

    #[test]
    fn unclosed_italic_renders_literally() {
        let line = parse_markdown_line("a * b");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(span_text(&line.spans[0]), "a * b");
    }

    #[test]
    fn plain_text_is_a_single_raw_span() {
        let line = parse_markdown_line("SELECT * FROM orders WHERE total > 10");
        // The lone * pairs with nothing and stays literal
        assert_eq!(line.spans.len(), 1);
        assert_eq!(
            span_text(&line.spans[0]),
            "SELECT * FROM orders WHERE total > 10"
        );
    }

    #[test]
    fn empty_line_yields_default_line() {
        let line = parse_markdown_line("");
        assert!(line.spans.is_empty());
    }

    #[test]
    fn angle_brackets_stay_literal() {
        let line = parse_markdown_line("<script>alert(1)</script>");
        assert_eq!(span_text(&line.spans[0]), "<script>alert(1)</script>");
    }
}
