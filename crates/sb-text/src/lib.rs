//! SimpleBrowser text rendering
//!
//! Turns a fetched body into displayable plain text. Everything between
//! `<` and `>` is dropped, `&lt;`/`&gt;` decode to their characters,
//! and any other `&...;` entity is emitted untouched once its
//! terminating semicolon arrives. An entity still open at end of input
//! is suppressed. view-source bodies bypass all of this.

/// How a fetched body should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Strip tags and decode entities.
    #[default]
    Text,
    /// Emit the body unchanged (view-source).
    Raw,
}

/// Render a fetched body as plain text.
pub fn render(body: &str, mode: RenderMode) -> String {
    if mode == RenderMode::Raw {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    let mut in_tag = false;
    let mut in_entity = false;
    let mut entity = String::new();

    // Branch order matters: `<` and `>` take priority even while an
    // entity is pending, and `&` restarts a pending entity.
    for c in body.chars() {
        if c == '<' {
            in_tag = true;
        } else if c == '>' {
            in_tag = false;
        } else if c == '&' {
            in_entity = true;
            entity.clear();
            entity.push('&');
        } else if in_entity {
            entity.push(c);
            if entity == "&lt;" {
                out.push('<');
                in_entity = false;
            } else if entity == "&gt;" {
                out.push('>');
                in_entity = false;
            } else if c == ';' {
                out.push_str(&entity);
                in_entity = false;
            }
        } else if !in_tag {
            out.push(c);
        }
    }

    tracing::debug!(input = body.len(), output = out.len(), "rendered body");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_stripped() {
        assert_eq!(render("<p>hello</p>", RenderMode::Text), "hello");
    }

    #[test]
    fn test_lt_gt_entities_decoded() {
        assert_eq!(render("<p>A &lt; B</p>", RenderMode::Text), "A < B");
        assert_eq!(render("B &gt; A", RenderMode::Text), "B > A");
    }

    #[test]
    fn test_unknown_entity_passes_through() {
        assert_eq!(render("fish &amp; chips", RenderMode::Text), "fish &amp; chips");
        assert_eq!(render("&copy;", RenderMode::Text), "&copy;");
    }

    #[test]
    fn test_unterminated_entity_suppressed() {
        assert_eq!(render("tail &lt", RenderMode::Text), "tail ");
        assert_eq!(render("&unfinished", RenderMode::Text), "");
    }

    #[test]
    fn test_ampersand_restarts_entity() {
        // The first pending entity is abandoned by the second `&`.
        assert_eq!(render("&am&gt;", RenderMode::Text), ">");
    }

    #[test]
    fn test_text_across_tags() {
        assert_eq!(
            render("<html><body>one <b>two</b> three</body></html>", RenderMode::Text),
            "one two three"
        );
    }

    #[test]
    fn test_raw_mode_is_verbatim() {
        let body = "<p>A &lt; B</p>";
        assert_eq!(render(body, RenderMode::Raw), body);
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(render("", RenderMode::Text), "");
        assert_eq!(render("", RenderMode::Raw), "");
    }
}
