//! SimpleBrowser shell
//!
//! Wires the fetcher and the text renderer together: resolve a URL,
//! fetch its body, and render it for display.

use sb_net::{Fetcher, NetError, ResourceLocator, Scheme};
use sb_text::RenderMode;

/// URL loaded when none is given on the command line; served by the
/// local demo server the `file` scheme points at.
pub const DEMO_URL: &str = "file:///demo_file.txt";

/// Fetch a URL and render its body for display.
pub fn load(url: &str) -> Result<String, NetError> {
    let locator = ResourceLocator::parse(url)?;

    let mode = if locator.scheme == Scheme::ViewSource {
        RenderMode::Raw
    } else {
        RenderMode::Text
    };

    let mut fetcher = Fetcher::new(locator);
    let body = fetcher.fetch()?;

    Ok(sb_text::render(&body, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_data_url_renders_text() {
        let out = load("data:text/html,<p>A &lt; B</p>").unwrap();
        assert_eq!(out, "A < B\n");
    }

    #[test]
    fn test_load_view_source_is_verbatim() {
        let out = load("view-source:data:text/html,<p>A &lt; B</p>").unwrap();
        assert_eq!(out, "<p>A &lt; B</p>\n");
    }

    #[test]
    fn test_load_unknown_scheme_fails() {
        assert!(load("gopher://example.com/").is_err());
    }
}
