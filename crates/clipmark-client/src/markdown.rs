//! HTML-to-Markdown conversion and cleanup of conversion artifacts.

use std::sync::{Arc, LazyLock};

use clipmark_core::error::AppError;
use htmd::HtmlToMarkdown;
use regex::Regex;
use url::Url;

/// Dropcap letter separated from its word by a blank line:
/// "K\n\nwan's team" becomes "Kwan's team".
static DROPCAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([A-Z])\n\n([a-z])").unwrap());

/// Link wrapping complex content (an image plus captions/credits). The
/// outer link wrapper is discarded and the inner content kept. Must run
/// before [`BROKEN_LINK`].
static COMPLEX_BROKEN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\?\[\s*\n+([\s\S]*?!\[[^\]]*\]\([^)]+\)[\s\S]*?)\n*\\?\]\([^)]+\)").unwrap()
});

/// Link broken across lines, with an optional heading marker in the text:
/// "\[\n## Title\n\](url)" becomes "[Title](url)".
static BROKEN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\?\[\s*\n+(?:#{1,6}\s+)?([^\n]+?)\s*\n+\\?\]\(([^)]+)\)").unwrap()
});

/// Any markdown link or image: `[text](url)` or `![alt](url)`.
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// URL that already carries a scheme (http:, https:, mailto:, ...).
static HAS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").unwrap());

/// HTML-to-Markdown renderer using htmd.
///
/// Strips non-content elements (script, style, nav, chrome) during
/// conversion, then repairs common conversion artifacts.
pub struct MarkdownRenderer {
    converter: Arc<HtmlToMarkdown>,
}

impl Clone for MarkdownRenderer {
    fn clone(&self) -> Self {
        Self {
            converter: Arc::clone(&self.converter),
        }
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let converter = HtmlToMarkdown::builder()
            .skip_tags(vec![
                "title", "script", "style", "nav", "footer", "header", "aside", "noscript",
                "iframe", "svg", "form", "button",
            ])
            .build();

        Self {
            converter: Arc::new(converter),
        }
    }

    /// Convert HTML to cleaned Markdown. `source_url` is used to resolve
    /// relative links.
    pub fn render(&self, html: &str, source_url: &str) -> Result<String, AppError> {
        let markdown = self
            .converter
            .convert(html)
            .map_err(|e| AppError::ExtractError(e.to_string()))?;
        Ok(cleanup_content(&markdown, Some(source_url)))
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Repair artifacts in converted Markdown: re-attach dropcap letters,
/// unwrap or re-join links broken across lines, resolve relative URLs.
pub fn cleanup_content(content: &str, source_url: Option<&str>) -> String {
    if content.is_empty() {
        return String::new();
    }

    let content = DROPCAP.replace_all(content, "${1}${2}");
    let content = COMPLEX_BROKEN_LINK.replace_all(&content, "$1");
    let content = BROKEN_LINK.replace_all(&content, "[$1]($2)");

    match source_url {
        Some(base) => resolve_relative_links(&content, base),
        None => content.into_owned(),
    }
}

fn resolve_relative_links(content: &str, source_url: &str) -> String {
    let Ok(base) = Url::parse(source_url) else {
        return content.to_string();
    };

    MARKDOWN_LINK
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let prefix = &caps[1];
            let text = &caps[2];
            let url = &caps[3];

            // Absolute URLs and in-page anchors pass through untouched.
            if HAS_SCHEME.is_match(url) || url.starts_with('#') {
                return caps[0].to_string();
            }

            match base.join(url) {
                Ok(absolute) => format!("{prefix}[{text}]({absolute})"),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_basic_html() {
        let renderer = MarkdownRenderer::new();
        let md = renderer
            .render("<h1>Hello</h1><p>World</p>", "https://example.com/")
            .unwrap();
        assert!(md.contains("Hello"));
        assert!(md.contains("World"));
    }

    #[test]
    fn strips_script_and_nav() {
        let renderer = MarkdownRenderer::new();
        let html = "<nav>menu</nav><p>Content</p><script>alert('x')</script>";
        let md = renderer.render(html, "https://example.com/").unwrap();
        assert!(md.contains("Content"));
        assert!(!md.contains("alert"));
        assert!(!md.contains("menu"));
    }

    #[test]
    fn head_title_stays_out_of_the_body() {
        let renderer = MarkdownRenderer::new();
        let html = "<head><title>Site Title</title></head><body><p>Real body.</p></body>";
        let md = renderer.render(html, "https://example.com/").unwrap();
        assert!(md.contains("Real body."));
        assert!(!md.contains("Site Title"));
    }

    #[test]
    fn title_only_page_renders_empty() {
        let renderer = MarkdownRenderer::new();
        let html = "<head><title>Site Title</title></head><body></body>";
        let md = renderer.render(html, "https://example.com/").unwrap();
        assert!(md.trim().is_empty());
    }

    #[test]
    fn reattaches_dropcap_letters() {
        let cleaned = cleanup_content("K\n\nwan's team built it.", None);
        assert_eq!(cleaned, "Kwan's team built it.");
    }

    #[test]
    fn dropcap_fix_ignores_ordinary_paragraph_breaks() {
        let text = "First paragraph.\n\nsecond paragraph continues.";
        assert_eq!(cleanup_content(text, None), text);
    }

    #[test]
    fn rejoins_links_broken_across_lines() {
        let cleaned = cleanup_content("\\[\n\n## Some Title\n\n\\](https://example.com/a)", None);
        assert_eq!(cleaned, "[Some Title](https://example.com/a)");
    }

    #[test]
    fn unwraps_links_around_images() {
        let broken =
            "\\[\nImage\n![alt text](https://cdn.example.com/i.jpg)\nPhoto credit\n\\](https://example.com/story)";
        let cleaned = cleanup_content(broken, None);
        assert!(cleaned.contains("![alt text](https://cdn.example.com/i.jpg)"));
        assert!(cleaned.contains("Photo credit"));
        assert!(!cleaned.contains("](https://example.com/story)"));
    }

    #[test]
    fn resolves_relative_urls_against_source() {
        let content = "[doc](/docs/intro) and ![img](images/a.png)";
        let cleaned = cleanup_content(content, Some("https://example.com/blog/post"));
        assert!(cleaned.contains("[doc](https://example.com/docs/intro)"));
        assert!(cleaned.contains("![img](https://example.com/blog/images/a.png)"));
    }

    #[test]
    fn leaves_absolute_and_anchor_urls_alone() {
        let content = "[a](https://other.com/x) [m](mailto:hi@example.com) [t](#top)";
        let cleaned = cleanup_content(content, Some("https://example.com/"));
        assert_eq!(cleaned, content);
    }

    #[test]
    fn resolves_protocol_relative_urls() {
        let content = "[cdn](//cdn.example.com/lib.js)";
        let cleaned = cleanup_content(content, Some("https://example.com/page"));
        assert!(cleaned.contains("(https://cdn.example.com/lib.js)"));
    }
}
