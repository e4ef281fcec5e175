//! Small shared helpers: domain extraction and filename generation.

use url::Url;

/// Extract the rate-limit/scoring domain from a URL: the host, lowercased,
/// with a leading `www.` stripped. Scheme and port are ignored.
///
/// Example: `"https://www.Nature.com/articles/1"` → `"nature.com"`.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(
        host.strip_prefix("www.")
            .map(str::to_string)
            .unwrap_or(host),
    )
}

/// Render a filename pattern, substituting `{{title}}`, `{{date}}`,
/// `{{slug}}`, and `{{domain}}` placeholders.
pub fn render_filename(pattern: &str, vars: &[(&str, &str)]) -> String {
    let mut result = pattern.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{key}}}}}"), value);
    }
    result
}

/// Convert a title to a URL-friendly slug: ASCII lowercase, runs of
/// non-alphanumerics collapsed to single hyphens, trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_hyphen = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    slug.trim_matches('-').to_string()
}

/// Sanitize a string for use as a filename: strip characters invalid on
/// common filesystems, collapse whitespace, and truncate long names at a
/// word boundary.
pub fn sanitize_filename(name: &str, max_length: usize) -> String {
    const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    let cleaned: String = name.chars().filter(|c| !INVALID.contains(c)).collect();
    let mut collapsed = String::with_capacity(cleaned.len());
    let mut last_space = false;
    for c in cleaned.chars() {
        if c.is_whitespace() {
            if !last_space {
                collapsed.push(' ');
            }
            last_space = true;
        } else {
            collapsed.push(c);
            last_space = false;
        }
    }
    let mut result = collapsed.trim_matches([' ', '.']).to_string();

    if result.chars().count() > max_length {
        let truncated: String = result.chars().take(max_length).collect();
        // Prefer breaking at the last space past the halfway point.
        result = match truncated.rfind(' ') {
            Some(idx) if idx > max_length / 2 => truncated[..idx].to_string(),
            _ => truncated,
        };
        result = result.trim_matches([' ', '.']).to_string();
    }

    if result.is_empty() {
        "Untitled".to_string()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_of_lowercases_and_strips_www() {
        assert_eq!(
            domain_of("https://www.Nature.com/articles/1"),
            Some("nature.com".to_string())
        );
        assert_eq!(
            domain_of("http://journals.nature.com:8080/x"),
            Some("journals.nature.com".to_string())
        );
        assert_eq!(domain_of("not a url"), None);
    }

    #[test]
    fn render_filename_substitutes_placeholders() {
        let out = render_filename(
            "{{title}} {{date}}",
            &[("title", "Hello World"), ("date", "2026-08-26")],
        );
        assert_eq!(out, "Hello World 2026-08-26");
    }

    #[test]
    fn render_filename_leaves_unknown_placeholders() {
        let out = render_filename("{{title}} {{nope}}", &[("title", "X")]);
        assert_eq!(out, "X {{nope}}");
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  --Rust 2026--  "), "rust-2026");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn sanitize_strips_invalid_characters() {
        assert_eq!(sanitize_filename("a<b>c:d/e", 100), "abcde");
        assert_eq!(sanitize_filename("  lots   of\tspace  ", 100), "lots of space");
    }

    #[test]
    fn sanitize_truncates_at_word_boundary() {
        let long = "word ".repeat(40);
        let out = sanitize_filename(&long, 100);
        assert!(out.len() <= 100);
        assert!(!out.ends_with(' '));
    }

    #[test]
    fn sanitize_empty_becomes_untitled() {
        assert_eq!(sanitize_filename("", 100), "Untitled");
        assert_eq!(sanitize_filename("///", 100), "Untitled");
        assert_eq!(sanitize_filename(" . ", 100), "Untitled");
    }
}
