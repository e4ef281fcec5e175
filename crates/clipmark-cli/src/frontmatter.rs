//! YAML frontmatter for saved notes.

use chrono::Local;
use clipmark_core::models::ExtractedPage;
use clipmark_core::template::Template;

use crate::config::Config;

/// Build the `---`-delimited frontmatter block for one note.
///
/// Properties appear in the order configured in `default_properties`;
/// missing metadata is omitted rather than written empty. Template tags
/// come first, then extra CLI tags not already present.
pub fn build_frontmatter(
    page: &ExtractedPage,
    url: &str,
    template: &Template,
    config: &Config,
    extra_tags: &[String],
) -> String {
    let mut lines = Vec::new();

    for prop in &config.default_properties {
        match prop.as_str() {
            "title" => lines.push(format!("title: {}", yaml_scalar(&page.title))),
            "source" => lines.push(format!("source: {}", yaml_scalar(url))),
            "created" => {
                let created = Local::now().format(&config.date_format).to_string();
                lines.push(format!("created: {}", yaml_scalar(&created)));
            }
            "author" => {
                if let Some(author) = &page.author {
                    lines.push("author:".to_string());
                    lines.push(format!("  - {}", yaml_scalar(author)));
                }
            }
            "published" => {
                if let Some(published) = &page.published {
                    lines.push(format!("published: {}", yaml_scalar(published)));
                }
            }
            "description" => {
                if let Some(description) = &page.description {
                    lines.push(format!("description: {}", yaml_scalar(description)));
                }
            }
            _ => {}
        }
    }

    let mut tags = template.tags.clone();
    for tag in extra_tags {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    lines.push("tags:".to_string());
    for tag in &tags {
        lines.push(format!("  - {}", yaml_scalar(tag)));
    }

    for (key, value) in &template.properties {
        lines.push(format!("{key}: {}", yaml_scalar(value)));
    }

    format!("---\n{}\n---\n\n", lines.join("\n"))
}

/// Quote a YAML scalar when it could be misread as structure, a comment,
/// or a non-string type.
fn yaml_scalar(value: &str) -> String {
    let needs_quoting = value.is_empty()
        || value != value.trim()
        || value.contains(['"', '\'', ':', '#', '\n', '[', ']', '{', '}', '&', '*', '!', '|', '>', '%', '@', '`'])
        || value.starts_with(['-', '?'])
        || value.parse::<f64>().is_ok()
        || matches!(value, "true" | "false" | "null" | "~" | "yes" | "no");

    if needs_quoting {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}
