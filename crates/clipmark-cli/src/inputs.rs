//! Turning CLI arguments into a URL batch.
//!
//! Each positional argument is either a URL or a path to a file of URLs:
//! markdown files contribute `[text](url)` link targets and bare URLs,
//! plain text files one URL per line with `#` comments.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use clipmark_core::error::AppError;
use regex::Regex;

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]\((https?://[^\s)]+)\)").unwrap());

pub fn is_valid_url(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"));
    match rest {
        Some(rest) => rest
            .split('/')
            .next()
            .is_some_and(|host| !host.is_empty() && !host.contains(char::is_whitespace)),
        None => false,
    }
}

/// Expand one CLI argument into URLs.
pub fn parse_input(input: &str) -> Result<Vec<String>, AppError> {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        if is_valid_url(trimmed) {
            return Ok(vec![trimmed.to_string()]);
        }
        return Ok(Vec::new());
    }

    let path = crate::config::expand_tilde(trimmed);
    if path.exists() {
        return read_url_file(&path);
    }

    Err(AppError::Config(format!(
        "input is neither a URL nor an existing file: {trimmed}"
    )))
}

fn read_url_file(path: &Path) -> Result<Vec<String>, AppError> {
    let text = std::fs::read_to_string(path)?;
    Ok(urls_in_text(&text))
}

/// Extract URLs from text: markdown link targets first, then bare URLs one
/// per line, skipping blanks and `#` comments.
pub fn urls_in_text(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = MARKDOWN_LINK
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if is_valid_url(line) {
            urls.push(line.to_string());
        }
    }

    dedupe_preserving_order(urls)
}

/// Collect the full batch from all CLI arguments, deduplicated in first-seen
/// order.
pub fn collect_urls(inputs: &[String]) -> Result<Vec<String>, AppError> {
    let mut all = Vec::new();
    for input in inputs {
        all.extend(parse_input(input)?);
    }
    Ok(dedupe_preserving_order(all))
}

fn dedupe_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}
