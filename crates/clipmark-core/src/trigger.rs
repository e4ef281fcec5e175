//! Trigger parsing and evaluation.
//!
//! A trigger string in a template is one of three things, decided at load
//! time so that misconfiguration fails before any URL is processed:
//!
//! - `@name` — a reference to a built-in category filter
//! - a regex — when the string starts with `^` or contains a regex
//!   metacharacter that a plain URL fragment would not (`\ [ ] ( ) + ? |`)
//! - a literal — anything else, matched as a case-insensitive substring

use regex::{Regex, RegexBuilder};

use crate::category::CategorySet;
use crate::error::AppError;

/// The exact metacharacter set that forces regex interpretation. `/`, `.`,
/// `-`, and `:` appear in ordinary URLs and deliberately do not.
const REGEX_METACHARACTERS: &[char] = &['\\', '[', ']', '(', ')', '+', '?', '|'];

const CATEGORY_PREFIX: char = '@';

/// A compiled matching rule attached to a template.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Case-insensitive substring match against the full URL.
    Literal(String),
    /// Case-insensitive regex search anywhere in the full URL.
    Pattern(Regex),
    /// Delegation to a named category filter.
    CategoryRef(String),
}

/// Whether a raw trigger string must be treated as a regex.
pub fn is_regex_pattern(raw: &str) -> bool {
    raw.starts_with('^') || raw.chars().any(|c| REGEX_METACHARACTERS.contains(&c))
}

impl Trigger {
    /// Parse a raw trigger string, compiling regexes and resolving category
    /// references eagerly. Both failure modes are configuration errors.
    pub fn parse(raw: &str, categories: &CategorySet) -> Result<Self, AppError> {
        let raw = raw.trim();

        if let Some(name) = raw.strip_prefix(CATEGORY_PREFIX) {
            let name = name.to_lowercase();
            if !categories.contains(&name) {
                return Err(AppError::UnknownCategory(name));
            }
            return Ok(Trigger::CategoryRef(name));
        }

        if is_regex_pattern(raw) {
            let compiled = RegexBuilder::new(raw)
                .case_insensitive(true)
                .build()
                .map_err(|e| AppError::InvalidRegex {
                    pattern: raw.to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(Trigger::Pattern(compiled));
        }

        Ok(Trigger::Literal(raw.to_lowercase()))
    }

    /// Evaluate this trigger against a URL. No side effects; the referenced
    /// category is guaranteed present because `parse` validated it.
    pub fn evaluate(&self, url: &str, categories: &CategorySet) -> bool {
        match self {
            Trigger::Literal(text) => url.to_lowercase().contains(text),
            Trigger::Pattern(regex) => regex.is_match(url),
            Trigger::CategoryRef(name) => categories
                .get(name)
                .is_some_and(|filter| filter.matches(url)),
        }
    }
}
