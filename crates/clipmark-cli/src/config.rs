//! Configuration loading: `~/.clipmark.toml`, auto-created on first run.

use std::path::{Path, PathBuf};

use clipmark_core::error::AppError;
use clipmark_core::template::TemplateSpec;
use serde::Deserialize;

/// Default config file content, written on first run.
const DEFAULT_CONFIG_TOML: &str = r##"# clipmark configuration
# Location: ~/.clipmark.toml

# Directory notes are saved into (any directory of markdown files)
vault = "~/Documents/Notes"

# Date format for the frontmatter 'created' field
date_format = "%Y-%m-%d"

# Date format for {{date}} in filename patterns
filename_date_format = "%Y-%m-%d"

# Default output folder (relative to vault)
default_folder = "Inbox/Clips"

# Minimum seconds between requests to the same domain
min_interval = 3.0

# Frontmatter properties to include when available
default_properties = ["title", "source", "author", "created", "published", "description"]

# Templates decide where a clipped URL lands and how it is tagged.
# They are checked in order; the first trigger that matches wins.
# Triggers are substrings, case-insensitive regexes (when they contain
# regex metacharacters or start with ^), or @category references.

[[templates]]
name = "github"
triggers = ["https://github.com/", '^https://[\w-]+\.github\.io/']
folder = "Reference/Software"
tags = ["webclip", "software", "github"]
filename = "{{title}}"

[templates.properties]
type = "repository"

[[templates]]
name = "stackoverflow"
triggers = ["stackoverflow.com/questions", "stackexchange.com/questions"]
folder = "Reference/Code"
tags = ["webclip", "code", "stackoverflow"]
filename = "{{title}}"

[[templates]]
name = "documentation"
triggers = ["@docs"]
folder = "Reference/Docs"
tags = ["webclip", "docs"]
filename = "{{title}}"

[[templates]]
name = "wikipedia"
triggers = ["@wiki"]
folder = "Reference/Wikipedia"
tags = ["webclip", "reference", "wikipedia"]
filename = "{{title}}"

[[templates]]
name = "papers"
triggers = ["arxiv.org", "@academic"]
folder = "Reference/Papers"
tags = ["webclip", "paper"]
filename = "{{title}}"

[templates.properties]
type = "paper"

[[templates]]
name = "hackernews"
triggers = ["news.ycombinator.com"]
folder = "Inbox/News"
tags = ["webclip", "news", "hackernews"]
filename = "{{title}}"

# Used when no other template matches.
[[templates]]
name = "default"
folder = "Inbox/Clips"
tags = ["webclip"]
filename = "{{title}} {{date}}"
"##;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub vault: String,
    pub date_format: String,
    pub filename_date_format: String,
    pub default_folder: String,
    pub min_interval: f64,
    pub default_properties: Vec<String>,
    pub templates: Vec<TemplateSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault: "~/Documents/Notes".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            filename_date_format: "%Y-%m-%d".to_string(),
            default_folder: "Inbox/Clips".to_string(),
            min_interval: 3.0,
            default_properties: vec![
                "title".to_string(),
                "source".to_string(),
                "author".to_string(),
                "created".to_string(),
                "published".to_string(),
                "description".to_string(),
            ],
            templates: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from `path`, or `~/.clipmark.toml` when `None`.
    /// A missing file is created with the default catalog first. Returns
    /// the config and whether the file was created on this call.
    pub fn load(path: Option<&Path>) -> Result<(Self, bool), AppError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        let created = if config_path.exists() {
            false
        } else {
            std::fs::write(&config_path, DEFAULT_CONFIG_TOML)?;
            true
        };

        let text = std::fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&text).map_err(|e| {
            AppError::Config(format!("invalid config {}: {e}", config_path.display()))
        })?;
        Ok((config, created))
    }

    /// Write the default config file, failing if it already exists.
    pub fn init(path: Option<&Path>) -> Result<PathBuf, AppError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        if config_path.exists() {
            return Err(AppError::Config(format!(
                "config file already exists: {}",
                config_path.display()
            )));
        }
        std::fs::write(&config_path, DEFAULT_CONFIG_TOML)?;
        Ok(config_path)
    }

    /// The vault directory with `~` expanded.
    pub fn vault_dir(&self) -> PathBuf {
        expand_tilde(&self.vault)
    }
}

pub fn default_config_path() -> Result<PathBuf, AppError> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| AppError::Config("HOME is not set; pass --config".to_string()))?;
    Ok(home.join(".clipmark.toml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config.min_interval, 3.0);
        let names: Vec<&str> = config.templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "github",
                "stackoverflow",
                "documentation",
                "wikipedia",
                "papers",
                "hackernews",
                "default"
            ]
        );
        let github = &config.templates[0];
        assert_eq!(github.folder, "Reference/Software");
        assert_eq!(github.properties.get("type").unwrap(), "repository");
    }

    #[test]
    fn default_catalog_compiles_into_a_router() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        let router = clipmark_core::TemplateRouter::from_specs(
            &config.templates,
            clipmark_core::CategorySet::builtin(),
        )
        .unwrap();
        assert_eq!(router.route("https://github.com/rust-lang/rust").name, "github");
        assert_eq!(router.route("https://arxiv.org/abs/2301.00001").name, "papers");
        assert_eq!(router.route("https://example.com/post").name, "default");
    }

    #[test]
    fn missing_file_is_created_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipmark.toml");
        let (config, created) = Config::load(Some(&path)).unwrap();
        assert!(created);
        assert!(path.exists());
        assert!(!config.templates.is_empty());

        let (_, created_again) = Config::load(Some(&path)).unwrap();
        assert!(!created_again);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipmark.toml");
        std::fs::write(&path, "min_interval = 0.5\n").unwrap();
        let (config, _) = Config::load(Some(&path)).unwrap();
        assert_eq!(config.min_interval, 0.5);
        assert_eq!(config.default_folder, "Inbox/Clips");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipmark.toml");
        std::fs::write(&path, "vault = [broken\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipmark.toml");
        Config::init(Some(&path)).unwrap();
        assert!(Config::init(Some(&path)).is_err());
    }

    #[test]
    fn expand_tilde_resolves_against_home() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
        // Reads HOME rather than setting it; the harness runs tests in
        // parallel and env mutation would leak into other tests.
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(
                expand_tilde("~/Documents/Notes"),
                PathBuf::from(home).join("Documents/Notes")
            );
        }
    }
}
