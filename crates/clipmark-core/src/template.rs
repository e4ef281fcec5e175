//! Template catalog and URL routing.
//!
//! The catalog is loaded once at startup, validated eagerly (duplicate
//! names, invalid regexes, unknown category references), and then immutable
//! for the duration of a batch run. Routing is first-match-wins in operator
//! order: template order is priority, not a score.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::category::CategorySet;
use crate::error::AppError;
use crate::trigger::Trigger;

pub const DEFAULT_TEMPLATE_NAME: &str = "default";
pub const DEFAULT_FOLDER: &str = "Inbox/Clips";
pub const DEFAULT_FILENAME: &str = "{{title}}";

/// Raw template definition as it appears in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSpec {
    pub name: String,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

fn default_folder() -> String {
    DEFAULT_FOLDER.to_string()
}

fn default_tags() -> Vec<String> {
    vec!["webclip".to_string()]
}

fn default_filename() -> String {
    DEFAULT_FILENAME.to_string()
}

impl Default for TemplateSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_TEMPLATE_NAME.to_string(),
            triggers: Vec::new(),
            folder: default_folder(),
            tags: default_tags(),
            filename: default_filename(),
            properties: BTreeMap::new(),
        }
    }
}

/// A validated template with compiled triggers.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub triggers: Vec<Trigger>,
    pub folder: String,
    pub tags: Vec<String>,
    pub filename: String,
    pub properties: BTreeMap<String, String>,
}

impl Template {
    fn compile(spec: &TemplateSpec, categories: &CategorySet) -> Result<Self, AppError> {
        let triggers = spec
            .triggers
            .iter()
            .map(|raw| Trigger::parse(raw, categories))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: spec.name.clone(),
            triggers,
            folder: spec.folder.clone(),
            tags: spec.tags.clone(),
            filename: spec.filename.clone(),
            properties: spec.properties.clone(),
        })
    }

    fn synthesized_default() -> Self {
        Self {
            name: DEFAULT_TEMPLATE_NAME.to_string(),
            triggers: Vec::new(),
            folder: default_folder(),
            tags: default_tags(),
            filename: default_filename(),
            properties: BTreeMap::new(),
        }
    }
}

/// Resolves a URL to exactly one template.
#[derive(Debug, Clone)]
pub struct TemplateRouter {
    /// Non-default templates, in configured (priority) order.
    templates: Vec<Template>,
    default: Template,
    categories: CategorySet,
}

impl TemplateRouter {
    /// Validate and compile a template catalog.
    ///
    /// Fails fast on duplicate names, a `default` that carries triggers,
    /// invalid trigger regexes, or unknown `@category` references. A missing
    /// `default` is synthesized.
    pub fn from_specs(specs: &[TemplateSpec], categories: CategorySet) -> Result<Self, AppError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for spec in specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(AppError::DuplicateTemplate(spec.name.clone()));
            }
        }

        let mut templates = Vec::new();
        let mut default = None;
        for spec in specs {
            if spec.name == DEFAULT_TEMPLATE_NAME {
                if !spec.triggers.is_empty() {
                    return Err(AppError::Config(
                        "template 'default' must not have triggers; it always matches".into(),
                    ));
                }
                default = Some(Template::compile(spec, &categories)?);
            } else {
                templates.push(Template::compile(spec, &categories)?);
            }
        }

        Ok(Self {
            templates,
            default: default.unwrap_or_else(Template::synthesized_default),
            categories,
        })
    }

    /// Route a URL to a template: first template in configured order whose
    /// first matching trigger fires, else `default`. Pure — the same URL and
    /// catalog always yield the same template.
    pub fn route(&self, url: &str) -> &Template {
        for template in &self.templates {
            for trigger in &template.triggers {
                if trigger.evaluate(url, &self.categories) {
                    tracing::debug!(url = %url, template = %template.name, "Routed");
                    return template;
                }
            }
        }
        &self.default
    }

    /// The always-matching fallback template.
    pub fn default_template(&self) -> &Template {
        &self.default
    }

    /// Look up a template by name (`-t` override), including `default`.
    pub fn get(&self, name: &str) -> Option<&Template> {
        if name == DEFAULT_TEMPLATE_NAME {
            return Some(&self.default);
        }
        self.templates.iter().find(|t| t.name == name)
    }

    /// All templates in routing order, default last.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter().chain(std::iter::once(&self.default))
    }
}
