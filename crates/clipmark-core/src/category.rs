//! Built-in category filters referenced from template triggers as `@name`.
//!
//! A category filter scores a URL by combining a domain signal (suffix match
//! against a weighted domain table) with path signals (weighted regexes over
//! the URL path and query). The URL matches when the combined score reaches
//! the filter's threshold. Trust-domain categories (`@news`, `@social`,
//! `@wiki`, `@scitech`, `@longform`) carry domain weights at or above their
//! threshold so a known host matches regardless of path; precision categories
//! (`@academic`, `@docs`) keep domain weights below the threshold so a path
//! signal must also fire.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::AppError;
use crate::util::domain_of;

/// A single weighted path rule. Rules are independent and additive: a URL
/// matching several path rules accumulates all their weights.
#[derive(Debug, Clone)]
pub struct PathRule {
    pub pattern: Regex,
    pub weight: f64,
}

/// A named, scored URL classifier.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    name: String,
    /// Domain suffix → weight. Longest matching suffix wins.
    domain_rules: Vec<(String, f64)>,
    path_rules: Vec<PathRule>,
    threshold: f64,
}

/// Raw category rule table, as it appears in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    pub threshold: f64,
    #[serde(default)]
    pub domains: BTreeMap<String, f64>,
    #[serde(default)]
    pub paths: Vec<PathRuleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathRuleSpec {
    pub pattern: String,
    pub weight: f64,
}

impl CategoryFilter {
    pub fn new(name: impl Into<String>, threshold: f64) -> Self {
        Self {
            name: name.into(),
            domain_rules: Vec::new(),
            path_rules: Vec::new(),
            threshold,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a single domain suffix rule.
    pub fn domain(mut self, suffix: &str, weight: f64) -> Self {
        self.domain_rules.push((suffix.to_lowercase(), weight));
        self
    }

    /// Add many domain suffixes sharing one weight.
    pub fn domains(mut self, suffixes: &[&str], weight: f64) -> Self {
        for s in suffixes {
            self.domain_rules.push((s.to_lowercase(), weight));
        }
        self
    }

    /// Add a weighted path rule. The pattern is compiled case-insensitively;
    /// an invalid pattern is a configuration error, surfaced here rather than
    /// at match time.
    pub fn path(mut self, pattern: &str, weight: f64) -> Result<Self, AppError> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::InvalidRegex {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        self.path_rules.push(PathRule {
            pattern: compiled,
            weight,
        });
        Ok(self)
    }

    /// Build a filter from a configuration rule table.
    ///
    /// Rejects negative weights and thresholds before any URL is processed.
    pub fn from_spec(spec: &CategorySpec) -> Result<Self, AppError> {
        if spec.threshold < 0.0 || !spec.threshold.is_finite() {
            return Err(AppError::Config(format!(
                "category '{}': threshold must be non-negative, got {}",
                spec.name, spec.threshold
            )));
        }
        let mut filter = CategoryFilter::new(spec.name.clone(), spec.threshold);
        for (suffix, weight) in &spec.domains {
            if *weight < 0.0 {
                return Err(AppError::Config(format!(
                    "category '{}': negative weight {} for domain '{}'",
                    spec.name, weight, suffix
                )));
            }
            filter = filter.domain(suffix, *weight);
        }
        for rule in &spec.paths {
            if rule.weight < 0.0 {
                return Err(AppError::Config(format!(
                    "category '{}': negative weight {} for path rule '{}'",
                    spec.name, rule.weight, rule.pattern
                )));
            }
            filter = filter.path(&rule.pattern, rule.weight)?;
        }
        Ok(filter)
    }

    /// Weight of the longest domain-rule suffix matching the host, or 0.
    ///
    /// A rule matches a host that equals it or ends with `.` + rule, so
    /// `nature.com` covers `www.nature.com` and `journals.nature.com` but not
    /// `nature.com.fake.example`.
    fn domain_score(&self, host: &str) -> f64 {
        let mut best: Option<&(String, f64)> = None;
        for rule in &self.domain_rules {
            let (suffix, _) = rule;
            let hit = host == suffix || host.ends_with(&format!(".{suffix}"));
            if hit && best.is_none_or(|(s, _)| suffix.len() > s.len()) {
                best = Some(rule);
            }
        }
        best.map(|(_, w)| *w).unwrap_or(0.0)
    }

    /// Sum of weights of every path rule matching the URL path + query.
    fn path_score(&self, path_query: &str) -> f64 {
        self.path_rules
            .iter()
            .filter(|r| r.pattern.is_match(path_query))
            .map(|r| r.weight)
            .sum()
    }

    /// Combined score for a URL. Deterministic and side-effect free.
    pub fn score(&self, url: &str) -> f64 {
        let Ok(parsed) = url::Url::parse(url) else {
            return 0.0;
        };
        let host = domain_of(url).unwrap_or_default();
        let mut path_query = parsed.path().to_string();
        if let Some(q) = parsed.query() {
            path_query.push('?');
            path_query.push_str(q);
        }
        self.domain_score(&host) + self.path_score(&path_query)
    }

    /// True iff the URL's combined score reaches the threshold.
    pub fn matches(&self, url: &str) -> bool {
        self.score(url) >= self.threshold
    }
}

/// The catalog of category filters available to `@name` triggers.
///
/// Immutable for the duration of a batch run.
#[derive(Debug, Clone, Default)]
pub struct CategorySet {
    filters: BTreeMap<String, CategoryFilter>,
}

impl CategorySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&CategoryFilter> {
        self.filters.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Insert a filter, replacing any built-in of the same name.
    pub fn insert(&mut self, filter: CategoryFilter) {
        self.filters.insert(filter.name().to_lowercase(), filter);
    }

    /// Add filters from configuration rule tables on top of this set.
    pub fn extend_from_specs(&mut self, specs: &[CategorySpec]) -> Result<(), AppError> {
        for spec in specs {
            self.insert(CategoryFilter::from_spec(spec)?);
        }
        Ok(())
    }

    /// The built-in filter set.
    ///
    /// The rule tables here can only fail on a programming error (a bad
    /// hard-coded regex), so construction panics rather than returning
    /// `Result`; the tables are exercised by tests.
    pub fn builtin() -> Self {
        let mut set = Self::default();
        for filter in builtin_filters().expect("built-in category tables are valid") {
            set.insert(filter);
        }
        set
    }
}

fn builtin_filters() -> Result<Vec<CategoryFilter>, AppError> {
    let academic = CategoryFilter::new("academic", 1.0)
        .domains(
            &[
                "arxiv.org",
                "biorxiv.org",
                "medrxiv.org",
                "ssrn.com",
                "nature.com",
                "science.org",
                "sciencedirect.com",
                "springer.com",
                "link.springer.com",
                "wiley.com",
                "onlinelibrary.wiley.com",
                "tandfonline.com",
                "sagepub.com",
                "jstor.org",
                "pnas.org",
                "plos.org",
                "frontiersin.org",
                "mdpi.com",
                "acm.org",
                "ieee.org",
                "ieeexplore.ieee.org",
                "pubmed.ncbi.nlm.nih.gov",
                "semanticscholar.org",
            ],
            0.5,
        )
        // DOI anywhere in the path is sufficient on its own.
        .path(r"/10\.\d{4,9}/\S+", 1.0)?
        .path(r"/(abs|abstract|article|articles|paper|papers|fulltext)/", 0.5)?
        .path(r"\.pdf($|\?)", 0.5)?;

    let news = CategoryFilter::new("news", 1.0).domains(
        &[
            "nytimes.com",
            "washingtonpost.com",
            "theguardian.com",
            "bbc.com",
            "bbc.co.uk",
            "reuters.com",
            "apnews.com",
            "bloomberg.com",
            "wsj.com",
            "ft.com",
            "economist.com",
            "npr.org",
            "aljazeera.com",
            "cnn.com",
            "cnbc.com",
            "politico.com",
            "axios.com",
            "theatlantic.com",
            "time.com",
            "latimes.com",
        ],
        1.0,
    );

    let docs = CategoryFilter::new("docs", 1.0)
        .domains(
            &[
                "readthedocs.io",
                "docs.rs",
                "devdocs.io",
                "developer.mozilla.org",
                "learn.microsoft.com",
                "docs.python.org",
                "pkg.go.dev",
                "docs.oracle.com",
                "kubernetes.io",
                "developer.apple.com",
                "developers.google.com",
            ],
            0.5,
        )
        .path(r"/(docs|documentation|reference|manual|api|guides?)(/|$)", 0.5)?
        .path(r"/(man|v\d+(\.\d+)*)/", 0.5)?;

    let edu = CategoryFilter::new("edu", 1.0)
        .domains(&["edu", "ac.uk", "ac.jp", "edu.au"], 1.0)
        .domains(
            &[
                "coursera.org",
                "edx.org",
                "khanacademy.org",
                "ocw.mit.edu",
                "udacity.com",
                "brilliant.org",
            ],
            1.0,
        );

    let gov = CategoryFilter::new("gov", 1.0)
        .domains(&["gov", "mil", "gov.uk", "gc.ca", "europa.eu"], 1.0)
        .domains(&["un.org", "who.int", "worldbank.org"], 1.0);

    let longform = CategoryFilter::new("longform", 1.0).domains(
        &[
            "newyorker.com",
            "harpers.org",
            "lrb.co.uk",
            "nybooks.com",
            "parisreview.org",
            "laphamsquarterly.org",
            "longreads.com",
            "theparisreview.org",
            "granta.com",
            "n-plus-one.com",
        ],
        1.0,
    );

    let scitech = CategoryFilter::new("scitech", 1.0).domains(
        &[
            "arstechnica.com",
            "wired.com",
            "theverge.com",
            "techcrunch.com",
            "ieee.org",
            "spectrum.ieee.org",
            "quantamagazine.org",
            "scientificamerican.com",
            "newscientist.com",
            "phys.org",
            "sciencedaily.com",
            "hackaday.com",
            "lwn.net",
            "acm.org",
        ],
        1.0,
    );

    let social = CategoryFilter::new("social", 1.0).domains(
        &[
            "twitter.com",
            "x.com",
            "reddit.com",
            "news.ycombinator.com",
            "lobste.rs",
            "mastodon.social",
            "bsky.app",
            "linkedin.com",
            "facebook.com",
            "instagram.com",
            "tiktok.com",
            "threads.net",
            "discourse.org",
        ],
        1.0,
    );

    let wiki = CategoryFilter::new("wiki", 1.0).domains(
        &[
            "wikipedia.org",
            "wiktionary.org",
            "wikibooks.org",
            "wikisource.org",
            "wikidata.org",
            "fandom.com",
            "wikihow.com",
            "britannica.com",
        ],
        1.0,
    );

    Ok(vec![
        academic, news, docs, edu, gov, longform, scitech, social, wiki,
    ])
}
