//! Netscape `cookies.txt` support for authenticated fetches.
//!
//! Browser extensions like "Get cookies.txt" export in this format:
//! seven tab-separated fields per line (domain, include-subdomains flag,
//! path, secure flag, expiry, name, value), `#` for comments.

use std::path::Path;

use clipmark_core::error::AppError;
use url::Url;

#[derive(Debug, Clone)]
pub struct Cookie {
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub expires: i64,
    pub name: String,
    pub value: String,
}

/// All cookies loaded from one file, filtered per URL at fetch time.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let cookies = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let parts: Vec<&str> = line.split('\t').collect();
                if parts.len() < 7 {
                    return None;
                }
                Some(Cookie {
                    domain: parts[0].to_string(),
                    path: parts[2].to_string(),
                    secure: parts[3].eq_ignore_ascii_case("TRUE"),
                    expires: parts[4].parse().unwrap_or(0),
                    name: parts[5].to_string(),
                    value: parts[6].to_string(),
                })
            })
            .collect();
        Self { cookies }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Cookies applicable to a URL: domain matches exactly or as a parent
    /// domain, and the URL path starts with the cookie path.
    pub fn cookies_for(&self, url: &str) -> Vec<&Cookie> {
        let Ok(parsed) = Url::parse(url) else {
            return Vec::new();
        };
        let Some(host) = parsed.host_str() else {
            return Vec::new();
        };
        let host = host.to_lowercase();
        let path = if parsed.path().is_empty() {
            "/"
        } else {
            parsed.path()
        };

        self.cookies
            .iter()
            .filter(|c| {
                let cookie_domain = c.domain.to_lowercase();
                let cookie_domain = cookie_domain.trim_start_matches('.');
                (host == cookie_domain || host.ends_with(&format!(".{cookie_domain}")))
                    && path.starts_with(&c.path)
            })
            .collect()
    }

    /// Build a `Cookie:` header value for a URL, or `None` if nothing
    /// applies.
    pub fn header_for(&self, url: &str) -> Option<String> {
        let applicable = self.cookies_for(url);
        if applicable.is_empty() {
            return None;
        }
        Some(
            applicable
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
