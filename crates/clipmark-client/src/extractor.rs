//! The full extraction pipeline for one URL: fetch, read metadata from the
//! document head, convert the body to Markdown.

use std::sync::Arc;

use clipmark_core::error::AppError;
use clipmark_core::models::ExtractedPage;
use clipmark_core::traits::Extractor;
use clipmark_core::util::domain_of;
use scraper::{Html, Selector};
use url::Url;

use crate::cookies::CookieJar;
use crate::fetcher::HttpFetcher;
use crate::markdown::MarkdownRenderer;

/// [`Extractor`] backed by a live HTTP fetch.
///
/// Metadata comes from standard `<meta>` tags with OpenGraph fallbacks;
/// the body is the whole document converted to Markdown with chrome
/// elements stripped.
#[derive(Clone)]
pub struct PageExtractor {
    fetcher: HttpFetcher,
    renderer: MarkdownRenderer,
    cookies: Arc<CookieJar>,
}

impl PageExtractor {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self {
            fetcher,
            renderer: MarkdownRenderer::new(),
            cookies: Arc::new(CookieJar::default()),
        }
    }

    /// Attach a cookie jar; applicable cookies are sent with each fetch.
    pub fn with_cookies(mut self, jar: CookieJar) -> Self {
        self.cookies = Arc::new(jar);
        self
    }
}

impl Extractor for PageExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedPage, AppError> {
        let cookie_header = self.cookies.header_for(url);
        let html = self.fetcher.fetch(url, cookie_header.as_deref()).await?;
        build_page(url, &html, &self.renderer)
    }
}

// Parsing is synchronous and kept out of the async fn: scraper's DOM is not
// Send and must not be held across an await point.
fn build_page(url: &str, html: &str, renderer: &MarkdownRenderer) -> Result<ExtractedPage, AppError> {
    let document = Html::parse_document(html);

    let title = select_text(&document, "title")
        .or_else(|| select_meta(&document, "meta[property='og:title']"))
        .filter(|t| !t.is_empty())
        .or_else(|| host_of(url))
        .unwrap_or_else(|| "Untitled".to_string());

    let author = select_meta(&document, "meta[name='author']")
        .or_else(|| select_meta(&document, "meta[property='article:author']"));

    let description = select_meta(&document, "meta[name='description']")
        .or_else(|| select_meta(&document, "meta[property='og:description']"));

    let published = select_meta(&document, "meta[property='article:published_time']")
        .or_else(|| select_attr(&document, "time[datetime]", "datetime"));

    let site = select_meta(&document, "meta[property='og:site_name']");

    drop(document);

    let content = renderer.render(html, url)?;
    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::EmptyContent(url.to_string()));
    }

    let word_count = ExtractedPage::count_words(&content);
    let domain = domain_of(url).unwrap_or_default();

    Ok(ExtractedPage {
        title,
        author,
        description,
        published,
        content,
        site,
        domain,
        word_count,
    })
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let text: String = document.select(&selector).next()?.text().collect();
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn select_meta(document: &Html, selector: &str) -> Option<String> {
    select_attr(document, selector, "content")
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let value = document.select(&selector).next()?.value().attr(attr)?;
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.to_string())
}
