pub mod cookies;
pub mod extractor;
pub mod fetcher;
pub mod markdown;

pub use cookies::CookieJar;
pub use extractor::PageExtractor;
pub use fetcher::HttpFetcher;
pub use markdown::MarkdownRenderer;
