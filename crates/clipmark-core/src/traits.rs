use std::future::Future;

use crate::error::AppError;
use crate::models::ExtractedPage;

/// The content-extraction collaborator: given a URL, produce the page's
/// metadata and Markdown body, or fail.
///
/// Called synchronously per job by the pipeline; latency and availability
/// are outside the core's control. Implementations decide how many fetch
/// attempts stand behind one `extract` call (e.g. a fallback provider) —
/// the pipeline records exactly one result per job either way.
pub trait Extractor: Send + Sync + Clone {
    fn extract(&self, url: &str) -> impl Future<Output = Result<ExtractedPage, AppError>> + Send;
}
