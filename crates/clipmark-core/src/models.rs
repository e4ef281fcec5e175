use serde::{Deserialize, Serialize};

/// Everything the extractor collaborator returns for one URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    /// Publication date as reported by the page, unparsed.
    pub published: Option<String>,
    /// Page body as Markdown.
    pub content: String,
    pub site: Option<String>,
    pub domain: String,
    pub word_count: usize,
}

impl ExtractedPage {
    /// Count whitespace-separated words in a body.
    pub fn count_words(content: &str) -> usize {
        content.split_whitespace().count()
    }
}
