//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. Mocks use
//! `Arc<Mutex<_>>` for interior mutability so tests can assert on recorded
//! calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::ExtractedPage;
use crate::pipeline::{BatchEvent, BatchReporter};
use crate::traits::Extractor;
use crate::util::domain_of;

/// Build a plausible extracted page for a URL.
pub fn make_test_page(url: &str) -> ExtractedPage {
    let domain = domain_of(url).unwrap_or_else(|| "example.com".to_string());
    ExtractedPage {
        title: format!("Page at {url}"),
        author: Some("Test Author".to_string()),
        description: Some("A test page".to_string()),
        published: None,
        content: "Some extracted body text.".to_string(),
        site: Some(domain.clone()),
        domain,
        word_count: 4,
    }
}

/// Mock extractor that succeeds with a synthesized page for every URL,
/// except URLs explicitly configured to fail. Records every call.
#[derive(Clone)]
pub struct MockExtractor {
    failures: Arc<Mutex<HashMap<String, String>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockExtractor {
    pub fn ok() -> Self {
        Self {
            failures: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make extraction fail for a specific URL with the given message.
    pub fn failing_for(self, url: &str, error: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(url.to_string(), error.to_string());
        self
    }
}

impl Extractor for MockExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedPage, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(message) = self.failures.lock().unwrap().get(url) {
            return Err(AppError::ExtractError(message.clone()));
        }
        Ok(make_test_page(url))
    }
}

/// Reporter that records event labels for assertions.
#[derive(Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl BatchReporter for RecordingReporter {
    fn report(&self, event: BatchEvent<'_>) {
        let label = match &event {
            BatchEvent::BatchStarted { .. } => "BatchStarted",
            BatchEvent::JobRouted { .. } => "JobRouted",
            BatchEvent::JobDispatched { .. } => "JobDispatched",
            BatchEvent::JobCompleted { .. } => "JobCompleted",
            BatchEvent::JobFailed { .. } => "JobFailed",
            BatchEvent::BatchCancelled { .. } => "BatchCancelled",
            BatchEvent::BatchFinished { .. } => "BatchFinished",
        };
        self.events.lock().unwrap().push(label.to_string());
    }
}
