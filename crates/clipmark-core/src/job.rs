use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::ExtractedPage;
use crate::util::domain_of;

/// A routed URL waiting to be dispatched.
///
/// `arrival_index` is the batch-relative submission order and serves as the
/// fairness tie-break when several domains become ready at the same instant.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub url: String,
    /// Host, lowercased, `www.` stripped — the rate-limit key.
    pub domain: String,
    /// Name of the template the URL was routed to.
    pub template: String,
    pub arrival_index: usize,
}

impl Job {
    pub fn new(url: impl Into<String>, template: impl Into<String>, arrival_index: usize) -> Self {
        let url = url.into();
        // An unparseable URL still gets a job; it rate-limits under its own
        // key and fails at extraction, which is recorded, not fatal.
        let domain = domain_of(&url).unwrap_or_else(|| url.clone());
        Self {
            url,
            domain,
            template: template.into(),
            arrival_index,
        }
    }
}

/// What happened to a dispatched job.
#[derive(Debug, Clone, Serialize)]
pub enum JobOutcome {
    Success(ExtractedPage),
    Failure(String),
}

/// One entry in the batch's append-only result log, recorded in dispatch
/// order — exactly one per job.
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub job: Job,
    pub outcome: JobOutcome,
    pub dispatched_at: DateTime<Utc>,
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, JobOutcome::Success(_))
    }
}

/// All results for one batch run, in dispatch order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub results: Vec<JobResult>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_derives_domain_from_url() {
        let job = Job::new("https://www.Example.com/page", "default", 0);
        assert_eq!(job.domain, "example.com");
    }

    #[test]
    fn unparseable_url_keys_on_itself() {
        let job = Job::new("not a url", "default", 0);
        assert_eq!(job.domain, "not a url");
    }

    #[test]
    fn report_tallies_outcomes() {
        let mut report = BatchReport::default();
        report.results.push(JobResult {
            job: Job::new("https://a.com/", "default", 0),
            outcome: JobOutcome::Failure("HTTP 404".into()),
            dispatched_at: Utc::now(),
        });
        report.results.push(JobResult {
            job: Job::new("https://b.com/", "default", 1),
            outcome: JobOutcome::Success(ExtractedPage {
                title: "T".into(),
                author: None,
                description: None,
                published: None,
                content: "body".into(),
                site: None,
                domain: "b.com".into(),
                word_count: 1,
            }),
            dispatched_at: Utc::now(),
        });
        assert_eq!(report.len(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
    }
}
