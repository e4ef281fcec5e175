//! Batch orchestration: route → schedule → extract → collect.

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::job::{BatchReport, Job, JobOutcome, JobResult};
use crate::ratelimit::RateLimiter;
use crate::schedule::DeferredScheduler;
use crate::template::TemplateRouter;
use crate::traits::Extractor;

/// Events emitted by the pipeline for monitoring/logging.
#[derive(Debug, Clone)]
pub enum BatchEvent<'a> {
    BatchStarted {
        total: usize,
    },
    JobRouted {
        url: &'a str,
        template: &'a str,
    },
    JobDispatched {
        job: &'a Job,
    },
    JobCompleted {
        job: &'a Job,
        word_count: usize,
    },
    JobFailed {
        job: &'a Job,
        error: &'a str,
    },
    BatchCancelled {
        dropped: usize,
    },
    BatchFinished {
        succeeded: usize,
        failed: usize,
    },
}

/// Trait for receiving batch events (decoupled logging).
pub trait BatchReporter: Send + Sync {
    fn report(&self, event: BatchEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBatchReporter;

impl BatchReporter for TracingBatchReporter {
    fn report(&self, event: BatchEvent<'_>) {
        match event {
            BatchEvent::BatchStarted { total } => {
                tracing::info!(%total, "Batch started");
            }
            BatchEvent::JobRouted { url, template } => {
                tracing::debug!(%url, %template, "Routed URL");
            }
            BatchEvent::JobDispatched { job } => {
                tracing::info!(url = %job.url, template = %job.template, "Dispatched");
            }
            BatchEvent::JobCompleted { job, word_count } => {
                tracing::info!(url = %job.url, %word_count, "Extracted");
            }
            BatchEvent::JobFailed { job, error } => {
                tracing::warn!(url = %job.url, %error, "Extraction failed");
            }
            BatchEvent::BatchCancelled { dropped } => {
                tracing::info!(%dropped, "Batch cancelled; dropping undispatched jobs");
            }
            BatchEvent::BatchFinished { succeeded, failed } => {
                tracing::info!(%succeeded, %failed, "Batch finished");
            }
        }
    }
}

/// Orchestrates one batch run. Routing happens once per URL up front; the
/// scheduler then owns dispatch order; each emitted job is handed to the
/// extractor and its outcome recorded. One bad URL never aborts the batch.
pub struct BatchPipeline<E: Extractor> {
    router: TemplateRouter,
    extractor: E,
    limiter: RateLimiter,
}

impl<E: Extractor> BatchPipeline<E> {
    pub fn new(router: TemplateRouter, extractor: E, limiter: RateLimiter) -> Self {
        Self {
            router,
            extractor,
            limiter,
        }
    }

    pub fn router(&self) -> &TemplateRouter {
        &self.router
    }

    /// Route a list of URLs into jobs, preserving submission order.
    pub fn route_jobs(&self, urls: &[String], reporter: &impl BatchReporter) -> Vec<Job> {
        urls.iter()
            .enumerate()
            .map(|(index, url)| {
                let template = self.router.route(url);
                reporter.report(BatchEvent::JobRouted {
                    url,
                    template: &template.name,
                });
                Job::new(url.clone(), template.name.clone(), index)
            })
            .collect()
    }

    /// Route and run a whole batch.
    pub async fn run(
        &self,
        urls: &[String],
        cancel: CancellationToken,
        reporter: &impl BatchReporter,
    ) -> BatchReport {
        let jobs = self.route_jobs(urls, reporter);
        self.run_jobs(jobs, cancel, reporter).await
    }

    /// Run pre-built jobs through the scheduler and extractor.
    ///
    /// Cancellation takes effect between dispatches: undispatched jobs are
    /// dropped with no result recorded; a job already handed to the
    /// extractor runs to completion.
    pub async fn run_jobs(
        &self,
        jobs: Vec<Job>,
        cancel: CancellationToken,
        reporter: &impl BatchReporter,
    ) -> BatchReport {
        reporter.report(BatchEvent::BatchStarted { total: jobs.len() });

        let mut scheduler = DeferredScheduler::new(jobs, self.limiter.clone());
        let mut report = BatchReport::default();

        loop {
            let job = tokio::select! {
                job = scheduler.next() => match job {
                    Some(job) => job,
                    None => break,
                },
                () = cancel.cancelled() => {
                    reporter.report(BatchEvent::BatchCancelled {
                        dropped: scheduler.pending_count(),
                    });
                    break;
                }
            };

            reporter.report(BatchEvent::JobDispatched { job: &job });
            let dispatched_at = Utc::now();

            let outcome = match self.extractor.extract(&job.url).await {
                Ok(page) => {
                    reporter.report(BatchEvent::JobCompleted {
                        job: &job,
                        word_count: page.word_count,
                    });
                    JobOutcome::Success(page)
                }
                Err(e) => {
                    let message = e.to_string();
                    reporter.report(BatchEvent::JobFailed {
                        job: &job,
                        error: &message,
                    });
                    JobOutcome::Failure(message)
                }
            };

            report.results.push(JobResult {
                job,
                outcome,
                dispatched_at,
            });
        }

        reporter.report(BatchEvent::BatchFinished {
            succeeded: report.succeeded(),
            failed: report.failed(),
        });
        report
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::category::CategorySet;
    use crate::template::{TemplateRouter, TemplateSpec};
    use crate::testutil::{MockExtractor, RecordingReporter};

    fn test_router() -> TemplateRouter {
        let specs = vec![
            TemplateSpec {
                name: "github".into(),
                triggers: vec!["github.com".into()],
                ..TemplateSpec::default()
            },
            TemplateSpec {
                name: "wiki".into(),
                triggers: vec!["@wiki".into()],
                ..TemplateSpec::default()
            },
        ];
        TemplateRouter::from_specs(&specs, CategorySet::builtin()).unwrap()
    }

    fn pipeline(extractor: MockExtractor) -> BatchPipeline<MockExtractor> {
        BatchPipeline::new(test_router(), extractor, RateLimiter::new(Duration::ZERO))
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn every_url_gets_exactly_one_result() {
        let p = pipeline(MockExtractor::ok());
        let report = p
            .run(
                &urls(&[
                    "https://github.com/rust-lang/rust",
                    "https://en.wikipedia.org/wiki/Rust",
                    "https://example.com/article",
                ]),
                CancellationToken::new(),
                &RecordingReporter::new(),
            )
            .await;
        assert_eq!(report.len(), 3);
        assert_eq!(report.succeeded(), 3);
    }

    #[tokio::test]
    async fn routing_is_applied_before_scheduling() {
        let p = pipeline(MockExtractor::ok());
        let reporter = RecordingReporter::new();
        let jobs = p.route_jobs(
            &urls(&[
                "https://github.com/rust-lang/rust",
                "https://en.wikipedia.org/wiki/Rust",
                "https://example.com/article",
            ]),
            &reporter,
        );
        let templates: Vec<&str> = jobs.iter().map(|j| j.template.as_str()).collect();
        assert_eq!(templates, vec!["github", "wiki", "default"]);
        assert_eq!(jobs[2].arrival_index, 2);
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let batch = urls(&[
            "https://a.com/1",
            "https://b.com/1",
            "https://c.com/1",
            "https://d.com/1",
            "https://e.com/1",
        ]);
        let p = pipeline(MockExtractor::ok().failing_for("https://c.com/1", "HTTP 500"));
        let report = p
            .run(&batch, CancellationToken::new(), &RecordingReporter::new())
            .await;

        assert_eq!(report.len(), 5);
        assert_eq!(report.succeeded(), 4);
        assert_eq!(report.failed(), 1);
        let failed: Vec<&str> = report
            .results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.job.url.as_str())
            .collect();
        assert_eq!(failed, vec!["https://c.com/1"]);
    }

    #[tokio::test]
    async fn cancelled_batch_records_no_results() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let p = pipeline(MockExtractor::ok());
        let reporter = RecordingReporter::new();
        let report = p
            .run(&urls(&["https://a.com/1", "https://b.com/1"]), cancel, &reporter)
            .await;
        assert!(report.is_empty());
        assert!(reporter.labels().contains(&"BatchCancelled".to_string()));
    }

    #[tokio::test]
    async fn reporter_sees_lifecycle_events() {
        let p = pipeline(MockExtractor::ok().failing_for("https://b.com/1", "boom"));
        let reporter = RecordingReporter::new();
        p.run(
            &urls(&["https://a.com/1", "https://b.com/1"]),
            CancellationToken::new(),
            &reporter,
        )
        .await;
        let labels = reporter.labels();
        assert_eq!(labels.iter().filter(|l| *l == "JobDispatched").count(), 2);
        assert_eq!(labels.iter().filter(|l| *l == "JobCompleted").count(), 1);
        assert_eq!(labels.iter().filter(|l| *l == "JobFailed").count(), 1);
        assert_eq!(labels.last().unwrap(), "BatchFinished");
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_batch_still_completes() {
        let p = BatchPipeline::new(
            test_router(),
            MockExtractor::ok(),
            RateLimiter::new(Duration::from_secs(2)),
        );
        let report = p
            .run(
                &urls(&["https://a.com/1", "https://a.com/2", "https://b.com/1"]),
                CancellationToken::new(),
                &RecordingReporter::new(),
            )
            .await;
        assert_eq!(report.len(), 3);
        // Results are recorded in dispatch order: a/1, b/1 overtakes, a/2.
        let order: Vec<usize> = report.results.iter().map(|r| r.job.arrival_index).collect();
        assert_eq!(order, vec![0, 2, 1]);
    }
}
