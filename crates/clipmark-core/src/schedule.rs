//! The deferred dispatch scheduler.
//!
//! Consumes a batch of routed jobs in arrival order and yields them one at a
//! time, respecting the per-domain minimum interval without letting a slow
//! domain stall requests to domains that are ready now.
//!
//! Each call to [`DeferredScheduler::next`] scans the pending list from the
//! front and dispatches the first job whose domain is ready, so among ready
//! jobs the lowest arrival index always wins and per-domain arrival order is
//! never violated. When nothing is ready it sleeps for exactly the minimum
//! remaining wait across all pending jobs, then rescans — every pending job
//! is reconsidered on every scan, so none can starve.

use tokio::time::Instant;

use crate::job::Job;
use crate::ratelimit::RateLimiter;

pub struct DeferredScheduler {
    /// Pending jobs in original arrival order.
    pending: Vec<Job>,
    limiter: RateLimiter,
}

impl DeferredScheduler {
    pub fn new(jobs: Vec<Job>, limiter: RateLimiter) -> Self {
        Self {
            pending: jobs,
            limiter,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Yield the next job to dispatch, sleeping if every pending domain is
    /// rate-limited. Returns `None` when the batch is drained.
    ///
    /// The dispatch is recorded against the limiter at the instant the job
    /// is returned — before the caller starts extraction — because the
    /// interval governs request initiation, not response time.
    pub async fn next(&mut self) -> Option<Job> {
        loop {
            if self.pending.is_empty() {
                return None;
            }

            let now = Instant::now();
            if let Some(pos) = self
                .pending
                .iter()
                .position(|job| self.limiter.can_dispatch(&job.domain, now))
            {
                let job = self.pending.remove(pos);
                self.limiter.record_dispatch(&job.domain, now);
                tracing::debug!(
                    url = %job.url,
                    domain = %job.domain,
                    deferred = self.pending.len(),
                    "Dispatching job"
                );
                return Some(job);
            }

            // Nothing is ready: wait exactly until the earliest domain frees
            // up. This is the scheduler's single suspension point.
            let wait = self
                .pending
                .iter()
                .map(|job| self.limiter.time_until_ready(&job.domain, now))
                .min()
                .expect("pending is non-empty");
            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                pending = self.pending.len(),
                "All pending domains rate-limited; waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn jobs(urls: &[&str]) -> Vec<Job> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| Job::new(*url, "default", i))
            .collect()
    }

    /// Drain the scheduler, recording (arrival_index, elapsed-since-start).
    async fn drain(mut scheduler: DeferredScheduler) -> Vec<(usize, Duration)> {
        let start = Instant::now();
        let mut order = Vec::new();
        while let Some(job) = scheduler.next().await {
            order.push((job.arrival_index, start.elapsed()));
        }
        order
    }

    #[tokio::test(start_paused = true)]
    async fn same_domain_jobs_are_spaced_by_min_interval() {
        let scheduler = DeferredScheduler::new(
            jobs(&["https://example.com/1", "https://example.com/2"]),
            RateLimiter::new(Duration::from_secs(3)),
        );
        let order = drain(scheduler).await;
        assert_eq!(order[0].0, 0);
        assert_eq!(order[1].0, 1);
        assert!(order[1].1 - order[0].1 >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn ready_domain_overtakes_blocked_domain() {
        // Two example.com jobs, then one other.com job. The other.com job
        // must not wait behind the second example.com job.
        let scheduler = DeferredScheduler::new(
            jobs(&[
                "https://example.com/1",
                "https://example.com/2",
                "https://other.com/1",
            ]),
            RateLimiter::new(Duration::from_secs(3)),
        );
        let order = drain(scheduler).await;
        let indices: Vec<usize> = order.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2, 1]);
        // Both first dispatches happen immediately.
        assert!(order[1].1 < Duration::from_secs(1));
        assert!(order[2].1 >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn per_domain_arrival_order_is_preserved() {
        let scheduler = DeferredScheduler::new(
            jobs(&[
                "https://a.com/1",
                "https://b.com/1",
                "https://a.com/2",
                "https://b.com/2",
                "https://a.com/3",
            ]),
            RateLimiter::new(Duration::from_secs(1)),
        );
        let order = drain(scheduler).await;
        let a_order: Vec<usize> = order
            .iter()
            .map(|(i, _)| *i)
            .filter(|i| [0, 2, 4].contains(i))
            .collect();
        assert_eq!(a_order, vec![0, 2, 4]);
        let b_order: Vec<usize> = order
            .iter()
            .map(|(i, _)| *i)
            .filter(|i| [1, 3].contains(i))
            .collect();
        assert_eq!(b_order, vec![1, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn two_domains_interleave_without_starvation() {
        // 6 jobs over 2 domains, 1s interval: total wall-clock is bounded by
        // ceil(6/2) * 1s, not 6 * 1s.
        let scheduler = DeferredScheduler::new(
            jobs(&[
                "https://a.com/1",
                "https://b.com/1",
                "https://a.com/2",
                "https://b.com/2",
                "https://a.com/3",
                "https://b.com/3",
            ]),
            RateLimiter::new(Duration::from_secs(1)),
        );
        let order = drain(scheduler).await;
        assert_eq!(order.len(), 6);
        let total = order.last().unwrap().1;
        assert!(
            total <= Duration::from_secs(3),
            "expected ≤ 3s total, got {total:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn earliest_arrival_wins_when_several_domains_are_ready() {
        let scheduler = DeferredScheduler::new(
            jobs(&["https://a.com/1", "https://b.com/1", "https://c.com/1"]),
            RateLimiter::new(Duration::from_secs(3)),
        );
        let order = drain(scheduler).await;
        let indices: Vec<usize> = order.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_drains_immediately_in_arrival_order() {
        let scheduler = DeferredScheduler::new(
            jobs(&[
                "https://a.com/1",
                "https://a.com/2",
                "https://a.com/3",
            ]),
            RateLimiter::new(Duration::ZERO),
        );
        let order = drain(scheduler).await;
        let indices: Vec<usize> = order.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(order.last().unwrap().1 < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_batch_yields_none() {
        let mut scheduler =
            DeferredScheduler::new(Vec::new(), RateLimiter::new(Duration::from_secs(3)));
        assert!(scheduler.next().await.is_none());
    }
}
