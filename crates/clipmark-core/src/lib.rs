pub mod category;
pub mod error;
pub mod job;
pub mod models;
pub mod pipeline;
pub mod ratelimit;
pub mod schedule;
pub mod template;
pub mod testutil;
pub mod traits;
pub mod trigger;
pub mod util;

pub use category::{CategoryFilter, CategorySet};
pub use error::AppError;
pub use job::{BatchReport, Job, JobOutcome, JobResult};
pub use models::ExtractedPage;
pub use pipeline::{BatchEvent, BatchPipeline, BatchReporter, TracingBatchReporter};
pub use ratelimit::RateLimiter;
pub use schedule::DeferredScheduler;
pub use template::{Template, TemplateRouter, TemplateSpec};
pub use traits::Extractor;
