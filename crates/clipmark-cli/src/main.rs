mod config;
mod frontmatter;
mod inputs;
mod output;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use clipmark_client::{CookieJar, HttpFetcher, PageExtractor};
use clipmark_core::job::{Job, JobOutcome};
use clipmark_core::{BatchPipeline, CategorySet, RateLimiter, TemplateRouter, TracingBatchReporter};

use crate::config::Config;

/// Threshold above which a batch asks for confirmation.
const CONFIRM_THRESHOLD: usize = 10;

#[derive(Parser)]
#[command(name = "clipmark", version, about = "Clip web pages into Markdown notes")]
struct Cli {
    /// URLs or files of URLs (markdown or one-per-line text)
    inputs: Vec<String>,

    /// Output folder (relative to the current directory), overriding
    /// template routing
    #[arg(short, long)]
    output: Option<String>,

    /// Vault directory notes are saved into
    #[arg(short, long)]
    vault: Option<String>,

    /// Use this template for every URL instead of routing
    #[arg(short, long)]
    template: Option<String>,

    /// Extra tags to add to every note
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Minimum seconds between requests to the same domain
    #[arg(long)]
    min_interval: Option<f64>,

    /// Netscape cookies.txt file for authenticated fetches
    #[arg(long)]
    cookies: Option<PathBuf>,

    /// Config file (default: ~/.clipmark.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the default config file and exit
    #[arg(long)]
    init_config: bool,

    /// List configured templates and exit
    #[arg(long)]
    list_templates: bool,

    /// Show routing decisions without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt for large batches
    #[arg(short = 'y', long)]
    yes: bool,

    /// Allow fetching from private/reserved IP addresses
    #[arg(long)]
    allow_private: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.init_config {
        let path = Config::init(cli.config.as_deref())?;
        println!("Created {}", path.display());
        return Ok(());
    }

    let (mut config, created) = Config::load(cli.config.as_deref())?;
    if created {
        tracing::info!("Created default config at ~/.clipmark.toml");
    }
    if let Some(vault) = &cli.vault {
        config.vault = vault.clone();
    }
    if let Some(interval) = cli.min_interval {
        config.min_interval = interval;
    }

    let router = TemplateRouter::from_specs(&config.templates, CategorySet::builtin())?;

    if cli.list_templates {
        for template in router.iter() {
            println!("{:<16} {}", template.name, template.folder);
        }
        return Ok(());
    }

    let urls = inputs::collect_urls(&cli.inputs)?;
    if urls.is_empty() {
        bail!("no URLs to clip; pass URLs or files of URLs");
    }

    // With -t every URL goes to the named template; otherwise route.
    let jobs: Vec<Job> = match &cli.template {
        Some(name) => {
            let template = router
                .get(name)
                .with_context(|| format!("unknown template '{name}'"))?;
            urls.iter()
                .enumerate()
                .map(|(i, url)| Job::new(url.clone(), template.name.clone(), i))
                .collect()
        }
        None => urls
            .iter()
            .enumerate()
            .map(|(i, url)| Job::new(url.clone(), router.route(url).name.clone(), i))
            .collect(),
    };

    if cli.dry_run {
        for job in &jobs {
            let folder = router
                .get(&job.template)
                .map(|t| t.folder.as_str())
                .unwrap_or_default();
            println!("{:<16} {:<24} {}", job.template, folder, job.url);
        }
        return Ok(());
    }

    if jobs.len() > CONFIRM_THRESHOLD && !cli.yes && !confirm(jobs.len())? {
        bail!("aborted");
    }

    let mut fetcher = HttpFetcher::new()?;
    if cli.allow_private {
        fetcher = fetcher.allow_private_hosts();
    }
    let mut extractor = PageExtractor::new(fetcher);
    if let Some(path) = &cli.cookies {
        let jar = CookieJar::load(path)
            .with_context(|| format!("failed to load cookies from {}", path.display()))?;
        tracing::info!(cookies = jar.len(), "Loaded cookie jar");
        extractor = extractor.with_cookies(jar);
    }

    let limiter = RateLimiter::from_secs(config.min_interval)?;
    let pipeline = BatchPipeline::new(router, extractor, limiter);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; finishing current job");
            signal_cancel.cancel();
        }
    });

    let report = pipeline
        .run_jobs(jobs, cancel, &TracingBatchReporter)
        .await;

    let mut saved = 0usize;
    for result in &report.results {
        match &result.outcome {
            JobOutcome::Success(page) => {
                let template = pipeline
                    .router()
                    .get(&result.job.template)
                    .unwrap_or_else(|| pipeline.router().default_template());
                let folder = match &cli.output {
                    Some(folder) => output::resolve_output_folder(folder)?,
                    None => output::resolve_template_folder(&template.folder, &config.vault_dir())?,
                };
                let path = output::unique_filepath(
                    folder.join(output::note_filename(page, template, &config)),
                );
                let frontmatter =
                    frontmatter::build_frontmatter(page, &result.job.url, template, &config, &cli.tags);
                output::write_note(&path, &format!("{frontmatter}{}\n", page.content))?;
                println!("Saved {}", path.display());
                saved += 1;
            }
            JobOutcome::Failure(error) => {
                eprintln!("Failed {}: {error}", result.job.url);
            }
        }
    }

    eprintln!("{saved} saved, {} failed, {} total", report.failed(), urls.len());

    let code = batch_exit_code(saved);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Success iff at least one note was saved. A batch where every job failed
/// or was cancelled before any dispatch exits nonzero.
fn batch_exit_code(saved: usize) -> i32 {
    if saved > 0 {
        0
    } else {
        1
    }
}


fn confirm(count: usize) -> Result<bool> {
    eprint!("Clip {count} URLs? [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
