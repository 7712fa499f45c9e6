//! CLI commands implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{FetchMode, Settings};
use crate::domain::{DomainAuditOptions, DomainAuditor};
use crate::jobs::JobStore;
use crate::models::{JobStatus, PageAudit};
use crate::pipeline::AuditPipeline;
use crate::server;

#[derive(Parser)]
#[command(name = "aeoscope")]
#[command(about = "Answer Engine Optimization auditor for pages and domains")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Audit a single page and print the result
    Page {
        /// URL to audit
        url: String,
        /// Fetch mode: hybrid, http, or rendered
        #[arg(long)]
        mode: Option<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Audit a whole domain and print the aggregated result
    Domain {
        /// Domain to audit (scheme optional, defaults to https)
        domain: String,
        /// Maximum pages to audit (0 = unlimited up to the hard ceiling)
        #[arg(long)]
        max_pages: Option<usize>,
        /// Concurrent page workers (1-10)
        #[arg(long)]
        concurrency: Option<usize>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Entry point called from main.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);
            server::serve(settings, &host, port).await
        }
        Commands::Page { url, mode, json } => audit_page_cmd(settings, url, mode, json).await,
        Commands::Domain {
            domain,
            max_pages,
            concurrency,
            json,
        } => audit_domain_cmd(settings, domain, max_pages, concurrency, json).await,
    }
}

async fn audit_page_cmd(
    mut settings: Settings,
    url: String,
    mode: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(mode) = mode {
        settings.fetcher.mode = FetchMode::parse(&mode)
            .ok_or_else(|| anyhow::anyhow!("invalid mode '{}' (hybrid|http|rendered)", mode))?;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message(format!("Auditing {}", url));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let pipeline = AuditPipeline::new(&settings)?;
    let outcome = pipeline.audit_page(&url).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.audit)?);
    } else {
        print_page_audit(&outcome.audit);
    }
    Ok(())
}

async fn audit_domain_cmd(
    settings: Settings,
    domain: String,
    max_pages: Option<usize>,
    concurrency: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let pipeline = Arc::new(AuditPipeline::new(&settings)?);
    let jobs = Arc::new(JobStore::new(Duration::from_secs(settings.job.ttl_seconds)));
    let auditor = DomainAuditor::new(pipeline, jobs.clone(), settings.domain.clone());

    let job_id = jobs.create().await;
    let (_, mut events) = jobs.subscribe(&job_id).await.expect("job just created");

    let run_job_id = job_id.clone();
    let run_domain = domain.clone();
    let handle = tokio::spawn(async move {
        auditor
            .run(
                run_job_id,
                run_domain,
                DomainAuditOptions {
                    max_pages,
                    concurrency,
                },
            )
            .await;
    });

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}").unwrap(),
    );
    bar.set_message("discovering...");

    loop {
        match events.recv().await {
            Ok(event) => {
                bar.set_position(event.percentage.round() as u64);
                bar.set_message(event.message.clone());
                if event.status.is_terminal() {
                    break;
                }
            }
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
    bar.finish_and_clear();
    let _ = handle.await;

    let state = jobs
        .get(&job_id)
        .await
        .ok_or_else(|| anyhow::anyhow!("job state lost"))?;

    match state.status {
        JobStatus::Completed => {
            let result = state.result.expect("completed job has a result");
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "{} {} {}",
                    style("Domain score:").bold(),
                    style(format!("{:.1}/100", result.overall_score)).green().bold(),
                    style(format!("({})", result.grade)).dim()
                );
                println!(
                    "Pages: {}/{} audited successfully",
                    result.pages_successful, result.pages_audited
                );
                for (category, agg) in &result.breakdown {
                    println!(
                        "  {:<18} {:>5.1}/{:<4.0} {:>5.1}%",
                        category, agg.mean, agg.max, agg.percentage
                    );
                }
                if let Some(best) = &result.best_page {
                    println!("Best page:  {} ({:.1})", best.url, best.overall_score);
                }
                if let Some(worst) = &result.worst_page {
                    println!("Worst page: {} ({:.1})", worst.url, worst.overall_score);
                }
                if let Some(geo) = &result.geo_score {
                    println!(
                        "{} {:.1}/100 for {}",
                        style("GEO score:").bold(),
                        geo.geo_score,
                        geo.brand_name
                    );
                    for action in &geo.recommended_actions {
                        println!("  - {}", action);
                    }
                }
            }
            Ok(())
        }
        _ => {
            let reason = state.error.unwrap_or_else(|| "unknown error".to_string());
            anyhow::bail!("domain audit failed: {}", reason)
        }
    }
}

fn print_page_audit(audit: &PageAudit) {
    println!(
        "{} {} {}",
        style("AEO score:").bold(),
        style(format!("{:.1}/100", audit.overall_score)).green().bold(),
        style(format!("({})", audit.grade)).dim()
    );
    println!(
        "Content type: {} ({:?} confidence)",
        audit.content_classification.content_type.as_str(),
        audit.content_classification.confidence
    );
    println!();
    for (category, score) in &audit.breakdown {
        println!(
            "  {:<18} {:>5.1}/{:<4.0} {:>5.1}%",
            category, score.raw, score.max, score.percentage
        );
        for (name, value) in &score.sub_scores {
            if *value > 0.0 {
                println!("      {:<24} {:.1}", name, value);
            }
        }
    }
    if !audit.recommendations.is_empty() {
        println!();
        println!("{}", style("Top recommendations:").bold());
        for rec in audit.recommendations.iter().take(5) {
            println!(
                "  [{}] {} (+{:.1} potential)",
                rec.priority, rec.title, rec.potential_gain
            );
        }
    }
}
