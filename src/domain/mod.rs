//! Domain audit orchestration.
//!
//! Discovers URLs, audits them with a bounded worker pool, streams
//! progress, and aggregates the results. Workers claim URLs from a
//! shared queue and report outcomes over a channel; the orchestrator
//! task is the only JobStore writer.

pub mod aggregate;
pub mod discovery;

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use crate::config::DomainConfig;
use crate::jobs::{progress_event, JobStore};
use crate::models::JobStatus;
use crate::pipeline::{AuditPipeline, PageOutcome};
use crate::scoring::geo::GeoPage;

use discovery::UrlDiscovery;

/// Per-request overrides for a domain audit.
#[derive(Debug, Clone, Default)]
pub struct DomainAuditOptions {
    pub max_pages: Option<usize>,
    pub concurrency: Option<usize>,
}

/// Outcome message from one worker for one URL.
struct WorkerReport {
    url: String,
    outcome: Option<PageOutcome>,
}

/// Runs domain audits against a job store.
pub struct DomainAuditor {
    pipeline: Arc<AuditPipeline>,
    jobs: Arc<JobStore>,
    config: DomainConfig,
}

impl DomainAuditor {
    pub fn new(pipeline: Arc<AuditPipeline>, jobs: Arc<JobStore>, config: DomainConfig) -> Self {
        Self {
            pipeline,
            jobs,
            config,
        }
    }

    /// Run a domain audit to its terminal state. Spawned by the caller;
    /// all failure paths transition the job rather than returning errors.
    pub async fn run(&self, job_id: String, domain: String, options: DomainAuditOptions) {
        let domain_url = normalize_domain(&domain);

        let mut config = self.config.clone();
        if let Some(max_pages) = options.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(concurrency) = options.concurrency {
            config.concurrency = concurrency;
        }
        let max_pages = config.effective_max_pages();
        let workers = config.effective_concurrency();

        // Discovery phase.
        self.jobs
            .publish(progress_event(
                &job_id,
                JobStatus::Discovering,
                "Discovering URLs...",
                0,
                0,
                0,
                format!("Discovering URLs for {}", domain_url),
                None,
            ))
            .await;

        let discovery = match UrlDiscovery::new(max_pages) {
            Ok(d) => d,
            Err(e) => {
                self.jobs.fail(&job_id, &format!("discovery setup failed: {}", e)).await;
                return;
            }
        };
        let urls = discovery.discover(&domain_url).await;

        let cancel = self.jobs.cancel_flag(&job_id).await;
        if cancel
            .as_ref()
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(true)
        {
            return;
        }
        if urls.is_empty() {
            self.jobs.fail(&job_id, "no URLs discovered").await;
            return;
        }
        let cancel = cancel.unwrap();
        let total_urls = urls.len();
        info!("Job {}: auditing {} URLs with {} workers", job_id, total_urls, workers);

        self.jobs
            .publish(progress_event(
                &job_id,
                JobStatus::Auditing,
                "Auditing pages...",
                0,
                total_urls,
                total_urls,
                format!("Discovered {} URLs", total_urls),
                None,
            ))
            .await;

        // Worker pool: claim from a shared queue, report over a channel.
        let queue: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(urls.into_iter().collect()));
        let (report_tx, mut report_rx) = mpsc::channel::<WorkerReport>(workers * 2);
        let page_timeout = Duration::from_secs(config.page_timeout_secs);

        for _ in 0..workers {
            let queue = queue.clone();
            let report_tx = report_tx.clone();
            let pipeline = self.pipeline.clone();
            let cancel = cancel.clone();

            tokio::spawn(async move {
                loop {
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    let Some(url) = queue.lock().await.pop_front() else {
                        break;
                    };

                    let outcome =
                        match tokio::time::timeout(page_timeout, pipeline.audit_page(&url)).await {
                            Ok(outcome) => Some(outcome),
                            Err(_) => {
                                warn!("Page audit timed out for {}", url);
                                None
                            }
                        };

                    if report_tx
                        .send(WorkerReport { url, outcome })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            });
        }
        drop(report_tx);

        // Orchestrator loop: single writer for job state, with the stall
        // watchdog on the report channel.
        let stall_timeout = Duration::from_secs(config.stall_timeout_secs);
        let mut outcomes: Vec<PageOutcome> = Vec::new();
        let mut pages_audited = 0usize;

        loop {
            let report = match tokio::time::timeout(stall_timeout, report_rx.recv()).await {
                Ok(Some(report)) => report,
                Ok(None) => break,
                Err(_) => {
                    cancel.store(true, Ordering::Relaxed);
                    let reason = format!(
                        "worker pool stalled: no progress for {}s",
                        config.stall_timeout_secs
                    );
                    self.jobs.fail(&job_id, &reason).await;
                    return;
                }
            };

            if cancel.load(Ordering::Relaxed) {
                return;
            }

            pages_audited += 1;
            let message = match &report.outcome {
                Some(outcome) => format!(
                    "Audited {} ({:.1})",
                    report.url, outcome.audit.overall_score
                ),
                None => format!("Failed to audit {}", report.url),
            };
            self.jobs
                .publish(progress_event(
                    &job_id,
                    JobStatus::Auditing,
                    "Auditing pages...",
                    pages_audited,
                    total_urls,
                    total_urls,
                    message,
                    Some(report.url),
                ))
                .await;

            if let Some(outcome) = report.outcome {
                outcomes.push(outcome);
            }
        }

        if cancel.load(Ordering::Relaxed) {
            return;
        }

        // Aggregation.
        let geo_pages: Vec<GeoPage> = outcomes
            .iter()
            .map(|o| GeoPage::from_audit(&o.model, &o.audit))
            .collect();
        let audits = outcomes.into_iter().map(|o| o.audit).collect();
        let result = aggregate::aggregate(&domain_url, pages_audited, audits, &geo_pages);

        self.jobs.complete(&job_id, result).await;
    }
}

/// Ensure the domain has a scheme; bare domains default to HTTPS.
pub fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
