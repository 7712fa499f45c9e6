//! In-memory job store and progress plumbing for domain audits.
//!
//! A process-wide map of job id to state with a single writer (the
//! orchestrator). Progress events go to a per-job broadcast channel plus
//! a bounded ring buffer so late subscribers can replay the tail.
//! Terminal jobs are retained for a TTL, then evicted by the sweeper.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::models::{DomainAudit, JobState, JobStatus, ProgressEvent};

/// Events retained per job for late subscribers.
const EVENT_RING_CAPACITY: usize = 256;

/// Broadcast channel depth per job.
const BROADCAST_CAPACITY: usize = 64;

struct JobEntry {
    state: JobState,
    events: VecDeque<ProgressEvent>,
    tx: broadcast::Sender<ProgressEvent>,
    cancelled: Arc<AtomicBool>,
}

/// Process-wide job registry.
pub struct JobStore {
    jobs: RwLock<HashMap<String, JobEntry>>,
    ttl: Duration,
}

impl JobStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Create a queued job and return its id.
    pub async fn create(&self) -> String {
        let job_id = format!("job_{}", uuid::Uuid::new_v4().simple());
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let entry = JobEntry {
            state: JobState::new(job_id.clone()),
            events: VecDeque::new(),
            tx,
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        self.jobs.write().await.insert(job_id.clone(), entry);
        info!("Created job {}", job_id);
        job_id
    }

    /// Snapshot a job's state.
    pub async fn get(&self, job_id: &str) -> Option<JobState> {
        self.jobs.read().await.get(job_id).map(|e| e.state.clone())
    }

    /// Cancellation flag for workers to poll between pages.
    pub async fn cancel_flag(&self, job_id: &str) -> Option<Arc<AtomicBool>> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .map(|e| e.cancelled.clone())
    }

    /// Subscribe to a job's progress: the buffered tail plus a live
    /// receiver. None for unknown jobs.
    pub async fn subscribe(
        &self,
        job_id: &str,
    ) -> Option<(Vec<ProgressEvent>, broadcast::Receiver<ProgressEvent>)> {
        let jobs = self.jobs.read().await;
        let entry = jobs.get(job_id)?;
        Some((
            entry.events.iter().cloned().collect(),
            entry.tx.subscribe(),
        ))
    }

    /// Publish a progress update. Mutates state to match the event and
    /// fans out to subscribers. Only the orchestrator calls this.
    pub async fn publish(&self, event: ProgressEvent) {
        let mut jobs = self.jobs.write().await;
        let Some(entry) = jobs.get_mut(&event.job_id) else {
            warn!("Progress update for unknown job {}", event.job_id);
            return;
        };
        if entry.state.status.is_terminal() {
            // No state is ever revisited after a terminal transition.
            debug!("Dropping event for terminal job {}", event.job_id);
            return;
        }

        entry.state.status = event.status;
        entry.state.percentage = event.percentage;
        entry.state.pages_audited = event.pages_audited;
        entry.state.total_urls = event.total_urls;
        entry.state.urls_discovered = event.urls_discovered;
        entry.state.current_url = event.current_url.clone();

        if entry.events.len() >= EVENT_RING_CAPACITY {
            entry.events.pop_front();
        }
        entry.events.push_back(event.clone());
        let _ = entry.tx.send(event);
    }

    /// Transition a job to completed and store its result.
    pub async fn complete(&self, job_id: &str, result: DomainAudit) {
        let mut jobs = self.jobs.write().await;
        let Some(entry) = jobs.get_mut(job_id) else {
            return;
        };
        if entry.state.status.is_terminal() {
            return;
        }
        entry.state.status = JobStatus::Completed;
        entry.state.percentage = 100.0;
        entry.state.result = Some(result);
        entry.state.finished_at = Some(Utc::now());
        entry.state.current_url = None;

        let event = terminal_event(&entry.state, "Audit completed successfully");
        if entry.events.len() >= EVENT_RING_CAPACITY {
            entry.events.pop_front();
        }
        entry.events.push_back(event.clone());
        let _ = entry.tx.send(event);
        info!("Job {} completed", job_id);
    }

    /// Transition a job to failed with a reason. Prior page results are
    /// discarded: the store only reports terminal domain state.
    pub async fn fail(&self, job_id: &str, reason: &str) {
        let mut jobs = self.jobs.write().await;
        let Some(entry) = jobs.get_mut(job_id) else {
            return;
        };
        if entry.state.status.is_terminal() {
            return;
        }
        entry.state.status = JobStatus::Failed;
        entry.state.error = Some(reason.to_string());
        entry.state.result = None;
        entry.state.finished_at = Some(Utc::now());
        entry.state.current_url = None;

        let event = terminal_event(&entry.state, reason);
        if entry.events.len() >= EVENT_RING_CAPACITY {
            entry.events.pop_front();
        }
        entry.events.push_back(event.clone());
        let _ = entry.tx.send(event);
        warn!("Job {} failed: {}", job_id, reason);
    }

    /// Cancel a running job: flags workers to stop and fails the job.
    pub async fn cancel(&self, job_id: &str) -> bool {
        let flag = {
            let jobs = self.jobs.read().await;
            match jobs.get(job_id) {
                Some(entry) if !entry.state.status.is_terminal() => {
                    Some(entry.cancelled.clone())
                }
                _ => None,
            }
        };
        match flag {
            Some(flag) => {
                flag.store(true, Ordering::Relaxed);
                self.fail(job_id, "cancelled by request").await;
                true
            }
            None => false,
        }
    }

    /// Evict terminal jobs older than the TTL. Returns evicted count.
    pub async fn sweep(&self) -> usize {
        let mut jobs = self.jobs.write().await;
        let cutoff = Utc::now() - chrono::Duration::from_std(self.ttl).unwrap_or_default();
        let before = jobs.len();
        jobs.retain(|_, entry| {
            !(entry.state.status.is_terminal()
                && entry.state.finished_at.map(|t| t < cutoff).unwrap_or(false))
        });
        before - jobs.len()
    }

    /// Run the eviction sweeper until the process exits.
    pub fn spawn_sweeper(self: Arc<Self>) {
        let interval = self.ttl.min(Duration::from_secs(60)).max(Duration::from_secs(5));
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let evicted = self.sweep().await;
                if evicted > 0 {
                    debug!("Evicted {} expired job(s)", evicted);
                }
            }
        });
    }
}

fn terminal_event(state: &JobState, message: &str) -> ProgressEvent {
    ProgressEvent {
        job_id: state.job_id.clone(),
        status: state.status,
        current_step: match state.status {
            JobStatus::Completed => "Done".to_string(),
            _ => "Failed".to_string(),
        },
        percentage: state.percentage,
        pages_audited: state.pages_audited,
        total_urls: state.total_urls,
        urls_discovered: state.urls_discovered,
        message: message.to_string(),
        current_url: None,
        timestamp: Utc::now(),
    }
}

/// Build a progress event for a job mid-flight. Percentage is 10 points
/// for finished discovery plus 90 scaled by audited pages; only the
/// terminal event ever reports 100.
pub fn progress_event(
    job_id: &str,
    status: JobStatus,
    step: &str,
    pages_audited: usize,
    total_urls: usize,
    urls_discovered: usize,
    message: String,
    current_url: Option<String>,
) -> ProgressEvent {
    let percentage = match status {
        JobStatus::Queued => 0.0,
        JobStatus::Discovering => 5.0,
        JobStatus::Auditing => {
            let p = if total_urls > 0 {
                10.0 + 90.0 * (pages_audited as f64 / total_urls as f64)
            } else {
                10.0
            };
            p.min(99.0)
        }
        JobStatus::Completed => 100.0,
        JobStatus::Failed => 0.0,
    };
    ProgressEvent {
        job_id: job_id.to_string(),
        status,
        current_step: step.to_string(),
        percentage: percentage.min(100.0),
        pages_audited,
        total_urls,
        urls_discovered,
        message,
        current_url,
        timestamp: Utc::now(),
    }
}
