//! Domain audit job state and progress events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audit::DomainAudit;

/// Job lifecycle. States advance strictly forward; `Completed` and
/// `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Discovering,
    Auditing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Discovering => "discovering",
            Self::Auditing => "auditing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// A progress update published after every discovery step and completed
/// page. Totally ordered per job (single writer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub job_id: String,
    pub status: JobStatus,
    pub current_step: String,
    pub percentage: f64,
    pub pages_audited: usize,
    pub total_urls: usize,
    pub urls_discovered: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of a domain audit job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobState {
    pub job_id: String,
    pub status: JobStatus,
    pub percentage: f64,
    pub pages_audited: usize,
    pub total_urls: usize,
    pub urls_discovered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DomainAudit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobState {
    pub fn new(job_id: String) -> Self {
        Self {
            job_id,
            status: JobStatus::Queued,
            percentage: 0.0,
            pages_audited: 0,
            total_urls: 0,
            urls_discovered: 0,
            current_url: None,
            result: None,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Discovering.is_terminal());
        assert!(!JobStatus::Auditing.is_terminal());
    }

    #[test]
    fn test_new_job_state() {
        let state = JobState::new("job_abc".into());
        assert_eq!(state.status, JobStatus::Queued);
        assert_eq!(state.percentage, 0.0);
        assert!(state.result.is_none());
    }
}
