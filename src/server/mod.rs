//! HTTP API for page and domain audits.
//!
//! Thin surface over the pipeline and job store: synchronous page
//! audits, asynchronous domain jobs with an SSE progress stream, and a
//! report endpoint behind the renderer capability.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::domain::DomainAuditor;
use crate::jobs::JobStore;
use crate::pipeline::AuditPipeline;
use crate::report::{ReportRenderer, UnavailableReportRenderer};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AuditPipeline>,
    pub jobs: Arc<JobStore>,
    pub settings: Arc<Settings>,
    pub renderer: Arc<dyn ReportRenderer>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let pipeline = Arc::new(AuditPipeline::new(&settings)?);
        let jobs = Arc::new(JobStore::new(Duration::from_secs(settings.job.ttl_seconds)));
        Ok(Self {
            pipeline,
            jobs,
            settings: Arc::new(settings),
            renderer: Arc::new(UnavailableReportRenderer),
        })
    }

    /// The auditor that runs domain jobs for this server.
    pub fn auditor(&self) -> DomainAuditor {
        DomainAuditor::new(
            self.pipeline.clone(),
            self.jobs.clone(),
            self.settings.domain.clone(),
        )
    }
}

/// Start the web server.
pub async fn serve(settings: Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    state.jobs.clone().spawn_sweeper();
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
