//! Request handlers for the audit API.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::Stream;
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::info;

use crate::domain::DomainAuditOptions;
use crate::models::{JobStatus, ProgressEvent};

use super::AppState;

#[derive(Deserialize)]
pub struct PageAuditRequest {
    pub url: String,
}

#[derive(Deserialize, Default)]
pub struct DomainOptions {
    #[serde(default)]
    pub max_pages: Option<usize>,
    #[serde(default)]
    pub concurrency: Option<usize>,
}

#[derive(Deserialize)]
pub struct DomainAuditRequest {
    pub domain: String,
    #[serde(default)]
    pub options: Option<DomainOptions>,
}

#[derive(Deserialize)]
pub struct ReportRequest {
    pub audit_result: serde_json::Value,
    pub audit_type: String,
    #[serde(default)]
    pub detailed: bool,
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// POST /audit/page - synchronous single-page audit.
pub async fn audit_page(
    State(state): State<AppState>,
    Json(request): Json<PageAuditRequest>,
) -> impl IntoResponse {
    if !request.url.starts_with("http://") && !request.url.starts_with("https://") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "url must be http(s)"})),
        )
            .into_response();
    }

    info!("Page audit request for {}", request.url);
    let outcome = state.pipeline.audit_page(&request.url).await;
    Json(json!({"result": outcome.audit})).into_response()
}

/// POST /audit/domain - create a job and run it in the background.
pub async fn audit_domain(
    State(state): State<AppState>,
    Json(request): Json<DomainAuditRequest>,
) -> impl IntoResponse {
    if request.domain.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "domain is required"})),
        )
            .into_response();
    }

    let job_id = state.jobs.create().await;
    let options = request.options.unwrap_or_default();
    let audit_options = DomainAuditOptions {
        max_pages: options.max_pages,
        concurrency: options.concurrency,
    };

    let auditor = state.auditor();
    let spawn_job_id = job_id.clone();
    let domain = request.domain.clone();
    tokio::spawn(async move {
        auditor.run(spawn_job_id, domain, audit_options).await;
    });

    Json(json!({
        "job_id": job_id,
        "status": "queued",
        "domain": request.domain,
        "progress_url": format!("/audit/domain/progress/{}", job_id),
    }))
    .into_response()
}

/// GET /audit/domain/progress/:job_id - SSE stream of progress events.
/// The terminal event carries the result (or the failure reason).
pub async fn domain_progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let Some((backlog, mut live)) = state.jobs.subscribe(&job_id).await else {
        return Err(StatusCode::NOT_FOUND);
    };

    let (tx, rx) = tokio::sync::mpsc::channel::<serde_json::Value>(32);
    let jobs = state.jobs.clone();

    tokio::spawn(async move {
        let forward = |event: ProgressEvent| {
            let jobs = jobs.clone();
            let job_id = job_id.clone();
            async move {
                if event.status.is_terminal() {
                    let result = jobs.get(&job_id).await;
                    let (result_value, error) = result
                        .map(|s| (s.result.map(|r| json!(r)), s.error))
                        .unwrap_or((None, None));
                    json!({
                        "status": if event.status == JobStatus::Completed { "done" } else { "failed" },
                        "percentage": event.percentage,
                        "pages_audited": event.pages_audited,
                        "total_urls": event.total_urls,
                        "message": event.message,
                        "result": result_value,
                        "error": error,
                    })
                } else {
                    json!(event)
                }
            }
        };

        for event in backlog {
            let terminal = event.status.is_terminal();
            let payload = forward(event).await;
            if tx.send(payload).await.is_err() || terminal {
                return;
            }
        }
        loop {
            let event = match live.recv().await {
                Ok(event) => event,
                // A slow reader that lagged can pick up from the next event.
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
            };
            let terminal = event.status.is_terminal();
            let payload = forward(event).await;
            if tx.send(payload).await.is_err() || terminal {
                return;
            }
        }
    });

    let stream = ReceiverStream::new(rx)
        .map(|payload| Ok(Event::default().data(payload.to_string())));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /audit/domain/result/:job_id - late result fetch.
pub async fn domain_result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match state.jobs.get(&job_id).await {
        Some(job) => Json(json!({
            "status": job.status,
            "percentage": job.percentage,
            "pages_audited": job.pages_audited,
            "total_urls": job.total_urls,
            "result": job.result,
            "error": job.error,
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "job not found"})),
        )
            .into_response(),
    }
}

/// DELETE /audit/domain/:job_id - cancel a running job.
pub async fn cancel_domain(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    if state.jobs.cancel(&job_id).await {
        Json(json!({"status": "cancelled"})).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "job not found or already finished"})),
        )
            .into_response()
    }
}

/// POST /audit/pdf - delegate to the report renderer capability. A
/// renderer failure is reported to the caller and never touches stored
/// audits.
pub async fn render_report(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> impl IntoResponse {
    match state
        .renderer
        .render(&request.audit_result, &request.audit_type, request.detailed)
        .await
    {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/pdf")],
            bytes,
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::server::create_router;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> axum::Router {
        // Plain HTTP keeps the tests off the browser path.
        let mut settings = Settings::default();
        settings.fetcher.mode = crate::config::FetchMode::Http;
        let state = AppState::new(settings).unwrap();
        create_router(state)
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_page_audit_rejects_bad_url() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/audit/page")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"url": "ftp://example.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_page_audit_unreachable_host_still_scores() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/audit/page")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"url": "http://127.0.0.1:1/x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["result"]["overall_score"].as_f64().unwrap() >= 0.0);
        assert!(json["result"]["breakdown"].is_object());
    }

    #[tokio::test]
    async fn test_domain_audit_returns_job() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/audit/domain")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"domain": "127.0.0.1:1", "options": {"max_pages": 2}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "queued");
        assert!(json["job_id"].as_str().unwrap().starts_with("job_"));
        assert!(json["progress_url"]
            .as_str()
            .unwrap()
            .contains(json["job_id"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn test_result_unknown_job_404() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/audit/domain/result/job_nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_progress_unknown_job_404() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/audit/domain/progress/job_nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pdf_unavailable_without_renderer() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/audit/pdf")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"audit_result": {}, "audit_type": "page", "detailed": false}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_cancel_unknown_job_404() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/audit/domain/job_nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
