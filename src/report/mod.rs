//! Report rendering capability.
//!
//! The PDF renderer is an external collaborator: the core only defines
//! the call contract and ships a null-object default. A missing renderer
//! turns report requests into a clean "unavailable" error without
//! touching stored audit results.

use async_trait::async_trait;

/// Renders an audit result into a downloadable report.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Render the given audit JSON. `detailed` selects the long form.
    async fn render(
        &self,
        audit: &serde_json::Value,
        audit_type: &str,
        detailed: bool,
    ) -> anyhow::Result<Vec<u8>>;
}

/// Default renderer when none is installed: always unavailable.
pub struct UnavailableReportRenderer;

#[async_trait]
impl ReportRenderer for UnavailableReportRenderer {
    async fn render(
        &self,
        _audit: &serde_json::Value,
        _audit_type: &str,
        _detailed: bool,
    ) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("no report renderer is configured")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_renderer_errors() {
        let renderer = UnavailableReportRenderer;
        let result = renderer
            .render(&serde_json::json!({}), "page", false)
            .await;
        assert!(result.is_err());
    }
}
