use anyhow::Result;
use async_trait::async_trait;

/// Transport seam for feed fetches. Implementations must treat non-success
/// HTTP statuses as errors so the retry layer sees them as failed attempts.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
}
