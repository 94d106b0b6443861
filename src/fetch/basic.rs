use super::client::HttpClient;
use anyhow::Result;
use async_trait::async_trait;

pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self.0.get(url).send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }
}
