// src/fetch/http.rs
use super::{extract_certificates, today, CertificateSource, PROFILE_BASE_URL, USER_AGENT};
use crate::types::Certificate;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

/// Public-profile fetcher: one GET against the profile page.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn fetch_profile_page(&self, username: &str) -> Result<String> {
        let url = format!("{}/{}", PROFILE_BASE_URL, username);
        info!("Fetching DIO profile: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch the profile page")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        response
            .text()
            .await
            .context("Failed to read the profile page body")
    }
}

#[async_trait]
impl CertificateSource for HttpSource {
    async fn fetch(&self, username: &str) -> Result<Vec<Certificate>> {
        match self.fetch_profile_page(username).await {
            Ok(html) => {
                let certificates = extract_certificates(&html, &today());
                info!("Found {} certificates on the profile", certificates.len());
                Ok(certificates)
            }
            Err(e) => {
                warn!("Profile fetch failed, continuing with no certificates: {:#}", e);
                Ok(Vec::new())
            }
        }
    }
}
