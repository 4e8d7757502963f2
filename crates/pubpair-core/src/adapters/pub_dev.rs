use super::Registry;
use crate::config::{Config, DEFAULT_REGISTRY_URL};
use crate::errors::{PubPairError, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the pub.dev JSON API (or any server speaking the same protocol).
#[derive(Debug, Clone)]
pub struct PubDevRegistry {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PackageListing {
    #[serde(default)]
    versions: Vec<VersionListing>,
}

#[derive(Debug, Deserialize)]
struct VersionListing {
    version: String,
}

impl PubDevRegistry {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(crate::USER_AGENT)
            .build()
            .map_err(|e| {
                PubPairError::Registry(format!("failed to build HTTP client: {}", e))
            })?;
        let trimmed = base_url.trim().trim_end_matches('/');
        Ok(Self {
            client,
            base_url: if trimmed.is_empty() {
                DEFAULT_REGISTRY_URL.to_string()
            } else {
                trimmed.to_string()
            },
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.registry_url)
    }

    pub fn package_url(&self, package: &str) -> String {
        format!("{}/packages/{}", self.base_url, package.trim())
    }
}

impl Registry for PubDevRegistry {
    fn published_versions(&self, package: &str) -> Result<Vec<String>> {
        if package.trim().is_empty() {
            return Err(PubPairError::Registry(
                "Package name cannot be empty when querying the registry".into(),
            ));
        }

        let url = self.package_url(package);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .map_err(|e| PubPairError::Registry(format!("HTTP request to {} failed: {}", url, e)))?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let body = response.text().map_err(|e| {
                    PubPairError::Registry(format!("failed to read response from {}: {}", url, e))
                })?;
                parse_versions(&body)
                    .map_err(|e| PubPairError::Registry(format!("invalid JSON from {}: {}", url, e)))
            }
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            other => {
                let body = response.text().unwrap_or_default();
                let snippet: String = body.trim().chars().take(300).collect();
                Err(PubPairError::Registry(format!(
                    "Registry {} returned {}: {}",
                    url, other, snippet
                )))
            }
        }
    }
}

fn parse_versions(body: &str) -> serde_json::Result<Vec<String>> {
    let listing: PackageListing = serde_json::from_str(body)?;
    Ok(listing.versions.into_iter().map(|v| v.version).collect())
}
