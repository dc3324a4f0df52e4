use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{LiveRecord, RecordType};
use crate::config::Record;

const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Records fetched per page when listing a zone.
const LIST_PAGE_SIZE: usize = 100;

/// Thin client for the Cloudflare v4 DNS records API. One instance per run;
/// no retries, no caching. A failed call is reported to the caller.
pub struct CloudflareClient {
    client: Client,
    api_token: String,
    base_url: String,
}

impl CloudflareClient {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_token: api_token.into(),
            base_url: CLOUDFLARE_API_BASE.to_string(),
        }
    }

    /// Points the client at a different API endpoint, so tests can talk to a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches every record in the zone, following pagination until the
    /// reported total is reached.
    pub async fn list_records(&self, zone_id: &str) -> Result<Vec<LiveRecord>> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/zones/{}/dns_records?page={}&per_page={}",
                self.base_url, zone_id, page, LIST_PAGE_SIZE
            );

            let response: ListResponse = self
                .client
                .get(&url)
                .header("Authorization", format!("Bearer {}", self.api_token))
                .header("Content-Type", "application/json")
                .send()
                .await
                .context("Failed to send list request to Cloudflare")?
                .json()
                .await
                .context("Failed to parse Cloudflare list response")?;

            check_success(response.success, &response.errors)?;

            // `result` is null instead of a list when the call fails.
            let result = response.result.unwrap_or_default();
            let page_len = result.len();
            let total = response.result_info.map(|info| info.total_count as usize);
            records.extend(result);

            let done = match total {
                Some(total) => records.len() >= total,
                None => page_len < LIST_PAGE_SIZE,
            };
            if done || page_len == 0 {
                break;
            }

            page += 1;
        }

        Ok(records)
    }

    pub async fn create_record(&self, zone_id: &str, record: &Record) -> Result<LiveRecord> {
        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);

        let response: RecordResponse = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&WriteRecordRequest::from(record))
            .send()
            .await
            .context("Failed to send create request to Cloudflare")?
            .json()
            .await
            .context("Failed to parse Cloudflare create response")?;

        check_success(response.success, &response.errors)?;

        response
            .result
            .ok_or_else(|| anyhow::anyhow!("No result in Cloudflare response"))
    }

    pub async fn update_record(&self, zone_id: &str, record_id: &str, record: &Record) -> Result<()> {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, zone_id, record_id
        );

        let response: RecordResponse = self
            .client
            .put(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&WriteRecordRequest::from(record))
            .send()
            .await
            .context("Failed to send update request to Cloudflare")?
            .json()
            .await
            .context("Failed to parse Cloudflare update response")?;

        check_success(response.success, &response.errors)
    }

    pub async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, zone_id, record_id
        );

        let response: DeleteResponse = self
            .client
            .delete(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await
            .context("Failed to send delete request to Cloudflare")?
            .json()
            .await
            .context("Failed to parse Cloudflare delete response")?;

        check_success(response.success, &response.errors)
    }
}

fn check_success(success: bool, errors: &[ApiError]) -> Result<()> {
    if success {
        return Ok(());
    }

    let errors: Vec<String> = errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect();
    anyhow::bail!("Cloudflare API error: {}", errors.join(", "));
}

// Cloudflare API types

#[derive(Debug, Serialize)]
struct WriteRecordRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'a RecordType,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

impl<'a> From<&'a Record> for WriteRecordRequest<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            record_type: &record.record_type,
            name: &record.name,
            content: &record.content,
            ttl: 1, // 1 means "automatic" on Cloudflare
            proxied: record.proxied,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<Vec<LiveRecord>>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<LiveRecord>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    total_count: u32,
}
