//! Record counts from the catalog search index

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub trait SearchIndex {
    /// Number of records matching the filter query `filter`
    fn result_count(&self, filter: &str) -> Result<u64>;
}

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    #[serde(rename = "numFound")]
    num_found: u64,
}

/// Solr core queried over HTTP with `rows=0`
pub struct SolrIndex {
    client: Client,
    select_url: Url,
    credentials: Option<(String, String)>,
}

impl SolrIndex {
    pub fn new(base_url: &str, connect_timeout: Duration, timeout: Duration) -> Result<Self> {
        let mut url =
            Url::parse(base_url).with_context(|| format!("Invalid search URL: {base_url}"))?;

        let credentials = if url.username().is_empty() {
            None
        } else {
            Some((
                url.username().to_string(),
                url.password().unwrap_or_default().to_string(),
            ))
        };
        // Credentials travel in the Authorization header, not the URL
        let _ = url.set_username("");
        let _ = url.set_password(None);

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        let select_url = url.join("select").context("Failed to build select URL")?;

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .user_agent("postzephir-verify")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            select_url,
            credentials,
        })
    }

    pub fn select_url(&self) -> &Url {
        &self.select_url
    }
}

impl SearchIndex for SolrIndex {
    fn result_count(&self, filter: &str) -> Result<u64> {
        let mut url = self.select_url.clone();
        url.query_pairs_mut()
            .append_pair("q", "*:*")
            .append_pair("fq", filter)
            .append_pair("rows", "0")
            .append_pair("wt", "json");

        let mut request = self.client.get(url);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = request
            .send()
            .with_context(|| format!("Search request failed: {}", self.select_url))?;
        if !response.status().is_success() {
            let status = response.status();
            bail!(
                "{}: HTTP {} - {}",
                self.select_url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            );
        }
        let body = response
            .text()
            .context("Failed to read search response body")?;
        let count = parse_result_count(&body)
            .with_context(|| format!("Unparseable response from {}", self.select_url))?;

        debug!(filter, count, "search index count");
        Ok(count)
    }
}

pub fn parse_result_count(body: &str) -> Result<u64> {
    let parsed: SelectResponse =
        serde_json::from_str(body).context("Missing response.numFound")?;
    Ok(parsed.response.num_found)
}
