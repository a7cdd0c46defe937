// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! PageSpeed Insights client and report normalization
//!
//! The HTTP GET goes through the [`Fetch`] capability so callers decide how
//! (and whether) the network is reached. [`ReqwestFetcher`] is the live
//! implementation; [`StaticFetcher`] replays a saved payload.

use crate::analysis::{AnalysisUpdate, CoreWebVitals};
use crate::config::PageSpeedConfig;
use crate::error::{PagebotError, Result};
use crate::normalize::normalize_url;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Status and body of a completed GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs an HTTP GET. Timeouts and cancellation belong to the implementor.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse>;
}

/// Live fetcher backed by a reqwest client
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(config: &PageSpeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(url, e))?;

        Ok(FetchResponse { status, body })
    }
}

/// Replays one fixed response for every request
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    response: FetchResponse,
}

impl StaticFetcher {
    pub fn new(response: FetchResponse) -> Self {
        Self { response }
    }

    /// A 200 response carrying `body`
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(FetchResponse::new(200, body))
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn get(&self, _url: &str) -> Result<FetchResponse> {
        Ok(self.response.clone())
    }
}

/// Refuses every request; used when no page-speed source is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

#[async_trait]
impl Fetch for OfflineFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        Err(PagebotError::remote_fetch(
            &without_query(url),
            "no page-speed source configured (use --psi or --live)",
        ))
    }
}

/// Scores and vitals taken from a PageSpeed Insights report
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpeedReport {
    pub core_web_vitals: CoreWebVitals,
    pub performance_score: f64,
    pub seo_score: f64,
    pub readability_score: f64,
}

impl PageSpeedReport {
    /// Update touching only the vitals and the three scores
    pub fn into_update(self) -> AnalysisUpdate {
        AnalysisUpdate::new()
            .with_core_web_vitals(self.core_web_vitals)
            .with_scores(
                self.performance_score,
                self.seo_score,
                self.readability_score,
            )
    }
}

/// runPagespeed request URL for `page_url`
pub fn psi_request_url(page_url: &str, config: &PageSpeedConfig) -> Result<Url> {
    let mut url = Url::parse(&config.endpoint)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("url", &normalize_url(page_url));
        query.append_pair("strategy", config.strategy.as_str());
        for category in &config.categories {
            query.append_pair("category", &category.to_uppercase());
        }
        if let Some(key) = config.resolved_api_key() {
            query.append_pair("key", &key);
        }
    }
    Ok(url)
}

/// Fetch and normalize the PageSpeed Insights report for `page_url`
pub async fn fetch_psi_data<F: Fetch + ?Sized>(
    page_url: &str,
    fetcher: &F,
    config: &PageSpeedConfig,
) -> Result<PageSpeedReport> {
    let page_url = normalize_url(page_url);
    let request_url = psi_request_url(&page_url, config)?;

    info!(url = %page_url, strategy = config.strategy.as_str(), "Requesting PageSpeed report");
    let response = fetcher.get(request_url.as_str()).await?;

    if !response.is_success() {
        return Err(PagebotError::remote_fetch(
            &page_url,
            format!("PageSpeed API returned status {}", response.status),
        ));
    }

    let report = parse_psi_response(&response.body)?;
    debug!(
        performance = report.performance_score,
        seo = report.seo_score,
        lcp = report.core_web_vitals.lcp,
        "PageSpeed report parsed"
    );
    Ok(report)
}

/// Map a raw runPagespeed payload onto a [`PageSpeedReport`]
pub fn parse_psi_response(body: &str) -> Result<PageSpeedReport> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| PagebotError::MalformedResponse(format!("body is not JSON: {}", e)))?;

    let score = |category: &str| {
        required_number(
            &root,
            &["lighthouseResult", "categories", category, "score"],
        )
    };
    let audit = |id: &str| {
        required_number(&root, &["lighthouseResult", "audits", id, "numericValue"])
    };

    Ok(PageSpeedReport {
        core_web_vitals: CoreWebVitals {
            lcp: audit("largest-contentful-paint")? / 1000.0,
            fid: audit("first-input-delay")?,
            cls: audit("cumulative-layout-shift")?,
        },
        performance_score: score("performance")?,
        seo_score: score("seo")?,
        readability_score: score("accessibility")?,
    })
}

fn required_number(root: &Value, path: &[&str]) -> Result<f64> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        current = match current.get(key) {
            Some(Value::Null) | None => {
                return Err(PagebotError::MalformedResponse(format!(
                    "missing field {}",
                    path[..=depth].join(".")
                )))
            }
            Some(value) => value,
        };
    }
    current.as_f64().ok_or_else(|| {
        PagebotError::MalformedResponse(format!("field {} is not a number", path.join(".")))
    })
}

fn transport_error(url: &str, err: reqwest::Error) -> PagebotError {
    // The request URL may carry the API key
    PagebotError::remote_fetch(&without_query(url), err.without_url().to_string())
}

fn without_query(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => url.split('?').next().unwrap_or_default().to_string(),
    }
}
