// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for pagebot

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PagebotError>;

#[derive(Error, Debug)]
pub enum PagebotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The injected fetch capability failed or returned a non-success status
    #[error("Remote fetch failed for {url}: {reason}")]
    RemoteFetch { url: String, reason: String },

    /// A page-speed payload is missing a required field or is not JSON
    #[error("Malformed page-speed response: {0}")]
    MalformedResponse(String),

    /// Import/export payload does not match the Analysis record shape
    #[error("Codec error: {0}")]
    Codec(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PagebotError {
    /// Build a remote fetch error for `url`
    pub fn remote_fetch(url: &str, reason: impl Into<String>) -> Self {
        Self::RemoteFetch {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
