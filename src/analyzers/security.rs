// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Security header extraction

use super::{Analyzer, PageInput};
use crate::analysis::{AnalysisUpdate, TechnicalSection};
use crate::config::Config;
use crate::scan::TaskKind;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use tracing::debug;

pub const CONTENT_SECURITY_POLICY: &str = "content-security-policy";
pub const STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";
pub const X_FRAME_OPTIONS: &str = "x-frame-options";
pub const X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
pub const REFERRER_POLICY: &str = "referrer-policy";

/// Security-relevant response headers; absent headers are empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityHeaders {
    pub csp: String,
    pub hsts: String,
    pub xfo: String,
    pub xcto: String,
    pub referrer: String,
}

impl SecurityHeaders {
    /// Number of headers that are set
    pub fn present(&self) -> usize {
        [&self.csp, &self.hsts, &self.xfo, &self.xcto, &self.referrer]
            .iter()
            .filter(|v| !v.is_empty())
            .count()
    }
}

/// A header collection with case-insensitive lookup
pub trait HeaderSource {
    fn header(&self, name: &str) -> Option<String>;
}

impl<S: BuildHasher> HeaderSource for HashMap<String, String, S> {
    fn header(&self, name: &str) -> Option<String> {
        self.get(name)
            .or_else(|| {
                self.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .cloned()
    }
}

impl HeaderSource for BTreeMap<String, String> {
    fn header(&self, name: &str) -> Option<String> {
        self.get(name)
            .or_else(|| {
                self.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .cloned()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> HeaderSource for [(K, V)] {
    fn header(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(k, _)| k.as_ref().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_ref().to_string())
    }
}

impl HeaderSource for HeaderMap {
    fn header(&self, name: &str) -> Option<String> {
        // HeaderMap names are already case-insensitive
        self.get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// Normalize a header collection into [`SecurityHeaders`]
pub fn extract_security_headers<H: HeaderSource + ?Sized>(headers: &H) -> SecurityHeaders {
    let get = |name: &str| {
        headers
            .header(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    SecurityHeaders {
        csp: get(CONTENT_SECURITY_POLICY),
        hsts: get(STRICT_TRANSPORT_SECURITY),
        xfo: get(X_FRAME_OPTIONS),
        xcto: get(X_CONTENT_TYPE_OPTIONS),
        referrer: get(REFERRER_POLICY),
    }
}

/// Fraction of the five security headers that are present, in `[0, 1]`
pub fn security_score(headers: &SecurityHeaders) -> f64 {
    headers.present() as f64 / 5.0
}

/// Response header analysis
pub struct TechAnalyzer;

impl Default for TechAnalyzer {
    fn default() -> Self {
        Self
    }
}

impl Analyzer for TechAnalyzer {
    fn name(&self) -> &str {
        "Security Headers"
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Tech
    }

    fn analyze(&self, page: &PageInput, _config: &Config) -> AnalysisUpdate {
        let headers = extract_security_headers(&page.headers);
        let score = security_score(&headers);
        debug!(present = headers.present(), score, "Security headers extracted");

        AnalysisUpdate::new()
            .with_security_headers(headers)
            .with_technical(TechnicalSection {
                security_score: score,
            })
    }
}
