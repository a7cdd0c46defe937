// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Page analyzers
//!
//! Each analyzer reads an already-retrieved page (markup and response
//! headers) and returns an [`AnalysisUpdate`] for the sections it owns.
//! Analyzers are best-effort: they never fail, unmatched input just yields
//! empty sections.

pub mod accessibility;
pub mod colors;
pub mod contrast;
pub mod security;
pub mod seo;

use crate::analysis::AnalysisUpdate;
use crate::config::Config;
use crate::scan::TaskKind;
use std::collections::BTreeMap;

/// A page as handed over by the fetching layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInput {
    pub html: String,
    pub headers: BTreeMap<String, String>,
}

impl PageInput {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }
}

/// Trait for all page analyzers
pub trait Analyzer: Send + Sync {
    /// Human-readable name
    fn name(&self) -> &str;

    /// Scan task this analyzer serves
    fn kind(&self) -> TaskKind;

    /// Analyze a page
    fn analyze(&self, page: &PageInput, config: &Config) -> AnalysisUpdate;
}

/// The markup/header analyzers, one per non-network task kind
pub fn page_analyzers() -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(security::TechAnalyzer),
        Box::new(colors::ColorsAnalyzer::default()),
        Box::new(seo::SeoAnalyzer),
    ]
}

/// Run every page analyzer and fold the results into one update
pub fn analyze_page(page: &PageInput, config: &Config) -> AnalysisUpdate {
    page_analyzers()
        .iter()
        .fold(AnalysisUpdate::new(), |acc, analyzer| {
            acc.combine(analyzer.analyze(page, config))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_analyzer_per_page_task() {
        let kinds: Vec<TaskKind> = page_analyzers().iter().map(|a| a.kind()).collect();
        assert_eq!(kinds, vec![TaskKind::Tech, TaskKind::Colors, TaskKind::Seo]);
    }

    #[test]
    fn test_analyze_page_touches_every_page_section() {
        let update = analyze_page(&PageInput::new("<p>hello</p>"), &Config::default());
        assert!(update.ui.is_some());
        assert!(update.seo.is_some());
        assert!(update.technical.is_some());
        assert!(update.security_headers.is_some());
        assert!(update.performance.is_some());
        assert!(update.accessibility.is_some());
        assert!(update.performance_score.is_none());
        assert!(update.core_web_vitals.is_none());
    }
}
