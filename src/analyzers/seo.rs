// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! SEO metadata extraction

use super::{Analyzer, PageInput};
use crate::analysis::{AnalysisUpdate, PerformanceSection, SeoSection};
use crate::config::Config;
use crate::scan::TaskKind;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("valid selector"));

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

/// `<meta name|property=... content=...>` pairs, keys lower-cased.
///
/// The first occurrence of a key wins. Tags without `content` are skipped.
pub fn extract_meta_tags(html: &str) -> BTreeMap<String, String> {
    let document = Html::parse_document(html);
    let mut tags = BTreeMap::new();

    for element in document.select(&META_SELECTOR) {
        let meta = element.value();
        let key = meta.attr("name").or_else(|| meta.attr("property"));
        if let (Some(key), Some(content)) = (key, meta.attr("content")) {
            let key = key.trim().to_lowercase();
            if !key.is_empty() {
                tags.entry(key).or_insert_with(|| content.trim().to_string());
            }
        }
    }

    tags
}

/// Text of the first `<title>`, whitespace collapsed; empty if none
pub fn extract_title(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| {
            title
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Whether the viewport meta tag scales to the device width
pub fn is_mobile_responsive(meta_tags: &BTreeMap<String, String>) -> bool {
    meta_tags.get("viewport").is_some_and(|content| {
        content
            .to_lowercase()
            .replace(' ', "")
            .contains("width=device-width")
    })
}

/// Search metadata analysis
pub struct SeoAnalyzer;

impl Default for SeoAnalyzer {
    fn default() -> Self {
        Self
    }
}

impl Analyzer for SeoAnalyzer {
    fn name(&self) -> &str {
        "SEO"
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Seo
    }

    fn analyze(&self, page: &PageInput, _config: &Config) -> AnalysisUpdate {
        let meta_tags = extract_meta_tags(&page.html);
        let title = extract_title(&page.html);
        let mobile_responsive = is_mobile_responsive(&meta_tags);

        debug!(meta_tags = meta_tags.len(), mobile_responsive, "SEO metadata extracted");

        AnalysisUpdate::new()
            .with_seo(SeoSection { meta_tags, title })
            .with_performance(PerformanceSection { mobile_responsive })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html lang="en"><head>
  <title>
    Acme   Widgets
  </title>
  <meta charset="utf-8">
  <meta name="Description" content=" Widgets for everyone ">
  <meta name="description" content="duplicate">
  <meta property="og:title" content="Acme">
  <meta name="viewport" content="width = device-width, initial-scale=1">
  <meta name="keywords">
</head><body></body></html>"#;

    #[test]
    fn test_meta_tags() {
        let tags = extract_meta_tags(PAGE);
        assert_eq!(tags.len(), 3);
        assert_eq!(tags["description"], "Widgets for everyone");
        assert_eq!(tags["og:title"], "Acme");
        assert!(!tags.contains_key("keywords"));
    }

    #[test]
    fn test_title() {
        assert_eq!(extract_title(PAGE), "Acme Widgets");
        assert_eq!(extract_title("<p>no title</p>"), "");
    }

    #[test]
    fn test_mobile_responsive() {
        assert!(is_mobile_responsive(&extract_meta_tags(PAGE)));
        assert!(!is_mobile_responsive(&BTreeMap::new()));

        let fixed = extract_meta_tags(r#"<meta name="viewport" content="width=1024">"#);
        assert!(!is_mobile_responsive(&fixed));
    }

    #[test]
    fn test_malformed_markup() {
        let tags = extract_meta_tags(r#"<meta name="a" content="b"<meta <<title>x"#);
        assert!(tags.len() <= 1);
        let _ = extract_title("<title>");
    }

    #[test]
    fn test_analyzer_sets_seo_and_performance() {
        let update = SeoAnalyzer::default().analyze(&PageInput::new(PAGE), &Config::default());
        let seo = update.seo.expect("seo section");
        assert_eq!(seo.title.as_deref(), Some("Acme Widgets"));
        assert!(update.performance.expect("performance section").mobile_responsive);
        assert!(update.technical.is_none());
    }
}
