// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! pagebot: Web Page Analysis
//!
//! Turns a retrieved web page into a normalized [`Analysis`] record:
//!
//! - Design (inline colors, fonts, frequency tiers, WCAG contrast)
//! - Accessibility (image alt text, document language)
//! - SEO (meta tags, title, mobile viewport)
//! - Security headers
//! - Performance (PageSpeed Insights scores and Core Web Vitals)
//!
//! Records can be exported as CSV or JSON and re-imported from JSON.

pub mod analysis;
pub mod analyzers;
pub mod config;
pub mod error;
pub mod export;
pub mod normalize;
pub mod pagespeed;
pub mod palette;
pub mod scan;

pub use analysis::{
    create_default_analysis, evaluate_compliance, Analysis, AnalysisUpdate, ComplianceStatus,
    CoreWebVitals,
};
pub use analyzers::{
    accessibility::analyze_accessibility,
    colors::{extract_css_colors, extract_font_families},
    contrast::{contrast_ratio, extract_contrast_issues, hex_contrast_ratio, ContrastIssue},
    security::{extract_security_headers, SecurityHeaders},
    Analyzer, PageInput,
};
pub use config::Config;
pub use error::{PagebotError, Result};
pub use export::{analyses_to_csv, analyses_to_json, parse_analyses_json};
pub use normalize::{dash_if_empty, normalize_url};
pub use pagespeed::{fetch_psi_data, Fetch, FetchResponse, PageSpeedReport};
pub use palette::{group_by_frequency, ColorEntry, ColorGroup};
pub use scan::{create_scan, run_scan, Scan, ScanOutcome, TaskKind, TaskStatus};
