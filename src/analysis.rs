// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! The Analysis record, its defaults and section-scoped merging
//!
//! A record starts from [`create_default_analysis`] with every field at its
//! documented default. Extractors produce [`AnalysisUpdate`] values that
//! only carry the sections they own; [`Analysis::merge`] consumes the record
//! and returns the updated one, so a record handed to the exporter can no
//! longer change.

use crate::analyzers::accessibility::{AccessibilityViolation, Impact};
use crate::analyzers::contrast::ContrastIssue;
use crate::config::ComplianceConfig;
use crate::error::{PagebotError, Result};
use crate::normalize::normalize_url;
use crate::palette::ColorEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

pub use crate::analyzers::security::SecurityHeaders;

/// Normalized result of analyzing one URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub url: String,
    pub core_web_vitals: CoreWebVitals,
    pub performance_score: f64,
    pub seo_score: f64,
    pub readability_score: f64,
    pub security_headers: SecurityHeaders,
    pub compliance_status: ComplianceStatus,
    pub data: AnalysisData,
}

/// LCP in seconds, FID in milliseconds, CLS unitless
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreWebVitals {
    pub lcp: f64,
    pub fid: f64,
    pub cls: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Pass,
    /// Until evaluated
    #[default]
    Warn,
    Fail,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceStatus::Pass => write!(f, "pass"),
            ComplianceStatus::Warn => write!(f, "warn"),
            ComplianceStatus::Fail => write!(f, "fail"),
        }
    }
}

/// Domain sections of a record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub ui: UiSection,
    pub performance: PerformanceSection,
    pub seo: SeoSection,
    pub technical: TechnicalSection,
    pub accessibility: AccessibilitySection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSection {
    pub contrast_issues: Vec<ContrastIssue>,
    pub colors: Vec<ColorEntry>,
    pub fonts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSection {
    pub mobile_responsive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoSection {
    pub meta_tags: BTreeMap<String, String>,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSection {
    pub security_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilitySection {
    pub violations: Vec<AccessibilityViolation>,
}

/// A record for `url` with every field at its default
pub fn create_default_analysis(url: &str) -> Analysis {
    Analysis {
        url: normalize_url(url),
        core_web_vitals: CoreWebVitals::default(),
        performance_score: 0.0,
        seo_score: 0.0,
        readability_score: 0.0,
        security_headers: SecurityHeaders::default(),
        compliance_status: ComplianceStatus::default(),
        data: AnalysisData::default(),
    }
}

/// Partial extractor output. `None` leaves the record's value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisUpdate {
    pub core_web_vitals: Option<CoreWebVitals>,
    pub performance_score: Option<f64>,
    pub seo_score: Option<f64>,
    pub readability_score: Option<f64>,
    pub security_headers: Option<SecurityHeaders>,
    pub compliance_status: Option<ComplianceStatus>,
    pub ui: Option<UiUpdate>,
    pub performance: Option<PerformanceSection>,
    pub seo: Option<SeoUpdate>,
    pub technical: Option<TechnicalSection>,
    pub accessibility: Option<AccessibilitySection>,
}

/// Partial `ui` section; each field is overlaid on its own
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiUpdate {
    pub contrast_issues: Option<Vec<ContrastIssue>>,
    pub colors: Option<Vec<ColorEntry>>,
    pub fonts: Option<Vec<String>>,
}

impl UiUpdate {
    fn combine(self, other: UiUpdate) -> Self {
        Self {
            contrast_issues: other.contrast_issues.or(self.contrast_issues),
            colors: other.colors.or(self.colors),
            fonts: other.fonts.or(self.fonts),
        }
    }

    fn apply(self, ui: &mut UiSection) {
        if let Some(contrast_issues) = self.contrast_issues {
            ui.contrast_issues = contrast_issues;
        }
        if let Some(colors) = self.colors {
            ui.colors = colors;
        }
        if let Some(fonts) = self.fonts {
            ui.fonts = fonts;
        }
    }
}

impl From<UiSection> for UiUpdate {
    fn from(ui: UiSection) -> Self {
        Self {
            contrast_issues: Some(ui.contrast_issues),
            colors: Some(ui.colors),
            fonts: Some(ui.fonts),
        }
    }
}

/// Partial `seo` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoUpdate {
    pub meta_tags: Option<BTreeMap<String, String>>,
    pub title: Option<String>,
}

impl SeoUpdate {
    fn combine(self, other: SeoUpdate) -> Self {
        Self {
            meta_tags: other.meta_tags.or(self.meta_tags),
            title: other.title.or(self.title),
        }
    }

    fn apply(self, seo: &mut SeoSection) {
        if let Some(meta_tags) = self.meta_tags {
            seo.meta_tags = meta_tags;
        }
        if let Some(title) = self.title {
            seo.title = title;
        }
    }
}

impl From<SeoSection> for SeoUpdate {
    fn from(seo: SeoSection) -> Self {
        Self {
            meta_tags: Some(seo.meta_tags),
            title: Some(seo.title),
        }
    }
}

impl AnalysisUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_core_web_vitals(mut self, vitals: CoreWebVitals) -> Self {
        self.core_web_vitals = Some(vitals);
        self
    }

    pub fn with_scores(mut self, performance: f64, seo: f64, readability: f64) -> Self {
        self.performance_score = Some(performance);
        self.seo_score = Some(seo);
        self.readability_score = Some(readability);
        self
    }

    pub fn with_security_headers(mut self, headers: SecurityHeaders) -> Self {
        self.security_headers = Some(headers);
        self
    }

    pub fn with_compliance_status(mut self, status: ComplianceStatus) -> Self {
        self.compliance_status = Some(status);
        self
    }

    /// Set every `ui` field
    pub fn with_ui(mut self, ui: UiSection) -> Self {
        self.ui = Some(UiUpdate::from(ui));
        self
    }

    pub fn with_contrast_issues(mut self, contrast_issues: Vec<ContrastIssue>) -> Self {
        self.ui.get_or_insert_with(UiUpdate::default).contrast_issues = Some(contrast_issues);
        self
    }

    pub fn with_colors(mut self, colors: Vec<ColorEntry>) -> Self {
        self.ui.get_or_insert_with(UiUpdate::default).colors = Some(colors);
        self
    }

    pub fn with_fonts(mut self, fonts: Vec<String>) -> Self {
        self.ui.get_or_insert_with(UiUpdate::default).fonts = Some(fonts);
        self
    }

    pub fn with_performance(mut self, performance: PerformanceSection) -> Self {
        self.performance = Some(performance);
        self
    }

    /// Set every `seo` field
    pub fn with_seo(mut self, seo: SeoSection) -> Self {
        self.seo = Some(SeoUpdate::from(seo));
        self
    }

    pub fn with_meta_tags(mut self, meta_tags: BTreeMap<String, String>) -> Self {
        self.seo.get_or_insert_with(SeoUpdate::default).meta_tags = Some(meta_tags);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.seo.get_or_insert_with(SeoUpdate::default).title = Some(title.into());
        self
    }

    pub fn with_technical(mut self, technical: TechnicalSection) -> Self {
        self.technical = Some(technical);
        self
    }

    pub fn with_accessibility(mut self, accessibility: AccessibilitySection) -> Self {
        self.accessibility = Some(accessibility);
        self
    }

    /// Fold `other` into `self`; fields set in `other` win
    pub fn combine(self, other: AnalysisUpdate) -> Self {
        Self {
            core_web_vitals: other.core_web_vitals.or(self.core_web_vitals),
            performance_score: other.performance_score.or(self.performance_score),
            seo_score: other.seo_score.or(self.seo_score),
            readability_score: other.readability_score.or(self.readability_score),
            security_headers: other.security_headers.or(self.security_headers),
            compliance_status: other.compliance_status.or(self.compliance_status),
            ui: combine_with(self.ui, other.ui, UiUpdate::combine),
            performance: other.performance.or(self.performance),
            seo: combine_with(self.seo, other.seo, SeoUpdate::combine),
            technical: other.technical.or(self.technical),
            accessibility: other.accessibility.or(self.accessibility),
        }
    }
}

impl Analysis {
    /// Overlay `update` onto this record. Only fields set in the update
    /// change; everything else already in the record is kept.
    pub fn merge(mut self, update: AnalysisUpdate) -> Self {
        if let Some(vitals) = update.core_web_vitals {
            self.core_web_vitals = CoreWebVitals {
                lcp: finite_or_zero(vitals.lcp),
                fid: finite_or_zero(vitals.fid),
                cls: finite_or_zero(vitals.cls),
            };
        }
        if let Some(score) = update.performance_score {
            self.performance_score = clamp_score("performanceScore", score);
        }
        if let Some(score) = update.seo_score {
            self.seo_score = clamp_score("seoScore", score);
        }
        if let Some(score) = update.readability_score {
            self.readability_score = clamp_score("readabilityScore", score);
        }
        if let Some(headers) = update.security_headers {
            self.security_headers = headers;
        }
        if let Some(status) = update.compliance_status {
            self.compliance_status = status;
        }
        if let Some(ui) = update.ui {
            ui.apply(&mut self.data.ui);
        }
        if let Some(performance) = update.performance {
            self.data.performance = performance;
        }
        if let Some(seo) = update.seo {
            seo.apply(&mut self.data.seo);
        }
        if let Some(technical) = update.technical {
            self.data.technical = TechnicalSection {
                security_score: clamp_score("technical.securityScore", technical.security_score),
            };
        }
        if let Some(accessibility) = update.accessibility {
            self.data.accessibility = accessibility;
        }
        self
    }

    /// Check the range invariants of an imported record
    pub fn validate(&self) -> Result<()> {
        let scores = [
            ("performanceScore", self.performance_score),
            ("seoScore", self.seo_score),
            ("readabilityScore", self.readability_score),
            ("data.technical.securityScore", self.data.technical.security_score),
        ];
        for (field, value) in scores {
            if !(0.0..=1.0).contains(&value) {
                return Err(PagebotError::Codec(format!(
                    "{} for {} is {}, expected a value in [0, 1]",
                    field, self.url, value
                )));
            }
        }
        Ok(())
    }
}

/// Derive a compliance status from a fully populated record
pub fn evaluate_compliance(analysis: &Analysis, config: &ComplianceConfig) -> ComplianceStatus {
    let security = analysis.data.technical.security_score;
    let violations = &analysis.data.accessibility.violations;

    let blocking_violation = violations.iter().any(|v| v.impact >= Impact::Serious);
    if analysis.performance_score < config.fail_below_performance
        || security < config.fail_below_security
        || blocking_violation
    {
        return ComplianceStatus::Fail;
    }

    if analysis.performance_score >= config.pass_performance
        && analysis.seo_score >= config.pass_seo
        && security >= config.pass_security
        && violations.is_empty()
        && analysis.data.ui.contrast_issues.is_empty()
    {
        ComplianceStatus::Pass
    } else {
        ComplianceStatus::Warn
    }
}

fn combine_with<T>(first: Option<T>, second: Option<T>, f: fn(T, T) -> T) -> Option<T> {
    match (first, second) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (a, b) => b.or(a),
    }
}

fn clamp_score(field: &str, value: f64) -> f64 {
    if value.is_nan() {
        warn!(field, "Score is NaN, using 0");
        return 0.0;
    }
    let clamped = value.clamp(0.0, 1.0);
    if clamped != value {
        warn!(field, value, "Score outside [0, 1], clamped");
    }
    clamped
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
