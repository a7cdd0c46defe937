// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Structural accessibility checks over raw markup
//!
//! - `image-alt` (WCAG 1.1.1): reported once if any `<img>` has no `alt`
//!   attribute. `alt=""` marks a decorative image and is accepted.
//! - `html-has-lang` (WCAG 3.1.1): the `<html>` element carries no
//!   non-empty `lang` attribute.
//!
//! Both are presence checks on tag text matched by regex, so malformed
//! markup degrades to fewer findings rather than an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b([^>]*)>").expect("valid regex"));

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<html\b([^>]*)>").expect("valid regex"));

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*"|'[^']*'"#).expect("valid regex"));

static ALT_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:^|[\s"'])alt(?:\s|=|/|$)"#).expect("valid regex"));

static LANG_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)lang\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid regex")
});

/// How severely a violation affects users
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Impact::Minor => write!(f, "minor"),
            Impact::Moderate => write!(f, "moderate"),
            Impact::Serious => write!(f, "serious"),
            Impact::Critical => write!(f, "critical"),
        }
    }
}

/// A single accessibility rule violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityViolation {
    /// Rule identifier (`image-alt`, `html-has-lang`)
    pub id: String,
    pub impact: Impact,
    pub description: String,
}

impl AccessibilityViolation {
    pub fn new(id: &str, impact: Impact, description: &str) -> Self {
        Self {
            id: id.to_string(),
            impact,
            description: description.to_string(),
        }
    }
}

/// Finds accessibility violations in a page's markup
pub trait AccessibilityScanner {
    fn scan(&self, html: &str) -> Vec<AccessibilityViolation>;
}

/// Regex scanner over tag text
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupScanner;

impl AccessibilityScanner for MarkupScanner {
    fn scan(&self, html: &str) -> Vec<AccessibilityViolation> {
        let mut violations = Vec::new();

        if images_missing_alt(html) > 0 {
            violations.push(AccessibilityViolation::new(
                "image-alt",
                Impact::Moderate,
                "Images must have alternate text",
            ));
        }

        if let Some(caps) = HTML_TAG_RE.captures(html) {
            if !has_lang(&caps[1]) {
                violations.push(AccessibilityViolation::new(
                    "html-has-lang",
                    Impact::Serious,
                    "<html> element must have a lang attribute",
                ));
            }
        }

        violations
    }
}

/// Accessibility violations found by the default [`MarkupScanner`]
pub fn analyze_accessibility(html: &str) -> Vec<AccessibilityViolation> {
    MarkupScanner.scan(html)
}

/// Number of `<img>` tags without an `alt` attribute
fn images_missing_alt(html: &str) -> usize {
    IMG_TAG_RE
        .captures_iter(html)
        .filter(|caps| {
            // Drop attribute values so `title="alt text"` is not mistaken for alt
            let attrs = QUOTED_RE.replace_all(&caps[1], "\"\"");
            !ALT_ATTR_RE.is_match(&attrs)
        })
        .count()
}

fn has_lang(attrs: &str) -> bool {
    LANG_ATTR_RE.captures(attrs).is_some_and(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .is_some_and(|m| !m.as_str().trim().is_empty())
    })
}
