// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Color and font extraction from inline style attributes
//!
//! This is a regex heuristic over `style="..."` attribute values, not a CSS
//! parser and not a DOM walk. It tolerates arbitrary markup: anything it
//! cannot match is skipped, so the worst case is an empty result.

use super::accessibility::analyze_accessibility;
use super::contrast::find_contrast_issues;
use super::{Analyzer, PageInput};
use crate::analysis::{AccessibilitySection, AnalysisUpdate, UiSection};
use crate::config::Config;
use crate::palette::build_palette;
use crate::scan::TaskKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

static STYLE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)style\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

static HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[0-9a-fA-F]{6}\b").expect("valid regex"));

/// Which kind of property a color was declared on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRole {
    Text,
    Background,
    Border,
    Other,
}

impl ColorRole {
    fn for_property(property: &str) -> Self {
        match property {
            "color" => ColorRole::Text,
            "background" | "background-color" => ColorRole::Background,
            p if p.starts_with("border") || p.starts_with("outline") => ColorRole::Border,
            _ => ColorRole::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorRole::Text => "text",
            ColorRole::Background => "background",
            ColorRole::Border => "border",
            ColorRole::Other => "other",
        }
    }
}

/// A hex literal together with the role of the property it appeared in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleColor {
    /// Lower-case `#rrggbb`
    pub hex: String,
    pub role: ColorRole,
}

/// Source of colors and fonts for a page.
///
/// [`InlineStyleExtractor`] is the regex implementation; a DOM-based
/// extractor can replace it without touching callers.
pub trait ColorExtractor {
    /// Every 6-digit hex color in declaration order, tagged with its role
    fn role_colors(&self, html: &str) -> Vec<RoleColor>;

    /// Primary font family of every `font-family` declaration
    fn font_families(&self, html: &str) -> Vec<String>;

    /// Every 6-digit hex color in first-seen order, duplicates kept
    fn css_colors(&self, html: &str) -> Vec<String> {
        self.role_colors(html).into_iter().map(|c| c.hex).collect()
    }
}

/// Regex extractor over inline `style` attributes
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineStyleExtractor;

impl ColorExtractor for InlineStyleExtractor {
    fn role_colors(&self, html: &str) -> Vec<RoleColor> {
        let mut colors = Vec::new();
        for style in inline_styles(html) {
            for (property, value) in declarations(&style) {
                let role = ColorRole::for_property(&property);
                for m in HEX_RE.find_iter(value) {
                    colors.push(RoleColor {
                        hex: m.as_str().to_lowercase(),
                        role,
                    });
                }
            }
        }
        colors
    }

    fn font_families(&self, html: &str) -> Vec<String> {
        let mut fonts = Vec::new();
        for style in inline_styles(html) {
            for (property, value) in declarations(&style) {
                if property != "font-family" {
                    continue;
                }
                let primary = value
                    .split(',')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .trim_matches(|c| c == '\'' || c == '"')
                    .trim();
                if !primary.is_empty() {
                    fonts.push(primary.to_string());
                }
            }
        }
        fonts
    }
}

/// Hex colors found in inline styles, first-seen order, not deduplicated
pub fn extract_css_colors(html: &str) -> Vec<String> {
    InlineStyleExtractor.css_colors(html)
}

/// Primary font families found in inline styles, first-seen order
pub fn extract_font_families(html: &str) -> Vec<String> {
    InlineStyleExtractor.font_families(html)
}

/// Values of all inline `style` attributes, with quote entities decoded
pub(crate) fn inline_styles(html: &str) -> Vec<String> {
    STYLE_ATTR_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| {
            m.as_str()
                .replace("&quot;", "\"")
                .replace("&#39;", "'")
                .replace("&apos;", "'")
        })
        .collect()
}

/// Split a style value into `(lower-case property, trimmed value)` pairs
pub(crate) fn declarations(style: &str) -> Vec<(String, &str)> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(property, value)| (property.trim().to_ascii_lowercase(), value.trim()))
        .filter(|(property, _)| !property.is_empty())
        .collect()
}

/// Design attributes of a page: palette, fonts, contrast and markup findings
pub struct ColorsAnalyzer {
    extractor: Box<dyn ColorExtractor + Send + Sync>,
}

impl Default for ColorsAnalyzer {
    fn default() -> Self {
        Self {
            extractor: Box::new(InlineStyleExtractor),
        }
    }
}

impl ColorsAnalyzer {
    pub fn with_extractor(extractor: Box<dyn ColorExtractor + Send + Sync>) -> Self {
        Self { extractor }
    }
}

impl Analyzer for ColorsAnalyzer {
    fn name(&self) -> &str {
        "Colors & Typography"
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Colors
    }

    fn analyze(&self, page: &PageInput, config: &Config) -> AnalysisUpdate {
        let colors = build_palette(&self.extractor.role_colors(&page.html));

        let mut fonts: Vec<String> = Vec::new();
        for font in self.extractor.font_families(&page.html) {
            if !fonts.iter().any(|f| f.eq_ignore_ascii_case(&font)) {
                fonts.push(font);
            }
        }

        let contrast_issues = find_contrast_issues(&page.html, config.contrast.min_ratio);
        let violations = analyze_accessibility(&page.html);

        debug!(
            colors = colors.len(),
            fonts = fonts.len(),
            contrast_issues = contrast_issues.len(),
            violations = violations.len(),
            "Colors analysis finished"
        );

        AnalysisUpdate::new()
            .with_ui(UiSection {
                contrast_issues,
                colors,
                fonts,
            })
            .with_accessibility(AccessibilitySection { violations })
    }
}
