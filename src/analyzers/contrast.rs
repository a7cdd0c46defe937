// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Color contrast evaluation - WCAG 1.4.3 Contrast (Minimum)
//!
//! Pairs the `color` and `background-color` declarations of each inline
//! style attribute and computes their contrast ratio with the WCAG relative
//! luminance formula. Pairs below 4.5:1 (AA, normal text) become issues.

use super::colors::{declarations, inline_styles};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// WCAG AA minimum for body text
pub const WCAG_AA_MIN_RATIO: f64 = 4.5;

static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rgba?\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)").expect("valid regex")
});

/// Named colors recognised in style values
const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("silver", Rgb::new(192, 192, 192)),
    ("maroon", Rgb::new(128, 0, 0)),
    ("olive", Rgb::new(128, 128, 0)),
    ("lime", Rgb::new(0, 255, 0)),
    ("aqua", Rgb::new(0, 255, 255)),
    ("teal", Rgb::new(0, 128, 128)),
    ("navy", Rgb::new(0, 0, 128)),
    ("fuchsia", Rgb::new(255, 0, 255)),
    ("purple", Rgb::new(128, 0, 128)),
    ("orange", Rgb::new(255, 165, 0)),
];

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
                Some(Self::new(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    /// Parse any supported CSS color value: hex, `rgb()`/`rgba()` or a named color
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim().to_lowercase();
        if trimmed.starts_with('#') {
            Self::from_hex(&trimmed)
        } else if trimmed.starts_with("rgb") {
            let caps = RGB_RE.captures(&trimmed)?;
            let r: u8 = caps[1].parse().ok()?;
            let g: u8 = caps[2].parse().ok()?;
            let b: u8 = caps[3].parse().ok()?;
            Some(Self::new(r, g, b))
        } else {
            NAMED_COLORS
                .iter()
                .find(|(name, _)| *name == trimmed)
                .map(|(_, rgb)| *rgb)
        }
    }

    /// Lower-case `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS name for this exact color, if it has one
    pub fn name(&self) -> Option<&'static str> {
        NAMED_COLORS
            .iter()
            .find(|(_, rgb)| rgb == self)
            .map(|(name, _)| *name)
    }

    /// Relative luminance per WCAG 2.x
    /// <https://www.w3.org/TR/WCAG20/#relativeluminancedef>
    pub fn relative_luminance(&self) -> f64 {
        let [r, g, b] = [self.r, self.g, self.b].map(|c| {
            let v = f64::from(c) / 255.0;
            if v <= 0.03928 {
                v / 12.92
            } else {
                ((v + 0.055) / 1.055).powf(2.4)
            }
        });
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}

/// Contrast ratio between two colors, always >= 1.0 (1.0 to 21.0)
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Contrast ratio between two hex literals; `None` if either is not a color
pub fn hex_contrast_ratio(a: &str, b: &str) -> Option<f64> {
    Some(contrast_ratio(Rgb::from_hex(a)?, Rgb::from_hex(b)?))
}

/// A text/background pair below the contrast threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastIssue {
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
}

/// Low-contrast pairs at the WCAG AA threshold
pub fn extract_contrast_issues(html: &str) -> Vec<ContrastIssue> {
    find_contrast_issues(html, WCAG_AA_MIN_RATIO)
}

/// Low-contrast pairs below `min_ratio`, one per style attribute at most
pub fn find_contrast_issues(html: &str, min_ratio: f64) -> Vec<ContrastIssue> {
    let mut issues = Vec::new();

    for style in inline_styles(html) {
        let mut fg = None;
        let mut bg = None;

        for (property, value) in declarations(&style) {
            match property.as_str() {
                "color" => fg = first_color(value).or(fg),
                "background-color" | "background" => bg = first_color(value).or(bg),
                _ => {}
            }
        }

        if let (Some(fg), Some(bg)) = (fg, bg) {
            let ratio = contrast_ratio(fg, bg);
            if ratio < min_ratio {
                issues.push(ContrastIssue {
                    foreground: fg.to_hex(),
                    background: bg.to_hex(),
                    ratio,
                });
            }
        }
    }

    issues
}

/// First color in a declaration value (`background: #fff url(x.png)` -> white)
fn first_color(value: &str) -> Option<Rgb> {
    Rgb::parse(value).or_else(|| value.split_whitespace().find_map(Rgb::parse))
}
