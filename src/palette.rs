// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Color palettes and frequency tiers
//!
//! [`build_palette`] counts the role-tagged colors of a page into
//! [`ColorEntry`] values. [`group_by_frequency`] ranks entries by count and
//! splits them into up to three tiers:
//!
//! | Tier                | Size with `n` entries (defaults)            |
//! |---------------------|---------------------------------------------|
//! | `Most Used`         | `max(ceil(40% of n), min(3, n))`            |
//! | `Supporting Colors` | `ceil(30% of n)`, capped by what remains    |
//! | `Accent Colors`     | the rest                                    |
//!
//! Empty tiers are omitted.

use crate::analyzers::colors::RoleColor;
use crate::analyzers::contrast::Rgb;
use crate::config::PaletteConfig;
use serde::{Deserialize, Serialize};

pub const MOST_USED: &str = "Most Used";
pub const SUPPORTING_COLORS: &str = "Supporting Colors";
pub const ACCENT_COLORS: &str = "Accent Colors";

/// Usage value for a color seen in more than one role
pub const MIXED_USAGE: &str = "mixed";

/// One distinct color of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEntry {
    /// CSS color name, or the hex when there is none
    pub name: String,
    /// Lower-case `#rrggbb`
    pub hex: String,
    /// `text`, `background`, `border`, `other` or `mixed`
    pub usage: String,
    pub count: u32,
}

impl ColorEntry {
    pub fn new(hex: &str, usage: &str, count: u32) -> Self {
        let hex = hex.to_lowercase();
        let name = Rgb::from_hex(&hex)
            .and_then(|rgb| rgb.name())
            .map(str::to_string)
            .unwrap_or_else(|| hex.clone());
        Self {
            name,
            hex,
            usage: usage.to_string(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorGroup {
    pub name: String,
    pub colors: Vec<ColorEntry>,
}

/// Count colors by hex, keeping first-seen order
pub fn build_palette(colors: &[RoleColor]) -> Vec<ColorEntry> {
    let mut entries: Vec<ColorEntry> = Vec::new();

    for color in colors {
        let hex = color.hex.to_lowercase();
        match entries.iter_mut().find(|e| e.hex == hex) {
            Some(entry) => {
                entry.count = entry.count.saturating_add(1);
                if entry.usage != color.role.as_str() {
                    entry.usage = MIXED_USAGE.to_string();
                }
            }
            None => entries.push(ColorEntry::new(&hex, color.role.as_str(), 1)),
        }
    }

    entries
}

/// Group colors into frequency tiers using the default boundaries
pub fn group_by_frequency(colors: &[ColorEntry]) -> Vec<ColorGroup> {
    group_by_frequency_with(colors, &PaletteConfig::default())
}

pub fn group_by_frequency_with(colors: &[ColorEntry], config: &PaletteConfig) -> Vec<ColorGroup> {
    let mut ranked = colors.to_vec();
    // sort_by is stable: equal counts keep their input order
    ranked.sort_by(|a, b| b.count.cmp(&a.count));

    let n = ranked.len();
    let most_used = percent_ceil(n, config.most_used_percent)
        .max(config.min_most_used.min(n))
        .min(n);
    let supporting = percent_ceil(n, config.supporting_percent).min(n - most_used);

    let accent = ranked.split_off(most_used + supporting);
    let supporting = ranked.split_off(most_used);

    [
        (MOST_USED, ranked),
        (SUPPORTING_COLORS, supporting),
        (ACCENT_COLORS, accent),
    ]
    .into_iter()
    .filter(|(_, colors)| !colors.is_empty())
    .map(|(name, colors)| ColorGroup {
        name: name.to_string(),
        colors,
    })
    .collect()
}

fn percent_ceil(n: usize, percent: u8) -> usize {
    (n * usize::from(percent)).div_ceil(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::colors::ColorRole;

    fn entries(counts: &[u32]) -> Vec<ColorEntry> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| ColorEntry::new(&format!("#0000{:02x}", i), "text", count))
            .collect()
    }

    fn sizes(groups: &[ColorGroup]) -> Vec<(&str, usize)> {
        groups
            .iter()
            .map(|g| (g.name.as_str(), g.colors.len()))
            .collect()
    }

    #[test]
    fn test_five_decreasing_colors() {
        let groups = group_by_frequency(&entries(&[10, 8, 6, 4, 2]));
        assert_eq!(groups[0].name, MOST_USED);
        assert!(groups[0].colors.len() >= 3);
        assert!(groups.iter().any(|g| g.name == SUPPORTING_COLORS));
        assert_eq!(sizes(&groups), vec![(MOST_USED, 3), (SUPPORTING_COLORS, 2)]);
    }

    #[test]
    fn test_ten_colors_fill_every_tier() {
        let groups = group_by_frequency(&entries(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));
        assert_eq!(
            sizes(&groups),
            vec![(MOST_USED, 4), (SUPPORTING_COLORS, 3), (ACCENT_COLORS, 3)]
        );
        assert_eq!(groups[0].colors[0].count, 10);
        assert_eq!(groups[2].colors.last().unwrap().count, 1);
    }

    #[test]
    fn test_small_and_empty_inputs() {
        assert!(group_by_frequency(&[]).is_empty());
        assert_eq!(sizes(&group_by_frequency(&entries(&[3]))), vec![(MOST_USED, 1)]);
        assert_eq!(sizes(&group_by_frequency(&entries(&[3, 1]))), vec![(MOST_USED, 2)]);
        assert_eq!(
            sizes(&group_by_frequency(&entries(&[1, 1, 1, 1]))),
            vec![(MOST_USED, 3), (SUPPORTING_COLORS, 1)]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let colors = entries(&[2, 5, 2, 2]);
        let groups = group_by_frequency(&colors);
        let ranked: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.colors.iter().map(|c| c.hex.as_str()))
            .collect();
        assert_eq!(ranked, vec!["#000001", "#000000", "#000002", "#000003"]);
    }

    #[test]
    fn test_configured_boundaries() {
        let config = PaletteConfig {
            most_used_percent: 20,
            supporting_percent: 20,
            min_most_used: 1,
        };
        let groups = group_by_frequency_with(&entries(&[5, 4, 3, 2, 1]), &config);
        assert_eq!(
            sizes(&groups),
            vec![(MOST_USED, 1), (SUPPORTING_COLORS, 1), (ACCENT_COLORS, 3)]
        );
    }

    #[test]
    fn test_build_palette_counts_and_usage() {
        let role = |hex: &str, role| RoleColor {
            hex: hex.to_string(),
            role,
        };
        let palette = build_palette(&[
            role("#FFFFFF", ColorRole::Background),
            role("#123456", ColorRole::Text),
            role("#ffffff", ColorRole::Background),
            role("#123456", ColorRole::Border),
        ]);

        assert_eq!(palette.len(), 2);
        assert_eq!(palette[0], ColorEntry::new("#ffffff", "background", 2));
        assert_eq!(palette[0].name, "white");
        assert_eq!(palette[1].name, "#123456");
        assert_eq!(palette[1].usage, MIXED_USAGE);
        assert_eq!(palette[1].count, 2);
    }
}
