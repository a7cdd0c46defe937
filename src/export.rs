// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! CSV and JSON export of analysis records

use crate::analysis::Analysis;
use crate::error::{PagebotError, Result};
use tracing::debug;

/// CSV columns, in output order
pub const CSV_COLUMNS: [&str; 19] = [
    "url",
    "lcp",
    "fid",
    "cls",
    "performanceScore",
    "seoScore",
    "readabilityScore",
    "csp",
    "hsts",
    "xfo",
    "xcto",
    "referrer",
    "complianceStatus",
    "mobileResponsive",
    "securityScore",
    "contrastIssues",
    "accessibilityViolations",
    "colors",
    "fonts",
];

/// Header row plus one row per record, each terminated by `\n`
pub fn analyses_to_csv(records: &[Analysis]) -> String {
    let mut out = String::new();
    write_row(&mut out, CSV_COLUMNS.iter().copied());
    for record in records {
        let row = csv_row(record);
        write_row(&mut out, row.iter().map(String::as_str));
    }
    debug!(records = records.len(), "CSV export built");
    out
}

/// Pretty-printed JSON array. Records that would not parse back are
/// rejected up front.
pub fn analyses_to_json(records: &[Analysis]) -> Result<String> {
    for record in records {
        record.validate()?;
    }
    serde_json::to_string_pretty(records).map_err(|e| PagebotError::Codec(e.to_string()))
}

/// Parse a JSON array of records. Any malformed or out-of-range record
/// fails the whole parse.
pub fn parse_analyses_json(json: &str) -> Result<Vec<Analysis>> {
    let records: Vec<Analysis> =
        serde_json::from_str(json).map_err(|e| PagebotError::Codec(e.to_string()))?;
    for record in &records {
        record.validate()?;
    }
    debug!(records = records.len(), "JSON import parsed");
    Ok(records)
}

fn csv_row(record: &Analysis) -> Vec<String> {
    let vitals = &record.core_web_vitals;
    let headers = &record.security_headers;
    let data = &record.data;

    vec![
        record.url.clone(),
        vitals.lcp.to_string(),
        vitals.fid.to_string(),
        vitals.cls.to_string(),
        record.performance_score.to_string(),
        record.seo_score.to_string(),
        record.readability_score.to_string(),
        headers.csp.clone(),
        headers.hsts.clone(),
        headers.xfo.clone(),
        headers.xcto.clone(),
        headers.referrer.clone(),
        record.compliance_status.to_string(),
        data.performance.mobile_responsive.to_string(),
        data.technical.security_score.to_string(),
        data.ui.contrast_issues.len().to_string(),
        data.accessibility.violations.len().to_string(),
        data.ui.colors.len().to_string(),
        data.ui.fonts.join(", "),
    ]
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<'a>(out: &mut String, row: impl Iterator<Item = &'a str>) {
    for (i, cell) in row.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{create_default_analysis, AnalysisUpdate, CoreWebVitals, UiSection};
    use crate::analyzers::security::SecurityHeaders;

    fn sample_records() -> Vec<Analysis> {
        let first = create_default_analysis("example.com").merge(
            AnalysisUpdate::new()
                .with_scores(0.1 + 0.2, 0.93, 0.88)
                .with_core_web_vitals(CoreWebVitals {
                    lcp: 1.5,
                    fid: 10.0,
                    cls: 0.01,
                })
                .with_security_headers(SecurityHeaders {
                    csp: "default-src 'self', https://cdn.example".to_string(),
                    ..Default::default()
                })
                .with_ui(UiSection {
                    fonts: vec!["Inter".to_string(), "Georgia".to_string()],
                    ..Default::default()
                }),
        );
        let second = create_default_analysis("http://second.test/path?q=\"x\"");
        vec![first, second]
    }

    #[test]
    fn test_csv_has_header_and_one_row_per_record() {
        let csv = analyses_to_csv(&sample_records());
        assert!(csv.ends_with('\n'));
        assert_eq!(csv.lines().count(), 3);
        assert_eq!(csv.lines().next().unwrap(), CSV_COLUMNS.join(","));
    }

    #[test]
    fn test_csv_quotes_fields() {
        let csv = analyses_to_csv(&sample_records());
        let first = csv.lines().nth(1).unwrap();
        assert!(first.starts_with("https://example.com,1.5,10,0.01,"));
        assert!(first.contains("\"default-src 'self', https://cdn.example\""));
        assert!(first.ends_with(",0,0,0,\"Inter, Georgia\""));

        let second = csv.lines().nth(2).unwrap();
        assert!(second.starts_with("\"http://second.test/path?q=\"\"x\"\"\","));
        assert!(second.contains(",warn,false,0,"));
    }

    #[test]
    fn test_csv_of_nothing_is_header_only() {
        assert_eq!(analyses_to_csv(&[]).lines().count(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let records = sample_records();
        let json = analyses_to_json(&records).unwrap();
        assert!(json.contains("\n  {"));
        assert_eq!(parse_analyses_json(&json).unwrap(), records);
    }

    #[test]
    fn test_json_keys_follow_schema_order() {
        let json = analyses_to_json(&sample_records()[..1]).unwrap();
        let url = json.find("\"url\"").unwrap();
        let vitals = json.find("\"coreWebVitals\"").unwrap();
        let status = json.find("\"complianceStatus\"").unwrap();
        let data = json.find("\"data\"").unwrap();
        assert!(url < vitals && vitals < status && status < data);
    }

    #[test]
    fn test_bad_json_is_codec_error() {
        for input in ["", "{}", "[1, 2]", r#"[{"url": "x"}]"#, "not json"] {
            assert!(
                matches!(parse_analyses_json(input), Err(PagebotError::Codec(_))),
                "{:?}",
                input
            );
        }
    }

    #[test]
    fn test_out_of_range_score_is_rejected() {
        let json = analyses_to_json(&sample_records())
            .unwrap()
            .replacen("\"seoScore\": 0.93", "\"seoScore\": 1.93", 1);
        assert!(matches!(parse_analyses_json(&json), Err(PagebotError::Codec(_))));
    }

    #[test]
    fn test_out_of_range_record_is_not_exported() {
        let mut record = create_default_analysis("a.io");
        record.performance_score = 1.5;
        assert!(matches!(
            analyses_to_json(&[record]),
            Err(PagebotError::Codec(_))
        ));
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(parse_analyses_json("[]").unwrap(), Vec::<Analysis>::new());
        assert_eq!(analyses_to_json(&[]).unwrap(), "[]");
    }
}
