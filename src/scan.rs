// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Scans and their tasks
//!
//! A scan covers one URL and always owns four tasks, one per [`TaskKind`].
//! [`run_scan`] executes them in order against an already-retrieved page,
//! merging each task's output into a fresh [`Analysis`] record.

use crate::analysis::{create_default_analysis, evaluate_compliance, Analysis, AnalysisUpdate};
use crate::analyzers::{page_analyzers, PageInput};
use crate::config::Config;
use crate::normalize::normalize_url;
use crate::pagespeed::{fetch_psi_data, Fetch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// What a task analyzes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Security headers
    Tech,
    /// Palette, fonts, contrast and markup accessibility
    Colors,
    /// Meta tags and viewport
    Seo,
    /// PageSpeed report
    Perf,
}

impl TaskKind {
    /// Every kind, in execution order
    pub const ALL: [TaskKind; 4] = [TaskKind::Tech, TaskKind::Colors, TaskKind::Seo, TaskKind::Perf];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Tech => "tech",
            TaskKind::Colors => "colors",
            TaskKind::Seo => "seo",
            TaskKind::Perf => "perf",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTask {
    pub id: Uuid,
    pub scan_id: Uuid,
    pub kind: TaskKind,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScanTask {
    pub fn new(scan_id: Uuid, kind: TaskKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            scan_id,
            kind,
            status: TaskStatus::Queued,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark as running
    pub fn start(&mut self) {
        self.status = TaskStatus::Running;
        self.updated_at = Utc::now();
    }

    /// Mark as completed
    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
        self.updated_at = Utc::now();
    }

    /// Mark as failed with an error message
    pub fn fail(&mut self, error: &str) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.to_string());
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub id: Uuid,
    /// Normalized URL
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub tasks: Vec<ScanTask>,
}

impl Scan {
    pub fn task(&self, kind: TaskKind) -> Option<&ScanTask> {
        self.tasks.iter().find(|t| t.kind == kind)
    }

    pub fn all_completed(&self) -> bool {
        self.tasks.iter().all(|t| t.status == TaskStatus::Completed)
    }

    pub fn failed_tasks(&self) -> impl Iterator<Item = &ScanTask> {
        self.tasks.iter().filter(|t| t.status == TaskStatus::Failed)
    }
}

/// A new scan for `url` with one queued task per [`TaskKind`]
pub fn create_scan(url: &str) -> Scan {
    let id = Uuid::new_v4();
    Scan {
        id,
        url: normalize_url(url),
        created_at: Utc::now(),
        tasks: TaskKind::ALL
            .iter()
            .map(|&kind| ScanTask::new(id, kind))
            .collect(),
    }
}

/// A finished scan and the record it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub scan: Scan,
    pub analysis: Analysis,
}

/// Run every task of `scan` in order and build its analysis record
pub async fn run_scan(
    mut scan: Scan,
    page: &PageInput,
    fetcher: &dyn Fetch,
    config: &Config,
) -> ScanOutcome {
    let analyzers = page_analyzers();
    let mut analysis = create_default_analysis(&scan.url);

    info!(scan = %scan.id, url = %scan.url, "Starting scan");

    for task in scan.tasks.iter_mut() {
        task.start();

        let result = match task.kind {
            TaskKind::Perf => fetch_psi_data(&scan.url, fetcher, &config.pagespeed)
                .await
                .map(|report| report.into_update())
                .map_err(|e| e.to_string()),
            kind => Ok(analyzers
                .iter()
                .filter(|a| a.kind() == kind)
                .fold(AnalysisUpdate::new(), |acc, a| {
                    acc.combine(a.analyze(page, config))
                })),
        };

        match result {
            Ok(update) => {
                analysis = analysis.merge(update);
                task.complete();
            }
            Err(error) => {
                warn!(task = %task.kind, %error, "Task failed");
                task.fail(&error);
            }
        }
    }

    if scan.all_completed() {
        let status = evaluate_compliance(&analysis, &config.compliance);
        analysis = analysis.merge(AnalysisUpdate::new().with_compliance_status(status));
    }

    info!(
        scan = %scan.id,
        compliance = %analysis.compliance_status,
        failed = scan.failed_tasks().count(),
        "Scan finished"
    );

    ScanOutcome { scan, analysis }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ComplianceStatus;
    use crate::pagespeed::{FetchResponse, OfflineFetcher, StaticFetcher};

    const PSI: &str = r#"{"lighthouseResult": {
        "categories": {"performance": {"score": 0.95}, "accessibility": {"score": 0.9}, "seo": {"score": 0.97}},
        "audits": {
            "largest-contentful-paint": {"numericValue": 1200},
            "first-input-delay": {"numericValue": 8},
            "cumulative-layout-shift": {"numericValue": 0.02}
        }}}"#;

    fn page() -> PageInput {
        let mut page = PageInput::new(
            r#"<html lang="en"><head><title>Acme</title>
            <meta name="viewport" content="width=device-width"></head>
            <body><p style="color:#000000;background-color:#ffffff;font-family:Inter">x</p></body></html>"#,
        );
        for (name, value) in [
            ("Content-Security-Policy", "default-src 'self'"),
            ("Strict-Transport-Security", "max-age=63072000"),
            ("X-Frame-Options", "DENY"),
            ("X-Content-Type-Options", "nosniff"),
            ("Referrer-Policy", "no-referrer"),
        ] {
            page.headers.insert(name.to_string(), value.to_string());
        }
        page
    }

    #[test]
    fn test_create_scan_has_four_queued_tasks() {
        let scan = create_scan("example.com");
        assert_eq!(scan.url, "https://example.com");

        let kinds: Vec<TaskKind> = scan.tasks.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, TaskKind::ALL.to_vec());
        assert!(scan
            .tasks
            .iter()
            .all(|t| t.status == TaskStatus::Queued && t.scan_id == scan.id));
    }

    #[test]
    fn test_task_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TaskKind::Perf).unwrap(), "\"perf\"");
        assert_eq!(TaskKind::Colors.to_string(), "colors");
    }

    #[tokio::test]
    async fn test_run_scan_completes_all_tasks() {
        let outcome = run_scan(
            create_scan("example.com"),
            &page(),
            &StaticFetcher::ok(PSI),
            &Config::default(),
        )
        .await;

        assert!(outcome.scan.all_completed());
        let analysis = outcome.analysis;
        assert_eq!(analysis.performance_score, 0.95);
        assert_eq!(analysis.core_web_vitals.lcp, 1.2);
        assert_eq!(analysis.data.technical.security_score, 1.0);
        assert_eq!(analysis.data.seo.title, "Acme");
        assert!(analysis.data.performance.mobile_responsive);
        assert_eq!(analysis.data.ui.fonts, vec!["Inter"]);
        assert_eq!(analysis.compliance_status, ComplianceStatus::Pass);
    }

    #[tokio::test]
    async fn test_failed_fetch_only_fails_perf() {
        let outcome = run_scan(
            create_scan("example.com"),
            &page(),
            &OfflineFetcher,
            &Config::default(),
        )
        .await;

        let failed: Vec<TaskKind> = outcome.scan.failed_tasks().map(|t| t.kind).collect();
        assert_eq!(failed, vec![TaskKind::Perf]);
        assert!(outcome.scan.task(TaskKind::Perf).unwrap().error.is_some());
        assert_eq!(
            outcome.scan.task(TaskKind::Seo).unwrap().status,
            TaskStatus::Completed
        );

        let analysis = outcome.analysis;
        assert_eq!(analysis.performance_score, 0.0);
        assert_eq!(analysis.data.seo.title, "Acme");
        assert_eq!(analysis.security_headers.xfo, "DENY");
        assert_eq!(analysis.compliance_status, ComplianceStatus::Warn);
    }

    #[tokio::test]
    async fn test_error_status_fails_perf() {
        let fetcher = StaticFetcher::new(FetchResponse::new(429, "quota"));
        let outcome = run_scan(create_scan("a.io"), &page(), &fetcher, &Config::default()).await;
        let perf = outcome.scan.task(TaskKind::Perf).unwrap();
        assert_eq!(perf.status, TaskStatus::Failed);
        assert!(perf.error.as_deref().unwrap().contains("429"));
    }
}
