// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! pagebot CLI - Web Page Analysis

use clap::{Parser, Subcommand, ValueEnum};
use pagebot::analyzers::colors::{ColorExtractor, InlineStyleExtractor};
use pagebot::config::{self, Config};
use pagebot::pagespeed::{Fetch, OfflineFetcher, ReqwestFetcher, StaticFetcher};
use pagebot::palette::{build_palette, group_by_frequency_with};
use pagebot::{
    analyses_to_csv, analyses_to_json, create_scan, dash_if_empty, parse_analyses_json,
    run_scan, Analysis, PageInput, Result, ScanOutcome, TaskStatus,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// pagebot: Web Page Analysis
///
/// Scores a page for design, accessibility, SEO, security headers and
/// performance, and exports the results as CSV or JSON.
#[derive(Parser)]
#[command(name = "pagebot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one page
    Analyze {
        /// Page URL
        #[arg(long)]
        url: String,

        /// Saved page markup
        #[arg(long)]
        html: Option<PathBuf>,

        /// Response headers as a JSON object
        #[arg(long)]
        headers: Option<PathBuf>,

        /// Saved PageSpeed Insights response
        #[arg(long, conflicts_with = "live")]
        psi: Option<PathBuf>,

        /// Query the PageSpeed Insights API
        #[arg(long)]
        live: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,

        /// Write the record as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert saved records to CSV or JSON
    Export {
        /// JSON array of analysis records
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the color frequency tiers of a page
    Palette {
        /// Saved page markup
        #[arg(long)]
        html: PathBuf,
    },

    /// Initialize configuration file
    Init {
        /// Output format (yaml, toml)
        #[arg(long, default_value = "yaml")]
        format: String,
    },

    /// Show current configuration
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);

    let config = match config::load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Init { format } => handle_init(&config_path, &format),
        Command::Show => handle_show(&config),
        Command::Analyze {
            url,
            html,
            headers,
            psi,
            live,
            format,
            output,
        } => {
            let request = AnalyzeRequest {
                url,
                html,
                headers,
                psi,
                live,
                format,
                output,
            };
            handle_analyze(request, &config).await
        }
        Command::Export {
            input,
            format,
            output,
        } => handle_export(&input, format, output.as_deref()).await,
        Command::Palette { html } => handle_palette(&html, &config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn handle_init(config_path: &Path, format: &str) -> Result<()> {
    let path = if format == "toml" {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    config::write_default_config(&path)?;
    println!("Created configuration file: {}", path.display());
    Ok(())
}

fn handle_show(config: &Config) -> Result<()> {
    println!("\nCurrent Configuration:");
    println!("======================\n");

    println!("PageSpeed:");
    println!("  Endpoint: {}", config.pagespeed.endpoint);
    println!("  Strategy: {}", config.pagespeed.strategy.as_str());
    println!("  Categories: {}", config.pagespeed.categories.join(", "));
    println!(
        "  API key: {}",
        if config.pagespeed.resolved_api_key().is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!("  Timeout: {}s", config.pagespeed.timeout_secs);
    println!();

    println!("Contrast:");
    println!("  Minimum ratio: {}", config.contrast.min_ratio);
    println!();

    println!("Palette:");
    println!("  Most used: {}%", config.palette.most_used_percent);
    println!("  Supporting: {}%", config.palette.supporting_percent);
    println!("  Most used floor: {}", config.palette.min_most_used);
    println!();

    println!("Compliance:");
    println!(
        "  Fail below: performance {}, security {}",
        config.compliance.fail_below_performance, config.compliance.fail_below_security
    );
    println!(
        "  Pass at: performance {}, seo {}, security {}",
        config.compliance.pass_performance,
        config.compliance.pass_seo,
        config.compliance.pass_security
    );

    Ok(())
}

struct AnalyzeRequest {
    url: String,
    html: Option<PathBuf>,
    headers: Option<PathBuf>,
    psi: Option<PathBuf>,
    live: bool,
    format: OutputFormat,
    output: Option<PathBuf>,
}

async fn handle_analyze(request: AnalyzeRequest, config: &Config) -> Result<()> {
    let mut page = PageInput::default();
    if let Some(path) = &request.html {
        page.html = tokio::fs::read_to_string(path).await?;
    }
    if let Some(path) = &request.headers {
        let raw = tokio::fs::read_to_string(path).await?;
        let headers: BTreeMap<String, String> = serde_json::from_str(&raw)?;
        page = page.with_headers(headers);
    }

    let fetcher: Box<dyn Fetch> = match (&request.psi, request.live) {
        (Some(path), _) => Box::new(StaticFetcher::ok(tokio::fs::read_to_string(path).await?)),
        (None, true) => Box::new(ReqwestFetcher::new(&config.pagespeed)?),
        (None, false) => Box::new(OfflineFetcher),
    };

    let outcome = run_scan(create_scan(&request.url), &page, fetcher.as_ref(), config).await;

    if let Some(path) = &request.output {
        let json = analyses_to_json(std::slice::from_ref(&outcome.analysis))?;
        tokio::fs::write(path, json).await?;
        info!(path = %path.display(), "Analysis written");
    }

    match request.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Pretty => print_summary(&outcome),
    }

    Ok(())
}

async fn handle_export(input: &Path, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let raw = tokio::fs::read_to_string(input).await?;
    let records = parse_analyses_json(&raw)?;

    let rendered = match format {
        ExportFormat::Csv => analyses_to_csv(&records),
        ExportFormat::Json => analyses_to_json(&records)?,
    };

    match output {
        Some(path) => {
            tokio::fs::write(path, rendered).await?;
            info!(records = records.len(), path = %path.display(), "Export written");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

async fn handle_palette(html: &Path, config: &Config) -> Result<()> {
    let markup = tokio::fs::read_to_string(html).await?;
    let palette = build_palette(&InlineStyleExtractor.role_colors(&markup));

    if palette.is_empty() {
        println!("No inline colors found in {}", html.display());
        return Ok(());
    }

    for group in group_by_frequency_with(&palette, &config.palette) {
        println!("{}:", group.name);
        for color in &group.colors {
            println!(
                "  {:<10} {:<9} {:<10} x{}",
                color.name, color.hex, color.usage, color.count
            );
        }
        println!();
    }
    Ok(())
}

fn print_summary(outcome: &ScanOutcome) {
    let analysis: &Analysis = &outcome.analysis;
    let headers = &analysis.security_headers;
    let vitals = &analysis.core_web_vitals;

    println!();
    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║                    PAGEBOT ANALYSIS SUMMARY                    ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!();
    println!("URL:          {}", analysis.url);
    println!("Title:        {}", dash_if_empty(Some(analysis.data.seo.title.as_str())));
    println!("Compliance:   {}", analysis.compliance_status);
    println!();

    println!("Scores:");
    println!("  Performance:  {:.2}", analysis.performance_score);
    println!("  SEO:          {:.2}", analysis.seo_score);
    println!("  Readability:  {:.2}", analysis.readability_score);
    println!("  Security:     {:.2}", analysis.data.technical.security_score);
    println!();

    println!("Core Web Vitals:");
    println!("  LCP: {:.2}s  FID: {:.0}ms  CLS: {:.3}", vitals.lcp, vitals.fid, vitals.cls);
    println!();

    println!("Security headers:");
    println!("  CSP:             {}", dash_if_empty(Some(headers.csp.as_str())));
    println!("  HSTS:            {}", dash_if_empty(Some(headers.hsts.as_str())));
    println!("  X-Frame-Options: {}", dash_if_empty(Some(headers.xfo.as_str())));
    println!("  X-Content-Type:  {}", dash_if_empty(Some(headers.xcto.as_str())));
    println!("  Referrer-Policy: {}", dash_if_empty(Some(headers.referrer.as_str())));
    println!();

    let ui = &analysis.data.ui;
    let fonts = ui.fonts.join(", ");
    println!("Design:");
    println!("  Colors: {}", ui.colors.len());
    println!("  Fonts:  {}", dash_if_empty(Some(fonts.as_str())));
    println!(
        "  Mobile responsive: {}",
        if analysis.data.performance.mobile_responsive {
            "yes"
        } else {
            "no"
        }
    );
    for issue in &ui.contrast_issues {
        println!(
            "  ⚠️  Low contrast {} on {} ({:.2}:1)",
            issue.foreground, issue.background, issue.ratio
        );
    }
    for violation in &analysis.data.accessibility.violations {
        println!(
            "  ❌ [{}] {} ({})",
            violation.id, violation.description, violation.impact
        );
    }
    println!();

    for task in &outcome.scan.tasks {
        let icon = match task.status {
            TaskStatus::Completed => "✅",
            TaskStatus::Failed => "❌",
            TaskStatus::Queued | TaskStatus::Running => "⏳",
        };
        match &task.error {
            Some(error) => println!("{} {:<7} {}", icon, task.kind.as_str(), error),
            None => println!("{} {}", icon, task.kind),
        }
    }
    println!();
}
