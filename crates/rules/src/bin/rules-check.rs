//! rules-check: parse every tenant's rules in a configs snapshot.
//!
//! Reads a single view or a `{"configs": {...}}` listing, parses each
//! tenant's rules configuration and prints a summary or JSON report.
//! Exits non-zero when any tenant fails to parse.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use vigil_rules::check::{self, TenantReport, TenantStatus};

// ── CLI ─────────────────────────────────────────────────────────────

/// Validate tenant rule configurations.
#[derive(Parser, Debug)]
#[command(name = "rules-check", version, about)]
struct Cli {
    /// Configs snapshot to check. Defaults to `VIGIL_CONFIGS_FILE`.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    output: OutputFormat,

    /// Also parse configurations that are marked deleted.
    #[arg(long)]
    include_deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
}

// ── Output ──────────────────────────────────────────────────────────

fn print_summary(reports: &[TenantReport]) {
    for report in reports {
        let head = format!("{} (id {}, {})", report.tenant, report.id, report.format_version);
        match &report.status {
            TenantStatus::Deleted => println!("{}: deleted, skipped", head),
            TenantStatus::NoRules => println!("{}: no rules configuration", head),
            TenantStatus::Parsed { groups } => {
                println!("{}: ok, {} group(s)", head, groups.len());
                for (key, summary) in groups {
                    println!(
                        "  {}: {} alerting, {} recording",
                        key, summary.alerting, summary.recording
                    );
                }
            }
            TenantStatus::Failed { error } => println!("{}: FAILED: {}", head, error),
        }
    }
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    vigil_core::config::load_dotenv();
    let config = vigil_core::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    config.log_summary();

    let input = cli
        .input
        .or_else(|| config.check.configs_file.clone())
        .context("no input: pass --input or set VIGIL_CONFIGS_FILE")?;

    let views = check::load_views(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let skip_deleted = config.check.skip_deleted && !cli.include_deleted;
    let reports = check::check_all(&views, skip_deleted);

    let failed = reports.iter().filter(|r| r.is_failure()).count();
    for report in reports.iter().filter(|r| r.is_failure()) {
        warn!(tenant = %report.tenant, id = %report.id, "rules config failed to parse");
    }

    match cli.output {
        OutputFormat::Summary => print_summary(&reports),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    info!(tenants = reports.len(), failed, "rules check complete");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
