//! assignmap - which Intune configuration is assigned to which group
//!
//! For every tracked group this tool walks the Intune configuration
//! categories (settings catalog, device configurations, administrative
//! templates, compliance, apps, scripts, remediations, Autopilot, enrollment,
//! intents) and records, per category, every object that includes or
//! excludes the group:
//! - named group assignments and exclusions
//! - the built-in "All users" and "All devices" targets

mod api;
mod auth;
mod config;
mod engine;
mod error;
mod export;
mod models;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::GraphClient;
use crate::auth::{AzureAuthenticator, StaticToken, TokenProvider};
use crate::config::{Config, DEFAULT_API_VERSION, DEFAULT_CONCURRENCY, DEFAULT_GRAPH_URL};
use crate::engine::{track_groups, CategoryProcessor, RunSummary, Runner};
use crate::export::{export_report, ExportFormat};
use crate::models::{CategoryTable, Report};

/// assignmap - Intune assignment report per group
#[derive(Parser, Debug)]
#[command(name = "assignmap")]
#[command(about = "Report which Intune policies, apps and scripts target (or exclude) a set of groups")]
#[command(version)]
struct Args {
    /// Group display name to report on; repeatable. "All users" and "All devices" are built in
    #[arg(short, long = "group", value_name = "NAME")]
    groups: Vec<String>,

    /// Only process this category key; repeatable (see --list-categories)
    #[arg(short, long = "category", value_name = "KEY")]
    categories: Vec<String>,

    /// Output file (defaults to assignments-<timestamp>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: csv or json (defaults to the output file extension)
    #[arg(short, long)]
    format: Option<String>,

    /// Maximum concurrent assignment requests per category
    #[arg(long)]
    concurrency: Option<usize>,

    /// Abort the run after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Microsoft Graph root URL (e.g., https://graph.microsoft.com)
    #[arg(long, env = "GRAPH_URL")]
    graph_url: Option<String>,

    /// Graph API version
    #[arg(long)]
    api_version: Option<String>,

    /// Bearer token to use instead of the Azure CLI login
    #[arg(long, env = "GRAPH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Config file (defaults to <config dir>/assignmap/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the category table and exit
    #[arg(long)]
    list_categories: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG overrides, e.g. RUST_LOG=assignmap=debug
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("assignmap=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    // Everything that can make the run meaningless is checked before any request
    let selected = if args.categories.is_empty() {
        config.categories.clone()
    } else {
        args.categories.clone()
    };
    let table = CategoryTable::builtin()
        .select(&selected)
        .context("Invalid category selection")?;
    table.validate().context("Invalid category table")?;

    if args.list_categories {
        print_categories(&table);
        return Ok(());
    }

    let names = config.merge_groups(&args.groups);
    if names.is_empty() {
        bail!("No groups given; pass --group <NAME> or set `groups` in the config file");
    }

    let concurrency = args
        .concurrency
        .or(config.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);
    let format = match args.format.as_deref().or(config.format.as_deref()) {
        Some(format) => Some(ExportFormat::parse(format)?),
        None => None,
    };
    let output = args
        .output
        .clone()
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| default_output(format.unwrap_or(ExportFormat::Csv)));
    let format = format.unwrap_or_else(|| ExportFormat::from_path(&output));
    let timeout = args.timeout.or(config.timeout_secs).map(Duration::from_secs);

    let graph_url = args
        .graph_url
        .clone()
        .or_else(|| config.graph_url.clone())
        .unwrap_or_else(|| DEFAULT_GRAPH_URL.to_string());
    let api_version = args
        .api_version
        .clone()
        .or_else(|| config.api_version.clone())
        .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

    // Set up authentication
    let tokens: Arc<dyn TokenProvider> = match args.token.clone() {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(
            AzureAuthenticator::new(&graph_url).context("Failed to create Azure authenticator")?,
        ),
    };

    // Create API client
    let mut client = GraphClient::new(tokens, &graph_url, &api_version)
        .context("Failed to create HTTP client")?;
    if let Some(max_retries) = config.max_retries {
        client = client.with_max_retries(max_retries);
    }
    let client = Arc::new(client);
    let processor = CategoryProcessor::new(client.clone(), concurrency)?;

    eprintln!("Connecting to {}...", client.base_url());
    let (mut groups, unresolved) = track_groups(client.as_ref(), &names)
        .await
        .context("Failed to look up groups. Make sure you're logged in with 'az login'")?;
    if groups.is_empty() {
        bail!("None of the groups could be found: {}", unresolved.join(", "));
    }

    let runner = Runner::new(processor, table.clone());
    let summary = runner.run(&mut groups, cancellation(timeout)).await;

    // The run installed a SIGINT listener, so the default handler no longer
    // ends the process while the report is written
    let _exit_on_interrupt = on_interrupt(interrupted(), || std::process::exit(130));

    let report = Report::assemble(&groups, &table.keys());
    let written = export_report(&report, format, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_summary(&summary, &unresolved);
    eprintln!("Report written to {}", written);

    Ok(())
}

/// Completes on Ctrl-C or when the optional timeout elapses
async fn cancellation(timeout: Option<Duration>) {
    let deadline = async {
        match timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = interrupted() => tracing::warn!("Interrupted, stopping"),
        _ = deadline => tracing::warn!("Run timed out, stopping"),
    }
}

/// Completes on Ctrl-C; never completes if the signal cannot be listened for
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run `action` in the background once `interrupt` completes
fn on_interrupt<F, A>(interrupt: F, action: A) -> tokio::task::JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
    A: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        interrupt.await;
        action();
    })
}

fn default_output(format: ExportFormat) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    let extension = match format {
        ExportFormat::Csv => "csv",
        ExportFormat::Json => "json",
    };
    PathBuf::from(format!("assignments-{}.{}", stamp, extension))
}

fn print_categories(table: &CategoryTable) {
    for category in table.categories() {
        println!(
            "{:<26} {}/{} ({})",
            category.key, category.service_path, category.resource_type, category.relation
        );
    }
}

fn print_summary(summary: &RunSummary, unresolved: &[String]) {
    if summary.is_clean() && unresolved.is_empty() {
        eprintln!("Processed all {} categories", summary.processed_categories.len());
        return;
    }

    eprintln!(
        "Processed {} categories, skipped {}",
        summary.processed_categories.len(),
        summary.skipped_categories.len()
    );

    for name in unresolved {
        eprintln!("  group not found: {}", name);
    }
    for skipped in &summary.skipped_categories {
        eprintln!("  skipped category {}: {}", skipped.category, skipped.reason);
    }
    for skipped in &summary.skipped_objects {
        eprintln!(
            "  skipped {} '{}' ({}): {}",
            skipped.category, skipped.display_name, skipped.object_id, skipped.reason
        );
    }
    if summary.malformed_records > 0 {
        eprintln!("  {} malformed assignment records ignored", summary.malformed_records);
    }
    if summary.cancelled {
        eprintln!("Run was cancelled; unfinished categories are empty in the report");
    }
}
