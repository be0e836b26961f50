// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use zonesync::{
    audit::{reconstruct, reconstruct_for, HistoryRecord, ValueChange, ValueChangeKind},
    config::{Config, StaticSettings},
    constants::TOKIO_WORKER_THREADS,
    engine::{ApplyRequest, ZoneApplier},
    history::JsonlHistoryStore,
    metrics::gather_metrics,
    pdns::PdnsClient,
    records::{RRType, RecordRow, ResourceRecordValue},
};

/// Reconcile zone records against a nameserver control API.
#[derive(Debug, Parser)]
#[command(name = "zonesync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the RRset batches an apply would send
    Plan(ApplyArgs),
    /// Apply desired records to a zone
    Apply(ApplyArgs),
    /// Show the audit history
    History {
        /// Only records of this zone
        #[arg(long)]
        zone: Option<String>,
        /// Only changes to this owner name (requires --type)
        #[arg(long, requires = "rtype")]
        name: Option<String>,
        /// Only changes to this record type (requires --name)
        #[arg(long = "type", id = "rtype", requires = "name")]
        rtype: Option<RRType>,
    },
}

#[derive(Debug, clap::Args)]
struct ApplyArgs {
    /// Zone to modify
    #[arg(long)]
    zone: String,
    /// JSON or YAML file holding the complete desired record list
    #[arg(long)]
    records: PathBuf,
    /// Name recorded in the audit history
    #[arg(long, default_value = "zonesync")]
    actor: String,
    /// Zone serial the records were based on; a mismatch aborts the apply
    #[arg(long)]
    serial: Option<u32>,
    /// Print Prometheus metrics after the command
    #[arg(long)]
    print_metrics: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("zonesync")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn initialize_logging() {
    // Respects RUST_LOG, defaulting to INFO, and RUST_LOG_FORMAT=json|text
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    initialize_logging();
    debug!("Logging initialized with file and line number tracking");

    let config = Config::from_env_or_yaml().context("loading configuration")?;

    match cli.command {
        Command::Plan(args) => {
            let applier = build_applier(&config)?;
            let request = load_request(&args)?;
            let plan = applier.plan(&request).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
            print_metrics_if(args.print_metrics)?;
        }
        Command::Apply(args) => {
            let applier = build_applier(&config)?;
            let request = load_request(&args)?;
            info!(zone = %request.zone, rows = request.records.len(), "Applying desired records");
            let outcome = applier.apply(&request).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            print_metrics_if(args.print_metrics)?;
            if !outcome.is_ok() {
                anyhow::bail!("apply to zone {} failed", request.zone);
            }
        }
        Command::History { zone, name, rtype } => {
            let store = JsonlHistoryStore::new(&config.history_path);
            let records = store.load(zone.as_deref()).await?;
            let filter = name.zip(rtype);
            for record in &records {
                print_history(record, filter.as_ref().map(|(n, t)| (n.as_str(), t)));
            }
        }
    }
    Ok(())
}

fn build_applier(config: &Config) -> Result<ZoneApplier> {
    let client = Arc::new(
        PdnsClient::new(
            &config.api_url,
            &config.server_id,
            &config.api_key,
            config.timeout,
        )
        .context("creating control API client")?,
    );
    let settings = Arc::new(StaticSettings::new(config.clone()));
    let history = Arc::new(JsonlHistoryStore::new(&config.history_path));
    Ok(
        ZoneApplier::new(client.clone(), client, settings.clone(), settings, history)
            .with_reverse_zone(config.reverse_zone.clone()),
    )
}

fn load_request(args: &ApplyArgs) -> Result<ApplyRequest> {
    let records = read_records(&args.records)?;
    Ok(ApplyRequest {
        zone: args.zone.clone(),
        records,
        actor: args.actor.clone(),
        serial: args.serial,
    })
}

fn read_records(path: &Path) -> Result<Vec<RecordRow>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read records file: {}", path.display()))?;
    parse_records(path, &contents)
}

fn parse_records(path: &Path, contents: &str) -> Result<Vec<RecordRow>> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(contents)
            .with_context(|| format!("parse records yaml: {}", path.display()))
    } else {
        serde_json::from_str(contents)
            .with_context(|| format!("parse records json: {}", path.display()))
    }
}

fn print_metrics_if(enabled: bool) -> Result<()> {
    if enabled {
        print!("{}", gather_metrics()?);
    }
    Ok(())
}

fn print_history(record: &HistoryRecord, filter: Option<(&str, &RRType)>) {
    let entries = match filter {
        Some((name, rtype)) => reconstruct_for(record, name, rtype),
        None => reconstruct(record),
    };
    if entries.is_empty() {
        return;
    }
    println!(
        "{} {} {}",
        record.timestamp.to_rfc3339(),
        record.zone,
        record.actor
    );
    for entry in &entries {
        let rtype = entry.rtype().map(ToString::to_string).unwrap_or_default();
        println!("  {} {} {}", entry.change_type.symbol(), entry.name(), rtype);
        for change in &entry.value_changes {
            println!("      {}", format_value_change(change));
        }
    }
}

fn format_value(value: Option<&ResourceRecordValue>) -> String {
    match value {
        Some(v) if v.disabled => format!("{} (disabled)", v.content),
        Some(v) => v.content.clone(),
        None => "-".to_string(),
    }
}

fn format_value_change(change: &ValueChange) -> String {
    let marker = match change.kind {
        ValueChangeKind::Addition => "added",
        ValueChangeKind::Deletion => "deleted",
        ValueChangeKind::Status => "status",
        ValueChangeKind::Unchanged => "unchanged",
    };
    format!(
        "{marker:<9} {} -> {}",
        format_value(change.old.as_ref()),
        format_value(change.new.as_ref())
    )
}
