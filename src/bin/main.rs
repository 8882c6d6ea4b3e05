// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! CLI tool for the App Service APM configurator (apm-setup)

use std::path::{Path, PathBuf};

use apmlib::apply::{ApplyStep, StepStatus};
use apmlib::monitoring::{inspect_service, refresh_status};
use apmlib::reconcile::FormField;
use apmlib::settings::ChangeKind;
use apmlib::{
    build_desired_settings, classify, diff, extract_form_values, plan_steps, validate,
    ApmError, ApplyConfig, Classification, LogLevel, ManagementApi, MonitoringSetup, Orchestrator, SnapshotApi,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::json;

#[derive(Parser)]
#[command(name = "apm-setup")]
#[command(about = "Enable Datadog APM on an App Service: classify, detect, plan and apply", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the service platform and runtime
    Classify {
        /// Service snapshot (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Detect an existing Datadog monitoring setup
    Analyze {
        #[arg(short, long)]
        snapshot: PathBuf,
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Recover form values from the current settings
    Prefill {
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Print the API key unredacted
        #[arg(long)]
        show_secrets: bool,
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Validate a configuration and preview the changes and steps
    Plan {
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Apply configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Apply a configuration to the service
    Apply {
        #[arg(short, long)]
        snapshot: PathBuf,
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Refresh the Datadog sidecar status
    Status {
        #[arg(short, long)]
        snapshot: PathBuf,
    },
    /// Print a sample configuration file
    SampleConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("{} {}", "[ERROR]".red().bold(), e);
        if let ApmError::Validation(v) = &e {
            for issue in v.issues() {
                eprintln!("  {} {}", "-".red(), issue);
            }
        }
        std::process::exit(1);
    }
}

fn init_logging(level: Option<LogLevel>) {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = level {
        if std::env::var_os("RUST_LOG").is_none() {
            builder.filter_level(level.to_level_filter());
        }
    }
    builder.init();
}

fn load_config(path: &Path) -> apmlib::Result<ApplyConfig> {
    let mut cfg = ApplyConfig::from_toml_file(&path.to_string_lossy())?;
    cfg.apply_env_overrides();
    Ok(cfg)
}

/// Service id for a snapshot file: its file stem.
fn service_id(snapshot: &Path) -> String {
    snapshot
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "service".to_string())
}

async fn run(command: Commands) -> apmlib::Result<()> {
    match command {
        Commands::SampleConfig => {
            init_logging(None);
            print!("{}", ApplyConfig::sample_toml());
            Ok(())
        }
        Commands::Classify { snapshot, format } => {
            init_logging(None);
            let api = SnapshotApi::open(&snapshot)?;
            let c = classify_service(&api, &service_id(&snapshot)).await?;
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&c)?),
                Format::Text => print_classification(&c),
            }
            Ok(())
        }
        Commands::Analyze { snapshot, format } => {
            init_logging(None);
            let api = SnapshotApi::open(&snapshot)?;
            let setup = inspect_service(&api, &service_id(&snapshot)).await?.setup;
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&setup)?),
                Format::Text => print_setup(&setup),
            }
            Ok(())
        }
        Commands::Prefill { snapshot, show_secrets, format } => {
            init_logging(None);
            let api = SnapshotApi::open(&snapshot)?;
            let current = api.fetch_current_settings(&service_id(&snapshot)).await?;
            handle_prefill(&current, show_secrets, format)
        }
        Commands::Plan { snapshot, config, format } => {
            let cfg = load_config(&config)?;
            init_logging(Some(cfg.log_level));
            let api = SnapshotApi::open(&snapshot)?;
            handle_plan(&api, &service_id(&snapshot), &cfg, format).await
        }
        Commands::Apply { snapshot, config } => {
            let cfg = load_config(&config)?;
            init_logging(Some(cfg.log_level));
            let api = SnapshotApi::open(&snapshot)?;
            handle_apply(&api, &service_id(&snapshot), &cfg).await
        }
        Commands::Status { snapshot } => {
            init_logging(None);
            let api = SnapshotApi::open(&snapshot)?;
            let id = service_id(&snapshot);
            let mut setup = inspect_service(&api, &id).await?.setup;
            if setup.container_name().is_none() {
                println!("{} no Datadog sidecar on this service ({})", "[INFO]".cyan(), setup.mechanism);
                return Ok(());
            }
            let outcome = refresh_status(&api, &id, &mut setup).await;
            print_setup(&setup);
            if let apmlib::monitoring::StatusOutcome::FetchFailed(reason) = outcome {
                eprintln!("  {} {}", "Reason:".white().bold(), reason.yellow());
            }
            Ok(())
        }
    }
}

async fn classify_service(api: &dyn ManagementApi, id: &str) -> apmlib::Result<Classification> {
    let meta = api.fetch_service_metadata(id).await?;
    let current = api.fetch_current_settings(id).await?;
    Ok(classify(&meta, &current))
}

fn print_classification(c: &Classification) {
    println!("{}", "═══ Service Runtime ═══".cyan().bold());
    println!("  {} {}", "Platform:".white().bold(), c.platform.to_string().green());
    println!("  {} {}", "Runtime:".white().bold(), c.runtime.label().green());
    println!("  {} {}", "Raw tag:".white().bold(), c.runtime.raw_runtime);
}

fn print_setup(setup: &MonitoringSetup) {
    println!("{}", "═══ Datadog Monitoring ═══".cyan().bold());
    let mechanism = setup.mechanism.to_string();
    println!(
        "  {} {}",
        "Mechanism:".white().bold(),
        if setup.present { mechanism.green() } else { mechanism.yellow() }
    );
    for (key, value) in &setup.details {
        let text = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
        println!("  {} {}", format!("{}:", key).white().bold(), text);
    }
}

fn handle_prefill(current: &apmlib::SettingsMap, show_secrets: bool, format: Format) -> apmlib::Result<()> {
    let values = extract_form_values(current);
    let fields = if show_secrets { values.fields.clone() } else { values.redacted() };

    if format == Format::Json {
        let out = json!({
            "fields": fields,
            "updatedFieldNames": values.updated_field_names,
            "apiKeyFound": values.api_key_found,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", "═══ Prefilled Fields ═══".cyan().bold());
    if fields.is_empty() {
        println!("  {}", "no Datadog settings found".yellow());
    }
    for (field, value) in &fields {
        println!("  {} {}", format!("{}:", field.name()).white().bold(), value.green());
    }
    if !values.api_key_found {
        println!("  {} {}", "[WARN]".yellow(), "no API key in current settings");
    }
    if values.get(FormField::IsDotNet).is_some() {
        println!("  {} .NET profiler settings detected", "[INFO]".cyan());
    }
    Ok(())
}

async fn handle_plan(api: &dyn ManagementApi, id: &str, cfg: &ApplyConfig, format: Format) -> apmlib::Result<()> {
    validate(&cfg.datadog)?;
    let c = classify_service(api, id).await?;
    let current = api.fetch_current_settings(id).await?;
    let changes = diff(&current, &build_desired_settings(&cfg.datadog));
    let steps = plan_steps(c.platform);

    if format == Format::Json {
        let out = json!({
            "serviceId": id,
            "classification": c,
            "changes": changes,
            "steps": steps,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_classification(&c);
    println!("{}", "═══ Settings ═══".cyan().bold());
    for change in &changes {
        let marker = match change.kind {
            ChangeKind::Added => "+".green(),
            ChangeKind::Updated => "~".yellow(),
            ChangeKind::Unchanged => "=".normal(),
        };
        match &change.before {
            Some(before) if change.kind == ChangeKind::Updated => {
                println!("  {} {} {} -> {}", marker, change.key.white().bold(), before, change.after)
            }
            _ => println!("  {} {} {}", marker, change.key.white().bold(), change.after),
        }
    }
    println!("{}", "═══ Steps ═══".cyan().bold());
    for (i, step) in steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step.name);
    }
    Ok(())
}

async fn handle_apply(api: &dyn ManagementApi, id: &str, cfg: &ApplyConfig) -> apmlib::Result<()> {
    let c = classify_service(api, id).await?;
    println!("{} applying to {} ({})", "[*]".cyan(), id.white().bold(), c.platform);

    let mut last: Vec<StepStatus> = Vec::new();
    let report = Orchestrator::new(api)
        .run_with_observer(id, c.platform, &cfg.datadog, |steps| {
            for (i, step) in steps.iter().enumerate() {
                if last.get(i) != Some(&step.status) {
                    print_step(step);
                }
            }
            last = steps.iter().map(|s| s.status).collect();
        })
        .await?;

    report.into_result()?;
    println!("{} {}", "[OK]".green().bold(), "Datadog APM configured");
    Ok(())
}

fn print_step(step: &ApplyStep) {
    let status = step.status.to_string();
    let status = match step.status {
        StepStatus::Pending => status.normal(),
        StepStatus::Running => status.cyan(),
        StepStatus::Completed => status.green(),
        StepStatus::Error => status.red().bold(),
    };
    match &step.error {
        Some(err) => println!("  [{}] {}: {}", status, step.name, err),
        None => println!("  [{}] {}", status, step.name),
    }
}
