//! Command-line front end
//!
//! Parses arguments, loads configuration, wires the infrastructure into the
//! use cases and renders job events as they arrive. Ctrl-C while a job runs
//! requests cooperative cancellation.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, info, warn};

use crate::application::{BatchValidator, GenerationPlan, ImeiUseCases, ProgressReducer};
use crate::domain::events::ValidationEvent;
use crate::domain::value_objects::Imei;
use crate::infrastructure::config::{ConfigManager, LoadedConfig};
use crate::infrastructure::export::{self, ExportFormat};
use crate::infrastructure::logging;
use crate::infrastructure::{JsonTemplateRepository, SwappaProvider};

/// Exit status after a second Ctrl-C (128 + SIGINT)
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// IMEI Blackbird - generate IMEIs from a TAC and check them online
#[derive(Parser, Debug)]
#[command(name = "imei-blackbird", author, version, about)]
pub struct Cli {
    /// Configuration file (defaults to config.json in the user config directory)
    #[arg(long, global = true, env = "IMEI_BLACKBIRD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Template list file (overrides storage.data_file)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Generate without checking the IMEIs online
    #[arg(long, global = true)]
    pub no_validate: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a device template
    Add {
        #[arg(long)]
        brand: String,

        #[arg(long)]
        model: String,

        /// 8-digit Type Allocation Code
        #[arg(long)]
        tac: String,
    },

    /// List templates with their latest IMEI and status
    List,

    /// Generate IMEIs for the first template with this model name and validate them
    Generate {
        #[arg(long)]
        model: String,

        /// Number of IMEIs (1-100, defaults to generation.default_count)
        #[arg(long)]
        count: Option<usize>,
    },

    /// Generate one IMEI for a template row, store it and validate it
    GenerateRow {
        /// Row index as shown by `list`
        slot: usize,
    },

    /// Check an IMEI's check digit offline
    Verify { imei: String },

    /// Export templates to a file
    Export {
        #[arg(value_enum)]
        format: ExportFormat,

        path: PathBuf,
    },
}

/// Runs a parsed command line
pub async fn execute(cli: Cli) -> Result<()> {
    let loaded = load_config(cli.config.as_deref()).await?;
    let config = loaded.config;
    logging::init_logging_with_config(&config.logging)?;
    logging::log_system_info();
    if loaded.created {
        info!("🎉 First run detected - wrote default configuration to {:?}", loaded.path);
    } else {
        info!("Loaded configuration from: {:?}", loaded.path);
    }

    let data_file = cli
        .data_file
        .clone()
        .unwrap_or_else(|| config.storage.data_file.clone());
    debug!("Template file: {:?}", data_file);

    let repository = Arc::new(JsonTemplateRepository::new(data_file));
    let provider = Arc::new(
        SwappaProvider::new(&config.provider).context("Failed to set up validation provider")?,
    );
    let validator = BatchValidator::new(provider);
    let mut use_cases =
        ImeiUseCases::load(repository, validator, config.generation.max_count).await?;

    match cli.command {
        Command::Add { brand, model, tac } => {
            let slot = use_cases.add_template(&brand, &model, &tac).await?;
            println!("Added template #{slot}: {} - {} - {}", brand.trim(), model.trim(), tac.trim());
        }
        Command::List => list(&use_cases),
        Command::Generate { model, count } => {
            let count = count.unwrap_or(config.generation.default_count);
            let plan = use_cases.generate_for_model(&model, count).await?;
            print_plan(&plan);
            if !cli.no_validate {
                validate_plan(&mut use_cases, &plan).await?;
            }
        }
        Command::GenerateRow { slot } => {
            let plan = use_cases.generate_for_slot(slot).await?;
            print_plan(&plan);
            if !cli.no_validate {
                validate_plan(&mut use_cases, &plan).await?;
            }
        }
        Command::Export { format, path } => {
            export::export(format, use_cases.templates(), &path).await?;
            println!("Exported {} template(s) to {}", use_cases.templates().len(), path.display());
        }
        Command::Verify { imei } => verify(&imei)?,
    }

    Ok(())
}

async fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    match path {
        Some(path) => ConfigManager::with_path(path).load_config(),
        None => ConfigManager::new()?.initialize_on_first_run().await,
    }
}

fn verify(raw: &str) -> Result<()> {
    let raw = raw.trim();
    match Imei::parse(raw) {
        Ok(imei) => {
            println!("✅ {imei}: check digit {} is correct", imei.check_digit());
            Ok(())
        }
        Err(e) => bail!("❌ {raw} is not a valid IMEI: {e}"),
    }
}

fn list(use_cases: &ImeiUseCases) {
    if use_cases.templates().is_empty() {
        println!("No templates yet. Add one with `imei-blackbird add`.");
        return;
    }
    for (slot, template) in use_cases.templates().iter().enumerate() {
        let imei = if template.generated_imei.is_empty() {
            "-"
        } else {
            template.generated_imei.as_str()
        };
        println!(
            "#{slot:<3} {} - {} - {} - {} [{}]",
            template.brand, template.model_name, template.tac, imei, template.status
        );
    }
}

fn print_plan(plan: &GenerationPlan) {
    println!("Generated {} IMEI(s) for template #{}:", plan.imeis.len(), plan.slot);
    for imei in &plan.imeis {
        println!("  {imei}");
    }
}

fn render_event(event: &ValidationEvent) {
    match event {
        ValidationEvent::Progress { completed, total, .. } => {
            println!("[{completed}/{total}] checking...");
        }
        ValidationEvent::SlotStatus {
            slot, imei, status, ..
        } => println!("  #{slot} {imei} -> {status}"),
        ValidationEvent::Finished { .. } => {}
    }
}

async fn validate_plan(use_cases: &mut ImeiUseCases, plan: &GenerationPlan) -> Result<()> {
    let handle = use_cases.start_validation(plan).await?;
    let token = handle.cancellation_token();
    let job_id = handle.id();
    info!("Validating {} IMEI(s) as job {}", plan.imeis.len(), job_id);

    // The SIGINT handler stays installed once registered, so a second
    // Ctrl-C has to be turned into an exit here.
    let ctrl_c = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            eprintln!(
                "\n⚠️ Cancellation requested, waiting for the current lookup... (Ctrl-C again to quit now)"
            );
            token.cancel();
        }
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted again, exiting without waiting for job {}", job_id);
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });

    let mut reducer = ProgressReducer::new();
    let outcome = use_cases
        .drive(handle, |event, _| {
            reducer.apply(event);
            render_event(event);
        })
        .await;
    ctrl_c.abort();
    let report = outcome?;

    let summary = report.summary();
    if let Some(progress) = reducer.snapshot() {
        println!("{}", progress.last_message);
    }
    println!(
        "Valid: {}  Invalid: {}  Unknown: {}  Network errors: {}",
        summary.valid, summary.invalid, summary.unknown_error, summary.network_error
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_with_globals() {
        let cli = Cli::try_parse_from([
            "imei-blackbird",
            "generate",
            "--model",
            "Galaxy S10",
            "--count",
            "5",
            "--no-validate",
            "--data-file",
            "/tmp/models.json",
        ])
        .unwrap();
        assert!(cli.no_validate);
        assert_eq!(cli.data_file, Some(PathBuf::from("/tmp/models.json")));
        assert!(matches!(
            cli.command,
            Command::Generate { ref model, count: Some(5) } if model == "Galaxy S10"
        ));
    }

    #[test]
    fn parses_export_format() {
        let cli = Cli::try_parse_from(["imei-blackbird", "export", "text", "out.txt"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Export { format: ExportFormat::Text, .. }
        ));
        assert!(Cli::try_parse_from(["imei-blackbird", "export", "csv", "out.csv"]).is_err());
    }

    #[test]
    fn verify_checks_digit() {
        assert!(verify("351912101234561").is_ok());
        assert!(verify("351912101234562").is_err());
        assert!(verify("3519").is_err());
    }
}
