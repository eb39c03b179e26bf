use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use gepetto::agent::{DryRunBackend, LlmBackend, ReasoningBackend};
use gepetto::config::Config;
use gepetto::domain::{RunEvent, Status, TaskResult};
use gepetto::error::GepettoError;
use gepetto::project;
use gepetto::report::{ReportWriter, summary};
use gepetto::runner::TaskEngine;
use gepetto::task::parse_task_file;
use gepetto::variables;

fn setup_logging(log_path: Option<&Path>, debug: bool) -> Result<()> {
    let log_file = match log_path {
        Some(path) => path.to_path_buf(),
        None => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gepetto")
            .join("logs")
            .join("gepetto.log"),
    };

    if let Some(log_dir) = log_file.parent() {
        if !log_dir.as_os_str().is_empty() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }
    }

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let level = if debug {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn colored_status(status: Option<Status>) -> ColoredString {
    match status {
        Some(Status::Success) => "SUCCESS".green().bold(),
        Some(Status::Failed) => "FAILED".red().bold(),
        Some(Status::Error) => "ERROR".yellow().bold(),
        None => "PENDING".normal(),
    }
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<RunEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            RunEvent::TaskStarted {
                task,
                description,
                total_steps,
            } => {
                println!("{} {} ({} steps)", "Running:".cyan(), task.bold(), total_steps);
                if !description.is_empty() {
                    println!("  {}", description.dimmed());
                }
            }
            RunEvent::StepStarted {
                index,
                total,
                instruction,
            } => {
                println!("{} {}", format!("[{}/{}]", index, total).cyan(), instruction);
            }
            RunEvent::Action { action, name, .. } => {
                println!("      {} {}", format!("#{}", action).dimmed(), name.dimmed());
            }
            RunEvent::StepFinished { status, details, .. } => {
                let details = details.unwrap_or_default();
                println!("      {} {}", colored_status(Some(status)), details);
            }
            RunEvent::TaskFinished { .. } => {}
        }
    }
}

fn print_summary(result: &TaskResult) {
    println!();
    println!("{} {}", "Result:".bold(), colored_status(result.status()));
    print!("{}", summary::render(result));
}

async fn handle_run_command(
    script: &Path,
    vars: &[(String, String)],
    no_report: bool,
    results_dir: Option<&PathBuf>,
    dry_run: bool,
    config: &Config,
) -> Result<bool> {
    let task = Arc::new(parse_task_file(script).context("Failed to parse task script")?);
    let config = config.with_overrides(vars.iter().cloned());

    let backend: Arc<dyn ReasoningBackend> = if dry_run {
        println!("{}", "Dry run: every step is accepted without calling the agent".yellow());
        Arc::new(DryRunBackend)
    } else {
        Arc::new(LlmBackend::anthropic(&config.llm).context("Failed to create LLM backend")?)
    };
    info!("Running '{}' with backend {}", task.name, backend.name());

    let engine = TaskEngine::new(backend);
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(rx));
    let result = engine.execute_with_events(task, &config, tx).await;
    printer.await.context("Progress printer failed")?;

    print_summary(&result);

    if !no_report {
        let writer = results_dir.map(ReportWriter::new).unwrap_or_default();
        match writer.save(&result) {
            Ok(paths) => println!("{} {}", "Reports:".cyan(), paths.dir.display()),
            Err(e) => {
                warn!("Failed to write reports: {}", e);
                eprintln!("{} {}", "Warning:".yellow(), e);
            }
        }
    }

    Ok(result.is_success())
}

fn handle_validate_command(script: &Path, vars: &[(String, String)], config: &Config) -> Result<()> {
    let task = parse_task_file(script).context("Failed to parse task script")?;
    let config = config.with_overrides(vars.iter().cloned());

    println!("{} {}", "Task:".green(), task.name);
    println!("  Steps: {}", task.step_count());
    let placeholders = variables::task_placeholders(&task);
    if !placeholders.is_empty() {
        let names: Vec<&str> = placeholders.iter().map(String::as_str).collect();
        println!("  Variables: {}", names.join(", "));
    }

    variables::validate_all_defined(&task, &config)?;
    println!("{}", "Script is valid".green());
    Ok(())
}

fn handle_init_command(vars: &[(String, String)]) -> Result<()> {
    let layout = project::init(Path::new("."), vars).context("Failed to initialize project")?;
    println!("{}", "Gepetto project initialized".green());
    println!("- Configuration saved to {}", layout.config.display());
    println!("- Sample task created at {}", layout.sample_task.display());
    println!("\nTo run it: gepetto run {}", layout.sample_task.display());
    Ok(())
}

fn handle_configure_command(
    config_path: Option<&PathBuf>,
    vars: &[(String, String)],
    max_steps: Option<u32>,
    debug: Option<bool>,
    log_path: Option<&PathBuf>,
    config: &Config,
) -> Result<()> {
    if vars.is_empty() && max_steps.is_none() && debug.is_none() && log_path.is_none() {
        print!("{}", serde_yaml::to_string(config).context("Failed to render configuration")?);
        return Ok(());
    }

    let mut updated = config.with_overrides(vars.iter().cloned());
    if let Some(max_steps) = max_steps {
        updated.max_steps = max_steps;
    }
    if let Some(debug) = debug {
        updated.debug = debug;
    }
    if let Some(path) = log_path {
        updated.log_path = Some(path.clone());
    }

    let target = config_path.cloned().unwrap_or_else(Config::project_path);
    updated.save(&target).context("Failed to save configuration")?;
    println!("{} {}", "Configuration saved to".green(), target.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let debug = config.debug || matches!(cli.command, Commands::Run { debug: true, .. });
    setup_logging(config.log_path.as_deref(), debug).context("Failed to setup logging")?;
    info!("Starting with config from: {:?}", cli.config);

    if let Err(err) = dispatch(&cli, &config).await {
        if is_script_error(&err) {
            eprintln!("{} {:#}", "Script error:".red().bold(), err);
            std::process::exit(2);
        }
        return Err(err);
    }
    Ok(())
}

/// Parse and variable errors the script author can fix
fn is_script_error(err: &eyre::Report) -> bool {
    err.downcast_ref::<GepettoError>().is_some_and(GepettoError::is_authoring_error)
}

async fn dispatch(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Run {
            script,
            variables,
            no_report,
            results_dir,
            dry_run,
            ..
        } => {
            let success = handle_run_command(
                script,
                &variables.vars,
                *no_report,
                results_dir.as_ref(),
                *dry_run,
                config,
            )
            .await?;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::Validate { script, variables } => handle_validate_command(script, &variables.vars, config)?,
        Commands::Init { variables } => handle_init_command(&variables.vars)?,
        Commands::Configure {
            variables,
            max_steps,
            debug,
            no_debug,
            log_path,
        } => {
            let debug = match (*debug, *no_debug) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            handle_configure_command(
                cli.config.as_ref(),
                &variables.vars,
                *max_steps,
                debug,
                log_path.as_ref(),
                config,
            )?
        }
    }

    Ok(())
}
