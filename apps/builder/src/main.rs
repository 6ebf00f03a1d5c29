mod commands;
mod config;
mod errors;
mod export;
mod form;
mod layout;
mod models;
mod render;
mod snapshot;
mod state;
mod steps;
mod validation;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::handlers::{export_finished, handle_step, template_lines};
use crate::commands::{dispatch, Command, Effect, Reply};
use crate::config::Config;
use crate::export::{DirectorySink, ExportError, ExportOutcome, ExportPipeline};
use crate::models::resume::ResumeDocument;
use crate::render::TemplateId;
use crate::snapshot::{FileStorage, SnapshotStore};
use crate::state::AppState;
use crate::validation::ValidationSchema;

#[derive(Parser, Debug)]
#[command(name = "resume-builder", version)]
#[command(about = "Build a resume step by step and export it as a PDF")]
struct Cli {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Interactive editor (the default)
    Session {
        /// Template to start with
        #[arg(short, long)]
        template: Option<String>,
    },
    /// Print the saved resume as JSON
    Show,
    /// Check the saved resume; exits with status 1 when invalid
    Validate,
    /// Print the saved resume rendered with a template
    Preview {
        #[arg(short, long, default_value = "professional")]
        template: String,
    },
    /// Export the saved resume as a PDF
    Export {
        #[arg(short, long, default_value = "professional")]
        template: String,
        /// Output directory (defaults to RESUME_EXPORT_DIR)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Also write the captured image as PNG
        #[arg(long)]
        png: bool,
    },
    /// List the available templates
    Templates,
    /// Replace the saved resume with a blank one
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resume_builder={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resume-builder v{}", env!("CARGO_PKG_VERSION"));
    info!(storage_dir = %config.storage_dir.display(), "Using snapshot storage");

    let snapshots = SnapshotStore::new(Box::new(FileStorage::new(&config.storage_dir)));

    match cli.command.unwrap_or(CliCommand::Session { template: None }) {
        CliCommand::Session { template } => {
            let template = template.as_deref().map(TemplateId::resolve).unwrap_or_default();
            let exporter = ExportPipeline::new(
                Arc::new(DirectorySink::new(&config.export_dir)),
                config.capture_scale,
            );
            let fonts = AppState::load_fonts(&config);
            let state = AppState::new(config, snapshots, exporter, fonts, template);
            run_session(state).await
        }
        CliCommand::Show => {
            let doc = snapshots.load().unwrap_or_default();
            let json = serde_json::to_string_pretty(&doc).context("Failed to serialize resume")?;
            println!("{json}");
            Ok(())
        }
        CliCommand::Validate => {
            let doc = snapshots.load().unwrap_or_default();
            let errors = ValidationSchema::new(config.strict_skills).validate(&doc);
            if errors.is_empty() {
                println!("All fields are valid");
                return Ok(());
            }
            for (path, message) in errors.iter() {
                println!("{path}: {message}");
            }
            std::process::exit(1);
        }
        CliCommand::Preview { template } => {
            let doc = snapshots.load().unwrap_or_default();
            println!("{}", render::render(&doc, &template).to_outline());
            Ok(())
        }
        CliCommand::Export { template, out, png } => {
            export_once(config, snapshots, &template, out, png).await
        }
        CliCommand::Templates => {
            for line in template_lines(TemplateId::default()) {
                println!("{line}");
            }
            Ok(())
        }
        CliCommand::Reset => {
            snapshots
                .save(&ResumeDocument::default())
                .context("Failed to reset the saved resume")?;
            println!("Saved resume replaced with a blank one");
            Ok(())
        }
    }
}

async fn export_once(
    config: Config,
    snapshots: SnapshotStore,
    template: &str,
    out: Option<PathBuf>,
    png: bool,
) -> Result<()> {
    let out_dir = out.unwrap_or_else(|| config.export_dir.clone());
    let exporter = ExportPipeline::new(Arc::new(DirectorySink::new(out_dir)), config.capture_scale)
        .with_png(png);
    let fonts = AppState::load_fonts(&config);
    let state = AppState::new(config, snapshots, exporter, fonts, TemplateId::resolve(template));

    if state.form.document().personal_info.full_name.is_empty() {
        warn!("Saved resume has no name, exporting the placeholder page");
    }

    let full_name = state.form.document().personal_info.full_name.clone();
    let result = match state.surface() {
        Ok(surface) => state.exporter.export(&surface, &full_name).await,
        Err(e) => Err(e),
    };
    let failed = result.is_err();
    print_reply(&export_finished(result));
    if failed {
        anyhow::bail!("export failed");
    }
    Ok(())
}

fn print_reply(reply: &Reply) {
    for line in &reply.lines {
        println!("{line}");
    }
    for notice in &reply.notices {
        println!("{notice}");
    }
}

fn prompt(state: &AppState) {
    print!("{}> ", state.steps.current());
    // A failed flush only delays the prompt.
    let _ = std::io::stdout().flush();
}

/// Reads commands from stdin until `quit` or end of input. Exports run as
/// background tasks and report back over a channel, so editing continues while
/// a PDF is being generated.
async fn run_session(mut state: AppState) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Result<ExportOutcome, ExportError>>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = 0usize;

    println!("Resume builder. Type 'help' for commands.");
    print_reply(&handle_step(&state));
    prompt(&state);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    prompt(&state);
                    continue;
                }
                let reply = match line.parse::<Command>() {
                    Ok(command) => dispatch(&mut state, command),
                    Err(message) => Reply::line(message),
                };
                print_reply(&reply);
                match reply.effect {
                    Effect::None => {}
                    Effect::Quit => break,
                    Effect::Export(job) => {
                        let exporter = state.exporter.clone();
                        let tx = tx.clone();
                        pending += 1;
                        tokio::spawn(async move {
                            let result = exporter.export(&job.surface, &job.full_name).await;
                            let _ = tx.send(result);
                        });
                    }
                }
                prompt(&state);
            }
            Some(result) = rx.recv() => {
                pending = pending.saturating_sub(1);
                println!();
                print_reply(&export_finished(result));
                prompt(&state);
            }
        }
    }

    // Let in-flight exports finish; they are never cancelled.
    while pending > 0 {
        let Some(result) = rx.recv().await else { break };
        pending -= 1;
        print_reply(&export_finished(result));
    }

    info!("Session ended");
    Ok(())
}
