use std::{path::PathBuf, process::ExitCode, sync::Arc};

mod artifacts;
mod commands;
mod config;
mod controller;
mod view;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{HttpAnalysisClient, UploadFile};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use artifacts::PendingSaves;
use commands::{parse_line, LineCommand, SaveTarget, Trigger, WorkflowCommand};
use config::{load_settings, Settings};
use controller::{
    events::{UiEvent, WorkflowKind},
    state::WorkflowState,
    validation::{TriggerError, UploadInput},
    Controller,
};

#[derive(Parser, Debug)]
#[command(
    name = "anomaly-console",
    version,
    about = "Drive the traffic anomaly analysis service from a terminal"
)]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where downloaded samples, charts and reports are written.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Workflow(WorkflowCommand),
    /// Read triggers from stdin; several workflows may be in flight at once.
    Interactive,
}

enum Step {
    Line(Option<String>),
    Event(UiEvent),
}

const INTERACTIVE_HELP: &str = "commands: generate --start-date D [--duration H] [--save] | \
analyze FILE [--save] | capture --interface I [--duration S] [--filter \"F\"] [--save] | \
save [results|sample] | show | dismiss | quit";

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(output_dir) = args.output_dir {
        settings.output_dir = output_dir;
    }

    // One cooperative loop: completions are applied strictly one at a time.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build event loop runtime")?;
    runtime.block_on(run(args.command, settings))
}

async fn run(command: Command, settings: Settings) -> Result<ExitCode> {
    let backend =
        HttpAnalysisClient::with_timeout(&settings.server_url, settings.request_timeout())
            .context("failed to initialize backend client")?;
    info!(
        server_url = backend.server_url(),
        stale_responses = ?settings.stale_responses,
        capture_enabled = settings.capture_enabled,
        "backend client ready"
    );
    let mut controller = Controller::new(
        Arc::new(backend),
        settings.stale_responses,
        settings.capture_enabled,
    );
    if controller.capture_state().is_none() {
        info!("live capture disabled; capture triggers are ignored");
    }

    match command {
        Command::Workflow(workflow) => run_once(&mut controller, workflow, &settings).await,
        Command::Interactive => run_interactive(&mut controller, &settings).await,
    }
}

async fn dispatch(
    controller: &mut Controller,
    command: &WorkflowCommand,
) -> Result<u64, TriggerError> {
    match command.trigger() {
        Trigger::Generate(input) => controller.trigger_generate(input),
        Trigger::Capture(input) => controller.trigger_capture(input),
        Trigger::Upload(path) => {
            let file = match path {
                Some(path) => match UploadFile::from_path(&path).await {
                    Ok(file) => Some(file),
                    Err(err) => {
                        return Err(controller.reject(
                            WorkflowKind::Upload,
                            TriggerError::UnreadableFile(err.message()),
                        ))
                    }
                },
                None => None,
            };
            controller.trigger_upload(UploadInput { file })
        }
    }
}

async fn run_once(
    controller: &mut Controller,
    command: WorkflowCommand,
    settings: &Settings,
) -> Result<ExitCode> {
    let workflow = command.workflow();
    let triggered = dispatch(controller, &command).await;
    present(controller)?;
    if let Err(err) = triggered {
        if !err.is_blocking_notice() {
            eprintln!("{err}");
        }
        return Ok(ExitCode::FAILURE);
    }

    let transitions = controller.settle(workflow).await;
    present(controller)?;

    let succeeded = transitions.last().is_some_and(|t| t.is_success());
    if succeeded && command.wants_save() {
        save_results(controller, SaveTarget::for_workflow(workflow), settings).await;
        present(controller)?;
    }
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_interactive(controller: &mut Controller, settings: &Settings) -> Result<ExitCode> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut save_on_success = PendingSaves::default();
    println!("{INTERACTIVE_HELP}");

    loop {
        let step = tokio::select! {
            line = lines.next_line() => Step::Line(line.context("failed to read stdin")?),
            Some(event) = controller.recv_event() => Step::Event(event),
        };

        match step {
            Step::Line(None) => break,
            Step::Line(Some(line)) => match parse_line(&line) {
                Ok(None) => continue,
                Ok(Some(LineCommand::Quit)) => break,
                Ok(Some(LineCommand::Show)) => {}
                Ok(Some(LineCommand::Dismiss)) => {
                    controller.interface_mut().generation_status.dismiss();
                }
                Ok(Some(LineCommand::Save { target })) => {
                    save_results(controller, target, settings).await;
                }
                Ok(Some(LineCommand::Workflow(command))) => {
                    if let Ok(generation) = dispatch(controller, &command).await {
                        if command.wants_save() {
                            save_on_success.request(command.workflow(), generation);
                        }
                    }
                }
                Err(message) => {
                    eprintln!("{message}");
                    continue;
                }
            },
            Step::Event(event) => {
                let workflow = event.workflow();
                let wants_save = save_on_success.take(workflow, event.generation());
                let Some(transition) = controller.apply(event) else {
                    continue;
                };
                if wants_save && transition.is_success() {
                    save_results(controller, SaveTarget::for_workflow(workflow), settings).await;
                }
            }
        }
        present(controller)?;
    }

    let outstanding = controller.in_flight();
    if outstanding > 0 {
        warn!(outstanding, "leaving with backend calls still in flight");
    }
    Ok(ExitCode::SUCCESS)
}

/// Downloads what the finished workflow links to; failures become notices.
async fn save_results(controller: &mut Controller, target: SaveTarget, settings: &Settings) {
    let backend = controller.backend();
    let saved = match target {
        SaveTarget::Sample => match controller.generation_state() {
            WorkflowState::Success(result) => {
                artifacts::save_sample(backend.as_ref(), &result.filename, &settings.output_dir)
                    .await
                    .map(|path| artifacts::SessionSave {
                        saved: vec![path],
                        ..Default::default()
                    })
            }
            _ => Err(anyhow!("no generated sample to save")),
        },
        SaveTarget::Results => {
            artifacts::save_session(backend.as_ref(), controller.interface(), &settings.output_dir)
                .await
        }
    };
    let outcome = match saved {
        Ok(outcome) => outcome,
        Err(err) => {
            controller
                .interface_mut()
                .alert(format!("Error saving results: {err:#}"));
            return;
        }
    };
    for path in &outcome.saved {
        println!("saved {}", path.display());
    }
    for skipped in outcome.skipped {
        controller.interface_mut().alert(skipped);
    }
    for failure in outcome.failures {
        controller
            .interface_mut()
            .alert(format!("Error saving results: {failure}"));
    }
}

fn present(controller: &mut Controller) -> Result<()> {
    for notice in controller.interface_mut().take_notices() {
        println!("[notice] {notice}");
    }
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    view::terminal::draw(controller.interface(), &mut out).context("failed to draw interface")
}
