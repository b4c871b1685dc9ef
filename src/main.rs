use anyhow::{Context, Result};
use indicatif::ProgressBar;
use relgate::cli::commands::{CheckVersionCommand, GateCommand, RunCommand, ValidateCommand};
use relgate::cli::output::*;
use relgate::cli::{Cli, Command};
use relgate::core::config::ReleaseConfig;
use relgate::core::{gate, version, BuildType, GateDecision, Release};
use relgate::execution::{
    git, CommandRunner, EchoRunner, SequenceEngine, SequenceError, SequenceEvent, ShellRunner,
};
use std::collections::HashMap;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_release(cmd).await?,
        Command::Validate(cmd) => validate_release(cmd)?,
        Command::Gate(cmd) => evaluate_gate(cmd),
        Command::CheckVersion(cmd) => check_version(cmd).await?,
    }

    Ok(())
}

async fn run_release(cmd: &RunCommand) -> Result<()> {
    // Load release config
    let config = ReleaseConfig::from_file(&cmd.file)
        .context("Failed to load release config")?;

    println!(
        "{} Loaded release: {}",
        INFO,
        style(&config.name).bold()
    );

    let build_type = BuildType::from_tag(&cmd.build_type);

    // Validate the version once, before any step executes
    let latest_tag = resolve_tag(cmd.tag.as_deref(), &build_type).await?;
    if let Err(e) = version::validate(&cmd.version, &build_type, latest_tag.as_deref()) {
        println!("{} Version validation failed:", CROSS);
        println!("  {}", style(&e).red());
        std::process::exit(1);
    }
    println!(
        "{} Version {} ok for build type {}",
        CHECK,
        style(&cmd.version).bold(),
        style(&build_type).cyan()
    );

    // Apply variable overrides
    let mut overrides = HashMap::new();
    for (key, value) in &cmd.set {
        overrides.insert(key.clone(), value.clone());
        println!(
            "{} Variable override: {} = {}",
            INFO,
            style(key).cyan(),
            style(value).dim()
        );
    }

    let mut release = Release::from_config(&config, build_type, &cmd.version, &overrides);

    // Gates read the host's output variables from the environment
    let host: HashMap<String, String> = std::env::vars().collect();

    println!();
    let progress = create_progress_bar(release.total_steps());
    let result = if cmd.dry_run {
        execute_with(EchoRunner, &mut release, &host, progress.clone()).await
    } else {
        execute_with(ShellRunner::new(), &mut release, &host, progress.clone()).await
    };
    progress.finish_and_clear();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&run_summary_json(&release))?);
    } else {
        print_run_summary(&release);
    }

    match result {
        Ok(()) => {
            println!(
                "\n{} {} completed {}",
                CHECK,
                style(&release.name).bold(),
                style("successfully").green()
            );
        }
        Err(e) => {
            println!(
                "\n{} {} {}",
                CROSS,
                style(&release.name).bold(),
                style("failed").red()
            );
            error!("{}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Run the sequence engine with console output wired to a progress bar
async fn execute_with<R: CommandRunner + 'static>(
    runner: R,
    release: &mut Release,
    host: &HashMap<String, String>,
    progress: ProgressBar,
) -> Result<(), SequenceError> {
    let mut engine = SequenceEngine::new(runner);

    engine.add_event_handler(move |event| {
        progress.println(format_sequence_event(&event));
        match &event {
            SequenceEvent::StepCompleted { .. }
            | SequenceEvent::StepFailed { .. }
            | SequenceEvent::StepSkipped { .. } => progress.inc(1),
            SequenceEvent::StageSkipped { steps, .. } => progress.inc(*steps as u64),
            _ => {}
        }
    });

    engine.execute(release, host).await
}

fn validate_release(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating release configuration...", INFO);

    match ReleaseConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Release configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Stages: {}", style(config.stages.len()).cyan());
            println!("  Steps: {}", style(config.total_steps()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

fn evaluate_gate(cmd: &GateCommand) {
    let flag = match (&cmd.value, &cmd.variable) {
        (Some(value), _) => Some(value.clone()),
        (None, Some(name)) => std::env::var(name).ok(),
        (None, None) => None,
    };

    match gate::evaluate_flag(flag.as_deref()) {
        GateDecision::Permit => {
            println!("{} permit", CHECK);
        }
        GateDecision::Deny => {
            println!("{} deny", CROSS);
            std::process::exit(1);
        }
    }
}

async fn check_version(cmd: &CheckVersionCommand) -> Result<()> {
    let build_type = BuildType::from_tag(&cmd.build_type);
    let latest_tag = resolve_tag(cmd.tag.as_deref(), &build_type).await?;

    match version::validate(&cmd.version, &build_type, latest_tag.as_deref()) {
        Ok(()) => {
            println!(
                "{} Version {} is valid for build type {}",
                CHECK,
                style(&cmd.version).bold(),
                style(&build_type).cyan()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", CROSS, style(&e).red());
            std::process::exit(1);
        }
    }
}

/// Resolve the most recent tag: explicit flag first, git for release builds
async fn resolve_tag(explicit: Option<&str>, build_type: &BuildType) -> Result<Option<String>> {
    if let Some(tag) = explicit {
        return Ok(Some(tag.to_string()));
    }

    if !matches!(build_type, BuildType::Release) {
        return Ok(None);
    }

    let runner = ShellRunner::new();
    git::latest_tag(&runner)
        .await
        .context("Failed to read latest git tag")
}

fn print_run_summary(release: &Release) {
    let state = &release.state;

    println!("\n{} Run summary", INFO);
    println!("  ID: {}", style(state.run_id).cyan());
    println!("  Status: {}", format_status(state.status));
    println!(
        "  Steps: {} completed, {} failed, {} skipped ({} total)",
        style(state.completed_steps).green(),
        style(state.failed_steps).red(),
        style(state.skipped_steps).dim(),
        state.total_steps
    );

    if let (Some(started), Some(completed)) = (state.started_at, state.completed_at) {
        if let Ok(duration) = completed.signed_duration_since(started).to_std() {
            println!("  Duration: {}", style(format_duration(duration)).dim());
        }
    }
}

fn run_summary_json(release: &Release) -> serde_json::Value {
    let mut steps = Vec::new();
    for stage in &release.stages {
        for step in &stage.steps {
            steps.push(serde_json::json!({
                "stage": stage.id,
                "step": step.id,
                "state": step.state,
            }));
        }
    }

    serde_json::json!({
        "release": release.name,
        "build_type": release.build_type.as_str(),
        "version": release.version,
        "run": release.state,
        "steps": steps,
    })
}

fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
