//! CLI output formatting

use crate::{
    core::{RunStatus, StepState},
    execution::SequenceEvent,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");

/// Create a progress bar for a run
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a step state for display
pub fn format_step_state(state: &StepState) -> String {
    match state {
        StepState::Pending => style("PENDING").dim().to_string(),
        StepState::Running { .. } => style("RUNNING").yellow().to_string(),
        StepState::Completed { .. } => style("COMPLETED").green().to_string(),
        StepState::Failed { .. } => style("FAILED").red().to_string(),
        StepState::Skipped { .. } => style("SKIPPED").dim().to_string(),
    }
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a sequence event for display
pub fn format_sequence_event(event: &SequenceEvent) -> String {
    match event {
        SequenceEvent::RunStarted {
            run_id,
            release_name,
        } => format!(
            "{} Starting release {} ({})",
            ROCKET,
            style(release_name).bold(),
            style(&run_id.to_string()[..8]).dim()
        ),
        SequenceEvent::StageStarted { stage_id } => {
            format!("{} Stage {}", INFO, style(stage_id).bold())
        }
        SequenceEvent::StageSkipped {
            stage_id, reason, ..
        } => format!(
            "{} Stage {} skipped: {}",
            SKIP,
            style(stage_id).bold(),
            style(reason).dim()
        ),
        SequenceEvent::StepStarted { step_id, command } => format!(
            "{} {} {}",
            SPINNER,
            style(step_id).cyan(),
            style(format!("$ {}", command)).dim()
        ),
        SequenceEvent::StepOutput { step_id, output } => {
            format!("{} Output from {}:\n{}", INFO, style(step_id).dim(), output)
        }
        SequenceEvent::StepCompleted { step_id } => {
            format!("{} {}", CHECK, style(step_id).cyan())
        }
        SequenceEvent::StepSkipped { step_id, reason } => format!(
            "{} {} skipped: {}",
            SKIP,
            style(step_id).cyan(),
            style(reason).dim()
        ),
        SequenceEvent::StepFailed { step_id, error } => {
            format!("{} {}: {}", CROSS, style(step_id).cyan(), style(error).red())
        }
        SequenceEvent::RunCompleted { status, .. } => {
            let icon = match status {
                RunStatus::Completed => CHECK,
                RunStatus::Failed => CROSS,
                _ => INFO,
            };
            format!("{} Run {}", icon, format_status(*status))
        }
    }
}
