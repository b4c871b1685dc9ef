//! Sequence engine - runs the stages of a release in order

use crate::{
    core::{GateDecision, Release, RunStatus, Stage, StepState},
    execution::runner::{CommandRunner, RunnerError},
};
use std::collections::HashMap;
use thiserror::Error;
use tokio::time::{timeout, Duration};
use tracing::{error, info};
use uuid::Uuid;

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum SequenceEvent {
    RunStarted {
        run_id: Uuid,
        release_name: String,
    },
    StageStarted {
        stage_id: String,
    },
    StageSkipped {
        stage_id: String,
        steps: usize,
        reason: String,
    },
    StepStarted {
        step_id: String,
        command: String,
    },
    StepOutput {
        step_id: String,
        output: String,
    },
    StepCompleted {
        step_id: String,
    },
    StepSkipped {
        step_id: String,
        reason: String,
    },
    StepFailed {
        step_id: String,
        error: String,
    },
    RunCompleted {
        run_id: Uuid,
        status: RunStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Box<dyn Fn(SequenceEvent) + Send + Sync>;

/// A failed run; carries the step that aborted it
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("step '{step_id}' failed: {error}")]
    StepFailed { step_id: String, error: String },
}

/// Runs a release: strictly sequential, fail-fast, no retries.
///
/// Stage routing (build type `only` lists and skip gates) happens here;
/// everything downstream of a failure is marked skipped and the run
/// aborts with an error.
pub struct SequenceEngine<R> {
    runner: R,
    event_handlers: Vec<EventHandler>,
}

impl<R: CommandRunner> SequenceEngine<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(SequenceEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Box::new(handler));
    }

    /// Emit an event to all handlers
    fn emit(&self, event: SequenceEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Execute the entire release sequence.
    ///
    /// `host` holds the orchestration host's output variables; gates
    /// read their flags from it.
    pub async fn execute(
        &self,
        release: &mut Release,
        host: &HashMap<String, String>,
    ) -> Result<(), SequenceError> {
        let run_id = release.state.run_id;

        info!("Starting release run: {} ({})", release.name, run_id);
        self.emit(SequenceEvent::RunStarted {
            run_id,
            release_name: release.name.clone(),
        });

        release.state.start(release.total_steps());

        let build_type = release.build_type.clone();
        let variables = release.variables.clone();
        let mut failure: Option<SequenceError> = None;

        for stage in release.stages.iter_mut() {
            if failure.is_some() {
                self.skip_stage(stage, "aborted after earlier failure");
                continue;
            }

            if !stage.selected_for(&build_type) {
                let reason = format!("not selected for build type '{}'", build_type);
                info!("Skipping stage {}: {}", stage.id, reason);
                self.skip_stage(stage, &reason);
                continue;
            }

            if let Some(gate) = &stage.gate {
                if gate.evaluate(host) == GateDecision::Deny {
                    let reason = format!("gate '{}' denied", gate.variable);
                    info!("Skipping stage {}: {}", stage.id, reason);
                    self.skip_stage(stage, &reason);
                    continue;
                }
            }

            self.emit(SequenceEvent::StageStarted {
                stage_id: stage.id.clone(),
            });

            for step in stage.steps.iter_mut() {
                if failure.is_some() {
                    let reason = "aborted after earlier failure".to_string();
                    step.state = StepState::Skipped {
                        reason: reason.clone(),
                    };
                    self.emit(SequenceEvent::StepSkipped {
                        step_id: step.id.clone(),
                        reason,
                    });
                    continue;
                }

                let command = step.render_command(&variables);
                let started_at = chrono::Utc::now();
                step.state = StepState::Running { started_at };

                info!("Executing step: {}", step.id);
                self.emit(SequenceEvent::StepStarted {
                    step_id: step.id.clone(),
                    command: command.clone(),
                });

                let result = match step.timeout_secs {
                    Some(secs) => {
                        match timeout(
                            Duration::from_secs(secs),
                            self.runner.run(&command, &step.env),
                        )
                        .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(RunnerError::Timeout(secs)),
                        }
                    }
                    None => self.runner.run(&command, &step.env).await,
                };

                match result {
                    Ok(output) if output.success() => {
                        step.state = StepState::Completed {
                            output: output.stdout.clone(),
                            started_at,
                            completed_at: chrono::Utc::now(),
                        };

                        if !output.stdout.trim().is_empty() {
                            self.emit(SequenceEvent::StepOutput {
                                step_id: step.id.clone(),
                                output: output.stdout,
                            });
                        }
                        self.emit(SequenceEvent::StepCompleted {
                            step_id: step.id.clone(),
                        });
                    }
                    Ok(output) => {
                        let stderr = output.stderr.trim();
                        let message = if stderr.is_empty() {
                            format!("exited with code {}", output.exit_code)
                        } else {
                            format!("exited with code {}: {}", output.exit_code, stderr)
                        };
                        failure = Some(self.fail_step(step, started_at, message));
                    }
                    Err(e) => {
                        failure = Some(self.fail_step(step, started_at, e.to_string()));
                    }
                }
            }
        }

        let mut completed = 0;
        let mut failed = 0;
        let mut skipped = 0;
        for step in release.stages.iter().flat_map(|s| s.steps.iter()) {
            match step.state {
                StepState::Completed { .. } => completed += 1,
                StepState::Failed { .. } => failed += 1,
                StepState::Skipped { .. } => skipped += 1,
                _ => {}
            }
        }
        release.state.update_counts(completed, failed, skipped);

        if let Some(err) = failure {
            release.state.fail();
            info!("Release run finished: {} - Failed", release.name);
            self.emit(SequenceEvent::RunCompleted {
                run_id,
                status: RunStatus::Failed,
            });
            return Err(err);
        }

        release.state.complete();
        info!("Release run finished: {} - Completed", release.name);
        self.emit(SequenceEvent::RunCompleted {
            run_id,
            status: RunStatus::Completed,
        });

        Ok(())
    }

    /// Mark every pending step of a stage as skipped
    fn skip_stage(&self, stage: &mut Stage, reason: &str) {
        let mut steps = 0;
        for step in stage.steps.iter_mut() {
            if matches!(step.state, StepState::Pending) {
                step.state = StepState::Skipped {
                    reason: reason.to_string(),
                };
                steps += 1;
            }
        }

        self.emit(SequenceEvent::StageSkipped {
            stage_id: stage.id.clone(),
            steps,
            reason: reason.to_string(),
        });
    }

    /// Mark a step as failed and build the run-aborting error
    fn fail_step(
        &self,
        step: &mut crate::core::Step,
        started_at: chrono::DateTime<chrono::Utc>,
        message: String,
    ) -> SequenceError {
        error!("Step {} failed: {}", step.id, message);

        step.state = StepState::Failed {
            error: message.clone(),
            started_at,
            failed_at: chrono::Utc::now(),
        };

        self.emit(SequenceEvent::StepFailed {
            step_id: step.id.clone(),
            error: message.clone(),
        });

        SequenceError::StepFailed {
            step_id: step.id.clone(),
            error: message,
        }
    }
}
