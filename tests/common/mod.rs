//! Test utility functions for relgate scenario tests
#![allow(dead_code)]

use async_trait::async_trait;
use relgate::core::config::ReleaseConfig;
use relgate::core::{BuildType, Release, StepState};
use relgate::execution::{CommandOutput, CommandRunner, RunnerError, SequenceEngine, SequenceError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock runner that records every command and fails the ones matching
/// configured markers
#[derive(Clone)]
pub struct MockRunner {
    executed: Arc<Mutex<Vec<String>>>,
    fail_markers: Arc<Vec<String>>,
    simulate_delay: Option<std::time::Duration>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            executed: Arc::new(Mutex::new(Vec::new())),
            fail_markers: Arc::new(Vec::new()),
            simulate_delay: None,
        }
    }

    /// Fail any command containing one of the given markers
    pub fn failing_on(markers: &[&str]) -> Self {
        Self {
            executed: Arc::new(Mutex::new(Vec::new())),
            fail_markers: Arc::new(markers.iter().map(|m| m.to_string()).collect()),
            simulate_delay: None,
        }
    }

    /// Delay every command by the given duration
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.simulate_delay = Some(delay);
        self
    }

    /// Commands executed so far, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(
        &self,
        command: &str,
        _env: &HashMap<String, String>,
    ) -> Result<CommandOutput, RunnerError> {
        self.executed.lock().unwrap().push(command.to_string());

        if let Some(delay) = self.simulate_delay {
            tokio::time::sleep(delay).await;
        }

        let fails = self.fail_markers.iter().any(|m| command.contains(m));
        Ok(CommandOutput {
            exit_code: if fails { 1 } else { 0 },
            stdout: if fails { String::new() } else { "ok".to_string() },
            stderr: if fails {
                "simulated failure".to_string()
            } else {
                String::new()
            },
        })
    }
}

/// Build a release run from a YAML literal
pub fn release_from_yaml(yaml: &str, build_type: &str, version: &str) -> Release {
    let config = ReleaseConfig::from_yaml(yaml).expect("Scenario YAML should parse");
    Release::from_config(
        &config,
        BuildType::from_tag(build_type),
        version,
        &HashMap::new(),
    )
}

/// Execute a release with the given mock runner and host variables
pub async fn run_release(
    release: &mut Release,
    runner: MockRunner,
    host: HashMap<String, String>,
) -> Result<(), SequenceError> {
    let engine = SequenceEngine::new(runner);
    engine.execute(release, &host).await
}

/// Host variable map from key/value pairs
pub fn host_vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn assert_step_completed(release: &Release, step_id: &str) {
    let step = release
        .step(step_id)
        .unwrap_or_else(|| panic!("Step '{}' should exist", step_id));
    assert!(
        matches!(step.state, StepState::Completed { .. }),
        "Step '{}' should be Completed, got {:?}",
        step_id,
        step.state
    );
}

pub fn assert_step_failed(release: &Release, step_id: &str) {
    let step = release
        .step(step_id)
        .unwrap_or_else(|| panic!("Step '{}' should exist", step_id));
    assert!(
        matches!(step.state, StepState::Failed { .. }),
        "Step '{}' should be Failed, got {:?}",
        step_id,
        step.state
    );
}

pub fn assert_step_skipped(release: &Release, step_id: &str, reason_contains: &str) {
    let step = release
        .step(step_id)
        .unwrap_or_else(|| panic!("Step '{}' should exist", step_id));
    match &step.state {
        StepState::Skipped { reason } => {
            assert!(
                reason.contains(reason_contains),
                "Step '{}' skip reason '{}' should mention '{}'",
                step_id,
                reason,
                reason_contains
            );
        }
        other => panic!("Step '{}' should be Skipped, got {:?}", step_id, other),
    }
}
