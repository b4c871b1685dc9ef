//! Release run domain model

use crate::core::{
    config::{ReleaseConfig, StageConfig, StepConfig},
    gate::Gate,
    state::{RunState, StepState},
    version::BuildType,
};
use std::collections::HashMap;

/// One release run: the stage list plus resolved variables and state
#[derive(Debug, Clone)]
pub struct Release {
    /// Release pipeline name
    pub name: String,

    /// Build type tag for this run
    pub build_type: BuildType,

    /// Version being released
    pub version: String,

    /// Fully resolved template variables (config, registry, built-ins, overrides)
    pub variables: HashMap<String, String>,

    /// Ordered stages
    pub stages: Vec<Stage>,

    /// Run state
    pub state: RunState,
}

/// A stage: an ordered group of steps with shared routing rules
#[derive(Debug, Clone)]
pub struct Stage {
    pub id: String,
    pub name: String,

    /// Build type tags this stage runs for (None = all)
    pub only: Option<Vec<String>>,

    /// Skip gate, if any
    pub gate: Option<Gate>,

    pub steps: Vec<Step>,
}

/// A single external command invocation
#[derive(Debug, Clone)]
pub struct Step {
    pub id: String,

    /// Shell command template
    pub command_template: String,

    /// Environment variables pinned for this step
    pub env: HashMap<String, String>,

    /// Optional timeout (None = host-governed)
    pub timeout_secs: Option<u64>,

    /// Runtime state
    pub state: StepState,
}

impl Release {
    /// Build a run from configuration.
    ///
    /// Variable precedence, lowest to highest: config variables, the
    /// registry set selected by the build type (as `registry.<key>`),
    /// the `version`/`build_type` built-ins, then `overrides`.
    pub fn from_config(
        config: &ReleaseConfig,
        build_type: BuildType,
        version: &str,
        overrides: &HashMap<String, String>,
    ) -> Self {
        let mut variables = config.variables.clone();

        for (key, value) in config.selected_registry(&build_type) {
            variables.insert(format!("registry.{}", key), value);
        }

        variables.insert("version".to_string(), version.to_string());
        variables.insert("build_type".to_string(), build_type.as_str().to_string());

        for (key, value) in overrides {
            variables.insert(key.clone(), value.clone());
        }

        let stages = config.stages.iter().map(Stage::from_config).collect();

        Release {
            name: config.name.clone(),
            build_type,
            version: version.to_string(),
            variables,
            stages,
            state: RunState::new(),
        }
    }

    /// Total number of steps across all stages
    pub fn total_steps(&self) -> usize {
        self.stages.iter().map(|s| s.steps.len()).sum()
    }

    /// Find a step by ID
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.stages
            .iter()
            .flat_map(|s| s.steps.iter())
            .find(|step| step.id == id)
    }
}

impl Stage {
    fn from_config(config: &StageConfig) -> Self {
        Stage {
            id: config.id.clone(),
            name: config.name.clone(),
            only: config.only.clone(),
            gate: config.gate.as_ref().map(|g| Gate {
                variable: g.variable.clone(),
            }),
            steps: config.steps.iter().map(Step::from_config).collect(),
        }
    }

    /// Whether this stage runs for the given build type
    pub fn selected_for(&self, build_type: &BuildType) -> bool {
        match &self.only {
            Some(tags) => tags.iter().any(|tag| tag == build_type.as_str()),
            None => true,
        }
    }
}

impl Step {
    fn from_config(config: &StepConfig) -> Self {
        Step {
            id: config.id.clone(),
            command_template: config.run.clone(),
            env: config.env.clone(),
            timeout_secs: config.timeout_secs,
            state: StepState::Pending,
        }
    }

    /// Render the command with variable substitution
    pub fn render_command(&self, variables: &HashMap<String, String>) -> String {
        let mut command = self.command_template.clone();

        // Replace variables in the form {{ variable_name }}
        for (key, value) in variables {
            let placeholder = format!("{{{{ {} }}}}", key);
            command = command.replace(&placeholder, value);
        }

        command
    }
}
