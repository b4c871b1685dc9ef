//! Release configuration from YAML

use crate::core::version::BuildType;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Variable names the tool fills in itself
const RESERVED_VARIABLES: &[&str] = &["version", "build_type"];

/// Top-level release configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Release pipeline name
    pub name: String,

    /// Variables available to all step command templates
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Production and test registry variable sets
    #[serde(default)]
    pub registries: Option<RegistriesConfig>,

    /// Ordered stages
    pub stages: Vec<StageConfig>,
}

/// Registry variable sets, selected by build type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistriesConfig {
    /// Targets for release and rc builds
    #[serde(default)]
    pub production: HashMap<String, String>,

    /// Targets for every other build type
    #[serde(default)]
    pub test: HashMap<String, String>,
}

/// Stage configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Unique stage identifier
    pub id: String,

    /// Human-readable stage name
    pub name: String,

    /// Optional stage description
    #[serde(default)]
    pub description: Option<String>,

    /// Build type tags this stage runs for (absent = all)
    #[serde(default)]
    pub only: Option<Vec<String>>,

    /// Skip gate driven by an upstream output variable
    #[serde(default)]
    pub gate: Option<GateConfig>,

    /// Ordered steps
    pub steps: Vec<StepConfig>,
}

/// Gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Name of the host variable holding the skip flag
    pub variable: String,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique step identifier
    pub id: String,

    /// Shell command template ({{ name }} placeholders)
    pub run: String,

    /// Environment variables pinned for this step
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Optional step timeout (absent = host-governed)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ReleaseConfig {
    /// Load release configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse release configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ReleaseConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the release configuration
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            anyhow::bail!("Release '{}' declares no stages", self.name);
        }

        let mut seen_stage_ids = std::collections::HashSet::new();
        let mut seen_step_ids = std::collections::HashSet::new();

        for stage in &self.stages {
            if !seen_stage_ids.insert(&stage.id) {
                anyhow::bail!("Duplicate stage ID: {}", stage.id);
            }

            if stage.steps.is_empty() {
                anyhow::bail!("Stage '{}' declares no steps", stage.id);
            }

            if let Some(gate) = &stage.gate {
                if gate.variable.is_empty() {
                    anyhow::bail!("Stage '{}' gate names no variable", stage.id);
                }
            }

            if let Some(only) = &stage.only {
                if only.iter().any(|tag| tag.is_empty()) {
                    anyhow::bail!("Stage '{}' has an empty build type in 'only'", stage.id);
                }
            }

            for step in &stage.steps {
                if !seen_step_ids.insert(&step.id) {
                    anyhow::bail!("Duplicate step ID: {}", step.id);
                }
                if step.run.trim().is_empty() {
                    anyhow::bail!("Step '{}' has an empty command", step.id);
                }
            }
        }

        for name in self.variables.keys() {
            if RESERVED_VARIABLES.contains(&name.as_str()) || name.starts_with("registry.") {
                anyhow::bail!("Variable '{}' shadows a built-in variable", name);
            }
        }

        Ok(())
    }

    /// Registry variable set for a build type (empty when none declared)
    pub fn selected_registry(&self, build_type: &BuildType) -> HashMap<String, String> {
        match &self.registries {
            Some(registries) if build_type.routes_to_production() => registries.production.clone(),
            Some(registries) => registries.test.clone(),
            None => HashMap::new(),
        }
    }

    /// Total number of steps across all stages
    pub fn total_steps(&self) -> usize {
        self.stages.iter().map(|s| s.steps.len()).sum()
    }
}
