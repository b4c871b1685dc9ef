//! CLI command definitions

use clap::{ArgGroup, Args};

/// Run a release sequence
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to release YAML file
    #[arg(short, long)]
    pub file: String,

    /// Version being released
    #[arg(long)]
    pub version: String,

    /// Build type tag (release, rc, or anything else)
    #[arg(long, default_value = "dev")]
    pub build_type: String,

    /// Most recent tag (discovered via git when omitted for release builds)
    #[arg(long)]
    pub tag: Option<String>,

    /// Variable overrides (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Print rendered commands without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Validate a release configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to release YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Evaluate a skip gate
#[derive(Debug, Args, Clone)]
#[command(group = ArgGroup::new("flag").required(true).args(["variable", "value"]))]
pub struct GateCommand {
    /// Host variable holding the skip flag (read from the environment)
    #[arg(long)]
    pub variable: Option<String>,

    /// Flag value to evaluate directly
    #[arg(long)]
    pub value: Option<String>,
}

/// Check a version string against a build type
#[derive(Debug, Args, Clone)]
pub struct CheckVersionCommand {
    /// Version string to check
    #[arg(long)]
    pub version: String,

    /// Build type tag (release, rc, or anything else)
    #[arg(long, default_value = "dev")]
    pub build_type: String,

    /// Most recent tag (discovered via git when omitted for release builds)
    #[arg(long)]
    pub tag: Option<String>,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("a=b").unwrap(),
            ("a".to_string(), "b".to_string())
        );
        assert_eq!(
            parse_key_value("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_key_value("no-equals").is_err());
    }
}
