//! Tag discovery through git

use crate::execution::runner::{CommandRunner, RunnerError};
use std::collections::HashMap;
use tracing::debug;

/// Most recent tag reachable from HEAD, or None when the repository has
/// no tags (or is not a repository at all).
pub async fn latest_tag<R: CommandRunner + ?Sized>(
    runner: &R,
) -> Result<Option<String>, RunnerError> {
    let output = runner
        .run("git describe --tags --abbrev=0", &HashMap::new())
        .await?;

    if !output.success() {
        debug!(
            "git describe exited with code {}: {}",
            output.exit_code,
            output.stderr.trim()
        );
        return Ok(None);
    }

    let tag = output.stdout.trim().to_string();
    Ok(if tag.is_empty() { None } else { Some(tag) })
}
