use godot_delivery_core::prelude::*;

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs `command` to completion within `timeout` and returns its combined stdout and stderr.
///
/// The child is killed when the timeout expires.
pub(crate) async fn run(
    mut command: Command,
    label: &str,
    timeout: Duration,
) -> Result<String, BuildError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(|source| BuildError::Spawn {
        command: label.to_string(),
        source,
    })?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| BuildError::Timeout {
            command: label.to_string(),
            timeout,
        })?
        .map_err(|source| BuildError::Spawn {
            command: label.to_string(),
            source,
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(BuildError::CommandFailed {
            command: label.to_string(),
            status: output.status.to_string(),
            output: combined,
        });
    }

    Ok(combined)
}
