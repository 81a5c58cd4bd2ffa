use anyhow::{bail, Context, Result};
use std::process::Command;

/// Run the tilt helper once with the motor angle. Blocks until it exits and
/// returns its stdout.
pub fn set_tilt(command: &str, angle: i32) -> Result<String> {
    let output = Command::new(command)
        .arg(angle.to_string())
        .output()
        .with_context(|| format!("Failed to run {}", command))?;

    if !output.status.success() {
        bail!(
            "{} {} exited with {}: {}",
            command,
            angle,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
