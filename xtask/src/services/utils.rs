use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Returns the root directory of the project.
///
/// # Errors
/// Returns an error if the manifest directory does not have a parent.
pub fn get_project_root() -> Result<PathBuf> {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .context("Could not find project root from xtask manifest")
}

/// Normalizes a project crate name to the workspace naming convention.
///
/// The facade itself is plain `asp`.
#[must_use]
pub fn normalize_project_name(project: &str) -> String {
    if project == "asp" || project.starts_with("asp-") { project.to_owned() } else { format!("asp-{project}") }
}

/// `cargo` invocation rooted at `dir`, sharing the workspace target directory.
///
/// # Errors
/// Returns an error if the project root cannot be determined.
pub fn cargo_in(dir: &Path) -> Result<Command> {
    let mut cmd = Command::new(std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into()));
    cmd.current_dir(dir).env("CARGO_TARGET_DIR", get_project_root()?.join("target"));
    Ok(cmd)
}

/// Runs a cargo command with inherited output, failing on a non-zero status.
///
/// # Errors
/// Returns an error if cargo cannot be spawned or exits unsuccessfully.
pub fn run_cargo(mut cmd: Command, what: &str) -> Result<()> {
    let status = cmd.status().with_context(|| format!("Failed to execute cargo for {what}"))?;
    if !status.success() {
        bail!("{what} failed with status {}", status.code().unwrap_or(-1));
    }
    Ok(())
}

/// Runs a cargo command and captures its output regardless of the exit status.
///
/// # Errors
/// Returns an error if cargo cannot be spawned.
pub fn capture_cargo(mut cmd: Command, what: &str) -> Result<Output> {
    cmd.output().with_context(|| format!("Failed to execute cargo for {what}"))
}
