use crate::models::gates::{GATED_CRATES, GateConfig};
use crate::services::utils::{cargo_in, get_project_root, normalize_project_name};

/// Runs tests in the workspace or a specific crate, once per capability configuration.
///
/// # Result
/// Returns an `anyhow::Result<()>` indicating success or failure of the test run.
///
/// # Errors
/// Returns an error if the test execution fails or if the test runner is not found.
pub fn run_tests(project: Option<&str>) -> anyhow::Result<()> {
    let target_is_workspace = project.is_none_or(|value| value == "all");
    let target_label = if target_is_workspace { "workspace" } else { "crate" };
    let has_nextest = std::process::Command::new("cargo-nextest").arg("--version").output().is_ok();

    for &config in configs_for(project) {
        println!("🧪 Running {target_label} tests ({config})...");

        let mut args: Vec<String> = if has_nextest {
            vec!["nextest".into(), "run".into()]
        } else {
            vec!["test".into()]
        };
        args.extend(target_args(project));
        args.extend(config.workspace_args());

        if has_nextest {
            args.extend(
                ["--failure-output", "immediate-final", "--success-output", "never", "--status-level", "skip"]
                    .into_iter()
                    .map(String::from),
            );
        } else {
            args.extend(["--", "-q"].into_iter().map(String::from));
        }

        println!("🧪 Running tests via '{}'...", if has_nextest { "nextest" } else { "cargo test" });
        let status = cargo_in(&get_project_root()?)?.args(args).status()?;

        if !status.success() {
            anyhow::bail!("Tests failed ({config})!");
        }
    }
    Ok(())
}

/// Runs doc tests in the workspace or a specific crate, once per capability configuration.
///
/// Without ISIS the facade's import doc test runs as `compile_fail`.
///
/// # Errors
/// Returns an error if the doctest execution fails.
pub fn run_doctests(project: Option<&str>) -> anyhow::Result<()> {
    let target_label = if project.is_none_or(|value| value == "all") { "workspace" } else { "crate" };

    for &config in configs_for(project) {
        println!("📚 Running {target_label} doc tests ({config})...");

        let mut args: Vec<String> = vec!["test".into(), "--doc".into()];
        args.extend(target_args(project));
        args.extend(config.workspace_args());

        let status = cargo_in(&get_project_root()?)?.args(args).status()?;
        if !status.success() {
            anyhow::bail!("Doc tests failed ({config})!");
        }
    }

    Ok(())
}

/// Crates that never see the flag only run once.
fn configs_for(project: Option<&str>) -> &'static [GateConfig] {
    const BOTH: &[GateConfig] = &GateConfig::ALL;
    const UNGATED: &[GateConfig] = &[GateConfig::IsisOff];

    match project {
        Some(project) if project != "all" && !GATED_CRATES.contains(&normalize_project_name(project).as_str()) => {
            UNGATED
        },
        _ => BOTH,
    }
}

fn target_args(project: Option<&str>) -> Vec<String> {
    match project {
        Some(project) if project != "all" => vec!["-p".into(), normalize_project_name(project)],
        _ => vec!["--workspace".into()],
    }
}
