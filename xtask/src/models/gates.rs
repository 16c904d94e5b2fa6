//! The capability matrix walked by `cargo xtask gates`.

use std::fmt;

/// Crates whose tests observe the ISIS flag.
pub const GATED_CRATES: &[&str] = &["asp", "asp-stereo", "asp-cli"];

/// Out-of-workspace crate that imports `asp::isis_io` without checking the flag.
pub const UNGUARDED_FIXTURE: &str = "xtask/fixtures/unguarded-consumer";

/// Errors a consumer sees when it names a gated item in a build without it.
pub const UNRESOLVED_CODES: &[&str] = &["E0432", "E0433"];

/// One build configuration of the capability matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateConfig {
    IsisOff,
    IsisOn,
}

impl GateConfig {
    pub const ALL: [Self; 2] = [Self::IsisOff, Self::IsisOn];

    #[must_use]
    pub const fn isis(self) -> bool {
        matches!(self, Self::IsisOn)
    }

    /// Feature arguments for commands run from the workspace root.
    ///
    /// Only the facade feature is named: consumers derive `cfg(asp_isis)` from it.
    #[must_use]
    pub fn workspace_args(self) -> Vec<String> {
        if self.isis() { vec!["--features".into(), "asp/isis".into()] } else { Vec::new() }
    }

    /// Feature arguments for the fixture crate, which forwards `isis` itself.
    #[must_use]
    pub fn fixture_args(self) -> Vec<String> {
        if self.isis() { vec!["--features".into(), "isis".into()] } else { Vec::new() }
    }

    /// Whether the unguarded consumer must compile in this configuration.
    #[must_use]
    pub const fn fixture_compiles(self) -> bool {
        self.isis()
    }
}

impl fmt::Display for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.isis() { "isis on" } else { "isis off" })
    }
}

/// Whether compiler output reports an unresolved gated import.
#[must_use]
pub fn is_unresolved_import(stderr: &str) -> bool {
    UNRESOLVED_CODES.iter().any(|code| stderr.contains(code))
}
