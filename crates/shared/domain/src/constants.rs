//! Stable identifiers shared between configuration files, the CLI and the capability gate.

/// Name of the optional ISIS imaging capability (cube I/O and ISIS camera models).
pub const ISIS: &str = "isis";

/// Name of the always-available pinhole stereo session.
pub const PINHOLE: &str = "pinhole";

/// Prefix for environment overrides (`ASP__STEREO__SESSION=isis`).
pub const ENV_PREFIX: &str = "ASP";

/// Default file stem of the configuration file.
pub const CONFIG_FILE: &str = "asp";
