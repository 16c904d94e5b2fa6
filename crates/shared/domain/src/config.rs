use crate::constants::PINHOLE;
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration shared across tools.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AspConfigInner {
    pub logging: LoggingConfig,
    pub stereo: StereoConfig,
    pub isis: IsisConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AspConfig {
    #[serde(flatten, default)]
    inner: Arc<AspConfigInner>,
}

impl Deref for AspConfig {
    type Target = AspConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AspConfig {
    fn deref_mut(&mut self) -> &mut AspConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Console/file logging knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level directive (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    pub console: bool,
    /// Directory for rolling log files; file logging is off when unset.
    pub directory: Option<PathBuf>,
    pub json: bool,
    /// Extra module directives, e.g. `asp_isis=trace`.
    pub env_filter: Option<String>,
}

/// Stereo session selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StereoConfig {
    /// Session name; `isis` is only accepted by builds with the ISIS capability.
    pub session: String,
    /// Reject triangulated points whose ray gap exceeds this many meters.
    pub max_triangulation_error: Option<f64>,
}

/// Settings consumed by ISIS sessions. Plain data: present in every build.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IsisConfig {
    /// Extension appended to a cube stem to find its adjustment file.
    pub adjustment_extension: String,
    /// Directory searched for adjustment files (next to the cube when unset).
    pub adjustment_dir: Option<PathBuf>,
}

// --- Default ---

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            console: true,
            directory: None,
            json: false,
            env_filter: None,
        }
    }
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self { session: PINHOLE.to_owned(), max_triangulation_error: None }
    }
}

impl Default for IsisConfig {
    fn default() -> Self {
        Self { adjustment_extension: "isis_adjust".to_owned(), adjustment_dir: None }
    }
}
