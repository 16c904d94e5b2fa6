use crate::error::{StereoError, StereoErrorExt};
use crate::triangulation::{Triangulation, triangulate};
use asp::domain::config::AspConfig;
use asp::domain::constants::{ISIS, PINHOLE};
use asp::kernel::camera::{CameraModel, PinholeCamera};
use nalgebra::Vector2;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Stereo sessions compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// Ideal frame cameras loaded from JSON parameter files.
    Pinhole,
    /// Cameras read from ISIS cube labels, with optional adjustments.
    #[cfg(asp_isis)]
    Isis,
}

impl SessionKind {
    /// Resolves a session name (case-insensitive).
    ///
    /// # Errors
    /// Returns [`StereoError::CapabilityUnavailable`] for `isis` in a build without the ISIS
    /// capability, and [`StereoError::UnknownSession`] for any other unrecognized name.
    pub fn parse(name: &str) -> Result<Self, StereoError> {
        match name.trim().to_ascii_lowercase().as_str() {
            PINHOLE => Ok(Self::Pinhole),
            #[cfg(asp_isis)]
            ISIS => Ok(Self::Isis),
            #[cfg(not(asp_isis))]
            ISIS => Err(StereoError::CapabilityUnavailable { session: ISIS.into(), capability: ISIS }),
            _ => Err(StereoError::UnknownSession {
                name: name.to_owned(),
                available: available_sessions().iter().map(|s| s.name()).collect::<Vec<_>>().join(", "),
            }),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pinhole => PINHOLE,
            #[cfg(asp_isis)]
            Self::Isis => ISIS,
        }
    }
}

impl FromStr for SessionKind {
    type Err = StereoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sessions this build can run.
#[must_use]
pub const fn available_sessions() -> &'static [SessionKind] {
    &[
        SessionKind::Pinhole,
        #[cfg(asp_isis)]
        SessionKind::Isis,
    ]
}

/// Whether ISIS sessions are compiled in. Always equal to `asp::capabilities::isis_enabled()`.
#[must_use]
pub const fn isis_supported() -> bool {
    cfg!(asp_isis)
}

/// Camera inputs of one stereo pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInputs {
    pub left: PathBuf,
    pub right: PathBuf,
    /// Explicit adjustment files; ignored by sessions without adjustments.
    pub left_adjust: Option<PathBuf>,
    pub right_adjust: Option<PathBuf>,
}

impl SessionInputs {
    #[must_use]
    pub fn new(left: impl Into<PathBuf>, right: impl Into<PathBuf>) -> Self {
        Self { left: left.into(), right: right.into(), ..Self::default() }
    }
}

/// A loaded camera pair.
pub trait StereoSession: fmt::Debug + Send + Sync {
    fn kind(&self) -> SessionKind;

    fn left_camera(&self) -> &dyn CameraModel;

    fn right_camera(&self) -> &dyn CameraModel;

    /// Limit on the ray gap of accepted points.
    fn max_error(&self) -> Option<f64> {
        None
    }

    /// Triangulates one pair of matching pixels.
    ///
    /// # Errors
    /// Propagates [`triangulate`] errors and returns [`StereoError::RayGap`] when the gap
    /// exceeds [`Self::max_error`].
    fn triangulate(&self, left_px: &Vector2<f64>, right_px: &Vector2<f64>) -> Result<Triangulation, StereoError> {
        let hit = triangulate(self.left_camera(), left_px, self.right_camera(), right_px)?;
        match self.max_error() {
            Some(limit) if hit.error > limit => Err(StereoError::RayGap { gap: hit.error, limit }),
            _ => Ok(hit),
        }
    }
}

/// Two pinhole cameras.
#[derive(Debug, Clone)]
pub struct PinholeSession {
    left: PinholeCamera,
    right: PinholeCamera,
    max_error: Option<f64>,
}

impl PinholeSession {
    #[must_use]
    pub const fn new(left: PinholeCamera, right: PinholeCamera) -> Self {
        Self { left, right, max_error: None }
    }

    /// Loads both cameras from their JSON parameter files.
    ///
    /// # Errors
    /// Returns [`StereoError::Camera`] if either file cannot be loaded.
    pub fn load(left: &Path, right: &Path) -> Result<Self, StereoError> {
        let left = PinholeCamera::load(left).context("left camera")?;
        let right = PinholeCamera::load(right).context("right camera")?;
        Ok(Self::new(left, right))
    }

    #[must_use]
    pub const fn with_max_error(mut self, max_error: Option<f64>) -> Self {
        self.max_error = max_error;
        self
    }
}

impl StereoSession for PinholeSession {
    fn kind(&self) -> SessionKind {
        SessionKind::Pinhole
    }

    fn left_camera(&self) -> &dyn CameraModel {
        &self.left
    }

    fn right_camera(&self) -> &dyn CameraModel {
        &self.right
    }

    fn max_error(&self) -> Option<f64> {
        self.max_error
    }
}

#[cfg(asp_isis)]
pub use isis::IsisSession;

#[cfg(asp_isis)]
mod isis {
    use super::{SessionInputs, SessionKind, StereoSession};
    use crate::error::{StereoError, StereoErrorExt};
    use asp::domain::config::IsisConfig;
    use asp::isis_io::{Adjustment, IsisAdjustCameraModel};
    use asp::kernel::camera::CameraModel;
    use std::path::{Path, PathBuf};

    /// Two ISIS cubes, each with an optional adjustment.
    #[derive(Debug, Clone)]
    pub struct IsisSession {
        left: IsisAdjustCameraModel,
        right: IsisAdjustCameraModel,
        max_error: Option<f64>,
    }

    impl IsisSession {
        /// Opens both cubes. Explicit adjustment paths win; otherwise an adjustment file
        /// found by the naming convention in `config` is applied when it exists.
        ///
        /// # Errors
        /// Returns [`StereoError::Isis`] if a cube or adjustment cannot be read.
        pub fn load(inputs: &SessionInputs, config: &IsisConfig) -> Result<Self, StereoError> {
            let left = open_side(&inputs.left, inputs.left_adjust.as_deref(), config).context("left cube")?;
            let right = open_side(&inputs.right, inputs.right_adjust.as_deref(), config).context("right cube")?;
            Ok(Self { left, right, max_error: None })
        }

        #[must_use]
        pub const fn with_max_error(mut self, max_error: Option<f64>) -> Self {
            self.max_error = max_error;
            self
        }

        #[must_use]
        pub const fn left(&self) -> &IsisAdjustCameraModel {
            &self.left
        }

        #[must_use]
        pub const fn right(&self) -> &IsisAdjustCameraModel {
            &self.right
        }
    }

    fn open_side(
        cube: &Path,
        explicit: Option<&Path>,
        config: &IsisConfig,
    ) -> Result<IsisAdjustCameraModel, asp::isis_io::IsisError> {
        let conventional: Option<PathBuf> = explicit.is_none().then(|| {
            Adjustment::path_for(cube, config.adjustment_dir.as_deref(), &config.adjustment_extension)
        });
        let adjustment = explicit.or_else(|| conventional.as_deref().filter(|path| path.is_file()));

        if let Some(path) = adjustment {
            tracing::debug!(cube = %cube.display(), adjustment = %path.display(), "Applying camera adjustment");
        }
        IsisAdjustCameraModel::open(cube, adjustment)
    }

    impl StereoSession for IsisSession {
        fn kind(&self) -> SessionKind {
            SessionKind::Isis
        }

        fn left_camera(&self) -> &dyn CameraModel {
            &self.left
        }

        fn right_camera(&self) -> &dyn CameraModel {
            &self.right
        }

        fn max_error(&self) -> Option<f64> {
            self.max_error
        }
    }
}

/// Loads the session named by `kind` with settings from `config`.
///
/// # Errors
/// Returns an error if the cameras cannot be loaded.
pub fn open_session(
    kind: SessionKind,
    inputs: &SessionInputs,
    config: &AspConfig,
) -> Result<Box<dyn StereoSession>, StereoError> {
    let max_error = config.stereo.max_triangulation_error;
    tracing::info!(session = %kind, left = %inputs.left.display(), right = %inputs.right.display(), "Opening stereo session");

    match kind {
        SessionKind::Pinhole => {
            Ok(Box::new(PinholeSession::load(&inputs.left, &inputs.right)?.with_max_error(max_error)))
        },
        #[cfg(asp_isis)]
        SessionKind::Isis => Ok(Box::new(IsisSession::load(inputs, &config.isis)?.with_max_error(max_error))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_parse() {
        for kind in available_sessions() {
            assert_eq!(SessionKind::parse(kind.name()).unwrap(), *kind);
        }
        assert_eq!("  PinHole ".parse::<SessionKind>().unwrap(), SessionKind::Pinhole);
    }

    #[test]
    fn unknown_sessions_list_the_alternatives() {
        let err = SessionKind::parse("rpc").unwrap_err();
        assert!(matches!(err, StereoError::UnknownSession { .. }));
        assert!(err.to_string().contains("pinhole"), "{err}");
    }

    #[test]
    fn isis_session_follows_the_capability() {
        assert_eq!(isis_supported(), asp::capabilities::isis_enabled());
        assert_eq!(available_sessions().len(), 1 + usize::from(isis_supported()));

        match SessionKind::parse("isis") {
            #[cfg(asp_isis)]
            Ok(kind) => assert_eq!(kind.name(), "isis"),
            #[cfg(not(asp_isis))]
            Ok(kind) => panic!("unexpected session {kind}"),
            Err(err) => {
                assert!(!isis_supported(), "{err}");
                assert!(matches!(err, StereoError::CapabilityUnavailable { capability: "isis", .. }));
            },
        }
    }
}
