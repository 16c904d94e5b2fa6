use asp::kernel::camera::CameraError;
use asp::kernel::error::format_context;
use std::borrow::Cow;

/// A specialized [`StereoError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum StereoError {
    /// The session exists but this build was compiled without the capability it needs.
    #[error("Session '{session}' requires the '{capability}' capability, which this build lacks")]
    CapabilityUnavailable { session: Cow<'static, str>, capability: &'static str },

    #[error("Unknown stereo session '{name}' (available: {available})")]
    UnknownSession { name: String, available: String },

    #[error("Stereo camera error{}: {source}", format_context(context))]
    Camera { source: CameraError, context: Option<Cow<'static, str>> },

    #[cfg(asp_isis)]
    #[error("Stereo ISIS error{}: {source}", format_context(context))]
    Isis { source: asp::isis_io::IsisError, context: Option<Cow<'static, str>> },

    /// The two rays never come close enough to define a point.
    #[error("Rays do not intersect{}: {message}", format_context(context))]
    NoIntersection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Closest-approach gap above the configured limit.
    #[error("Triangulation error {gap} exceeds the limit {limit}")]
    RayGap { gap: f64, limit: f64 },
}

impl StereoError {
    pub(crate) fn no_intersection(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NoIntersection { message: message.into(), context: None }
    }
}

impl From<CameraError> for StereoError {
    fn from(source: CameraError) -> Self {
        Self::Camera { source, context: None }
    }
}

#[cfg(asp_isis)]
impl From<asp::isis_io::IsisError> for StereoError {
    fn from(source: asp::isis_io::IsisError) -> Self {
        Self::Isis { source, context: None }
    }
}

/// Adds `.context(...)` to stereo results and the upstream errors they wrap.
pub trait StereoErrorExt<T> {
    /// Attaches a human-readable context to the error.
    ///
    /// # Errors
    /// Returns the original error (converted into [`StereoError`]) with the context set.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, StereoError>;
}

impl<T> StereoErrorExt<T> for Result<T, StereoError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                StereoError::Camera { context: c, .. }
                | StereoError::NoIntersection { context: c, .. } => *c = Some(context.into()),
                #[cfg(asp_isis)]
                StereoError::Isis { context: c, .. } => *c = Some(context.into()),
                StereoError::CapabilityUnavailable { .. }
                | StereoError::UnknownSession { .. }
                | StereoError::RayGap { .. } => {},
            }
            e
        })
    }
}

impl<T> StereoErrorExt<T> for Result<T, CameraError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, StereoError> {
        self.map_err(|source| StereoError::Camera { source, context: Some(context.into()) })
    }
}

#[cfg(asp_isis)]
impl<T> StereoErrorExt<T> for Result<T, asp::isis_io::IsisError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, StereoError> {
        self.map_err(|source| StereoError::Isis { source, context: Some(context.into()) })
    }
}
