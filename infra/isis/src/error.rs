use asp_kernel::camera::CameraError;
use asp_kernel::error::format_context;
use std::borrow::Cow;

/// Errors raised by the ISIS cube reader and camera models.
#[derive(Debug, thiserror::Error)]
pub enum IsisError {
    /// Failure reading the cube or one of its companion files.
    #[error("ISIS I/O error{}: {source}", format_context(context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// Malformed PVL label text.
    #[error("PVL syntax error{} at line {line}: {message}", format_context(context))]
    Label { line: usize, message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A keyword, group or object the reader needs is absent.
    #[error("Missing PVL entry{}: {path}", format_context(context))]
    MissingKeyword { path: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A keyword is present but its value cannot be interpreted.
    #[error("Invalid value for {keyword}{}: '{value}'", format_context(context))]
    InvalidValue { keyword: Cow<'static, str>, value: String, context: Option<Cow<'static, str>> },

    /// Valid ISIS, but not something this reader handles.
    #[error("Unsupported cube{}: {message}", format_context(context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A requested pixel window does not fit inside the cube.
    #[error("Pixel box {requested} exceeds cube bounds {cols}x{rows}")]
    OutOfBounds { requested: String, cols: usize, rows: usize },

    #[error("ISIS camera error{}: {source}", format_context(context))]
    Camera { source: CameraError, context: Option<Cow<'static, str>> },

    /// Failure (de)serializing an adjustment file.
    #[error("Adjustment file error{}: {source}", format_context(context))]
    Adjustment { source: serde_json::Error, context: Option<Cow<'static, str>> },
}

impl IsisError {
    pub(crate) fn missing(path: impl Into<Cow<'static, str>>) -> Self {
        Self::MissingKeyword { path: path.into(), context: None }
    }

    pub(crate) fn invalid(keyword: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self::InvalidValue { keyword: keyword.into(), value: value.into(), context: None }
    }

    pub(crate) fn unsupported(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unsupported { message: message.into(), context: None }
    }
}

impl From<std::io::Error> for IsisError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source, context: None }
    }
}

impl From<CameraError> for IsisError {
    fn from(source: CameraError) -> Self {
        Self::Camera { source, context: None }
    }
}

impl From<serde_json::Error> for IsisError {
    fn from(source: serde_json::Error) -> Self {
        Self::Adjustment { source, context: None }
    }
}

/// Adds `.context(...)` to ISIS results and to the upstream errors they wrap.
pub trait IsisErrorExt<T> {
    /// Attaches a human-readable context to the error.
    ///
    /// # Errors
    /// Returns the original error (converted into [`IsisError`]) with the context set.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IsisError>;
}

impl<T> IsisErrorExt<T> for Result<T, IsisError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                IsisError::Io { context: c, .. }
                | IsisError::Label { context: c, .. }
                | IsisError::MissingKeyword { context: c, .. }
                | IsisError::InvalidValue { context: c, .. }
                | IsisError::Unsupported { context: c, .. }
                | IsisError::Camera { context: c, .. }
                | IsisError::Adjustment { context: c, .. } => *c = Some(context.into()),
                IsisError::OutOfBounds { .. } => {},
            }
            e
        })
    }
}

impl<T> IsisErrorExt<T> for Result<T, std::io::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IsisError> {
        self.map_err(|source| IsisError::Io { source, context: Some(context.into()) })
    }
}

impl<T> IsisErrorExt<T> for Result<T, CameraError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IsisError> {
        self.map_err(|source| IsisError::Camera { source, context: Some(context.into()) })
    }
}

impl<T> IsisErrorExt<T> for Result<T, serde_json::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IsisError> {
        self.map_err(|source| IsisError::Adjustment { source, context: Some(context.into()) })
    }
}
