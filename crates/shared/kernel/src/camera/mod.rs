//! Camera model abstraction shared by every stereo session.
//!
//! Conventions:
//! * pixels are 0-based `(column, row)` with the origin at the center of the top-left pixel;
//! * camera frames look down `+z`, with `+x` along columns and `+y` along rows;
//! * poses are camera-to-world rotations.

mod pinhole;

pub use pinhole::{PinholeCamera, PinholeParams};

use crate::error::format_context;
use nalgebra::{Point3, Unit, UnitQuaternion, Vector2, Vector3};
use std::borrow::Cow;
use std::fmt::Debug;

/// Errors raised while projecting, back-projecting or loading camera models.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// The point lies on or behind the image plane.
    #[error("Point is behind the camera{}: depth {depth}", format_context(context))]
    BehindCamera { depth: f64, context: Option<Cow<'static, str>> },

    /// Parameters that cannot describe a physical camera.
    #[error("Invalid camera parameters{}: {message}", format_context(context))]
    InvalidParameters { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Camera I/O error{}: {source}", format_context(context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Camera file error{}: {source}", format_context(context))]
    Parse { source: serde_json::Error, context: Option<Cow<'static, str>> },
}

impl From<std::io::Error> for CameraError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source, context: None }
    }
}

impl From<serde_json::Error> for CameraError {
    fn from(source: serde_json::Error) -> Self {
        Self::Parse { source, context: None }
    }
}

/// Adds `.context(...)` to camera results and to the upstream errors they wrap.
pub trait CameraErrorExt<T> {
    /// Attaches a human-readable context to the error.
    ///
    /// # Errors
    /// Returns the original error (converted into [`CameraError`]) with the context set.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, CameraError>;
}

impl<T> CameraErrorExt<T> for Result<T, CameraError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                CameraError::BehindCamera { context: c, .. }
                | CameraError::InvalidParameters { context: c, .. }
                | CameraError::Io { context: c, .. }
                | CameraError::Parse { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> CameraErrorExt<T> for Result<T, std::io::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, CameraError> {
        self.map_err(|source| CameraError::Io { source, context: Some(context.into()) })
    }
}

impl<T> CameraErrorExt<T> for Result<T, serde_json::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, CameraError> {
        self.map_err(|source| CameraError::Parse { source, context: Some(context.into()) })
    }
}

/// A mapping between world points and image pixels.
///
/// Linescan-style models may vary the center and pose per pixel, hence the pixel argument
/// on [`CameraModel::camera_center`] and [`CameraModel::camera_pose`].
pub trait CameraModel: Debug + Send + Sync {
    /// Short model name used in logs (`pinhole`, `isis`, ...).
    fn type_name(&self) -> &'static str;

    /// Projects a world point into the image.
    ///
    /// # Errors
    /// Returns [`CameraError::BehindCamera`] if the point cannot be imaged.
    fn point_to_pixel(&self, point: &Point3<f64>) -> Result<Vector2<f64>, CameraError>;

    /// Unit direction (world frame) of the ray leaving the camera through `pixel`.
    ///
    /// # Errors
    /// Returns an error if the pixel cannot be back-projected.
    fn pixel_to_vector(&self, pixel: &Vector2<f64>) -> Result<Unit<Vector3<f64>>, CameraError>;

    /// Position of the camera when `pixel` was exposed.
    fn camera_center(&self, pixel: &Vector2<f64>) -> Point3<f64>;

    /// Camera-to-world rotation when `pixel` was exposed.
    fn camera_pose(&self, pixel: &Vector2<f64>) -> UnitQuaternion<f64>;
}

impl<C: CameraModel + ?Sized> CameraModel for Box<C> {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn point_to_pixel(&self, point: &Point3<f64>) -> Result<Vector2<f64>, CameraError> {
        (**self).point_to_pixel(point)
    }

    fn pixel_to_vector(&self, pixel: &Vector2<f64>) -> Result<Unit<Vector3<f64>>, CameraError> {
        (**self).pixel_to_vector(pixel)
    }

    fn camera_center(&self, pixel: &Vector2<f64>) -> Point3<f64> {
        (**self).camera_center(pixel)
    }

    fn camera_pose(&self, pixel: &Vector2<f64>) -> UnitQuaternion<f64> {
        (**self).camera_pose(pixel)
    }
}
