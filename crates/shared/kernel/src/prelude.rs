pub use crate::camera::{CameraError, CameraErrorExt, CameraModel, PinholeCamera};
pub use crate::error::format_context;
pub use nalgebra::{Point3, Unit, UnitQuaternion, Vector2, Vector3};
