use super::{CameraError, CameraErrorExt, CameraModel};
use nalgebra::{Point3, Quaternion, Unit, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk representation of a [`PinholeCamera`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinholeParams {
    /// Camera center in world coordinates.
    pub center: [f64; 3],
    /// Camera-to-world rotation as a quaternion `[w, x, y, z]`.
    pub rotation: [f64; 4],
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

/// Ideal pinhole camera without lens distortion.
#[derive(Debug, Clone, PartialEq)]
pub struct PinholeCamera {
    center: Point3<f64>,
    rotation: UnitQuaternion<f64>,
    fx: f64,
    fy: f64,
    cx: f64,
    cy: f64,
}

impl PinholeCamera {
    /// Creates a camera from its extrinsics and intrinsics (focal lengths and principal point in pixels).
    ///
    /// # Errors
    /// Returns [`CameraError::InvalidParameters`] for non-positive focal lengths or a
    /// non-finite principal point.
    pub fn new(
        center: Point3<f64>,
        rotation: UnitQuaternion<f64>,
        fx: f64,
        fy: f64,
        cx: f64,
        cy: f64,
    ) -> Result<Self, CameraError> {
        if !(fx > 0.0 && fy > 0.0) {
            return Err(CameraError::InvalidParameters {
                message: format!("focal lengths must be positive, got fx={fx}, fy={fy}").into(),
                context: None,
            });
        }
        if !(cx.is_finite() && cy.is_finite()) {
            return Err(CameraError::InvalidParameters {
                message: "principal point must be finite".into(),
                context: None,
            });
        }

        Ok(Self { center, rotation, fx, fy, cx, cy })
    }

    /// Builds a camera from its serialized parameters.
    ///
    /// # Errors
    /// Returns [`CameraError::InvalidParameters`] if the quaternion is degenerate or the
    /// intrinsics are invalid.
    pub fn from_params(params: &PinholeParams) -> Result<Self, CameraError> {
        let [w, x, y, z] = params.rotation;
        let quaternion = Quaternion::new(w, x, y, z);
        if quaternion.norm() <= f64::EPSILON {
            return Err(CameraError::InvalidParameters {
                message: "rotation quaternion has zero length".into(),
                context: None,
            });
        }

        Self::new(
            Point3::from(params.center),
            UnitQuaternion::from_quaternion(quaternion),
            params.fx,
            params.fy,
            params.cx,
            params.cy,
        )
    }

    /// Serializable parameters of this camera.
    #[must_use]
    pub fn params(&self) -> PinholeParams {
        let q = self.rotation.quaternion();
        PinholeParams {
            center: [self.center.x, self.center.y, self.center.z],
            rotation: [q.w, q.i, q.j, q.k],
            fx: self.fx,
            fy: self.fy,
            cx: self.cx,
            cy: self.cy,
        }
    }

    /// Loads a camera from a JSON parameter file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or describes an invalid camera.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CameraError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).context(format!("reading {}", path.display()))?;
        let params: PinholeParams =
            serde_json::from_str(&raw).context(format!("parsing {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded pinhole camera");
        Self::from_params(&params).context(format!("validating {}", path.display()))
    }

    /// Writes the camera as a JSON parameter file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CameraError> {
        let path = path.as_ref();
        let raw = serde_json::to_string_pretty(&self.params())?;
        fs::write(path, raw).context(format!("writing {}", path.display()))
    }
}

impl CameraModel for PinholeCamera {
    fn type_name(&self) -> &'static str {
        "pinhole"
    }

    fn point_to_pixel(&self, point: &Point3<f64>) -> Result<Vector2<f64>, CameraError> {
        let local = self.rotation.inverse_transform_vector(&(point - self.center));
        if local.z <= 0.0 {
            return Err(CameraError::BehindCamera { depth: local.z, context: None });
        }

        Ok(Vector2::new(
            self.fx * local.x / local.z + self.cx,
            self.fy * local.y / local.z + self.cy,
        ))
    }

    fn pixel_to_vector(&self, pixel: &Vector2<f64>) -> Result<Unit<Vector3<f64>>, CameraError> {
        let local = Vector3::new((pixel.x - self.cx) / self.fx, (pixel.y - self.cy) / self.fy, 1.0);
        Ok(Unit::new_normalize(self.rotation * local))
    }

    fn camera_center(&self, _pixel: &Vector2<f64>) -> Point3<f64> {
        self.center
    }

    fn camera_pose(&self, _pixel: &Vector2<f64>) -> UnitQuaternion<f64> {
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> PinholeCamera {
        PinholeCamera::new(
            Point3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.1, -0.2, 0.3),
            800.0,
            810.0,
            320.0,
            240.0,
        )
        .unwrap()
    }

    #[test]
    fn projection_and_back_projection_agree() {
        let cam = camera();
        let pixel = Vector2::new(100.0, 400.0);
        let ray = cam.pixel_to_vector(&pixel).unwrap();
        let point = cam.camera_center(&pixel) + ray.into_inner() * 25.0;

        assert_relative_eq!(cam.point_to_pixel(&point).unwrap(), pixel, epsilon = 1e-9);
    }

    #[test]
    fn points_behind_are_rejected() {
        let cam = PinholeCamera::new(
            Point3::origin(),
            UnitQuaternion::identity(),
            500.0,
            500.0,
            0.0,
            0.0,
        )
        .unwrap();
        let err = cam.point_to_pixel(&Point3::new(0.0, 0.0, -5.0)).unwrap_err();
        assert!(matches!(err, CameraError::BehindCamera { .. }));
    }

    #[test]
    fn rejects_degenerate_intrinsics() {
        let err = PinholeCamera::new(
            Point3::origin(),
            UnitQuaternion::identity(),
            0.0,
            500.0,
            0.0,
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, CameraError::InvalidParameters { .. }));
    }

    #[test]
    fn params_round_trip_preserves_geometry() {
        let cam = camera();
        let restored = PinholeCamera::from_params(&cam.params()).unwrap();
        assert_relative_eq!(restored.center, cam.center, epsilon = 1e-12);
        assert_relative_eq!(restored.rotation, cam.rotation, epsilon = 1e-12);
    }
}
