use crate::camera::IsisCameraModel;
use crate::error::{IsisError, IsisErrorExt};
use asp_kernel::camera::{CameraError, CameraModel, PinholeCamera, PinholeParams};
use nalgebra::{Point3, Quaternion, Unit, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Position offset and rotation correction applied on top of an ISIS camera, as produced
/// by bundle adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AdjustmentFile", into = "AdjustmentFile")]
pub struct Adjustment {
    position: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
}

/// JSON layout of an adjustment file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct AdjustmentFile {
    position: [f64; 3],
    /// `[w, x, y, z]`
    rotation: [f64; 4],
}

impl TryFrom<AdjustmentFile> for Adjustment {
    type Error = IsisError;

    fn try_from(file: AdjustmentFile) -> Result<Self, Self::Error> {
        let [w, x, y, z] = file.rotation;
        let quaternion = Quaternion::new(w, x, y, z);
        if quaternion.norm() <= f64::EPSILON {
            return Err(IsisError::invalid("rotation", format!("{:?}", file.rotation)));
        }
        Ok(Self::new(Vector3::from(file.position), UnitQuaternion::from_quaternion(quaternion)))
    }
}

impl From<Adjustment> for AdjustmentFile {
    fn from(adjustment: Adjustment) -> Self {
        let q = adjustment.rotation.quaternion();
        Self { position: adjustment.position.into(), rotation: [q.w, q.i, q.j, q.k] }
    }
}

impl Default for Adjustment {
    fn default() -> Self {
        Self::identity()
    }
}

impl Adjustment {
    #[must_use]
    pub const fn new(position: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { position, rotation }
    }

    /// No offset, no rotation.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    #[must_use]
    pub const fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    #[must_use]
    pub const fn rotation(&self) -> &UnitQuaternion<f64> {
        &self.rotation
    }

    /// Reads a JSON adjustment file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not describe a valid adjustment.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, IsisError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).context(format!("reading {}", path.display()))?;
        let adjustment = serde_json::from_str(&raw).context(format!("parsing {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded camera adjustment");
        Ok(adjustment)
    }

    /// Writes the adjustment as JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), IsisError> {
        let path = path.as_ref();
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).context(format!("writing {}", path.display()))
    }

    /// Conventional location of the adjustment for `cube`: `<dir>/<cube stem>.<extension>`,
    /// where `dir` defaults to the cube's own directory.
    #[must_use]
    pub fn path_for(cube: &Path, dir: Option<&Path>, extension: &str) -> PathBuf {
        let stem = cube.file_stem().unwrap_or(cube.as_os_str());
        let dir = dir.or_else(|| cube.parent()).unwrap_or_else(|| Path::new(""));
        dir.join(format!("{}.{extension}", stem.to_string_lossy()))
    }
}

/// An [`IsisCameraModel`] with an [`Adjustment`] applied.
///
/// The adjusted center is `center + position`, the adjusted pose `rotation * pose`.
#[derive(Debug, Clone, PartialEq)]
pub struct IsisAdjustCameraModel {
    camera: IsisCameraModel,
    adjustment: Adjustment,
    adjusted: PinholeCamera,
}

impl IsisAdjustCameraModel {
    /// Applies `adjustment` to `camera`.
    ///
    /// # Errors
    /// Returns an error if the adjusted camera is degenerate.
    pub fn new(camera: IsisCameraModel, adjustment: Adjustment) -> Result<Self, IsisError> {
        let base = camera.pinhole().params();
        let center = Point3::from(base.center) + adjustment.position;
        let pose = adjustment.rotation * camera.camera_pose(&Vector2::zeros());
        let q = pose.quaternion();

        let params = PinholeParams {
            center: [center.x, center.y, center.z],
            rotation: [q.w, q.i, q.j, q.k],
            ..base
        };
        let adjusted = PinholeCamera::from_params(&params).context("applying adjustment")?;

        Ok(Self { camera, adjustment, adjusted })
    }

    /// Opens `cube` and applies the adjustment stored at `adjustment`, if given.
    ///
    /// # Errors
    /// Returns an error if either file cannot be read.
    pub fn open(cube: impl AsRef<Path>, adjustment: Option<&Path>) -> Result<Self, IsisError> {
        let camera = IsisCameraModel::open(cube)?;
        let adjustment = adjustment.map_or_else(|| Ok(Adjustment::identity()), Adjustment::read)?;
        Self::new(camera, adjustment)
    }

    #[must_use]
    pub const fn camera(&self) -> &IsisCameraModel {
        &self.camera
    }

    #[must_use]
    pub const fn adjustment(&self) -> &Adjustment {
        &self.adjustment
    }
}

impl CameraModel for IsisAdjustCameraModel {
    fn type_name(&self) -> &'static str {
        "isis_adjust"
    }

    fn point_to_pixel(&self, point: &Point3<f64>) -> Result<Vector2<f64>, CameraError> {
        self.adjusted.point_to_pixel(point)
    }

    fn pixel_to_vector(&self, pixel: &Vector2<f64>) -> Result<Unit<Vector3<f64>>, CameraError> {
        self.adjusted.pixel_to_vector(pixel)
    }

    fn camera_center(&self, pixel: &Vector2<f64>) -> Point3<f64> {
        self.adjusted.camera_center(pixel)
    }

    fn camera_pose(&self, pixel: &Vector2<f64>) -> UnitQuaternion<f64> {
        self.adjusted.camera_pose(pixel)
    }
}
