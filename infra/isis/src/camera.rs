use crate::error::{IsisError, IsisErrorExt};
use crate::pvl::{Pvl, PvlGroup};
use crate::resource::DiskImageResourceIsis;
use asp_kernel::camera::{CameraError, CameraModel, PinholeCamera, PinholeParams};
use nalgebra::{Point3, Unit, UnitQuaternion, Vector2, Vector3};
use std::path::Path;

/// Frame camera described by the `IsisCube/Instrument` group of a cube label.
///
/// Recognised keywords:
/// * `FocalLength` and `PixelPitch`, both in millimetres;
/// * `BoresightSample` / `BoresightLine`, 1-based, defaulting to the image center;
/// * `InstrumentPosition = (x, y, z)` in world coordinates;
/// * `InstrumentRotation = (w, x, y, z)`, camera-to-world.
#[derive(Debug, Clone, PartialEq)]
pub struct IsisCameraModel {
    pinhole: PinholeCamera,
    focal_length_mm: f64,
    pixel_pitch_mm: f64,
}

impl IsisCameraModel {
    /// Opens a cube and builds its camera.
    ///
    /// # Errors
    /// Returns an error if the cube cannot be opened or lacks a usable `Instrument` group.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IsisError> {
        let path = path.as_ref();
        let resource = DiskImageResourceIsis::open(path)?;
        Self::from_resource(&resource).context(path.display().to_string())
    }

    /// Builds the camera of an already opened cube.
    ///
    /// # Errors
    /// Returns an error if the label lacks a usable `Instrument` group.
    pub fn from_resource(resource: &DiskImageResourceIsis) -> Result<Self, IsisError> {
        Self::from_label(resource.pvl(), resource.cols(), resource.rows())
    }

    /// Builds the camera from a label and the image size it applies to.
    ///
    /// # Errors
    /// Returns an error if keywords are missing, malformed or describe a degenerate camera.
    pub fn from_label(pvl: &Pvl, cols: usize, rows: usize) -> Result<Self, IsisError> {
        let instrument = pvl.root().require_object("IsisCube")?.require_group("Instrument")?;

        let focal_length_mm: f64 = positive(instrument, "FocalLength")?;
        let pixel_pitch_mm: f64 = positive(instrument, "PixelPitch")?;
        let focal_pixels = focal_length_mm / pixel_pitch_mm;

        let cx = boresight(instrument, "BoresightSample", cols)?;
        let cy = boresight(instrument, "BoresightLine", rows)?;

        let center: [f64; 3] = fixed_list(instrument, "InstrumentPosition")?;
        let rotation: [f64; 4] = fixed_list(instrument, "InstrumentRotation")?;

        let params = PinholeParams { center, rotation, fx: focal_pixels, fy: focal_pixels, cx, cy };
        let pinhole = PinholeCamera::from_params(&params).context("IsisCube/Instrument")?;

        Ok(Self { pinhole, focal_length_mm, pixel_pitch_mm })
    }

    #[must_use]
    pub const fn focal_length_mm(&self) -> f64 {
        self.focal_length_mm
    }

    #[must_use]
    pub const fn pixel_pitch_mm(&self) -> f64 {
        self.pixel_pitch_mm
    }

    /// Principal point in 0-based pixels.
    #[must_use]
    pub fn boresight(&self) -> Vector2<f64> {
        let params = self.pinhole.params();
        Vector2::new(params.cx, params.cy)
    }

    /// The equivalent ideal pinhole camera.
    #[must_use]
    pub const fn pinhole(&self) -> &PinholeCamera {
        &self.pinhole
    }
}

impl CameraModel for IsisCameraModel {
    fn type_name(&self) -> &'static str {
        "isis"
    }

    fn point_to_pixel(&self, point: &Point3<f64>) -> Result<Vector2<f64>, CameraError> {
        self.pinhole.point_to_pixel(point)
    }

    fn pixel_to_vector(&self, pixel: &Vector2<f64>) -> Result<Unit<Vector3<f64>>, CameraError> {
        self.pinhole.pixel_to_vector(pixel)
    }

    fn camera_center(&self, pixel: &Vector2<f64>) -> Point3<f64> {
        self.pinhole.camera_center(pixel)
    }

    fn camera_pose(&self, pixel: &Vector2<f64>) -> UnitQuaternion<f64> {
        self.pinhole.camera_pose(pixel)
    }
}

fn positive(group: &PvlGroup, name: &'static str) -> Result<f64, IsisError> {
    let keyword = group.require(name)?;
    let value: f64 = keyword.parse()?;
    if !(value.is_finite() && value > 0.0) {
        return Err(IsisError::invalid(name, keyword.value().unwrap_or_default()));
    }
    Ok(value)
}

fn boresight(group: &PvlGroup, name: &'static str, extent: usize) -> Result<f64, IsisError> {
    match group.keyword(name) {
        Some(keyword) => Ok(keyword.parse::<f64>()? - 1.0),
        None => Ok((extent as f64 - 1.0) / 2.0),
    }
}

fn fixed_list<const N: usize>(group: &PvlGroup, name: &'static str) -> Result<[f64; N], IsisError> {
    let keyword = group.require(name)?;
    let values = keyword.parse_all::<f64>()?;
    values
        .try_into()
        .map_err(|values: Vec<f64>| IsisError::invalid(name, format!("{} values, expected {N}", values.len())))
}
