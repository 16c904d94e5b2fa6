use crate::error::{StereoError, StereoErrorExt};
use asp::kernel::camera::CameraModel;
use nalgebra::{Point3, Vector2};

/// Rays closer to parallel than this (sine squared of the angle) do not triangulate.
const MIN_SIN2_ANGLE: f64 = 1e-12;

/// A triangulated ground point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangulation {
    /// Midpoint of the closest approach between the two rays.
    pub point: Point3<f64>,
    /// Distance between the rays at closest approach.
    pub error: f64,
}

/// Intersects the rays through `left_px` and `right_px`.
///
/// # Errors
/// Returns [`StereoError::NoIntersection`] for parallel rays or rays that meet behind a
/// camera, and [`StereoError::Camera`] if either camera cannot back-project its pixel.
pub fn triangulate(
    left: &dyn CameraModel,
    left_px: &Vector2<f64>,
    right: &dyn CameraModel,
    right_px: &Vector2<f64>,
) -> Result<Triangulation, StereoError> {
    let c1 = left.camera_center(left_px);
    let c2 = right.camera_center(right_px);
    let d1 = left.pixel_to_vector(left_px).context("left camera")?.into_inner();
    let d2 = right.pixel_to_vector(right_px).context("right camera")?.into_inner();

    // Closest points c1 + s*d1 and c2 + t*d2 on two unit-direction lines.
    let w0 = c1 - c2;
    let b = d1.dot(&d2);
    let d = d1.dot(&w0);
    let e = d2.dot(&w0);
    let denom = 1.0 - b * b;
    if denom < MIN_SIN2_ANGLE {
        return Err(StereoError::no_intersection("rays are parallel"));
    }

    let s = (b * e - d) / denom;
    let t = (e - b * d) / denom;
    if s < 0.0 || t < 0.0 {
        return Err(StereoError::no_intersection(format!(
            "rays converge behind the cameras (s={s:.3}, t={t:.3})"
        )));
    }

    let p1 = c1 + d1 * s;
    let p2 = c2 + d2 * t;
    Ok(Triangulation { point: nalgebra::center(&p1, &p2), error: (p1 - p2).norm() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use asp::kernel::camera::PinholeCamera;
    use nalgebra::UnitQuaternion;

    fn camera_at(x: f64, y: f64) -> PinholeCamera {
        PinholeCamera::new(Point3::new(x, y, 0.0), UnitQuaternion::identity(), 100.0, 100.0, 50.0, 50.0)
            .unwrap()
    }

    fn camera(x: f64) -> PinholeCamera {
        camera_at(x, 0.0)
    }

    #[test]
    fn intersecting_rays_meet_exactly() {
        let (left, right) = (camera(-1.0), camera(1.0));
        let target = Point3::new(0.5, -0.25, 10.0);
        let lp = left.point_to_pixel(&target).unwrap();
        let rp = right.point_to_pixel(&target).unwrap();

        let hit = triangulate(&left, &lp, &right, &rp).unwrap();
        assert_relative_eq!(hit.point, target, epsilon = 1e-9);
        assert!(hit.error < 1e-9);
    }

    #[test]
    fn skew_rays_report_their_gap() {
        // Cameras one unit apart in y; each ray stays in its own y plane.
        let (left, right) = (camera(-1.0), camera_at(1.0, 1.0));
        let lp = left.point_to_pixel(&Point3::new(0.0, 0.0, 10.0)).unwrap();
        let rp = right.point_to_pixel(&Point3::new(0.0, 1.0, 10.0)).unwrap();

        let hit = triangulate(&left, &lp, &right, &rp).unwrap();
        assert_relative_eq!(hit.error, 1.0, epsilon = 1e-9);
        assert_relative_eq!(hit.point, Point3::new(0.0, 0.5, 10.0), epsilon = 1e-9);
    }

    #[test]
    fn parallel_and_diverging_rays_are_rejected() {
        let (left, right) = (camera(-1.0), camera(1.0));
        let center = Vector2::new(50.0, 50.0);
        let err = triangulate(&left, &center, &right, &center).unwrap_err();
        assert!(err.to_string().contains("parallel"), "{err}");

        // Left ray points left, right ray points right.
        let err = triangulate(&left, &Vector2::new(0.0, 50.0), &right, &Vector2::new(100.0, 50.0)).unwrap_err();
        assert!(err.to_string().contains("behind"), "{err}");
    }
}
