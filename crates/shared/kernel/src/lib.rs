//! Kernel utilities shared across slices.
//! Keep this crate lightweight: configuration loading plus the camera abstraction every
//! session builds on. Nothing here depends on optional capabilities, so it compiles
//! identically with and without ISIS.
//!
//! ## Camera models
//! ```rust
//! use asp_kernel::camera::{CameraModel, PinholeCamera};
//! use asp_kernel::nalgebra::{Point3, UnitQuaternion, Vector2};
//!
//! let camera = PinholeCamera::new(Point3::origin(), UnitQuaternion::identity(), 1000.0, 1000.0, 512.0, 512.0)
//!     .unwrap();
//! let pixel = camera.point_to_pixel(&Point3::new(0.0, 0.0, 10.0)).unwrap();
//! assert_eq!(pixel, Vector2::new(512.0, 512.0));
//! ```
//!
//! ## Config loading (non-wasm)
//! ```rust,ignore
//! use asp_kernel::config::load_config;
//! use asp_kernel::domain::config::AspConfig;
//!
//! let cfg: AspConfig = load_config(Some("asp.toml")).unwrap();
//! ```
pub mod camera;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod error;
pub mod prelude;

pub use asp_domain as domain;
pub use nalgebra;
