//! ISIS cube support: PVL labels, pixel access and frame camera models.
//!
//! This crate is the optional ISIS capability. Applications do not depend on it directly;
//! they reach it through `asp::isis_io`, which only exists when the `asp/isis` feature is
//! enabled.
//!
//! ```rust,no_run
//! use asp_isis::{DiskImageResourceIsis, PixelBox};
//!
//! let cube = DiskImageResourceIsis::open("left.cub")?;
//! let window = cube.read(PixelBox::new(0, 0, 16, 16))?;
//! println!("{} valid samples", window.valid_count());
//! # Ok::<(), asp_isis::IsisError>(())
//! ```
mod adjust;
mod camera;
pub mod cube;
mod error;
mod image;
pub mod pvl;
mod resource;

pub use adjust::{Adjustment, IsisAdjustCameraModel};
pub use camera::IsisCameraModel;
pub use cube::{ByteOrder, CubeFormat, CubeLabel, PixelType, SpecialPixel};
pub use error::{IsisError, IsisErrorExt};
pub use image::{ImageBuffer, ImageStats, PixelBox};
pub use pvl::Pvl;
pub use resource::DiskImageResourceIsis;
