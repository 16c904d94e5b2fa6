//! Facade crate for the Ames Stereo Pipeline toolkit.
//! Re-exports domain/kernel primitives and owns the capability gate for optional subsystems.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `asp` with the desired feature flags (`isis`, or `full`).
//! - Query [`capabilities`] at runtime; reach the ISIS reader through `isis_io` when the
//!   feature is on. Without it, `isis_io` does not exist and naming it fails to compile.
//!
//! ## Consumers
//! Crates that reference gated items must not guess the flag. They read it back from this
//! crate's build metadata in their own `build.rs`:
//!
//! ```rust,ignore
//! fn main() {
//!     println!("cargo:rustc-check-cfg=cfg(asp_isis)");
//!     if std::env::var("DEP_ASP_ISIS").as_deref() == Ok("1") {
//!         println!("cargo:rustc-cfg=asp_isis");
//!     }
//! }
//! ```
//!
//! and gate on `#[cfg(asp_isis)]`. The metadata comes from the same `asp` build the consumer
//! links against, so both sides always agree.

pub use asp_domain as domain;
pub use asp_kernel as kernel;

/// Capability registry for runtime introspection.
pub mod capabilities {
    use asp_domain::capabilities::{CapabilitySet, CapabilityStatus};

    /// Whether the ISIS cube reader and camera models are compiled in.
    ///
    /// When it is `false`, `asp::isis_io` is absent and importing from it is an
    /// unresolved-import error:
    ///
    #[cfg_attr(feature = "isis", doc = "```no_run")]
    #[cfg_attr(not(feature = "isis"), doc = "```compile_fail,E0432")]
    /// use asp::isis_io::{DiskImageResourceIsis, IsisAdjustCameraModel, IsisCameraModel};
    ///
    /// let cube = DiskImageResourceIsis::open("left.cub")?;
    /// let camera = IsisCameraModel::from_resource(&cube)?;
    /// let _adjusted = IsisAdjustCameraModel::new(camera, Default::default())?;
    /// # Ok::<(), asp::isis_io::IsisError>(())
    /// ```
    pub const ISIS_ENABLED: bool = cfg!(feature = "isis");

    /// Build-time enabled capabilities (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "isis")]
        asp_domain::constants::ISIS,
    ];

    #[must_use]
    pub const fn isis_enabled() -> bool {
        ISIS_ENABLED
    }

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }

    /// [`ENABLED`] as a flag set.
    #[must_use]
    pub fn enabled_set() -> CapabilitySet {
        ENABLED.iter().map(|name| CapabilitySet::from(*name)).collect()
    }

    /// Every known capability with its presence in this build.
    #[must_use]
    pub fn report() -> Vec<CapabilityStatus> {
        let enabled = enabled_set();
        CapabilitySet::KNOWN
            .iter()
            .map(|(name, flag)| CapabilityStatus { name: *name, present: enabled.contains(*flag) })
            .collect()
    }
}

/// ISIS cube access and ISIS camera models.
#[cfg(feature = "isis")]
pub mod isis_io {
    pub use asp_isis::{
        Adjustment, DiskImageResourceIsis, ImageBuffer, IsisAdjustCameraModel, IsisCameraModel,
        IsisError, PixelBox,
    };
}
