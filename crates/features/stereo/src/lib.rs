//! Stereo feature slice: session selection and ray triangulation.
//!
//! ISIS sessions exist only when the `asp` facade was built with its `isis` feature. This
//! crate learns that through `cfg(asp_isis)`, set by `build.rs` from the facade's link
//! metadata, so it can never disagree with the `asp` it links against.

mod error;
mod session;
mod triangulation;

pub use crate::error::{StereoError, StereoErrorExt};
#[cfg(asp_isis)]
pub use crate::session::IsisSession;
pub use crate::session::{
    PinholeSession, SessionInputs, SessionKind, StereoSession, available_sessions, isis_supported, open_session,
};
pub use crate::triangulation::{Triangulation, triangulate};
