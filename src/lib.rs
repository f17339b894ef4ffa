//! # tunnelfx
//!
//! A decorative particle tunnel flythrough, rendered on the GPU.
//!
//! A closed Catmull-Rom path is swept with rings of colored particles to form
//! a tube, and a perspective camera flies along the path looking slightly
//! ahead, so the viewer endlessly falls down a twisting rainbow tunnel. The
//! geometry is built once; only the camera moves.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tunnelfx::prelude::*;
//!
//! fn main() -> Result<(), tunnelfx::TunnelError> {
//!     Tunnel::new()
//!         .with_fps(30)
//!         .with_palette(Palette::HueWheel { cycles: 4.0 })
//!         .run()
//! }
//! ```
//!
//! ## Anatomy of the effect
//!
//! - [`path::TunnelPath`]: a closed centripetal Catmull-Rom spline through
//!   the circuit waypoints, with arc-length parameterization and moving
//!   Frenet frames.
//! - [`tube::sweep`]: rings of particles placed around the path in each
//!   station's normal/binormal plane, slowly twisting along the tube and
//!   colored by a [`Palette`].
//! - [`camera::FlightCamera`]: rides the path with its eye at the current
//!   arc-length fraction and its look-at target a little further along.
//! - [`time::FrameLimiter`]: throttles the event loop's redraw storm down to
//!   a fixed frame rate without drifting.
//! - [`Tunnel`]: the builder tying it all together; `run()` opens a winit
//!   window and renders with wgpu until closed.
//!
//! The windowless core ([`TunnelEffect`]) is fully usable without a GPU,
//! which is how the integration tests exercise the flight.

pub mod camera;
pub mod error;
mod gpu;
pub mod path;
pub mod shader;
pub mod time;
pub mod tube;
mod tunnel;
pub mod visuals;

pub use camera::FlightCamera;
pub use error::{GpuError, TunnelError};
pub use glam::Vec3;
pub use path::{FrenetFrames, TunnelPath, DEFAULT_WAYPOINTS};
pub use time::{Clock, FrameLimiter};
pub use tube::TubeParticle;
pub use tunnel::{Tunnel, TunnelEffect};
pub use visuals::{hsl_to_rgb, Fog, Palette};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::camera::FlightCamera;
    pub use crate::error::TunnelError;
    pub use crate::path::TunnelPath;
    pub use crate::tunnel::{Tunnel, TunnelEffect};
    pub use crate::visuals::{Fog, Palette};
    pub use crate::Vec3;
}
