// src/drivers/mod.rs

// Loops that drive the collaborators. Exploration is feature-gated so
// calibration-only builds skip the RNG stack.

pub mod calibrate;
pub use calibrate::*;

#[cfg(feature = "explore")]
pub mod explore;

#[cfg(feature = "explore")]
pub use explore::*;
