pub mod actions;
pub mod distance;
pub mod select;
#[cfg(feature = "explore")]
pub mod stoch;

pub use actions::*;
pub use distance::*;
pub use select::*;
