pub mod sdk;
pub mod converter;
pub mod scoring;
pub mod simulator;

pub use sdk::*;
