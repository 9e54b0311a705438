pub mod config;
pub mod motion;
#[cfg(feature = "osc")]
pub mod osc;
pub mod pose;
pub mod rig;
