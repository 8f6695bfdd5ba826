//! NScope-Processing: Online conditioning stages for streaming biosignals
//!
//! Band-pass filtering with cross-chunk continuity, common-average
//! referencing and trigger edge cleanup.

pub mod bandpass;
pub mod car;
pub mod trigger;

pub use bandpass::{BandpassConfig, StreamingBandpass, DEFAULT_BP_ORDER};
pub use car::CommonAverageReference;
pub use trigger::TriggerConditioner;
