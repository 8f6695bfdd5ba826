//! Trigger-channel cleanup: collapse sustained levels into edge markers

use serde::{Deserialize, Serialize};

/// Default tolerance below which two successive samples count as duplicates.
pub const DEFAULT_TRIGGER_TOLERANCE: f64 = 0.05;

/// Converts a noisy scalar trigger channel into clean edge markers.
///
/// A sample is zeroed when it differs from the raw sample immediately before
/// it by no more than the tolerance, so a held trigger level survives only at
/// its first occurrence. The transform is chunk-local: the first sample of
/// every chunk is compared against an assumed previous value of 0, not the
/// tail of the prior chunk, so a level held across a chunk boundary is
/// re-reported at the start of the next chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerConditioner {
    tolerance: f64,
}

impl Default for TriggerConditioner {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TRIGGER_TOLERANCE,
        }
    }
}

impl TriggerConditioner {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Clean one trigger chunk, returning a sequence of the same length.
    pub fn clean(&self, trigger: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(trigger.len());
        let mut prev = 0.0;
        for &x in trigger {
            if (x - prev).abs() <= self.tolerance {
                out.push(0.0);
            } else {
                out.push(x);
            }
            prev = x;
        }
        out
    }
}
