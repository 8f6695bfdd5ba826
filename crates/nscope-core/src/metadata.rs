//! Immutable facts about a connected stream

use crate::error::{ScopeError, ScopeResult};
use serde::{Deserialize, Serialize};

/// Facts derived once at scope construction and frozen thereafter.
///
/// `channel_labels` lists the data channels only; the trigger channel is
/// removed. When no trigger channel was identified, column 0 of the raw
/// stream is treated as the trigger and its label is likewise excluded, so
/// labels, buffers and the update-cycle split always agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMetadata {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Ordered data-channel labels, trigger channel excluded
    pub channel_labels: Vec<String>,
    /// Raw-stream index of the trigger channel, if the classifier found one
    pub trigger_channel: Option<usize>,
}

impl StreamMetadata {
    /// Derive metadata from the raw channel list of a stream.
    pub fn from_channel_list(
        sample_rate: f64,
        channel_list: &[String],
        trigger_channel: Option<usize>,
    ) -> ScopeResult<Self> {
        let rate = sample_rate as u32;
        if rate == 0 {
            return Err(ScopeError::Source {
                message: format!("stream reports a non-positive sample rate ({})", sample_rate),
            });
        }
        if channel_list.len() < 2 {
            return Err(ScopeError::Source {
                message: format!(
                    "stream exposes {} channel(s); at least a trigger and one data channel are required",
                    channel_list.len()
                ),
            });
        }
        let effective = trigger_channel.unwrap_or(0);
        let channel_labels = channel_list
            .iter()
            .enumerate()
            .filter(|(k, _)| *k != effective)
            .map(|(_, label)| label.clone())
            .collect();
        Ok(StreamMetadata {
            sample_rate: rate,
            channel_labels,
            trigger_channel,
        })
    }

    /// Raw-stream column used as the trigger: the classified channel, or
    /// column 0 as the fallback.
    pub fn effective_trigger_index(&self) -> usize {
        self.trigger_channel.unwrap_or(0)
    }

    /// Number of data channels (trigger excluded).
    pub fn n_channels(&self) -> usize {
        self.channel_labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_trigger_label_removed() {
        let meta = StreamMetadata::from_channel_list(
            512.0,
            &labels(&["Fp1", "TRIGGER", "Fp2"]),
            Some(1),
        )
        .unwrap();
        assert_eq!(meta.sample_rate, 512);
        assert_eq!(meta.channel_labels, labels(&["Fp1", "Fp2"]));
        assert_eq!(meta.effective_trigger_index(), 1);
        assert_eq!(meta.n_channels(), 2);
    }

    #[test]
    fn test_unresolved_trigger_falls_back_to_column_zero() {
        let meta =
            StreamMetadata::from_channel_list(512.0, &labels(&["C3", "C4", "Cz"]), None).unwrap();
        assert_eq!(meta.effective_trigger_index(), 0);
        // the fallback trigger's label is excluded to keep shapes consistent
        assert_eq!(meta.channel_labels, labels(&["C4", "Cz"]));
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let result = StreamMetadata::from_channel_list(0.0, &labels(&["TRIGGER", "C3"]), Some(0));
        assert!(matches!(result, Err(ScopeError::Source { .. })));
    }
}
