//! SampleChunk: bounded group of consecutively-timestamped samples

use crate::error::{ScopeError, ScopeResult};

/// One acquisition pull worth of multichannel samples.
///
/// Data is stored row-major (sample-major): `data[sample * channels + channel]`,
/// matching the `[n_samples, n_channels]` layout delivered by acquisition
/// sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleChunk {
    data: Vec<f64>,
    channels: usize,
}

impl SampleChunk {
    /// Create a new chunk from row-major data.
    pub fn new(data: Vec<f64>, channels: usize) -> ScopeResult<Self> {
        if channels == 0 {
            return Err(ScopeError::MalformedChunk {
                reason: "channel count must be at least 1".to_string(),
            });
        }
        if data.len() % channels != 0 {
            return Err(ScopeError::MalformedChunk {
                reason: format!(
                    "data length {} is not divisible by channel count {}",
                    data.len(),
                    channels
                ),
            });
        }
        Ok(SampleChunk { data, channels })
    }

    /// Create a single-channel chunk from a sample sequence.
    pub fn single_channel(samples: Vec<f64>) -> Self {
        SampleChunk {
            data: samples,
            channels: 1,
        }
    }

    /// An empty chunk with the given channel count.
    pub fn empty(channels: usize) -> Self {
        SampleChunk {
            data: Vec::new(),
            channels: channels.max(1),
        }
    }

    /// Number of samples per channel.
    pub fn samples(&self) -> usize {
        self.data.len() / self.channels
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// True when the chunk carries no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at a given sample row and channel column.
    #[inline]
    pub fn value(&self, sample: usize, channel: usize) -> f64 {
        self.data[sample * self.channels + channel]
    }

    /// Mutable value at a given sample row and channel column.
    #[inline]
    pub fn value_mut(&mut self, sample: usize, channel: usize) -> &mut f64 {
        &mut self.data[sample * self.channels + channel]
    }

    /// Extract one channel as a contiguous sample sequence.
    pub fn channel(&self, channel: usize) -> ScopeResult<Vec<f64>> {
        if channel >= self.channels {
            return Err(ScopeError::MalformedChunk {
                reason: format!(
                    "channel index {} out of bounds (0-{})",
                    channel,
                    self.channels - 1
                ),
            });
        }
        Ok(self
            .data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
            .collect())
    }

    /// A new chunk with one channel column removed, preserving sample order.
    pub fn without_channel(&self, channel: usize) -> ScopeResult<SampleChunk> {
        if channel >= self.channels {
            return Err(ScopeError::MalformedChunk {
                reason: format!(
                    "channel index {} out of bounds (0-{})",
                    channel,
                    self.channels - 1
                ),
            });
        }
        if self.channels == 1 {
            return Err(ScopeError::MalformedChunk {
                reason: "cannot remove the only channel of a chunk".to_string(),
            });
        }
        let samples = self.samples();
        let mut data = Vec::with_capacity(samples * (self.channels - 1));
        for s in 0..samples {
            for ch in 0..self.channels {
                if ch != channel {
                    data.push(self.value(s, ch));
                }
            }
        }
        Ok(SampleChunk {
            data,
            channels: self.channels - 1,
        })
    }

    /// Raw row-major data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_creation() {
        let chunk = SampleChunk::new((0..6).map(|i| i as f64).collect(), 3).unwrap();
        assert_eq!(chunk.samples(), 2);
        assert_eq!(chunk.channels(), 3);
        assert_eq!(chunk.value(0, 0), 0.0);
        assert_eq!(chunk.value(1, 2), 5.0);
    }

    #[test]
    fn test_chunk_rejects_ragged_data() {
        let result = SampleChunk::new(vec![0.0; 7], 3);
        assert!(matches!(result, Err(ScopeError::MalformedChunk { .. })));
    }

    #[test]
    fn test_channel_extraction() {
        // rows: [0,1], [2,3], [4,5]
        let chunk = SampleChunk::new((0..6).map(|i| i as f64).collect(), 2).unwrap();
        assert_eq!(chunk.channel(0).unwrap(), vec![0.0, 2.0, 4.0]);
        assert_eq!(chunk.channel(1).unwrap(), vec![1.0, 3.0, 5.0]);
        assert!(chunk.channel(2).is_err());
    }

    #[test]
    fn test_without_channel() {
        let chunk = SampleChunk::new((0..9).map(|i| i as f64).collect(), 3).unwrap();
        let stripped = chunk.without_channel(1).unwrap();
        assert_eq!(stripped.channels(), 2);
        assert_eq!(stripped.samples(), 3);
        assert_eq!(stripped.channel(0).unwrap(), vec![0.0, 3.0, 6.0]);
        assert_eq!(stripped.channel(1).unwrap(), vec![2.0, 5.0, 8.0]);
    }

    #[test]
    fn test_single_channel_roundtrip() {
        let chunk = SampleChunk::single_channel(vec![1.0, -2.0, 3.0]);
        assert_eq!(chunk.channels(), 1);
        assert_eq!(chunk.channel(0).unwrap(), vec![1.0, -2.0, 3.0]);
    }
}
