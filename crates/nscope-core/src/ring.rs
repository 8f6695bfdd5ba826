//! Fixed-capacity rolling history for one or more time-aligned channels

use crate::chunk::SampleChunk;
use crate::error::{ScopeError, ScopeResult};

/// Fixed-capacity, time-ordered storage for parallel channel rows.
///
/// All rows share one circular write cursor, so channels can never drift out
/// of alignment. The buffer always holds exactly `capacity` samples per
/// channel; positions that no real sample has reached yet stay at their
/// initial zero, which a consumer must not mistake for signal.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    // channel-major: data[channel * capacity + slot]
    data: Vec<f64>,
    channels: usize,
    capacity: usize,
    // next write slot; also the oldest retained sample
    head: usize,
}

impl RingBuffer {
    /// Allocate a zeroed buffer of `capacity` samples for `channels` rows.
    pub fn new(channels: usize, capacity: usize) -> Self {
        let channels = channels.max(1);
        let capacity = capacity.max(1);
        RingBuffer {
            data: vec![0.0; channels * capacity],
            channels,
            capacity,
            head: 0,
        }
    }

    /// Capacity in samples per channel.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of channel rows.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Append a chunk, evicting the oldest samples.
    ///
    /// A chunk longer than the capacity is truncated to its most recent
    /// `capacity` samples; the earlier portion is unobservable and dropped
    /// without error.
    pub fn append(&mut self, chunk: &SampleChunk) -> ScopeResult<()> {
        if chunk.channels() != self.channels {
            return Err(ScopeError::ChannelMismatch {
                expected: self.channels,
                actual: chunk.channels(),
            });
        }
        let n = chunk.samples();
        let skip = n.saturating_sub(self.capacity);
        for s in skip..n {
            for ch in 0..self.channels {
                self.data[ch * self.capacity + self.head] = chunk.value(s, ch);
            }
            self.head = (self.head + 1) % self.capacity;
        }
        Ok(())
    }

    /// Append a sample sequence to a single-row buffer.
    pub fn append_samples(&mut self, samples: &[f64]) -> ScopeResult<()> {
        if self.channels != 1 {
            return Err(ScopeError::ChannelMismatch {
                expected: self.channels,
                actual: 1,
            });
        }
        let skip = samples.len().saturating_sub(self.capacity);
        for &x in &samples[skip..] {
            self.data[self.head] = x;
            self.head = (self.head + 1) % self.capacity;
        }
        Ok(())
    }

    /// One channel row in chronological order, oldest first.
    pub fn channel(&self, channel: usize) -> Vec<f64> {
        let row = &self.data[channel * self.capacity..(channel + 1) * self.capacity];
        let mut out = Vec::with_capacity(self.capacity);
        out.extend_from_slice(&row[self.head..]);
        out.extend_from_slice(&row[..self.head]);
        out
    }

    /// All channel rows in chronological order.
    pub fn snapshot(&self) -> Vec<Vec<f64>> {
        (0..self.channels).map(|ch| self.channel(ch)).collect()
    }
}
