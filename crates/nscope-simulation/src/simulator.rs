//! Simulated multichannel stream with a dedicated trigger channel

use core::f64::consts::PI;
use nscope_core::{AcquisitionSource, SampleChunk, ScopeError, ScopeResult, StreamInfo};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Configuration for the simulated stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Name the stream is exposed under
    pub stream_name: String,
    /// Sampling rate in Hz
    pub sample_rate: f64,
    /// Number of data channels (a trigger channel is added as column 0)
    pub data_channels: usize,
    /// Samples delivered per drain
    pub chunk_samples: usize,
    /// Tone frequency mixed into every data channel (Hz)
    pub tone_hz: f64,
    /// Tone amplitude (uV)
    pub tone_amplitude: f64,
    /// Gaussian noise standard deviation (uV, 0.0 = no noise)
    pub noise_std: f64,
    /// Trigger pulse period in samples
    pub trigger_period: usize,
    /// Trigger pulse width in samples
    pub trigger_width: usize,
    /// Trigger pulse level
    pub trigger_level: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            stream_name: "simulated_eeg".to_string(),
            sample_rate: 250.0,
            data_channels: 4,
            chunk_samples: 25,
            tone_hz: 10.0,
            tone_amplitude: 20.0,
            noise_std: 2.0,
            trigger_period: 250,
            trigger_width: 5,
            trigger_level: 5.0,
            seed: None,
        }
    }
}

/// Synthetic acquisition source: tone + noise data channels and a periodic
/// trigger pulse on a `TRIGGER` channel at column 0.
pub struct SimulatedSource {
    config: SimulatorConfig,
    channel_list: Vec<String>,
    rng: StdRng,
    noise: Normal<f64>,
    // sample counter across the whole stream lifetime
    clock: u64,
}

impl SimulatedSource {
    pub fn new(config: SimulatorConfig) -> ScopeResult<Self> {
        if config.sample_rate <= 0.0 || config.data_channels == 0 {
            return Err(ScopeError::Source {
                message: "simulator needs a positive sample rate and at least one data channel"
                    .to_string(),
            });
        }
        let noise = Normal::new(0.0, config.noise_std.max(0.0)).map_err(|e| {
            ScopeError::Source {
                message: format!("invalid noise configuration: {}", e),
            }
        })?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut channel_list = vec!["TRIGGER".to_string()];
        channel_list.extend((1..=config.data_channels).map(|i| format!("CH{}", i)));
        Ok(SimulatedSource {
            config,
            channel_list,
            rng,
            noise,
            clock: 0,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    fn trigger_value(&self, sample_index: u64) -> f64 {
        let phase = (sample_index as usize) % self.config.trigger_period.max(1);
        if phase < self.config.trigger_width {
            self.config.trigger_level
        } else {
            0.0
        }
    }
}

impl AcquisitionSource for SimulatedSource {
    fn stream_names(&self) -> Vec<String> {
        vec![self.config.stream_name.clone()]
    }

    fn stream_info(&self, stream_name: &str) -> Option<StreamInfo> {
        if stream_name != self.config.stream_name {
            return None;
        }
        Some(StreamInfo {
            sample_rate: self.config.sample_rate,
            channel_list: self.channel_list.clone(),
        })
    }

    fn acquire(&mut self) -> ScopeResult<()> {
        // A live source would block on its transport here; the simulator
        // synthesizes on drain instead.
        Ok(())
    }

    fn drain_chunk(&mut self, stream_name: &str) -> ScopeResult<(SampleChunk, Vec<f64>)> {
        if stream_name != self.config.stream_name {
            return Err(ScopeError::UnknownStream {
                name: stream_name.to_string(),
            });
        }
        let channels = self.config.data_channels + 1;
        let n = self.config.chunk_samples;
        let mut data = Vec::with_capacity(n * channels);
        let mut timestamps = Vec::with_capacity(n);
        for s in 0..n {
            let index = self.clock + s as u64;
            let t = index as f64 / self.config.sample_rate;
            timestamps.push(t);
            data.push(self.trigger_value(index));
            for ch in 0..self.config.data_channels {
                let phase = ch as f64 * PI / 8.0;
                let tone =
                    self.config.tone_amplitude * (2.0 * PI * self.config.tone_hz * t + phase).sin();
                data.push(tone + self.noise.sample(&mut self.rng));
            }
        }
        self.clock += n as u64;
        Ok((SampleChunk::new(data, channels)?, timestamps))
    }
}
