//! Per-signal-type conditioning seam
//!
//! The scope lifecycle is shared; how a signal type derives its metadata,
//! sizes its history and conditions each chunk is not. `SignalConditioning`
//! makes those hooks an explicit capability implemented per signal type, with
//! `EegConditioning` as the stock variant.

use crate::classify::ChannelClassifier;
use nscope_core::{
    RingBuffer, SampleChunk, ScopeError, ScopeResult, StreamInfo, StreamMetadata,
};
use nscope_processing::{
    BandpassConfig, CommonAverageReference, StreamingBandpass, TriggerConditioner,
};
use serde::{Deserialize, Serialize};

/// Conditioning toggles, mutable at any time; effective on the next cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeSettings {
    /// Re-reference against the selected channel subset each cycle
    pub apply_car: bool,
    /// Band-pass the data channels each cycle (requires a configured filter)
    pub apply_bandpass: bool,
    /// Data-channel indices averaged for CAR; fewer than 2 disables CAR
    pub selected_channels: Vec<usize>,
}

/// History buffers owned by a scope: data rows plus a trigger row.
#[derive(Debug, Clone)]
pub struct ScopeBuffers {
    pub data: RingBuffer,
    pub trigger: RingBuffer,
}

/// Output of conditioning one raw chunk.
#[derive(Debug, Clone)]
pub struct ConditionedChunk {
    /// Conditioned data columns, trigger removed
    pub data: SampleChunk,
    /// Cleaned trigger column, edges only
    pub trigger: Vec<f64>,
}

/// Signal-type-specific hooks of the scope lifecycle.
pub trait SignalConditioning {
    /// Derive the immutable stream facts, separating the event channel out of
    /// the data-channel list.
    fn extract_metadata(
        &self,
        info: &StreamInfo,
        classifier: &dyn ChannelClassifier,
    ) -> ScopeResult<StreamMetadata>;

    /// Allocate rolling history sized for `duration_secs` of signal.
    fn allocate_buffers(&self, metadata: &StreamMetadata, duration_secs: f64) -> ScopeBuffers;

    /// Condition one raw chunk into appendable data and trigger sequences.
    fn condition_chunk(
        &mut self,
        settings: &ScopeSettings,
        raw: &SampleChunk,
        metadata: &StreamMetadata,
    ) -> ScopeResult<ConditionedChunk>;
}

/// Stock EEG conditioning: streaming band-pass, subset CAR and trigger
/// duplicate-collapse.
#[derive(Debug, Clone, Default)]
pub struct EegConditioning {
    bandpass: Option<StreamingBandpass>,
    car: CommonAverageReference,
    trigger: TriggerConditioner,
}

impl EegConditioning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Design (or redesign) the band-pass filter. Redesign always starts from
    /// an uninitialized recursive state.
    pub fn configure_bandpass(
        &mut self,
        config: BandpassConfig,
        sample_rate: f64,
    ) -> ScopeResult<()> {
        match self.bandpass.as_mut() {
            Some(filter) => filter.configure(config, sample_rate),
            None => {
                self.bandpass = Some(StreamingBandpass::new(config, sample_rate)?);
                Ok(())
            }
        }
    }

    /// Current band-pass configuration, if one has been designed.
    pub fn bandpass_config(&self) -> Option<BandpassConfig> {
        self.bandpass.as_ref().map(|f| f.config())
    }
}

impl SignalConditioning for EegConditioning {
    fn extract_metadata(
        &self,
        info: &StreamInfo,
        classifier: &dyn ChannelClassifier,
    ) -> ScopeResult<StreamMetadata> {
        let trigger_channel = classifier.find_event_channel(&info.channel_list);
        StreamMetadata::from_channel_list(info.sample_rate, &info.channel_list, trigger_channel)
    }

    fn allocate_buffers(&self, metadata: &StreamMetadata, duration_secs: f64) -> ScopeBuffers {
        let capacity = (duration_secs * metadata.sample_rate as f64).ceil() as usize;
        ScopeBuffers {
            data: RingBuffer::new(metadata.n_channels(), capacity),
            trigger: RingBuffer::new(1, capacity),
        }
    }

    fn condition_chunk(
        &mut self,
        settings: &ScopeSettings,
        raw: &SampleChunk,
        metadata: &StreamMetadata,
    ) -> ScopeResult<ConditionedChunk> {
        if raw.channels() != metadata.n_channels() + 1 {
            return Err(ScopeError::ChannelMismatch {
                expected: metadata.n_channels() + 1,
                actual: raw.channels(),
            });
        }
        let trigger_index = metadata.effective_trigger_index();
        let trigger_raw = raw.channel(trigger_index)?;
        let mut data = raw.without_channel(trigger_index)?;

        if settings.apply_bandpass {
            match self.bandpass.as_mut() {
                Some(filter) => filter.apply(&mut data),
                None => {
                    tracing::debug!("band-pass enabled but no filter configured; skipping");
                }
            }
        }
        if settings.apply_car {
            self.car.apply(&mut data, &settings.selected_channels);
        }
        let trigger = self.trigger.clean(&trigger_raw);

        Ok(ConditionedChunk { data, trigger })
    }
}
