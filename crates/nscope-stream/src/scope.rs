//! Scope: the acquisition-and-condition update cycle

use crate::classify::{ChannelClassifier, LabelClassifier};
use crate::conditioning::{EegConditioning, ScopeBuffers, ScopeSettings, SignalConditioning};
use nscope_core::{AcquisitionSource, ScopeError, ScopeResult, StreamMetadata};
use nscope_processing::{BandpassConfig, DEFAULT_BP_ORDER};

/// Rolling history retained per channel, in seconds.
pub const BUFFER_DURATION_SECS: f64 = 30.0;

/// Scale-label to microvolt mapping for a consuming display's axis presets.
/// Purely presentational; nothing in the update cycle reads it.
pub const SIGNAL_Y_SCALES: [(&str, f64); 10] = [
    ("1uV", 1.0),
    ("10uV", 10.0),
    ("25uV", 25.0),
    ("50uV", 50.0),
    ("100uV", 100.0),
    ("250uV", 250.0),
    ("500uV", 500.0),
    ("1mV", 1000.0),
    ("2.5mV", 2500.0),
    ("100mV", 100000.0),
];

/// Streaming scope over one named stream of an acquisition source.
///
/// Single-threaded by contract: all work happens synchronously inside
/// `update`, and callers must serialize calls — there is no internal locking
/// because exactly one driver is expected to own the instance.
pub struct Scope<S: AcquisitionSource, C: SignalConditioning = EegConditioning> {
    source: S,
    stream_name: String,
    metadata: StreamMetadata,
    settings: ScopeSettings,
    conditioning: C,
    buffers: ScopeBuffers,
    duration_secs: f64,
    last_timestamps: Vec<f64>,
}

impl<S: AcquisitionSource> Scope<S, EegConditioning> {
    /// Connect a scope to a named stream with the stock EEG conditioning and
    /// the default history duration.
    pub fn new(source: S, stream_name: &str) -> ScopeResult<Self> {
        Self::with_conditioning(
            source,
            stream_name,
            EegConditioning::new(),
            &LabelClassifier,
            BUFFER_DURATION_SECS,
        )
    }

    /// Design the band-pass filter for this stream's sample rate.
    ///
    /// Does not enable filtering; that stays gated by the `apply_bandpass`
    /// toggle.
    pub fn configure_bandpass(&mut self, low_hz: f64, high_hz: f64) -> ScopeResult<()> {
        let sample_rate = self.metadata.sample_rate as f64;
        self.conditioning
            .configure_bandpass(BandpassConfig::new(low_hz, high_hz, DEFAULT_BP_ORDER), sample_rate)
    }
}

impl<S: AcquisitionSource, C: SignalConditioning> Scope<S, C> {
    /// Connect with explicit conditioning, classifier and history duration.
    pub fn with_conditioning(
        source: S,
        stream_name: &str,
        conditioning: C,
        classifier: &dyn ChannelClassifier,
        duration_secs: f64,
    ) -> ScopeResult<Self> {
        let info = source
            .stream_info(stream_name)
            .ok_or_else(|| ScopeError::UnknownStream {
                name: stream_name.to_string(),
            })?;
        let metadata = conditioning.extract_metadata(&info, classifier)?;
        let buffers = conditioning.allocate_buffers(&metadata, duration_secs);
        let settings = ScopeSettings {
            apply_car: false,
            apply_bandpass: false,
            selected_channels: (0..metadata.n_channels()).collect(),
        };
        tracing::info!(
            stream = stream_name,
            sample_rate = metadata.sample_rate,
            channels = metadata.n_channels(),
            capacity = buffers.data.capacity(),
            "scope ready"
        );
        Ok(Scope {
            source,
            stream_name: stream_name.to_string(),
            metadata,
            settings,
            conditioning,
            buffers,
            duration_secs,
            last_timestamps: Vec::new(),
        })
    }

    /// One acquisition-and-condition cycle.
    ///
    /// Pulls the next chunk (drain-on-read: each sample is delivered exactly
    /// once), conditions it and rolls it into the history buffers. An empty
    /// chunk is a valid quiet cycle. Upstream failures propagate unmodified;
    /// the caller decides whether to keep driving.
    pub fn update(&mut self) -> ScopeResult<()> {
        self.source.acquire()?;
        let (chunk, timestamps) = self.source.drain_chunk(&self.stream_name)?;
        if chunk.is_empty() {
            return Ok(());
        }
        let conditioned = self
            .conditioning
            .condition_chunk(&self.settings, &chunk, &self.metadata)?;
        self.buffers.data.append(&conditioned.data)?;
        self.buffers.trigger.append_samples(&conditioned.trigger)?;
        self.last_timestamps = timestamps;
        tracing::trace!(samples = conditioned.trigger.len(), "chunk conditioned");
        Ok(())
    }

    // ------------------------------------------------------------------
    // accessors

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.metadata.sample_rate
    }

    pub fn buffer_duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn channel_labels(&self) -> &[String] {
        &self.metadata.channel_labels
    }

    pub fn n_channels(&self) -> usize {
        self.metadata.n_channels()
    }

    pub fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    pub fn settings(&self) -> &ScopeSettings {
        &self.settings
    }

    pub fn apply_car(&self) -> bool {
        self.settings.apply_car
    }

    pub fn set_apply_car(&mut self, apply_car: bool) {
        self.settings.apply_car = apply_car;
    }

    pub fn apply_bandpass(&self) -> bool {
        self.settings.apply_bandpass
    }

    pub fn set_apply_bandpass(&mut self, apply_bandpass: bool) {
        self.settings.apply_bandpass = apply_bandpass;
    }

    /// Replace the CAR channel selection; duplicates are collapsed.
    pub fn set_selected_channels(&mut self, mut channels: Vec<usize>) {
        channels.sort_unstable();
        channels.dedup();
        self.settings.selected_channels = channels;
    }

    /// Data-channel history, oldest first, one row per channel.
    pub fn data_snapshot(&self) -> Vec<Vec<f64>> {
        self.buffers.data.snapshot()
    }

    /// Trigger history, oldest first.
    pub fn trigger_snapshot(&self) -> Vec<f64> {
        self.buffers.trigger.channel(0)
    }

    /// Timestamps of the most recent non-empty chunk.
    pub fn last_timestamps(&self) -> &[f64] {
        &self.last_timestamps
    }

    /// Axis-preset mapping for a consuming display.
    pub fn signal_y_scales(&self) -> &'static [(&'static str, f64)] {
        &SIGNAL_Y_SCALES
    }

    pub fn conditioning(&self) -> &C {
        &self.conditioning
    }

    pub fn conditioning_mut(&mut self) -> &mut C {
        &mut self.conditioning
    }
}
