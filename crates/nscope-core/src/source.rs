//! Acquisition boundary: the collaborator the scope pulls chunks from

use crate::chunk::SampleChunk;
use crate::error::ScopeResult;
use serde::{Deserialize, Serialize};

/// Per-stream facts an acquisition source exposes before any data flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Nominal sample rate in Hz
    pub sample_rate: f64,
    /// Ordered channel labels, trigger channel included
    pub channel_list: Vec<String>,
}

/// External acquisition collaborator.
///
/// The scope drives this interface synchronously: `acquire` performs the
/// blocking pull into the source's own accumulation, and `drain_chunk` hands
/// over everything accumulated since the previous drain while resetting that
/// accumulation, so every sample is delivered exactly once. An empty chunk
/// from a drain is a valid quiet cycle, not an error. Failures raised here
/// are propagated to the scope's caller unmodified; the scope never retries.
pub trait AcquisitionSource {
    /// Names of the streams this source exposes.
    fn stream_names(&self) -> Vec<String>;

    /// Facts about one named stream, or None if the name is unknown.
    fn stream_info(&self, stream_name: &str) -> Option<StreamInfo>;

    /// Blocking pull from the underlying transport into the source's buffer.
    fn acquire(&mut self) -> ScopeResult<()>;

    /// Drain-on-read: accumulated samples and their timestamps, with the
    /// source's accumulation reset as part of the same call.
    fn drain_chunk(&mut self, stream_name: &str) -> ScopeResult<(SampleChunk, Vec<f64>)>;
}
