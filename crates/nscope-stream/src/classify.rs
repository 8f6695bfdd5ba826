//! Channel-role classification boundary
//!
//! Identifying which channel, if any, carries event markers is a collaborator
//! concern; the scope only consumes the answer, once, at construction.

/// Maps a raw channel-label list to the index of the event/trigger channel.
pub trait ChannelClassifier {
    fn find_event_channel(&self, channel_names: &[String]) -> Option<usize>;
}

/// Stock classifier matching conventional trigger-channel labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelClassifier;

impl ChannelClassifier for LabelClassifier {
    fn find_event_channel(&self, channel_names: &[String]) -> Option<usize> {
        channel_names.iter().position(|name| {
            let label = name.trim().to_ascii_uppercase();
            label == "TRIGGER"
                || label == "TRG"
                || label.starts_with("STI")
                || label.starts_with("EVENT")
                || label.starts_with("MARKER")
        })
    }
}
