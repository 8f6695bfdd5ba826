//! NScope-Stream: Composition root for the live scope
//!
//! Owns the acquisition-and-condition update cycle: pull a chunk, split off
//! the trigger column, band-pass/CAR the data columns, clean the trigger, and
//! roll everything into fixed-duration history buffers a display can read.

pub mod classify;
pub mod conditioning;
pub mod driver;
pub mod scope;

pub use classify::{ChannelClassifier, LabelClassifier};
pub use conditioning::{
    ConditionedChunk, EegConditioning, ScopeBuffers, ScopeSettings, SignalConditioning,
};
pub use driver::{ScopeCommand, ScopeDriver, ScopeFrame};
pub use scope::{Scope, BUFFER_DURATION_SECS, SIGNAL_Y_SCALES};
