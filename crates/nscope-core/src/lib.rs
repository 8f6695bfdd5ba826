//! NScope-Core: Foundation types for streaming biosignal conditioning
//!
//! Chunks, stream metadata, rolling history buffers and the acquisition
//! boundary consumed by the scope layer.

pub mod chunk;
pub mod error;
pub mod metadata;
pub mod ring;
pub mod source;

pub use chunk::*;
pub use error::{ScopeError, ScopeResult};
pub use metadata::*;
pub use ring::*;
pub use source::*;
