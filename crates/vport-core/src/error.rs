//! Error types for the bridging core.

use thiserror::Error;

/// Core bridging errors.
///
/// Every variant maps to a discrete caller-visible outcome: producers see
/// them per batch, consumers per request. Resource exhaustion inside a
/// batch is recovered by dropping the affected frame and counting it, not
/// by failing the call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A frame in a submitted batch violated the length policy; the whole
    /// batch is rejected and nothing is queued
    #[error("invalid frame length {len}: admissible range is {min}..={max}")]
    InvalidLength {
        /// Offending frame length
        len: usize,
        /// Minimum admissible length
        min: usize,
        /// Maximum admissible length
        max: usize,
    },

    /// Adapter is torn down or the link is down
    #[error("adapter not ready")]
    NotReady,

    /// Allocation for a frame copy failed
    #[error("out of memory for frame copy")]
    NoMemory,

    /// The consumer's offered capacity cannot hold the frame; frames are
    /// never silently truncated
    #[error("buffer too small: need {required}, capacity {capacity}")]
    BufferTooSmall {
        /// Bytes the frame needs
        required: usize,
        /// Bytes the consumer offered
        capacity: usize,
    },

    /// Terminal, non-error outcome of a cancelled pending read
    #[error("read request cancelled")]
    Cancelled,

    /// Header codec failure
    #[error("wire error: {0}")]
    Wire(#[from] vport_wire::WireError),
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
