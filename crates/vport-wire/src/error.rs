//! Error types for header parsing and synthesis.

use thiserror::Error;

/// Wire-level codec errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// Buffer too short to hold the expected header
    #[error("buffer too short: expected at least {expected}, got {actual}")]
    TooShort {
        /// Expected minimum size
        expected: usize,
        /// Actual size received
        actual: usize,
    },

    /// Not an IPv4-over-Ethernet ARP packet
    #[error("not an IPv4-over-Ethernet ARP packet")]
    NotArp,
}
