//! Owned frame buffers.
//!
//! The network face hands the core borrowed storage whose lifetime ends
//! when the submit call returns, so every admitted frame is deep-copied
//! into a `FrameBuf` before anything else touches it.

use crate::error::Error;
use vport_wire::{FrameClass, ETHERNET_HEADER_SIZE};

/// One captured link-layer frame, owned by the core.
///
/// The full frame (including any synthetic link header) is kept internally
/// for statistics and diagnostic dumping; what the consumer receives
/// depends on the operating mode under which the frame was captured.
#[derive(Debug)]
pub struct FrameBuf {
    data: Vec<u8>,
    class: FrameClass,
    point_to_point: bool,
}

impl FrameBuf {
    /// Deep-copy producer-supplied bytes into an owned buffer.
    ///
    /// Allocation failure surfaces as [`Error::NoMemory`]; the caller
    /// drops that single frame and continues.
    pub fn copy_from(bytes: &[u8], class: FrameClass, point_to_point: bool) -> Result<Self, Error> {
        let mut data = Vec::new();
        data.try_reserve_exact(bytes.len()).map_err(|_| Error::NoMemory)?;
        data.extend_from_slice(bytes);

        Ok(Self {
            data,
            class,
            point_to_point,
        })
    }

    /// Classification tag of the frame's destination address
    #[must_use]
    pub fn class(&self) -> FrameClass {
        self.class
    }

    /// The full frame as carried on the emulated wire
    #[must_use]
    pub fn wire(&self) -> &[u8] {
        &self.data
    }

    /// Length of the full frame
    #[must_use]
    pub fn wire_len(&self) -> usize {
        self.data.len()
    }

    /// The bytes a consumer read receives: the full frame in bridge mode,
    /// the payload behind the link header in point-to-point mode
    #[must_use]
    pub fn delivered(&self) -> &[u8] {
        if self.point_to_point {
            &self.data[ETHERNET_HEADER_SIZE..]
        } else {
            &self.data
        }
    }

    /// Length of the deliverable bytes
    #[must_use]
    pub fn delivered_len(&self) -> usize {
        self.delivered().len()
    }

    /// Consume the frame, yielding the deliverable bytes
    #[must_use]
    pub fn into_delivered(mut self) -> Vec<u8> {
        if self.point_to_point {
            self.data.drain(..ETHERNET_HEADER_SIZE);
        }
        self.data
    }
}
