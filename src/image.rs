//! ROM image assembly
//!
//! ECU dumps come as two files: the pre-calibration segment covering
//! 0x000000-0x107FFF and the calibration segment mapped at 0x108000. Both are
//! padded or cut to their slot so addresses in the image equal CPU addresses.

use std::fs;
use std::path::Path;

use crate::{Address, DisassemblyError};

/// Slot size of the pre-calibration segment.
pub const PRE_SEGMENT_SIZE: usize = 0x108000;
/// Slot size of the calibration segment.
pub const CAL_SEGMENT_SIZE: usize = 0x78000;
/// Size of an assembled image (0x000000-0x17FFFF).
pub const IMAGE_SIZE: usize = PRE_SEGMENT_SIZE + CAL_SEGMENT_SIZE;

/// Immutable byte image addressed by CPU address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    bytes: Vec<u8>,
}

impl RawImage {
    /// Wraps bytes that already cover the address space.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Concatenates the two segments, each zero-padded or truncated to its slot.
    pub fn from_segments(pre: &[u8], cal: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(IMAGE_SIZE);
        bytes.extend_from_slice(fit_to_slot("pre-calibration", pre, PRE_SEGMENT_SIZE));
        bytes.resize(PRE_SEGMENT_SIZE, 0);
        bytes.extend_from_slice(fit_to_slot("calibration", cal, CAL_SEGMENT_SIZE));
        bytes.resize(IMAGE_SIZE, 0);
        Self { bytes }
    }

    /// Reads both segments from disk.
    pub fn from_files(pre: impl AsRef<Path>, cal: impl AsRef<Path>) -> Result<Self, DisassemblyError> {
        let pre_bytes = fs::read(pre.as_ref())?;
        let cal_bytes = fs::read(cal.as_ref())?;
        log::debug!(
            "Loaded 0x{:X} pre-calibration bytes from {} and 0x{:X} calibration bytes from {}",
            pre_bytes.len(),
            pre.as_ref().display(),
            cal_bytes.len(),
            cal.as_ref().display()
        );
        Ok(Self::from_segments(&pre_bytes, &cal_bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte(&self, address: Address) -> Option<u8> {
        self.bytes.get(address as usize).copied()
    }

    /// Bytes from `address` up to `end` (exclusive), clipped to the image.
    pub fn window(&self, address: Address, end: Address) -> &[u8] {
        let start = (address as usize).min(self.bytes.len());
        let end = (end as usize).clamp(start, self.bytes.len());
        &self.bytes[start..end]
    }

    pub fn read_word_le(&self, address: Address) -> Option<u16> {
        let lo = self.byte(address)?;
        let hi = self.byte(address.checked_add(1)?)?;
        Some(u16::from_le_bytes([lo, hi]))
    }
}

fn fit_to_slot<'a>(name: &str, segment: &'a [u8], slot: usize) -> &'a [u8] {
    if segment.len() > slot {
        log::warn!(
            "{} segment is 0x{:X} bytes, truncating to its 0x{:X}-byte slot",
            name,
            segment.len(),
            slot
        );
        &segment[..slot]
    } else {
        segment
    }
}
