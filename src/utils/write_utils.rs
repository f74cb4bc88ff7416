//! TIFF writing utilities
//!
//! Helper functions for writing TIFF files to disk, handling alignment
//! and entry ordering.

use crate::tiff::errors::TiffResult;
use crate::tiff::frame::FrameEntry;
use std::collections::HashSet;
use std::io::Write;

/// Align an offset to a 4-byte boundary
///
/// TIFF requires IFDs to start on a word boundary; data blocks are aligned
/// the same way to keep every offset even.
pub fn align_to_4_bytes(offset: u64) -> u64 {
    let remainder = offset % 4;
    if remainder == 0 {
        offset
    } else {
        offset + (4 - remainder)
    }
}

/// Write zero bytes to move `offset` up to the next 4-byte boundary
///
/// # Returns
/// The aligned offset
pub fn write_padding(writer: &mut impl Write, offset: u64) -> TiffResult<u64> {
    let aligned = align_to_4_bytes(offset);
    let padding = (aligned - offset) as usize;
    if padding > 0 {
        writer.write_all(&[0u8; 4][..padding])?;
    }
    Ok(aligned)
}

/// Get a list of entries sorted by tag number with duplicates removed
///
/// TIFF requires tags in ascending order with each tag appearing only once.
/// If multiple entries have the same tag ID, only the last occurrence is kept.
pub fn get_unique_sorted_entries(entries: Vec<FrameEntry>) -> Vec<FrameEntry> {
    let mut unique_entries = Vec::with_capacity(entries.len());
    let mut seen_tags = HashSet::new();

    for entry in entries.into_iter().rev() {
        if seen_tags.insert(entry.tag) {
            unique_entries.push(entry);
        }
    }

    unique_entries.sort_by_key(|entry| entry.tag);
    unique_entries
}
