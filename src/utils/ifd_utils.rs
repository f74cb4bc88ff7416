//! IFD utilities
//!
//! Utilities for working with Image File Directories (IFDs) in TIFF files.
//! The layout helpers are shared by the reader and the writer.

use log::debug;
use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::TiffResult;

/// Reads the first IFD offset from a TIFF file header
///
/// # Arguments
/// * `reader` - The seekable reader to use
/// * `is_big_tiff` - Whether the file is in BigTIFF format
/// * `byte_order_handler` - Handler for the file's byte order
///
/// # Returns
/// The offset to the first IFD
pub fn read_first_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    debug!("Reading {} first IFD offset", if is_big_tiff { "BigTIFF" } else { "standard TIFF" });
    read_offset(reader, is_big_tiff, byte_order_handler)
}

/// Reads the next IFD offset
///
/// # Returns
/// The offset to the next IFD, or 0 if there are no more IFDs
pub fn read_next_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    read_offset(reader, is_big_tiff, byte_order_handler)
}

fn read_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    if is_big_tiff {
        Ok(byte_order_handler.read_u64(reader)?)
    } else {
        Ok(byte_order_handler.read_u32(reader)? as u64)
    }
}

/// Size of the entry count field at the start of an IFD
pub fn entry_count_size(is_big_tiff: bool) -> u64 {
    if is_big_tiff { 8 } else { 2 }
}

/// Size of a single IFD entry
pub fn entry_size(is_big_tiff: bool) -> u64 {
    if is_big_tiff { 20 } else { 12 }
}

/// Size of an offset field (next IFD pointer, value offsets)
pub fn offset_size(is_big_tiff: bool) -> u64 {
    if is_big_tiff { 8 } else { 4 }
}

/// Calculates the size of an IFD with `entry_count` entries in bytes
///
/// Used to determine where the next IFD offset is located
pub fn calculate_ifd_size(entry_count: usize, is_big_tiff: bool) -> u64 {
    entry_count_size(is_big_tiff)
        + entry_size(is_big_tiff) * entry_count as u64
        + offset_size(is_big_tiff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ifd_sizes_match_layouts() {
        // 2 + 12 * 3 + 4
        assert_eq!(calculate_ifd_size(3, false), 42);
        // 8 + 20 * 3 + 8
        assert_eq!(calculate_ifd_size(3, true), 76);
    }
}
