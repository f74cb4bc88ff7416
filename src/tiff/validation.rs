//! TIFF validation utilities
//!
//! This module provides validation functions for TIFF files
//! to ensure data integrity and prevent errors when processing
//! potentially malformed files.

use log::{debug, error, warn};
use std::io::{Seek, SeekFrom};

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::header;

/// Validates an IFD offset to ensure it's within reasonable bounds
pub fn validate_ifd_offset(offset: u64, file_size: u64) -> TiffResult<()> {
    if offset >= file_size || offset < 8 {
        return Err(TiffError::GenericError(format!(
            "Invalid IFD offset: {} (file size: {})",
            offset, file_size
        )));
    }

    Ok(())
}

/// Validates that a block of `length` bytes at `offset` lies inside the file
///
/// # Arguments
/// * `offset` - Start of the block
/// * `length` - Length of the block in bytes
/// * `file_size` - The file size for validation
/// * `what` - Description of the block for error messages
pub fn validate_data_range(offset: u64, length: u64, file_size: u64, what: &str) -> TiffResult<()> {
    match offset.checked_add(length) {
        Some(end) if end <= file_size => Ok(()),
        _ => Err(TiffError::GenericError(format!(
            "{} at offset {} with length {} extends past end of file (file size: {})",
            what, offset, length, file_size
        ))),
    }
}

/// Gets the file size for validation purposes
///
/// # Returns
/// The file size or u64::MAX if it couldn't be determined
pub fn get_file_size(reader: &mut dyn SeekableReader) -> TiffResult<u64> {
    let current_position = reader.stream_position()?;
    let file_size = match reader.seek(SeekFrom::End(0)) {
        Ok(size) => size,
        Err(e) => {
            warn!("Could not determine file size: {}", e);
            u64::MAX
        }
    };
    reader.seek(SeekFrom::Start(current_position))?;

    Ok(file_size)
}

/// Validates the BigTIFF header
///
/// In BigTIFF, after the version number (43) comes the offset size
/// (always 8) and a reserved value (always 0).
pub fn validate_bigtiff_header(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<()> {
    let offset_size = byte_order_handler.read_u16(reader)?;
    let zeros = byte_order_handler.read_u16(reader)?;

    debug!("BigTIFF offset size: {}, reserved: {}", offset_size, zeros);

    if offset_size != header::BIGTIFF_OFFSET_SIZE || zeros != 0 {
        error!("Invalid BigTIFF header: offset_size={}, zeros={}", offset_size, zeros);
        return Err(TiffError::InvalidBigTIFFHeader);
    }

    Ok(())
}
