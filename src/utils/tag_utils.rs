//! TIFF tag utilities
//!
//! Utilities for working with TIFF tags and their values.

use crate::io::byte_order::ByteOrder;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::constants::{field_types, tags, compression};

/// Size in bytes of a single value of the given field type
///
/// Returns `None` for field types TIFF 6.0 and BigTIFF do not define, since the
/// byte length of such an entry cannot be known.
pub fn field_type_size(field_type: u16) -> Option<usize> {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => Some(1),
        field_types::SHORT | field_types::SSHORT => Some(2),
        field_types::LONG | field_types::SLONG | field_types::FLOAT | field_types::IFD => Some(4),
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => Some(8),
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => Some(8),
        _ => None,
    }
}

/// Width of the unit that gets byte-swapped for the given field type
///
/// Rationals are two independent 32-bit integers, so they swap in 4-byte
/// units even though each value is 8 bytes long.
pub fn swap_width(field_type: u16) -> usize {
    match field_type {
        field_types::RATIONAL | field_types::SRATIONAL => 4,
        other => field_type_size(other).unwrap_or(1),
    }
}

/// Whether the field type only exists in BigTIFF files
pub fn is_big_tiff_only_type(field_type: u16) -> bool {
    matches!(field_type, field_types::LONG8 | field_types::SLONG8 | field_types::IFD8)
}

/// Decodes a packed array of unsigned integer tag values
///
/// # Arguments
/// * `bytes` - Raw value bytes as stored in the file
/// * `field_type` - The entry's field type
/// * `byte_order` - Byte order of `bytes`
///
/// # Returns
/// The values widened to u64, or an error for non-integer field types
pub fn decode_unsigned_values(bytes: &[u8], field_type: u16, byte_order: ByteOrder) -> TiffResult<Vec<u64>> {
    let width = field_type_size(field_type)
        .ok_or(TiffError::UnsupportedFieldType(field_type))?;

    let values = bytes.chunks_exact(width).map(|chunk| match field_type {
        field_types::BYTE | field_types::UNDEFINED => Ok(chunk[0] as u64),
        field_types::SHORT => Ok(byte_order.decode_u16(chunk) as u64),
        field_types::LONG | field_types::IFD => Ok(byte_order.decode_u32(chunk) as u64),
        field_types::LONG8 | field_types::IFD8 => Ok(byte_order.decode_u64(chunk)),
        _ => Err(TiffError::UnsupportedFieldType(field_type)),
    }).collect::<TiffResult<Vec<u64>>>()?;

    Ok(values)
}

/// Decodes the first value held in an inline value field
///
/// Small values are left-justified in the IFD entry's value field, so the
/// value has to be read at its own width rather than the field's width.
pub fn decode_inline_value(raw: &[u8], field_type: u16, byte_order: ByteOrder) -> u64 {
    match field_type_size(field_type) {
        Some(1) => raw[0] as u64,
        Some(2) => byte_order.decode_u16(raw) as u64,
        Some(4) => byte_order.decode_u32(raw) as u64,
        _ if raw.len() >= 8 => byte_order.decode_u64(raw),
        _ => byte_order.decode_u32(raw) as u64,
    }
}

/// Whether an entry points at structures outside its frame
///
/// These values are file offsets into data the frame reader does not copy,
/// so they would dangle once the frame is written to another file. Besides
/// the well-known pointer tags this covers any private tag stored with the
/// IFD or IFD8 field type.
pub fn is_unrelocatable_pointer(tag: u16, field_type: u16) -> bool {
    matches!(field_type, field_types::IFD | field_types::IFD8)
        || matches!(tag,
            tags::FREE_OFFSETS
            | tags::FREE_BYTE_COUNTS
            | tags::SUB_IFDS
            | tags::JPEG_INTERCHANGE_FORMAT
            | tags::JPEG_INTERCHANGE_FORMAT_LENGTH
            | tags::EXIF_IFD
            | tags::GPS_IFD
            | tags::INTEROPERABILITY_IFD)
}

/// Get the name of a TIFF tag
///
/// Returns a human-readable name for a tag based on its numeric ID.
/// If the tag is not recognized, returns "Unknown".
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::NEW_SUBFILE_TYPE => "NewSubfileType",
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::X_RESOLUTION => "XResolution",
        tags::Y_RESOLUTION => "YResolution",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::RESOLUTION_UNIT => "ResolutionUnit",
        tags::PAGE_NUMBER => "PageNumber",
        tags::SOFTWARE => "Software",
        tags::DATE_TIME => "DateTime",
        tags::COLOR_MAP => "ColorMap",
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_LENGTH => "TileLength",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::TILE_BYTE_COUNTS => "TileByteCounts",
        tags::SUB_IFDS => "SubIFDs",
        tags::SAMPLE_FORMAT => "SampleFormat",
        tags::JPEG_TABLES => "JPEGTables",
        tags::JPEG_INTERCHANGE_FORMAT => "JPEGInterchangeFormat",
        tags::JPEG_INTERCHANGE_FORMAT_LENGTH => "JPEGInterchangeFormatLength",
        tags::EXIF_IFD => "ExifIFD",
        tags::GPS_IFD => "GPSIFD",
        tags::INTEROPERABILITY_IFD => "InteroperabilityIFD",
        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::IFD => "IFD",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
pub fn get_compression_name(compression_code: u64) -> &'static str {
    match compression_code as u16 {
        compression::NONE => "None",
        compression::CCITT_RLE => "CCITT RLE",
        compression::CCITT_FAX3 => "CCITT Group 3 Fax",
        compression::CCITT_FAX4 => "CCITT Group 4 Fax",
        compression::LZW => "LZW",
        compression::JPEG_OLD => "Old JPEG",
        compression::JPEG => "JPEG",
        compression::DEFLATE => "Adobe Deflate",
        compression::ZSTD => "Zstandard",
        compression::PACKBITS => "PackBits",
        _ => "Unknown",
    }
}
