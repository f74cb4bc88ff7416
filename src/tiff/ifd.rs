//! Image File Directory (IFD) structures and methods
//!
//! This module implements the core TIFF IFD (Image File Directory) structures
//! that describe the frames of a TIFF file. Each IFD is one frame; IFDs are
//! collections of tag entries, with each tag describing an aspect of the image.

use std::collections::HashMap;
use std::fmt;
use crate::tiff::constants::tags;
use log::{debug, trace};
use crate::utils::tag_utils;

/// Represents an Image File Directory (IFD) in a TIFF file
///
/// An IFD contains metadata about an image, stored as a series of tag entries.
/// Multi-frame TIFF files chain one IFD per frame.
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based), which is also the frame index
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached tag values for quick lookup
    tag_map: HashMap<u16, IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// Each entry describes one aspect of the image (dimensions, color space,
/// compression, etc.) using a tag-value pair. The field_type determines
/// how to interpret the value or offset.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values
    ///
    /// For inline values this is the first value decoded at its own width.
    pub value_offset: u64,
    /// The value field exactly as stored in the file (4 or 8 bytes used)
    pub raw_value: [u8; 8],
}

impl IFDEntry {
    /// Creates a new IFD entry from a decoded value or offset
    ///
    /// The raw value field is synthesized in little-endian order, which is
    /// what hand-built entries and the writer's own output use.
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self::from_raw(tag, field_type, count, value_offset, value_offset.to_le_bytes())
    }

    /// Creates an IFD entry keeping the raw value field read from a file
    pub fn from_raw(tag: u16, field_type: u16, count: u64, value_offset: u64, raw_value: [u8; 8]) -> Self {
        trace!("IFD entry: tag={} ({}), type={} ({}), count={}, offset/value={}",
               tag, tag_utils::get_tag_name(tag),
               field_type, tag_utils::get_field_type_name(field_type),
               count, value_offset);

        Self {
            tag,
            field_type,
            count,
            value_offset,
            raw_value,
        }
    }

    /// Total byte length of this entry's values
    ///
    /// `None` when the field type is unknown, or the length overflows.
    pub fn byte_len(&self) -> Option<u64> {
        let size = tag_utils::field_type_size(self.field_type)? as u64;
        size.checked_mul(self.count)
    }

    /// Determines if the value is stored inline in the value field
    /// rather than at the offset location
    ///
    /// Entries of unknown field type are treated as out-of-line.
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };

        match self.byte_len() {
            Some(len) => len <= inline_size,
            None => false,
        }
    }

    /// Returns a human-readable description of this entry
    pub fn description(&self) -> String {
        let tag_name = tag_utils::get_tag_name(self.tag);
        let field_type_name = tag_utils::get_field_type_name(self.field_type);

        let value_display = match self.tag {
            tags::COMPRESSION => format!("{} ({})",
                                         self.value_offset,
                                         tag_utils::get_compression_name(self.value_offset)),
            _ => self.value_offset.to_string()
        };

        format!("Tag: {} ({}), Type: {} ({}), Count: {}, Value/Offset: {}",
                self.tag, tag_name, self.field_type, field_type_name, self.count, value_display)
    }
}

impl IFD {
    /// Creates a new, empty IFD with the given index and file offset
    pub fn new(number: usize, offset: u64) -> Self {
        debug!("Creating new IFD #{} at offset {}", number, offset);

        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD
    ///
    /// A later entry with the same tag replaces the earlier one in lookups.
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry to IFD #{}: {}", self.number, entry.description());

        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets a tag value (value_offset) directly
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Gets the dimensions of the image described by this IFD
    ///
    /// Returns the width and height of the image if both tags are present.
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Returns number of samples per pixel (default 1 if not specified)
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Returns the compression code (default 1, uncompressed)
    pub fn get_compression(&self) -> u64 {
        self.get_tag_value(tags::COMPRESSION).unwrap_or(1)
    }

    /// Whether the frame stores its pixels in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_OFFSETS)
    }

    /// Gets the number of entries in this IFD
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame {}:", self.number)?;

        match self.get_dimensions() {
            Some((width, height)) => write!(f, " {}x{}", width, height)?,
            None => write!(f, " (no dimensions)")?,
        }

        let compression = self.get_compression();
        write!(f, ", {} sample(s)/pixel, compression {} ({}), {}, {} tags, offset {}",
               self.get_samples_per_pixel(),
               compression,
               tag_utils::get_compression_name(compression),
               if self.is_tiled() { "tiled" } else { "stripped" },
               self.entries.len(),
               self.offset)
    }
}
