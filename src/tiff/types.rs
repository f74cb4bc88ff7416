//! Core TIFF data structures

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{new_subfile_type, tags};
use crate::tiff::ifd::IFD;
use std::fmt;

/// Represents a TIFF file with its Image File Directories (IFDs)
#[derive(Debug)]
pub struct TIFF {
    /// Image File Directories in the TIFF file, one per frame
    pub ifds: Vec<IFD>,
    /// Whether this is a BigTIFF format
    pub is_big_tiff: bool,
    /// Byte order of the file
    pub byte_order: ByteOrder,
}

impl TIFF {
    /// Creates a new empty TIFF structure
    pub fn new(is_big_tiff: bool, byte_order: ByteOrder) -> Self {
        TIFF {
            ifds: Vec::new(),
            is_big_tiff,
            byte_order,
        }
    }

    /// Returns the main (first) IFD if available
    pub fn main_ifd(&self) -> Option<&IFD> {
        self.ifds.first()
    }

    /// Number of frames, counting every IFD in the main chain
    pub fn frame_count(&self) -> usize {
        self.ifds.len()
    }
}

impl fmt::Display for TIFF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format: {}", if self.is_big_tiff { "BigTIFF" } else { "TIFF" })?;
        writeln!(f, "Byte order: {}", self.byte_order.name())?;
        writeln!(f, "Frames: {}", self.frame_count())?;

        for ifd in &self.ifds {
            write!(f, "  {}", ifd)?;
            let subfile = ifd.get_tag_value(tags::NEW_SUBFILE_TYPE).unwrap_or(0) as u32;
            if subfile & new_subfile_type::REDUCED_RESOLUTION != 0 {
                write!(f, " [reduced resolution]")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
