//! TIFF container module
//!
//! This module provides structures and functions for reading TIFF and
//! BigTIFF files frame by frame and for writing frames into new
//! containers.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
pub mod frame;
pub mod writer;
pub(crate) mod constants;
pub(crate) mod validation;
#[cfg(test)]
pub(crate) mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use frame::{DataLayout, Frame, FrameEntry, TiffSource};
pub use writer::TiffWriter;
