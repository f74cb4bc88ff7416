//! Seekable reader and writer traits
//!
//! This module provides unified traits for streams that support both
//! transfer and seeking, so the TIFF reader and writer can work over
//! files and in-memory buffers alike.

use std::io::{Read, Seek, Write};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}

/// Trait for writers that can both write and seek
///
/// The TIFF writer needs to seek back to patch IFD chain offsets after a
/// frame has been appended.
pub trait SeekableWriter: Write + Seek {}

impl<T: Write + Seek> SeekableWriter for T {}
