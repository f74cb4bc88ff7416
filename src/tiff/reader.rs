//! TIFF file reader implementation
//!
//! This module implements the TIFF/BigTIFF file reader that uses the
//! Strategy pattern to handle different byte orders. It parses the header
//! and the chain of IFDs, one per frame, and reads tag values on demand.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::limits;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::logger::Logger;
use crate::utils::tag_utils;

/// Capacity of the buffered reader wrapped around source files
pub const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader<'a> {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Logger instance
    logger: &'a Logger,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl<'a> TiffReader<'a> {
    /// Creates a new TIFF reader
    pub fn new(logger: &'a Logger) -> Self {
        TiffReader {
            byte_order_handler: None,
            logger,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler, or an error before a header was read
    fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Byte order of the file read last
    pub fn byte_order(&self) -> TiffResult<ByteOrder> {
        Ok(self.handler()?.byte_order())
    }

    /// Loads the structure of a TIFF file from the given path
    ///
    /// The file handle is released before returning; use
    /// [`crate::tiff::TiffSource`] to keep it open for frame reads.
    pub fn load(&mut self, filepath: &Path) -> TiffResult<TIFF> {
        info!("Loading TIFF file: {}", filepath.display());
        self.logger.log(&format!("Reading {}", filepath.display()))?;

        let file = File::open(filepath)?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        self.read(&mut reader)
    }

    /// Reads a TIFF file from the given reader
    ///
    /// This method handles the core process of reading a TIFF file:
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF or BigTIFF format
    /// 3. Read all IFDs (Image File Directories)
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        debug!("Reader::read starting");
        reader.seek(SeekFrom::Start(0))?;

        let byte_order = format_utils::detect_byte_order(reader)?;
        let handler = byte_order.create_handler();

        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        self.is_big_tiff = is_big_tiff;

        let first_ifd_offset = ifd_utils::read_first_ifd_offset(reader, is_big_tiff, handler.as_ref())?;
        debug!("First IFD offset: {}", first_ifd_offset);
        self.byte_order_handler = Some(handler);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(is_big_tiff, byte_order);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        info!("Read {} IFDs from TIFF file", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A damaged link ends the chain with a warning; the frames read so far
    /// are kept. An IFD that points back into the chain ends it as well.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64, file_size: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut visited = HashSet::new();
        let mut ifd_offset = first_ifd_offset;
        let handler = self.handler()?;

        while ifd_offset != 0 {
            if ifds.len() >= limits::MAX_FRAMES {
                warn!("IFD chain longer than {} frames, ignoring the rest", limits::MAX_FRAMES);
                break;
            }

            if !visited.insert(ifd_offset) {
                warn!("IFD chain loops back to offset {}, stopping", ifd_offset);
                break;
            }

            if ifd_offset >= file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain",
                      ifd_offset, file_size);
                break;
            }

            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            };

            // The entry loop leaves the reader on the next IFD offset field
            let next_ifd_offset = match ifd_utils::read_next_ifd_offset(reader, self.is_big_tiff, handler) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };

            debug!("Next IFD offset: {}", next_ifd_offset);
            ifds.push(ifd);

            if next_ifd_offset != 0 && (next_ifd_offset >= file_size || next_ifd_offset < 8) {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }

            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads an IFD from the reader
    ///
    /// # Arguments
    /// * `reader` - The seekable reader to use
    /// * `offset` - Offset in the file where the IFD starts
    /// * `number` - The index of this IFD in the file
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = self.read_ifd_entry_count(reader)?;
        debug!("IFD #{} entry count: {}", number, entry_count);

        let mut ifd = IFD::new(number, offset);

        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads the entry count from an IFD
    fn read_ifd_entry_count(&self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            Ok(handler.read_u64(reader)?)
        } else {
            Ok(handler.read_u16(reader)? as u64)
        }
    }

    /// Reads a single IFD entry, keeping its raw value field
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;
        let byte_order = handler.byte_order();

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_len = ifd_utils::offset_size(self.is_big_tiff) as usize;
        let mut raw_value = [0u8; 8];
        reader.read_exact(&mut raw_value[..field_len])?;

        let mut entry = IFDEntry::from_raw(tag, field_type, count, 0, raw_value);
        entry.value_offset = if entry.is_value_inline(self.is_big_tiff) {
            tag_utils::decode_inline_value(&raw_value[..field_len], field_type, byte_order)
        } else if self.is_big_tiff {
            byte_order.decode_u64(&raw_value)
        } else {
            byte_order.decode_u32(&raw_value) as u64
        };

        Ok(entry)
    }

    /// Reads the raw bytes of an entry's values, in the file's byte order
    ///
    /// Inline values come from the entry itself; others are read from the
    /// value offset after checking they lie inside the file.
    pub fn read_value_bytes(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<Vec<u8>> {
        let len = entry.byte_len()
            .ok_or(TiffError::UnsupportedFieldType(entry.field_type))?;

        if entry.is_value_inline(self.is_big_tiff) {
            return Ok(entry.raw_value[..len as usize].to_vec());
        }

        let file_size = validation::get_file_size(reader)?;
        validation::validate_data_range(entry.value_offset, len, file_size,
                                        tag_utils::get_tag_name(entry.tag))?;

        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let mut buffer = vec![0u8; len as usize];
        reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Reads a tag's values as a vector of u64
    ///
    /// Used for offset and byte count arrays, which are always unsigned
    /// integers.
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        let bytes = self.read_value_bytes(reader, entry)?;
        tag_utils::decode_unsigned_values(&bytes, entry.field_type, self.byte_order()?)
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}
