//! Sequential TIFF writer
//!
//! Writes a TIFF or BigTIFF container one frame at a time. Each appended
//! frame is laid out as its payload chunks, then its out-of-line tag
//! values, then its IFD; the previous IFD's next pointer (or the header's
//! first IFD pointer) is patched to reach it. Nothing is buffered across
//! frames, so memory use is bounded by the largest frame.

use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableWriter;
use crate::tiff::constants::{field_types, header, limits};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::frame::{Frame, FrameEntry};
use crate::utils::ifd_utils;
use crate::utils::logger::Logger;
use crate::utils::tag_utils;
use crate::utils::write_utils;

/// Capacity of the buffered writer wrapped around output files
pub const WRITE_BUFFER_SIZE: usize = 1024 * 1024;

/// Appends frames to a new TIFF container
pub struct TiffWriter<'a, W: SeekableWriter> {
    writer: W,
    handler: Box<dyn ByteOrderHandler>,
    is_big_tiff: bool,
    logger: &'a Logger,
    /// Offset one past the last byte written
    position: u64,
    /// Where the pointer to the next IFD goes
    next_ifd_pointer: u64,
    frames_written: usize,
}

impl<'a> TiffWriter<'a, BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the container header
    pub fn create(path: &Path, byte_order: ByteOrder, is_big_tiff: bool, logger: &'a Logger) -> TiffResult<Self> {
        info!("Creating {} {} at {}",
              if is_big_tiff { "BigTIFF" } else { "TIFF" }, byte_order.name(), path.display());

        let file = File::create(path).map_err(|e| {
            TiffError::GenericError(format!("Cannot create {}: {}", path.display(), e))
        })?;

        Self::new(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file), byte_order, is_big_tiff, logger)
    }
}

impl<'a, W: SeekableWriter> TiffWriter<'a, W> {
    /// Starts a container on `writer`, which must be positioned at its start
    pub fn new(mut writer: W, byte_order: ByteOrder, is_big_tiff: bool, logger: &'a Logger) -> TiffResult<Self> {
        let handler = byte_order.create_handler();

        writer.write_all(&byte_order.marker())?;
        if is_big_tiff {
            handler.write_u16(&mut writer, header::BIG_TIFF_VERSION)?;
            handler.write_u16(&mut writer, header::BIGTIFF_OFFSET_SIZE)?;
            handler.write_u16(&mut writer, 0)?;
            handler.write_u64(&mut writer, 0)?;
        } else {
            handler.write_u16(&mut writer, header::TIFF_VERSION)?;
            handler.write_u32(&mut writer, 0)?;
        }

        let header_size = if is_big_tiff { header::BIG_TIFF_HEADER_SIZE } else { header::TIFF_HEADER_SIZE };

        Ok(TiffWriter {
            writer,
            handler,
            is_big_tiff,
            logger,
            position: header_size,
            // The first IFD pointer follows the marker and version
            next_ifd_pointer: header_size - ifd_utils::offset_size(is_big_tiff),
            frames_written: 0,
        })
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.handler.byte_order()
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Appends `frame` as the next frame of the container
    ///
    /// Tag values are converted to the container's byte order. Payload
    /// bytes are copied verbatim, which is only sound across byte orders
    /// for samples of at most 8 bits; wider samples are rejected.
    pub fn append_frame(&mut self, frame: &Frame) -> TiffResult<()> {
        let byte_order = self.byte_order();
        let bits_per_sample = frame.max_bits_per_sample();

        if frame.byte_order != byte_order && bits_per_sample > 8 {
            return Err(TiffError::IncompatibleByteOrder { frame: frame.index, bits_per_sample });
        }

        let mut entries = Vec::with_capacity(frame.entries.len() + 2);
        for entry in &frame.entries {
            entries.push(self.convert_entry(entry, frame.byte_order)?);
        }

        // Payload first, so the offset tags can be built from where it landed
        let mut chunk_offsets = Vec::with_capacity(frame.chunks.len());
        for chunk in &frame.chunks {
            self.pad()?;
            chunk_offsets.push(self.position);
            self.write_bytes(chunk)?;
        }

        let byte_counts: Vec<u64> = frame.chunks.iter().map(|chunk| chunk.len() as u64).collect();
        entries.push(self.offset_array_entry(frame.layout.offsets_tag(), &chunk_offsets)?);
        entries.push(self.offset_array_entry(frame.layout.byte_counts_tag(), &byte_counts)?);

        let entries = write_utils::get_unique_sorted_entries(entries);

        // Out-of-line values, in tag order
        let inline_limit = ifd_utils::offset_size(self.is_big_tiff) as usize;
        let mut value_offsets = Vec::with_capacity(entries.len());
        for entry in &entries {
            if entry.data.len() > inline_limit {
                self.pad()?;
                value_offsets.push(Some(self.position));
                self.write_bytes(&entry.data)?;
            } else {
                value_offsets.push(None);
            }
        }

        self.pad()?;
        let ifd_offset = self.position;
        self.write_ifd(&entries, &value_offsets)?;
        let next_pointer = ifd_offset
            + ifd_utils::entry_count_size(self.is_big_tiff)
            + ifd_utils::entry_size(self.is_big_tiff) * entries.len() as u64;

        self.check_classic_limit(self.position)?;
        self.patch_offset(self.next_ifd_pointer, ifd_offset)?;
        self.next_ifd_pointer = next_pointer;
        self.frames_written += 1;

        debug!("Wrote frame {} as IFD #{} at offset {} ({} tags, {} chunks)",
               frame.index, self.frames_written - 1, ifd_offset, entries.len(), frame.chunks.len());

        Ok(())
    }

    /// Flushes the container and hands back the underlying writer
    ///
    /// A container without frames is not a valid TIFF, so finishing one is
    /// an error.
    pub fn finish(mut self) -> TiffResult<W> {
        if self.frames_written == 0 {
            return Err(TiffError::GenericError("No frames were written to the TIFF container".to_string()));
        }

        self.writer.flush()?;
        self.logger.log(&format!("Wrote {} frames ({} bytes)", self.frames_written, self.position))?;
        info!("Finished TIFF container: {} frames, {} bytes", self.frames_written, self.position);

        Ok(self.writer)
    }

    /// Copies an entry, converting its values to the container byte order
    fn convert_entry(&self, entry: &FrameEntry, source_order: ByteOrder) -> TiffResult<FrameEntry> {
        if !self.is_big_tiff && tag_utils::is_big_tiff_only_type(entry.field_type) {
            return Err(TiffError::GenericError(format!(
                "{} uses the 64-bit {} type, which classic TIFF cannot store",
                tag_utils::get_tag_name(entry.tag), tag_utils::get_field_type_name(entry.field_type))));
        }

        let mut data = entry.data.clone();
        source_order.convert_elements(self.byte_order(), &mut data, tag_utils::swap_width(entry.field_type));

        Ok(FrameEntry { data, ..entry.clone() })
    }

    /// Builds a LONG (or LONG8 for BigTIFF) array entry
    fn offset_array_entry(&self, tag: u16, values: &[u64]) -> TiffResult<FrameEntry> {
        let byte_order = self.byte_order();
        let mut data = Vec::with_capacity(values.len() * 8);

        if self.is_big_tiff {
            for value in values {
                data.extend_from_slice(&byte_order.encode_u64(*value));
            }
        } else {
            for value in values {
                self.check_classic_limit(*value)?;
                data.extend_from_slice(&byte_order.encode_u32(*value as u32));
            }
        }

        Ok(FrameEntry {
            tag,
            field_type: if self.is_big_tiff { field_types::LONG8 } else { field_types::LONG },
            count: values.len() as u64,
            data,
        })
    }

    fn write_ifd(&mut self, entries: &[FrameEntry], value_offsets: &[Option<u64>]) -> TiffResult<()> {
        let field_len = ifd_utils::offset_size(self.is_big_tiff) as usize;
        let mut block = Vec::with_capacity(ifd_utils::calculate_ifd_size(entries.len(), self.is_big_tiff) as usize);

        if self.is_big_tiff {
            self.handler.write_u64(&mut block, entries.len() as u64)?;
        } else {
            let count = u16::try_from(entries.len()).map_err(|_| {
                TiffError::GenericError(format!("Too many tags for one IFD: {}", entries.len()))
            })?;
            self.handler.write_u16(&mut block, count)?;
        }

        for (entry, value_offset) in entries.iter().zip(value_offsets) {
            self.handler.write_u16(&mut block, entry.tag)?;
            self.handler.write_u16(&mut block, entry.field_type)?;

            if self.is_big_tiff {
                self.handler.write_u64(&mut block, entry.count)?;
            } else {
                let count = u32::try_from(entry.count).map_err(|_| TiffError::ClassicLimitExceeded(entry.count))?;
                self.handler.write_u32(&mut block, count)?;
            }

            match value_offset {
                Some(offset) => self.write_offset_field(&mut block, *offset)?,
                None => {
                    let mut field = [0u8; 8];
                    field[..entry.data.len()].copy_from_slice(&entry.data);
                    block.extend_from_slice(&field[..field_len]);
                }
            }
        }

        // Next IFD pointer, patched when another frame follows
        self.write_offset_field(&mut block, 0)?;
        self.write_bytes(&block)
    }

    fn write_offset_field(&self, block: &mut Vec<u8>, offset: u64) -> TiffResult<()> {
        if self.is_big_tiff {
            self.handler.write_u64(block, offset)?;
        } else {
            self.check_classic_limit(offset)?;
            self.handler.write_u32(block, offset as u32)?;
        }
        Ok(())
    }

    /// Overwrites the offset field at `at` and returns to the end of output
    fn patch_offset(&mut self, at: u64, offset: u64) -> TiffResult<()> {
        self.writer.seek(SeekFrom::Start(at))?;
        if self.is_big_tiff {
            self.handler.write_u64(&mut self.writer, offset)?;
        } else {
            self.handler.write_u32(&mut self.writer, offset as u32)?;
        }
        self.writer.seek(SeekFrom::Start(self.position))?;
        Ok(())
    }

    fn check_classic_limit(&self, offset: u64) -> TiffResult<()> {
        if !self.is_big_tiff && offset > limits::CLASSIC_MAX_OFFSET {
            return Err(TiffError::ClassicLimitExceeded(offset));
        }
        Ok(())
    }

    fn pad(&mut self) -> TiffResult<()> {
        self.position = write_utils::write_padding(&mut self.writer, self.position)?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> TiffResult<()> {
        self.writer.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }
}
