//! Frames and frame sources
//!
//! A frame is one image plane of a TIFF container. This module lifts a
//! frame out of its source file into a self-contained [`Frame`]: the tag
//! set with every value materialized, plus the strip or tile payload the
//! frame's offset tags point at. Nothing is decoded, so a frame written
//! elsewhere keeps its pixels bit for bit.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{field_types, new_subfile_type, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::reader::{TiffReader, READ_BUFFER_SIZE};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::logger::Logger;
use crate::utils::tag_utils;
use crate::utils::write_utils;

/// How a frame's pixel payload is chunked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLayout {
    Strips,
    Tiles,
}

impl DataLayout {
    /// Tag holding the chunk offsets
    pub fn offsets_tag(&self) -> u16 {
        match self {
            DataLayout::Strips => tags::STRIP_OFFSETS,
            DataLayout::Tiles => tags::TILE_OFFSETS,
        }
    }

    /// Tag holding the chunk byte counts
    pub fn byte_counts_tag(&self) -> u16 {
        match self {
            DataLayout::Strips => tags::STRIP_BYTE_COUNTS,
            DataLayout::Tiles => tags::TILE_BYTE_COUNTS,
        }
    }

    fn owns_tag(tag: u16) -> bool {
        matches!(tag,
            tags::STRIP_OFFSETS | tags::STRIP_BYTE_COUNTS
            | tags::TILE_OFFSETS | tags::TILE_BYTE_COUNTS)
    }
}

/// A tag with its values materialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u64,
    /// Packed values, in the byte order of the owning frame
    pub data: Vec<u8>,
}

impl FrameEntry {
    /// Decodes the first value as an unsigned integer
    pub fn first_value(&self, byte_order: ByteOrder) -> Option<u64> {
        tag_utils::decode_unsigned_values(&self.data, self.field_type, byte_order)
            .ok()?
            .first()
            .copied()
    }
}

/// One frame lifted out of a TIFF container
#[derive(Debug, Clone)]
pub struct Frame {
    /// Index of the frame in its source
    pub index: usize,
    /// Byte order of the tag values and payload
    pub byte_order: ByteOrder,
    /// Tags other than the chunk offset/byte count pair, sorted by tag
    pub entries: Vec<FrameEntry>,
    pub layout: DataLayout,
    /// Strip or tile payloads, in chunk order
    pub chunks: Vec<Vec<u8>>,
}

impl Frame {
    pub fn entry(&self, tag: u16) -> Option<&FrameEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }

    /// Inserts or replaces an entry, keeping entries sorted by tag
    pub fn set_entry(&mut self, entry: FrameEntry) {
        match self.entries.binary_search_by_key(&entry.tag, |e| e.tag) {
            Ok(position) => self.entries[position] = entry,
            Err(position) => self.entries.insert(position, entry),
        }
    }

    pub fn remove_entry(&mut self, tag: u16) -> Option<FrameEntry> {
        let position = self.entries.iter().position(|entry| entry.tag == tag)?;
        Some(self.entries.remove(position))
    }

    pub fn dimensions(&self) -> Option<(u64, u64)> {
        let width = self.entry(tags::IMAGE_WIDTH)?.first_value(self.byte_order)?;
        let height = self.entry(tags::IMAGE_LENGTH)?.first_value(self.byte_order)?;
        Some((width, height))
    }

    /// Widest sample of the frame in bits (TIFF default is 1)
    pub fn max_bits_per_sample(&self) -> u16 {
        self.entry(tags::BITS_PER_SAMPLE)
            .and_then(|entry| {
                tag_utils::decode_unsigned_values(&entry.data, entry.field_type, self.byte_order).ok()
            })
            .and_then(|values| values.into_iter().max())
            .map(|bits| bits as u16)
            .unwrap_or(1)
    }

    /// Total payload size in bytes
    pub fn payload_len(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.len() as u64).sum()
    }

    /// Marks the frame as page `page` of a `total`-page document
    ///
    /// Sets the "one page of many" NewSubfileType bit and the PageNumber
    /// tag. PageNumber is SHORT, so documents past 65535 pages skip it.
    pub fn set_page(&mut self, page: usize, total: usize) {
        let subfile = self.subfile_type() | new_subfile_type::SINGLE_PAGE;
        self.set_subfile_type(subfile);

        match (u16::try_from(page), u16::try_from(total)) {
            (Ok(page), Ok(total)) => {
                let mut data = Vec::with_capacity(4);
                data.extend_from_slice(&self.byte_order.encode_u16(page));
                data.extend_from_slice(&self.byte_order.encode_u16(total));
                self.set_entry(FrameEntry {
                    tag: tags::PAGE_NUMBER,
                    field_type: field_types::SHORT,
                    count: 2,
                    data,
                });
            },
            _ => {
                warn!("Page {} of {} does not fit the PageNumber tag, leaving it out", page, total);
                self.remove_entry(tags::PAGE_NUMBER);
            }
        }
    }

    /// Marks the frame as a standalone image
    pub fn clear_page(&mut self) {
        self.remove_entry(tags::PAGE_NUMBER);
        if self.entry(tags::NEW_SUBFILE_TYPE).is_some() {
            let subfile = self.subfile_type() & !new_subfile_type::SINGLE_PAGE;
            self.set_subfile_type(subfile);
        }
    }

    fn subfile_type(&self) -> u32 {
        self.entry(tags::NEW_SUBFILE_TYPE)
            .and_then(|entry| entry.first_value(self.byte_order))
            .unwrap_or(0) as u32
    }

    fn set_subfile_type(&mut self, value: u32) {
        let data = self.byte_order.encode_u32(value).to_vec();
        self.set_entry(FrameEntry {
            tag: tags::NEW_SUBFILE_TYPE,
            field_type: field_types::LONG,
            count: 1,
            data,
        });
    }
}

/// An open TIFF file that frames can be read from
///
/// The underlying handle stays open for the lifetime of the source and is
/// released when it is dropped.
pub struct TiffSource<'a> {
    path: PathBuf,
    reader: TiffReader<'a>,
    stream: Box<dyn SeekableReader>,
    tiff: TIFF,
}

impl<'a> TiffSource<'a> {
    /// Opens a TIFF file and parses its frame chain
    pub fn open(path: &Path, logger: &'a Logger) -> TiffResult<Self> {
        let file = File::open(path).map_err(|e| {
            TiffError::GenericError(format!("Cannot open {}: {}", path.display(), e))
        })?;
        let stream = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        Self::from_reader(path.to_path_buf(), Box::new(stream), logger)
    }

    /// Parses a TIFF held by any seekable stream
    ///
    /// `path` only names the source in logs and file naming.
    pub fn from_reader(path: PathBuf, mut stream: Box<dyn SeekableReader>, logger: &'a Logger) -> TiffResult<Self> {
        let mut reader = TiffReader::new(logger);
        let tiff = reader.read(stream.as_mut()).map_err(|e| {
            TiffError::GenericError(format!("{} is not a readable TIFF: {}", path.display(), e))
        })?;

        if tiff.ifds.is_empty() {
            return Err(TiffError::GenericError(format!(
                "No IFDs found in TIFF file {}", path.display())));
        }

        info!("Opened {} ({} frames, {}, {})",
              path.display(), tiff.frame_count(),
              if tiff.is_big_tiff { "BigTIFF" } else { "TIFF" },
              tiff.byte_order.name());

        Ok(TiffSource { path, reader, stream, tiff })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frame_count(&self) -> usize {
        self.tiff.frame_count()
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.tiff.byte_order
    }

    pub fn is_big_tiff(&self) -> bool {
        self.tiff.is_big_tiff
    }

    pub fn tiff(&self) -> &TIFF {
        &self.tiff
    }

    /// Reads frame `index` with all of its tag values and payload
    pub fn read_frame(&mut self, index: usize) -> TiffResult<Frame> {
        let count = self.frame_count();
        let ifd = self.tiff.ifds.get(index)
            .ok_or(TiffError::FrameOutOfRange { index, count })?;
        let stream = self.stream.as_mut();

        let layout = if ifd.has_tag(tags::TILE_OFFSETS) {
            DataLayout::Tiles
        } else if ifd.has_tag(tags::STRIP_OFFSETS) {
            DataLayout::Strips
        } else {
            return Err(TiffError::MissingImageData(index));
        };

        let offsets = self.reader.read_tag_values(stream, ifd, layout.offsets_tag())?;
        let byte_counts = self.reader.read_tag_values(stream, ifd, layout.byte_counts_tag())?;

        if offsets.len() != byte_counts.len() {
            return Err(TiffError::GenericError(format!(
                "Mismatch between {} offsets and byte counts in frame {}",
                if layout == DataLayout::Tiles { "tile" } else { "strip" }, index)));
        }

        let file_size = validation::get_file_size(stream)?;
        let mut chunks = Vec::with_capacity(offsets.len());
        for (offset, byte_count) in offsets.iter().zip(byte_counts.iter()) {
            validation::validate_data_range(*offset, *byte_count, file_size, "Image chunk")?;
            stream.seek(SeekFrom::Start(*offset))?;
            let mut chunk = vec![0u8; *byte_count as usize];
            stream.read_exact(&mut chunk)?;
            chunks.push(chunk);
        }

        let mut entries = Vec::with_capacity(ifd.entry_count());
        for entry in &ifd.entries {
            if DataLayout::owns_tag(entry.tag) {
                continue;
            }

            if tag_utils::is_unrelocatable_pointer(entry.tag, entry.field_type) {
                warn!("Dropping {} tag from frame {} of {}, it points outside the frame",
                      tag_utils::get_tag_name(entry.tag), index, self.path.display());
                continue;
            }

            if tag_utils::field_type_size(entry.field_type).is_none() {
                warn!("Dropping tag {} with unknown field type {} from frame {}",
                      entry.tag, entry.field_type, index);
                continue;
            }

            let data = self.reader.read_value_bytes(stream, entry)?;
            entries.push(FrameEntry {
                tag: entry.tag,
                field_type: entry.field_type,
                count: entry.count,
                data,
            });
        }
        // Last occurrence of a repeated tag wins, as in IFD lookups
        let entries = write_utils::get_unique_sorted_entries(entries);

        let frame = Frame {
            index,
            byte_order: self.tiff.byte_order,
            entries,
            layout,
            chunks,
        };

        debug!("Read frame {} of {}: {} tags, {} chunks, {} payload bytes",
               index, self.path.display(), frame.entries.len(),
               frame.chunks.len(), frame.payload_len());

        Ok(frame)
    }
}
