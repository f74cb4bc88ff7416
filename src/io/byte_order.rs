//! Byte order handling for TIFF files
//!
//! This module implements the Strategy pattern for handling different
//! byte orders (little-endian vs big-endian) when reading and writing
//! TIFF data.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use byteorder::ByteOrder as Endian;
use std::io::{Result, Write};

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the TIFF header
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let byte_order = reader.read_u16::<LittleEndian>()?;
        match byte_order {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II" (Intel)
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM" (Motorola)
            _ => Err(TiffError::InvalidByteOrder(byte_order)),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// The two marker bytes that open a TIFF header in this byte order
    pub fn marker(&self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => header::LITTLE_ENDIAN_MARKER,
            ByteOrder::BigEndian => header::BIG_ENDIAN_MARKER,
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }

    /// Decodes a u16 from the first two bytes of `bytes`
    pub fn decode_u16(&self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_u16(bytes),
            ByteOrder::BigEndian => BigEndian::read_u16(bytes),
        }
    }

    /// Decodes a u32 from the first four bytes of `bytes`
    pub fn decode_u32(&self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_u32(bytes),
            ByteOrder::BigEndian => BigEndian::read_u32(bytes),
        }
    }

    /// Decodes a u64 from the first eight bytes of `bytes`
    pub fn decode_u64(&self, bytes: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_u64(bytes),
            ByteOrder::BigEndian => BigEndian::read_u64(bytes),
        }
    }

    pub fn encode_u16(&self, value: u16) -> [u8; 2] {
        let mut buf = [0u8; 2];
        match self {
            ByteOrder::LittleEndian => LittleEndian::write_u16(&mut buf, value),
            ByteOrder::BigEndian => BigEndian::write_u16(&mut buf, value),
        }
        buf
    }

    pub fn encode_u32(&self, value: u32) -> [u8; 4] {
        let mut buf = [0u8; 4];
        match self {
            ByteOrder::LittleEndian => LittleEndian::write_u32(&mut buf, value),
            ByteOrder::BigEndian => BigEndian::write_u32(&mut buf, value),
        }
        buf
    }

    pub fn encode_u64(&self, value: u64) -> [u8; 8] {
        let mut buf = [0u8; 8];
        match self {
            ByteOrder::LittleEndian => LittleEndian::write_u64(&mut buf, value),
            ByteOrder::BigEndian => BigEndian::write_u64(&mut buf, value),
        }
        buf
    }

    /// Rewrites `bytes`, a packed array of `width`-byte elements stored in
    /// this byte order, into the `target` byte order in place.
    ///
    /// Single-byte elements and matching byte orders are left untouched.
    pub fn convert_elements(&self, target: ByteOrder, bytes: &mut [u8], width: usize) {
        if *self == target || width < 2 {
            return;
        }

        for element in bytes.chunks_exact_mut(width) {
            element.reverse();
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// The byte order this handler reads and writes
    fn byte_order(&self) -> ByteOrder;

    /// Read a u16 value
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    /// Read a u64 value
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    /// Write a u16 value
    fn write_u16(&self, writer: &mut dyn Write, value: u16) -> Result<()>;

    /// Write a u32 value
    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()>;

    /// Write a u64 value
    fn write_u64(&self, writer: &mut dyn Write, value: u64) -> Result<()>;
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::LittleEndian
    }

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn write_u16(&self, writer: &mut dyn Write, value: u16) -> Result<()> {
        writer.write_u16::<LittleEndian>(value)
    }

    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()> {
        writer.write_u32::<LittleEndian>(value)
    }

    fn write_u64(&self, writer: &mut dyn Write, value: u64) -> Result<()> {
        writer.write_u64::<LittleEndian>(value)
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::BigEndian
    }

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn write_u16(&self, writer: &mut dyn Write, value: u16) -> Result<()> {
        writer.write_u16::<BigEndian>(value)
    }

    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()> {
        writer.write_u32::<BigEndian>(value)
    }

    fn write_u64(&self, writer: &mut dyn Write, value: u64) -> Result<()> {
        writer.write_u64::<BigEndian>(value)
    }
}
