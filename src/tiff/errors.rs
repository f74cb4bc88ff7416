//! Custom error types for TIFF processing

use std::fmt;
use std::io;

/// TIFF-specific error types
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// Invalid TIFF header
    InvalidHeader,
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Frame index past the end of the IFD chain
    FrameOutOfRange { index: usize, count: usize },
    /// Frame has neither strip nor tile data
    MissingImageData(usize),
    /// Frame samples are byte order dependent and the orders differ
    IncompatibleByteOrder { frame: usize, bits_per_sample: u16 },
    /// Output no longer fits the classic TIFF layout
    ClassicLimitExceeded(u64),
    /// Invalid configuration value
    ConfigError(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::InvalidHeader => write!(f, "Invalid TIFF header"),
            TiffError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TiffError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TiffError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            TiffError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            TiffError::FrameOutOfRange { index, count } =>
                write!(f, "Frame {} out of range (file has {} frames)", index, count),
            TiffError::MissingImageData(frame) =>
                write!(f, "Frame {} has no strip or tile data", frame),
            TiffError::IncompatibleByteOrder { frame, bits_per_sample } =>
                write!(f, "Frame {} has {}-bit samples in a different byte order than the output",
                       frame, bits_per_sample),
            TiffError::ClassicLimitExceeded(offset) =>
                write!(f, "Offset {} exceeds the 4 GiB classic TIFF limit, write BigTIFF instead", offset),
            TiffError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TiffError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}
