//! TIFF format constants
//!
//! Named values for the parts of the TIFF format the frame reader and
//! writer care about, replacing magic numbers throughout the code.

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// BigTIFF version number (43)
    pub const BIG_TIFF_VERSION: u16 = 43;

    /// "II" byte order marker for little-endian
    pub const LITTLE_ENDIAN_MARKER: [u8; 2] = [0x49, 0x49];

    /// "MM" byte order marker for big-endian
    pub const BIG_ENDIAN_MARKER: [u8; 2] = [0x4D, 0x4D];

    /// BigTIFF offset size (8 bytes)
    pub const BIGTIFF_OFFSET_SIZE: u16 = 8;

    /// Size of a standard TIFF header in bytes
    pub const TIFF_HEADER_SIZE: u64 = 8;

    /// Size of a BigTIFF header in bytes
    pub const BIG_TIFF_HEADER_SIZE: u64 = 16;
}

/// Size limits of the classic (32-bit offset) TIFF layout
pub mod limits {
    /// Largest offset a classic TIFF can address
    pub const CLASSIC_MAX_OFFSET: u64 = u32::MAX as u64;

    /// Upper bound on the IFD chain length accepted from a source file
    pub const MAX_FRAMES: usize = 65_535;
}

/// Field types as defined by TIFF 6.0 and BigTIFF
pub mod field_types {
    pub const BYTE: u16 = 1;       // 8-bit unsigned integer
    pub const ASCII: u16 = 2;      // 8-bit byte containing ASCII character
    pub const SHORT: u16 = 3;      // 16-bit unsigned integer
    pub const LONG: u16 = 4;       // 32-bit unsigned integer
    pub const RATIONAL: u16 = 5;   // Two LONGs: numerator and denominator
    pub const SBYTE: u16 = 6;      // 8-bit signed integer
    pub const UNDEFINED: u16 = 7;  // 8-bit byte with unspecified format
    pub const SSHORT: u16 = 8;     // 16-bit signed integer
    pub const SLONG: u16 = 9;      // 32-bit signed integer
    pub const SRATIONAL: u16 = 10; // Two SLONGs: numerator and denominator
    pub const FLOAT: u16 = 11;     // Single precision IEEE floating point
    pub const DOUBLE: u16 = 12;    // Double precision IEEE floating point
    pub const IFD: u16 = 13;       // 32-bit IFD offset
    pub const LONG8: u16 = 16;     // BigTIFF 64-bit unsigned integer
    pub const SLONG8: u16 = 17;    // BigTIFF 64-bit signed integer
    pub const IFD8: u16 = 18;      // BigTIFF 64-bit IFD offset
}

/// Standard TIFF tags
pub mod tags {
    // Basic image structure tags
    pub const NEW_SUBFILE_TYPE: u16 = 254;         // Subfile data descriptor
    pub const IMAGE_WIDTH: u16 = 256;              // Width of the image in pixels
    pub const IMAGE_LENGTH: u16 = 257;             // Height of the image in pixels
    pub const BITS_PER_SAMPLE: u16 = 258;          // Bits per component
    pub const COMPRESSION: u16 = 259;              // Compression scheme
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 262; // Color space of image data
    pub const STRIP_OFFSETS: u16 = 273;            // Offsets to the data strips
    pub const SAMPLES_PER_PIXEL: u16 = 277;        // Number of components per pixel
    pub const ROWS_PER_STRIP: u16 = 278;           // Rows per strip of data
    pub const STRIP_BYTE_COUNTS: u16 = 279;        // Bytes counts for strips
    pub const X_RESOLUTION: u16 = 282;             // Horizontal resolution
    pub const Y_RESOLUTION: u16 = 283;             // Vertical resolution
    pub const PLANAR_CONFIGURATION: u16 = 284;     // How components are stored
    pub const RESOLUTION_UNIT: u16 = 296;          // Unit of measurement for resolution
    pub const PAGE_NUMBER: u16 = 297;              // Page index and page count
    pub const SOFTWARE: u16 = 305;                 // Software used to create the image
    pub const DATE_TIME: u16 = 306;                // Date and time of image creation
    pub const COLOR_MAP: u16 = 320;                // Colormap for palette color images
    pub const TILE_WIDTH: u16 = 322;               // Width of a tile
    pub const TILE_LENGTH: u16 = 323;              // Length of a tile
    pub const TILE_OFFSETS: u16 = 324;             // Offsets to the data tiles
    pub const TILE_BYTE_COUNTS: u16 = 325;         // Byte counts for tiles
    pub const SAMPLE_FORMAT: u16 = 339;            // Interpretation of sample data
    pub const JPEG_TABLES: u16 = 347;              // Shared JPEG quantization/Huffman tables

    // Tags pointing at structures outside the frame's own data
    pub const FREE_OFFSETS: u16 = 288;             // Unused byte ranges in the file
    pub const FREE_BYTE_COUNTS: u16 = 289;         // Lengths of the unused byte ranges
    pub const SUB_IFDS: u16 = 330;                 // Child IFD offsets
    pub const JPEG_INTERCHANGE_FORMAT: u16 = 513;  // Old-style JPEG stream offset
    pub const JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 514; // Old-style JPEG stream length
    pub const EXIF_IFD: u16 = 34665;               // Exif private IFD offset
    pub const GPS_IFD: u16 = 34853;                // GPS private IFD offset
    pub const INTEROPERABILITY_IFD: u16 = 40965;   // Interoperability IFD offset
}

/// Compression types
pub mod compression {
    pub const NONE: u16 = 1;              // No compression
    pub const CCITT_RLE: u16 = 2;         // CCITT modified Huffman RLE
    pub const CCITT_FAX3: u16 = 3;        // CCITT Group 3 fax
    pub const CCITT_FAX4: u16 = 4;        // CCITT Group 4 fax
    pub const LZW: u16 = 5;               // LZW compression
    pub const JPEG_OLD: u16 = 6;          // Old JPEG (deprecated)
    pub const JPEG: u16 = 7;              // JPEG compression
    pub const DEFLATE: u16 = 8;           // Adobe Deflate (zlib)
    pub const ZSTD: u16 = 14;             // Zstandard compression
    pub const PACKBITS: u16 = 32773;      // PackBits compression
}

/// Subfile type bit flags
pub mod new_subfile_type {
    pub const REDUCED_RESOLUTION: u32 = 1;      // Reduced resolution version of another image
    pub const SINGLE_PAGE: u32 = 2;             // One page of many
}
