//! Tests for the TIFF reader

use std::io::Cursor;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::tags;
use crate::tiff::errors::TiffError;
use crate::tiff::reader::TiffReader;
use crate::tiff::tests::test_utils::{build_tiff, create_test_tiff_buffer, gray_frame, patch_offset, FrameSpec};
use crate::utils::logger::Logger;

fn with_software(mut frame: FrameSpec, software: &'static str) -> FrameSpec {
    frame.software = Some(software);
    frame
}

#[test]
fn reads_dimension_only_ifd() {
    let logger = Logger::disabled();
    let mut reader = TiffReader::new(&logger);
    let mut cursor = create_test_tiff_buffer();

    let tiff = reader.read(&mut cursor).unwrap();

    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.byte_order, ByteOrder::LittleEndian);
    assert_eq!(tiff.frame_count(), 1);
    assert_eq!(tiff.ifds[0].get_dimensions(), Some((800, 600)));
}

#[test]
fn reads_every_frame_of_the_chain() {
    let logger = Logger::disabled();
    let bytes = build_tiff(ByteOrder::LittleEndian, false,
                           &[gray_frame(4, 2, 0), gray_frame(3, 3, 10), gray_frame(1, 5, 20)]);

    let tiff = TiffReader::new(&logger).read(&mut Cursor::new(bytes)).unwrap();

    assert_eq!(tiff.frame_count(), 3);
    assert_eq!(tiff.ifds[1].get_dimensions(), Some((3, 3)));
    assert_eq!(tiff.ifds[2].number, 2);
}

#[test]
fn inline_shorts_decode_in_big_endian_files() {
    let logger = Logger::disabled();
    let bytes = build_tiff(ByteOrder::BigEndian, false, &[gray_frame(7, 9, 0)]);

    let tiff = TiffReader::new(&logger).read(&mut Cursor::new(bytes)).unwrap();
    let ifd = &tiff.ifds[0];

    assert_eq!(tiff.byte_order, ByteOrder::BigEndian);
    assert_eq!(ifd.get_dimensions(), Some((7, 9)));
    assert_eq!(ifd.get_tag_value(tags::BITS_PER_SAMPLE), Some(8));
    assert_eq!(ifd.get_compression(), 1);
}

#[test]
fn reads_bigtiff() {
    let logger = Logger::disabled();
    let bytes = build_tiff(ByteOrder::LittleEndian, true, &[gray_frame(5, 5, 0), gray_frame(2, 2, 0)]);

    let mut reader = TiffReader::new(&logger);
    let tiff = reader.read(&mut Cursor::new(bytes)).unwrap();

    assert!(tiff.is_big_tiff);
    assert!(reader.is_big_tiff());
    assert_eq!(tiff.frame_count(), 2);
    assert_eq!(tiff.ifds[1].get_dimensions(), Some((2, 2)));
}

#[test]
fn reads_out_of_line_values() {
    let logger = Logger::disabled();
    let bytes = build_tiff(ByteOrder::BigEndian, false,
                           &[with_software(gray_frame(2, 2, 0), "tiffmerge test")]);
    let mut cursor = Cursor::new(bytes);

    let mut reader = TiffReader::new(&logger);
    let tiff = reader.read(&mut cursor).unwrap();
    let entry = tiff.ifds[0].get_entry(tags::SOFTWARE).unwrap();

    let bytes = reader.read_value_bytes(&mut cursor, entry).unwrap();
    assert_eq!(bytes, b"tiffmerge test\0".to_vec());

    let offsets = reader.read_tag_values(&mut cursor, &tiff.ifds[0], tags::STRIP_OFFSETS).unwrap();
    assert_eq!(offsets, vec![8]);
}

#[test]
fn missing_tag_is_reported() {
    let logger = Logger::disabled();
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new(&logger);
    let tiff = reader.read(&mut cursor).unwrap();

    let result = reader.read_tag_values(&mut cursor, &tiff.ifds[0], tags::STRIP_OFFSETS);
    assert!(matches!(result, Err(TiffError::TagNotFound(tags::STRIP_OFFSETS))));
}

#[test]
fn chain_looping_back_stops_after_one_pass() {
    let logger = Logger::disabled();
    let mut bytes = build_tiff(ByteOrder::LittleEndian, false, &[gray_frame(2, 2, 0), gray_frame(2, 2, 1)]);

    // Point the second IFD's next pointer back at the first IFD
    let first_ifd = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as u64;
    let len = bytes.len();
    patch_offset(&mut bytes, len - 4, first_ifd, ByteOrder::LittleEndian, false);

    let tiff = TiffReader::new(&logger).read(&mut Cursor::new(bytes)).unwrap();
    assert_eq!(tiff.frame_count(), 2);
}

#[test]
fn dangling_next_pointer_keeps_frames_read_so_far() {
    let logger = Logger::disabled();
    let mut bytes = build_tiff(ByteOrder::LittleEndian, false, &[gray_frame(2, 2, 0)]);
    let len = bytes.len();
    patch_offset(&mut bytes, len - 4, 1_000_000, ByteOrder::LittleEndian, false);

    let tiff = TiffReader::new(&logger).read(&mut Cursor::new(bytes)).unwrap();
    assert_eq!(tiff.frame_count(), 1);
}

#[test]
fn rejects_files_that_are_not_tiff() {
    let logger = Logger::disabled();

    let png_magic = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    assert!(TiffReader::new(&logger).read(&mut Cursor::new(png_magic)).is_err());

    let truncated = vec![0x49, 0x49, 42];
    assert!(TiffReader::new(&logger).read(&mut Cursor::new(truncated)).is_err());

    let bad_version = vec![0x49, 0x49, 41, 0, 8, 0, 0, 0];
    assert!(TiffReader::new(&logger).read(&mut Cursor::new(bad_version)).is_err());
}

#[test]
fn rejects_first_ifd_past_end_of_file() {
    let logger = Logger::disabled();
    let bytes = vec![0x49, 0x49, 42, 0, 0xFF, 0, 0, 0];
    assert!(TiffReader::new(&logger).read(&mut Cursor::new(bytes)).is_err());
}
