//! Tests for frame extraction from TIFF sources

use std::path::PathBuf;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{field_types, new_subfile_type, tags};
use crate::tiff::errors::TiffError;
use crate::tiff::frame::{DataLayout, FrameEntry, TiffSource};
use crate::tiff::tests::test_utils::{build_tiff, create_test_tiff_buffer, gray_frame, open_source};
use crate::utils::logger::Logger;

#[test]
fn frame_carries_payload_and_tags() {
    let logger = Logger::disabled();
    let frames = [gray_frame(4, 2, 0), gray_frame(3, 3, 100)];
    let expected_pixels = frames[1].pixels.clone();
    let mut source = open_source(build_tiff(ByteOrder::LittleEndian, false, &frames), &logger);

    assert_eq!(source.frame_count(), 2);
    let frame = source.read_frame(1).unwrap();

    assert_eq!(frame.index, 1);
    assert_eq!(frame.layout, DataLayout::Strips);
    assert_eq!(frame.chunks, vec![expected_pixels]);
    assert_eq!(frame.payload_len(), 9);
    assert_eq!(frame.dimensions(), Some((3, 3)));
    assert_eq!(frame.max_bits_per_sample(), 8);
}

#[test]
fn chunk_tags_are_left_out_of_entries() {
    let logger = Logger::disabled();
    let mut source = open_source(build_tiff(ByteOrder::BigEndian, false, &[gray_frame(2, 2, 0)]), &logger);
    let frame = source.read_frame(0).unwrap();

    assert!(frame.entry(tags::STRIP_OFFSETS).is_none());
    assert!(frame.entry(tags::STRIP_BYTE_COUNTS).is_none());
    assert!(frame.entry(tags::ROWS_PER_STRIP).is_some());

    let tags_in_order: Vec<u16> = frame.entries.iter().map(|entry| entry.tag).collect();
    let mut sorted = tags_in_order.clone();
    sorted.sort();
    assert_eq!(tags_in_order, sorted);
}

#[test]
fn out_of_line_values_are_materialized() {
    let logger = Logger::disabled();
    let mut layout = gray_frame(2, 2, 0);
    layout.software = Some("a scanner of some kind");
    let mut source = open_source(build_tiff(ByteOrder::LittleEndian, true, &[layout]), &logger);

    let frame = source.read_frame(0).unwrap();
    let software = frame.entry(tags::SOFTWARE).unwrap();

    assert_eq!(software.field_type, field_types::ASCII);
    assert_eq!(software.data, b"a scanner of some kind\0".to_vec());
}

#[test]
fn pointer_tags_are_dropped() {
    let logger = Logger::disabled();
    let mut layout = gray_frame(2, 2, 0);
    layout.extra_longs.push((tags::EXIF_IFD, 8));
    let mut source = open_source(build_tiff(ByteOrder::LittleEndian, false, &[layout]), &logger);

    let frame = source.read_frame(0).unwrap();
    assert!(frame.entry(tags::EXIF_IFD).is_none());
    assert!(frame.entry(tags::IMAGE_WIDTH).is_some());
}

#[test]
fn free_space_tags_are_dropped() {
    let logger = Logger::disabled();
    let mut layout = gray_frame(2, 2, 0);
    layout.extra_longs.push((tags::FREE_OFFSETS, 8));
    layout.extra_longs.push((tags::FREE_BYTE_COUNTS, 4));
    let mut source = open_source(build_tiff(ByteOrder::LittleEndian, false, &[layout]), &logger);

    let frame = source.read_frame(0).unwrap();
    assert!(frame.entry(tags::FREE_OFFSETS).is_none());
    assert!(frame.entry(tags::FREE_BYTE_COUNTS).is_none());
}

#[test]
fn repeated_tag_keeps_its_last_value() {
    let logger = Logger::disabled();
    let mut layout = gray_frame(2, 2, 0);
    layout.extra_longs.push((50_000, 1));
    layout.extra_longs.push((50_000, 2));
    let mut source = open_source(build_tiff(ByteOrder::LittleEndian, false, &[layout]), &logger);

    assert_eq!(source.tiff().ifds[0].get_tag_value(50_000), Some(2));

    let frame = source.read_frame(0).unwrap();
    let repeated: Vec<&FrameEntry> = frame.entries.iter().filter(|entry| entry.tag == 50_000).collect();
    assert_eq!(repeated.len(), 1);
    assert_eq!(repeated[0].first_value(ByteOrder::LittleEndian), Some(2));
}

#[test]
fn index_past_the_last_frame_is_out_of_range() {
    let logger = Logger::disabled();
    let mut source = open_source(build_tiff(ByteOrder::LittleEndian, false, &[gray_frame(2, 2, 0)]), &logger);

    let result = source.read_frame(1);
    assert!(matches!(result, Err(TiffError::FrameOutOfRange { index: 1, count: 1 })));
}

#[test]
fn frame_without_strips_or_tiles_is_rejected() {
    let logger = Logger::disabled();
    let cursor = create_test_tiff_buffer();
    let mut source = TiffSource::from_reader(PathBuf::from("dims.tif"), Box::new(cursor), &logger).unwrap();

    assert!(matches!(source.read_frame(0), Err(TiffError::MissingImageData(0))));
}

#[test]
fn strip_past_end_of_file_is_an_error() {
    let logger = Logger::disabled();
    let mut bytes = build_tiff(ByteOrder::LittleEndian, false, &[gray_frame(4, 4, 0)]);

    // Header (8) + strip (16) puts the IFD at 24; StripByteCounts is its
    // ninth entry and its value field sits 8 bytes into the entry
    let value_at = 24 + 2 + 8 * 12 + 8;
    assert_eq!(&bytes[value_at - 8..value_at - 6], &[0x17, 0x01]);
    bytes[value_at..value_at + 4].copy_from_slice(&1_000u32.to_le_bytes());

    let mut source = open_source(bytes, &logger);
    assert!(source.read_frame(0).is_err());
}

#[test]
fn unreadable_stream_is_not_a_source() {
    let logger = Logger::disabled();
    let result = TiffSource::from_reader(PathBuf::from("junk.tif"),
                                         Box::new(std::io::Cursor::new(b"not a tiff".to_vec())), &logger);
    assert!(result.is_err());

    let missing = TiffSource::open(std::path::Path::new("/nonexistent/input.tif"), &logger);
    assert!(missing.is_err());
}

#[test]
fn set_page_marks_one_page_of_many() {
    let logger = Logger::disabled();
    let mut source = open_source(build_tiff(ByteOrder::BigEndian, false, &[gray_frame(2, 2, 0)]), &logger);
    let mut frame = source.read_frame(0).unwrap();

    frame.set_page(3, 5);

    let page = frame.entry(tags::PAGE_NUMBER).unwrap();
    assert_eq!(page.field_type, field_types::SHORT);
    assert_eq!(page.count, 2);
    assert_eq!(page.data, vec![0, 3, 0, 5]);

    let subfile = frame.entry(tags::NEW_SUBFILE_TYPE).unwrap().first_value(ByteOrder::BigEndian);
    assert_eq!(subfile, Some(new_subfile_type::SINGLE_PAGE as u64));

    frame.clear_page();
    assert!(frame.entry(tags::PAGE_NUMBER).is_none());
    let subfile = frame.entry(tags::NEW_SUBFILE_TYPE).unwrap().first_value(ByteOrder::BigEndian);
    assert_eq!(subfile, Some(0));
}

#[test]
fn set_page_keeps_reduced_resolution_bit() {
    let logger = Logger::disabled();
    let mut layout = gray_frame(2, 2, 0);
    layout.extra_longs.push((tags::NEW_SUBFILE_TYPE, new_subfile_type::REDUCED_RESOLUTION));
    let mut source = open_source(build_tiff(ByteOrder::LittleEndian, false, &[layout]), &logger);
    let mut frame = source.read_frame(0).unwrap();

    frame.set_page(0, 2);
    let subfile = frame.entry(tags::NEW_SUBFILE_TYPE).unwrap().first_value(ByteOrder::LittleEndian);
    assert_eq!(subfile, Some(3));
}

#[test]
fn set_entry_keeps_entries_sorted() {
    let logger = Logger::disabled();
    let mut source = open_source(build_tiff(ByteOrder::LittleEndian, false, &[gray_frame(2, 2, 0)]), &logger);
    let mut frame = source.read_frame(0).unwrap();

    frame.set_entry(FrameEntry { tag: tags::X_RESOLUTION, field_type: field_types::RATIONAL, count: 1,
                                 data: vec![72, 0, 0, 0, 1, 0, 0, 0] });
    frame.set_entry(FrameEntry { tag: tags::IMAGE_WIDTH, field_type: field_types::LONG, count: 1,
                                 data: vec![9, 0, 0, 0] });

    assert!(frame.entries.windows(2).all(|pair| pair[0].tag < pair[1].tag));
    assert_eq!(frame.dimensions(), Some((9, 2)));
    assert!(frame.remove_entry(tags::X_RESOLUTION).is_some());
    assert!(frame.remove_entry(tags::X_RESOLUTION).is_none());
}
