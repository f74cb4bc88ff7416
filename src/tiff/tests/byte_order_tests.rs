//! Tests for the byte order module

extern crate std;

use std::io::Cursor;
use byteorder::{LittleEndian, BigEndian, WriteBytesExt};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler, LittleEndianHandler, BigEndianHandler};

#[test]
fn test_byte_order_detection_little_endian() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II
    let mut cursor = Cursor::new(buffer);

    let result = ByteOrder::detect(&mut cursor);
    std::assert!(result.is_ok());
    std::assert_eq!(result.unwrap(), ByteOrder::LittleEndian);
}

#[test]
fn test_byte_order_detection_big_endian() {
    let mut buffer = Vec::new();
    buffer.write_u16::<BigEndian>(0x4D4D).unwrap(); // MM
    let mut cursor = Cursor::new(buffer);

    let result = ByteOrder::detect(&mut cursor);
    std::assert!(result.is_ok());
    std::assert_eq!(result.unwrap(), ByteOrder::BigEndian);
}

#[test]
fn test_byte_order_detection_invalid() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap(); // Invalid
    let mut cursor = Cursor::new(buffer);

    let result = ByteOrder::detect(&mut cursor);
    std::assert!(result.is_err());
}

#[test]
fn test_little_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    buffer.write_u32::<LittleEndian>(0x12345678).unwrap();
    buffer.write_u64::<LittleEndian>(0x1234567890ABCDEF).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = LittleEndianHandler;

    std::assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    std::assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    std::assert_eq!(handler.read_u64(&mut cursor).unwrap(), 0x1234567890ABCDEF);
}

#[test]
fn test_big_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_u16::<BigEndian>(0x1234).unwrap();
    buffer.write_u32::<BigEndian>(0x12345678).unwrap();
    buffer.write_u64::<BigEndian>(0x1234567890ABCDEF).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = BigEndianHandler;

    std::assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    std::assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    std::assert_eq!(handler.read_u64(&mut cursor).unwrap(), 0x1234567890ABCDEF);
}
#[test]
fn test_encode_decode_follow_byte_order() {
    std::assert_eq!(ByteOrder::LittleEndian.encode_u16(0x1234), [0x34, 0x12]);
    std::assert_eq!(ByteOrder::BigEndian.encode_u16(0x1234), [0x12, 0x34]);
    std::assert_eq!(ByteOrder::BigEndian.decode_u32(&[0, 0, 1, 0]), 256);
    std::assert_eq!(ByteOrder::LittleEndian.decode_u32(&[0, 1, 0, 0]), 256);
    std::assert_eq!(ByteOrder::BigEndian.marker(), [0x4D, 0x4D]);
}

#[test]
fn test_convert_elements_swaps_each_element() {
    let mut shorts = vec![0x01, 0x02, 0x03, 0x04];
    ByteOrder::LittleEndian.convert_elements(ByteOrder::BigEndian, &mut shorts, 2);
    std::assert_eq!(shorts, vec![0x02, 0x01, 0x04, 0x03]);

    let mut longs = vec![1, 2, 3, 4];
    ByteOrder::BigEndian.convert_elements(ByteOrder::LittleEndian, &mut longs, 4);
    std::assert_eq!(longs, vec![4, 3, 2, 1]);
}

#[test]
fn test_convert_elements_leaves_bytes_and_same_order_alone() {
    let mut bytes = vec![1, 2, 3];
    ByteOrder::LittleEndian.convert_elements(ByteOrder::BigEndian, &mut bytes, 1);
    std::assert_eq!(bytes, vec![1, 2, 3]);

    let mut shorts = vec![1, 2];
    ByteOrder::BigEndian.convert_elements(ByteOrder::BigEndian, &mut shorts, 2);
    std::assert_eq!(shorts, vec![1, 2]);
}

#[test]
fn test_handler_write_matches_read() {
    let handler = ByteOrder::BigEndian.create_handler();
    let mut buffer = Vec::new();
    handler.write_u16(&mut buffer, 42).unwrap();
    handler.write_u64(&mut buffer, 0x0102030405060708).unwrap();
    std::assert_eq!(&buffer[..2], &[0, 42]);

    let mut cursor = Cursor::new(buffer);
    std::assert_eq!(handler.read_u16(&mut cursor).unwrap(), 42);
    std::assert_eq!(handler.read_u64(&mut cursor).unwrap(), 0x0102030405060708);
}
