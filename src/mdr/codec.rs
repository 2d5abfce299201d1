//! Low-level variable-width integer codec
//!
//! MDR records are packed from little-endian unsigned integers of 1, 2 or
//! 3 bytes. The width of a pointer field is chosen per file from the record
//! count of the section it points into, so the codec takes the width as a
//! runtime argument rather than as a type.

use std::io::{Read, Write};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Width in bytes of the smallest unsigned integer that can hold `count`.
///
/// Used for pointer fields: 1 byte up to 255 records, 2 up to 65535,
/// 3 otherwise. Record numbers are 1-based so a count of 255 still fits
/// in one byte.
pub fn width_for_count(count: u64) -> usize {
    if count <= 0xff {
        1
    } else if count <= 0xffff {
        2
    } else {
        3
    }
}

/// Write a little-endian unsigned integer of 1, 2 or 3 bytes.
///
/// A value that does not fit the chosen width is a logic error somewhere
/// upstream (a pointer width was frozen before the target section stopped
/// growing); truncating it would corrupt the file silently, so this fails
/// loudly instead.
pub fn put_n(writer: &mut (impl Write + ?Sized), width: usize, value: u32) -> std::io::Result<()> {
    assert!(
        fits(width, value),
        "value {:#x} does not fit in {} byte(s)",
        value,
        width
    );
    match width {
        1 => writer.write_u8(value as u8),
        2 => writer.write_u16::<LittleEndian>(value as u16),
        3 => writer.write_u24::<LittleEndian>(value),
        _ => panic!("invalid field width: {}", width),
    }
}

/// Read a little-endian unsigned integer of 1, 2 or 3 bytes.
pub fn read_n(reader: &mut (impl Read + ?Sized), width: usize) -> std::io::Result<u32> {
    match width {
        1 => Ok(reader.read_u8()? as u32),
        2 => Ok(reader.read_u16::<LittleEndian>()? as u32),
        3 => Ok(reader.read_u24::<LittleEndian>()?),
        _ => panic!("invalid field width: {}", width),
    }
}

/// Whether `value` is representable in `width` bytes.
pub fn fits(width: usize, value: u32) -> bool {
    match width {
        1 => value <= 0xff,
        2 => value <= 0xffff,
        3 => value <= 0xff_ffff,
        _ => false,
    }
}
