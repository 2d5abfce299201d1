//! The MDR file header and per-section position table.
//!
//! Header structure (all little-endian):
//! - 2 bytes: header length (426)
//! - 10 bytes: ASCII signature `"GARMIN MDR"`
//! - 2 bytes: code page
//! - 2 bytes: sort/collation id
//! - 2 bytes: flags (bit 0 = for-device build)
//! - 2 bytes: number of maps
//! - 29 × 14 bytes: section table, one entry per section number 1..=29:
//!   offset (4), end (4), item size (2), extra flags (4)
//!
//! The header is written twice: a zeroed reservation before any section is
//! streamed, then the real contents once every offset is known.

use std::io::{Read, Seek, SeekFrom, Write};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::error::{MdrError, Result};

/// Highest section number that has a table entry.
pub const SECTION_MAX: usize = 29;

/// Total header length in bytes.
pub const HEADER_LEN: u16 = 20 + (SECTION_MAX as u16) * 14;

pub const SIGNATURE: &[u8; 10] = b"GARMIN MDR";

/// Header flag bit marking a for-device build.
pub const FLAG_FOR_DEVICE: u16 = 0x0001;

/// One section's entry in the position table.
///
/// An all-zero entry means the section is absent from this file, either
/// because the build mode excludes it, the section number is reserved, or
/// no records were produced for it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    pub offset: u32,
    pub end: u32,
    pub item_size: u16,
    pub extra: u32,
}

impl SectionEntry {
    pub fn is_present(&self) -> bool {
        self.offset != 0
    }

    pub fn len_bytes(&self) -> u32 {
        self.end.saturating_sub(self.offset)
    }
}

/// In-memory form of the header, filled in as sections are written.
#[derive(Debug)]
pub struct MdrHeader {
    pub codepage: u16,
    pub sort_id: u16,
    pub flags: u16,
    pub num_maps: u16,
    entries: [SectionEntry; SECTION_MAX + 1],
}

impl MdrHeader {
    pub fn new() -> MdrHeader {
        MdrHeader {
            codepage: 0,
            sort_id: 0,
            flags: 0,
            num_maps: 0,
            entries: [SectionEntry::default(); SECTION_MAX + 1],
        }
    }

    pub fn section(&self, number: u8) -> &SectionEntry {
        &self.entries[number as usize]
    }

    pub fn set_position(&mut self, number: u8, offset: u32) {
        self.entries[number as usize].offset = offset;
    }

    pub fn set_end(&mut self, number: u8, end: u32) {
        self.entries[number as usize].end = end;
    }

    pub fn set_item_size(&mut self, number: u8, item_size: u16) {
        self.entries[number as usize].item_size = item_size;
    }

    pub fn set_extra(&mut self, number: u8, extra: u32) {
        self.entries[number as usize].extra = extra;
    }

    /// Reserve the header region with zeros; the real header is patched in
    /// by [`patch`](MdrHeader::patch) once all offsets are known.
    pub fn reserve(writer: &mut impl Write) -> Result<()> {
        writer.write_all(&vec![0u8; HEADER_LEN as usize])?;
        Ok(())
    }

    /// Seek back to the start of the file and write the final header.
    pub fn patch(&self, writer: &mut (impl Write + Seek)) -> Result<()> {
        writer.seek(SeekFrom::Start(0))?;
        writer.write_u16::<LittleEndian>(HEADER_LEN)?;
        writer.write_all(SIGNATURE)?;
        writer.write_u16::<LittleEndian>(self.codepage)?;
        writer.write_u16::<LittleEndian>(self.sort_id)?;
        writer.write_u16::<LittleEndian>(self.flags)?;
        writer.write_u16::<LittleEndian>(self.num_maps)?;
        for entry in &self.entries[1..] {
            writer.write_u32::<LittleEndian>(entry.offset)?;
            writer.write_u32::<LittleEndian>(entry.end)?;
            writer.write_u16::<LittleEndian>(entry.item_size)?;
            writer.write_u32::<LittleEndian>(entry.extra)?;
        }
        Ok(())
    }

    /// Parse a header from the start of `reader`.
    pub fn read_from(reader: &mut impl Read) -> Result<MdrHeader> {
        let header_len = reader.read_u16::<LittleEndian>()?;
        let mut signature = [0u8; 10];
        reader.read_exact(&mut signature)?;
        if &signature != SIGNATURE {
            return Err(MdrError::BadSignature {
                found: signature.to_vec(),
            });
        }
        if header_len != HEADER_LEN {
            return Err(MdrError::InvalidFormat(format!(
                "unexpected header length {} (expected {})",
                header_len, HEADER_LEN
            )));
        }

        let mut header = MdrHeader::new();
        header.codepage = reader.read_u16::<LittleEndian>()?;
        header.sort_id = reader.read_u16::<LittleEndian>()?;
        header.flags = reader.read_u16::<LittleEndian>()?;
        header.num_maps = reader.read_u16::<LittleEndian>()?;
        for number in 1..=SECTION_MAX {
            header.entries[number] = SectionEntry {
                offset: reader.read_u32::<LittleEndian>()?,
                end: reader.read_u32::<LittleEndian>()?,
                item_size: reader.read_u16::<LittleEndian>()?,
                extra: reader.read_u32::<LittleEndian>()?,
            };
        }
        Ok(header)
    }
}

impl Default for MdrHeader {
    fn default() -> Self {
        Self::new()
    }
}
