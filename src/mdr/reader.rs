//! Reading an MDR file back.
//!
//! The reader covers the surface the toolkit itself needs: the header
//! with its section table, the map list and the string pool. Decoding
//! every record of every section is the consuming navigation software's
//! job, not this crate's.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use log::info;

use super::config::encoding_for_code_page;
use super::error::{MdrError, Result};
use super::header::{MdrHeader, SectionEntry, FLAG_FOR_DEVICE, SECTION_MAX};

/// A parsed MDR file.
pub struct MdrReader<R> {
    reader: R,
    pub header: MdrHeader,
}

impl<R: Read + Seek> MdrReader<R> {
    /// Parse the header from the start of `reader`.
    ///
    /// # Errors
    /// Returns an error if the signature or header length is wrong, or on
    /// any I/O failure.
    pub fn new(mut reader: R) -> Result<MdrReader<R>> {
        reader.seek(SeekFrom::Start(0))?;
        let header = MdrHeader::read_from(&mut reader)?;
        info!(
            "opened MDR index: {} maps, code page {}, {} sections",
            header.num_maps,
            header.codepage,
            (1..=SECTION_MAX as u8)
                .filter(|&n| header.section(n).is_present())
                .count()
        );
        Ok(MdrReader { reader, header })
    }

    /// The header entry of a section.
    pub fn section(&self, number: u8) -> &SectionEntry {
        self.header.section(number)
    }

    /// Section numbers with a non-zero header entry.
    pub fn present_sections(&self) -> Vec<u8> {
        (1..=SECTION_MAX as u8)
            .filter(|&n| self.header.section(n).is_present())
            .collect()
    }

    pub fn is_for_device(&self) -> bool {
        self.header.flags & FLAG_FOR_DEVICE != 0
    }

    /// Record count of a fixed-width section, 0 if absent.
    pub fn record_count(&self, number: u8) -> u32 {
        let entry = self.header.section(number);
        if entry.item_size == 0 {
            return 0;
        }
        entry.len_bytes() / entry.item_size as u32
    }

    /// The registered map numbers, from section 1.
    pub fn map_numbers(&mut self) -> Result<Vec<u32>> {
        let entry = *self.header.section(1);
        if !entry.is_present() {
            return Ok(Vec::new());
        }
        let item_size = entry.item_size as u32;
        if item_size != 4 && item_size != 8 {
            return Err(MdrError::InvalidFormat(format!(
                "map index item size {} is not 4 or 8",
                item_size
            )));
        }
        self.reader.seek(SeekFrom::Start(entry.offset as u64))?;
        let mut maps = Vec::new();
        for _ in 0..entry.len_bytes() / item_size {
            maps.push(self.reader.read_u32::<LittleEndian>()?);
            if item_size == 8 {
                self.reader.read_u32::<LittleEndian>()?;
            }
        }
        Ok(maps)
    }

    /// The `(section, first, count)` ranges one map owns, from its map
    /// index subsection. Full builds only.
    pub fn map_subsections(&mut self, map: usize) -> Result<Vec<(u8, u32, u32)>> {
        let entry = *self.header.section(1);
        if !entry.is_present() || entry.item_size != 8 {
            return Err(MdrError::InvalidFormat(
                "this file has no map subsections".to_string(),
            ));
        }
        let n_sections = entry.extra as usize;
        self.reader
            .seek(SeekFrom::Start(entry.offset as u64 + map as u64 * 8 + 4))?;
        let blob_offset = self.reader.read_u32::<LittleEndian>()?;
        self.reader.seek(SeekFrom::Start(blob_offset as u64))?;
        let mut ranges = Vec::with_capacity(n_sections);
        for _ in 0..n_sections {
            let section = self.reader.read_u8()?;
            let first = self.reader.read_u32::<LittleEndian>()?;
            let count = self.reader.read_u32::<LittleEndian>()?;
            ranges.push((section, first, count));
        }
        Ok(ranges)
    }

    /// Decode the string pool back into text, in pool order.
    ///
    /// Only meaningful for full builds; device files drop section 15.
    pub fn strings(&mut self) -> Result<Vec<String>> {
        let entry = *self.header.section(15);
        if !entry.is_present() {
            return Err(MdrError::InvalidFormat(
                "this file has no string pool".to_string(),
            ));
        }
        let encoding = encoding_for_code_page(self.header.codepage)
            .ok_or(MdrError::UnsupportedCodePage(self.header.codepage))?;

        self.reader.seek(SeekFrom::Start(entry.offset as u64))?;
        let mut pool = vec![0u8; entry.len_bytes() as usize];
        self.reader.read_exact(&mut pool)?;
        if pool.first() != Some(&0) {
            return Err(MdrError::InvalidFormat(
                "string pool does not start with the reserved entry".to_string(),
            ));
        }

        // Skip the reserved entry, then split on terminators. A trailing
        // NUL belongs to the last string, so the final empty piece is not
        // an entry.
        let mut strings = Vec::new();
        for piece in pool[1..].split(|&b| b == 0) {
            if piece.is_empty() {
                continue;
            }
            let (decoded, _, _) = encoding.decode(piece);
            strings.push(decoded.into_owned());
        }
        Ok(strings)
    }
}
