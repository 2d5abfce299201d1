//! Section 1: the map index.
//!
//! One record per source map, in registration order. Full builds precede
//! the record table with one subsection blob per map listing the record
//! range that map owns in every map-indexed section (5, 6, 7, 11); those
//! sections keep their records map-major precisely so these ranges are
//! contiguous. The section is written last because the ranges are only
//! complete once every map-indexed section is final, and the header
//! offset points at the record table, not at the blobs.

use std::io::{Seek, Write};

use crate::mdr::config::BuildMode;
use crate::mdr::error::Result;
use crate::mdr::header::MdrHeader;
use byteorder::{LittleEndian, WriteBytesExt};

/// The sections whose per-map record ranges are indexed here.
pub const MAP_INDEXED_SECTIONS: [u8; 4] = [5, 6, 7, 11];

pub struct MapIndexSection {
    mode: BuildMode,
    map_numbers: Vec<u32>,
    /// `ranges[s]` = per-map `(first, count)` for `MAP_INDEXED_SECTIONS[s]`.
    ranges: Vec<Vec<(u32, u32)>>,
}

impl MapIndexSection {
    pub fn new(map_numbers: Vec<u32>, mode: BuildMode) -> MapIndexSection {
        MapIndexSection {
            mode,
            map_numbers,
            ranges: Vec::new(),
        }
    }

    /// Record the per-map ranges of one map-indexed section. Must be
    /// called once per entry of [`MAP_INDEXED_SECTIONS`], in order.
    pub fn add_ranges(&mut self, section: u8, ranges: Vec<(u32, u32)>) {
        assert_eq!(
            MAP_INDEXED_SECTIONS.get(self.ranges.len()),
            Some(&section),
            "map ranges supplied out of order"
        );
        assert_eq!(ranges.len(), self.map_numbers.len());
        self.ranges.push(ranges);
    }

    pub fn n_records(&self) -> usize {
        self.map_numbers.len()
    }

    pub fn item_size(&self) -> usize {
        match self.mode {
            BuildMode::Full => 8,
            BuildMode::ForDevice => 4,
        }
    }

    /// Write the whole section and fill in its header entry.
    ///
    /// This one does not go through the common bookkeeping because the
    /// subsection blobs sit before the offset recorded in the header.
    pub fn write(
        &self,
        writer: &mut (impl Write + Seek),
        header: &mut MdrHeader,
    ) -> Result<()> {
        if self.map_numbers.is_empty() {
            return Ok(());
        }

        let mut blob_offsets = Vec::with_capacity(self.map_numbers.len());
        if self.mode == BuildMode::Full {
            assert_eq!(self.ranges.len(), MAP_INDEXED_SECTIONS.len());
            for map in 0..self.map_numbers.len() {
                blob_offsets.push(writer.stream_position()? as u32);
                for (s, &section) in MAP_INDEXED_SECTIONS.iter().enumerate() {
                    let (first, count) = self.ranges[s][map];
                    writer.write_u8(section)?;
                    writer.write_u32::<LittleEndian>(first)?;
                    writer.write_u32::<LittleEndian>(count)?;
                }
            }
        }

        let table_start = writer.stream_position()? as u32;
        for (map, &map_number) in self.map_numbers.iter().enumerate() {
            writer.write_u32::<LittleEndian>(map_number)?;
            if self.mode == BuildMode::Full {
                writer.write_u32::<LittleEndian>(blob_offsets[map])?;
            }
        }

        header.set_position(1, table_start);
        header.set_end(1, writer.stream_position()? as u32);
        header.set_item_size(1, self.item_size() as u16);
        if self.mode == BuildMode::Full {
            header.set_extra(1, MAP_INDEXED_SECTIONS.len() as u32);
        }
        Ok(())
    }
}
