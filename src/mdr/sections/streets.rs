//! Section 7: the street table.
//!
//! One record per indexed street name: map index, 3-byte label offset,
//! string offset (full builds), city pointer (0 when the street has no
//! city), flags. Map-major order, name order within each map.

use std::io::Write;

use crate::mdr::codec::put_n;
use crate::mdr::config::{BuildMode, Sort};
use crate::mdr::records::StreetRecord;
use crate::mdr::sizes::PointerSizes;
use byteorder::WriteBytesExt;

use super::cities::{CitySection, FLAG_NAME_BREAK};
use super::{map_ranges, Section};

pub struct StreetSection {
    mode: BuildMode,
    records: Vec<StreetRecord>,
    /// Resolved 1-based city record numbers, parallel to `records`.
    city_ptrs: Vec<u32>,
    flags: Vec<u8>,
    prepared: bool,
}

impl StreetSection {
    pub fn new(records: Vec<StreetRecord>, mode: BuildMode) -> StreetSection {
        StreetSection {
            mode,
            records,
            city_ptrs: Vec::new(),
            flags: Vec::new(),
            prepared: false,
        }
    }

    /// Sort the records and resolve city pointers against the finalized
    /// city section. Idempotent.
    pub fn prepare(&mut self, sort: &Sort, cities: &CitySection) {
        if self.prepared {
            return;
        }
        self.prepared = true;

        self.records
            .sort_by_cached_key(|r| (r.map, sort.key(&r.name), r.lbl));

        self.city_ptrs = self
            .records
            .iter()
            .map(|r| r.city.map_or(0, |c| cities.position_of(c)))
            .collect();

        self.flags = Vec::with_capacity(self.records.len());
        let mut prev_key: Option<Vec<u8>> = None;
        for record in &self.records {
            let key = sort.key(&record.name);
            let mut flags = 0;
            if prev_key.as_deref() != Some(key.as_slice()) {
                flags |= FLAG_NAME_BREAK;
            }
            prev_key = Some(key);
            self.flags.push(flags);
        }
    }

    /// Records in final section order.
    pub fn records(&self) -> &[StreetRecord] {
        debug_assert!(self.prepared);
        &self.records
    }

    /// Per-map record ranges for the map index.
    pub fn map_ranges(&self, num_maps: usize) -> Vec<(u32, u32)> {
        map_ranges(self.records.iter().map(|r| r.map), num_maps)
    }
}

impl Section for StreetSection {
    fn n_records(&self) -> usize {
        self.records.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        match self.mode {
            BuildMode::Full => sizes.map() + 3 + sizes.str_off() + sizes.section(5) + 1,
            BuildMode::ForDevice => sizes.map() + 3 + sizes.section(5) + 1,
        }
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for ((record, &city_ptr), &flags) in
            self.records.iter().zip(&self.city_ptrs).zip(&self.flags)
        {
            put_n(writer, sizes.map(), record.map as u32)?;
            put_n(writer, 3, record.lbl)?;
            if self.mode == BuildMode::Full {
                put_n(writer, sizes.str_off(), record.name_off)?;
            }
            put_n(writer, sizes.section(5), city_ptr)?;
            writer.write_u8(flags)?;
        }
        Ok(())
    }

    fn extra(&self) -> u32 {
        0x04
    }
}
