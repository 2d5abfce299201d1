//! Section 5: the city table.
//!
//! Record layout: map index, 1-based city index within that map, region
//! pointer (full builds), 3-byte label offset, string offset (full
//! builds), flags. Records are ordered map-major with name order inside
//! each map, so the map index (section 1) can describe each map's
//! contribution as one contiguous range.

use std::io::Write;

use crate::mdr::codec::put_n;
use crate::mdr::config::{BuildMode, Sort};
use crate::mdr::records::{CityId, CityRecord};
use crate::mdr::sizes::PointerSizes;
use byteorder::{LittleEndian, WriteBytesExt};

use super::{map_ranges, Section};

/// Flag bit set when a record's name differs from the previous record's.
pub const FLAG_NAME_BREAK: u8 = 0x01;

pub struct CitySection {
    mode: BuildMode,
    records: Vec<CityRecord>,
    flags: Vec<u8>,
    /// Insertion index → 1-based record number after the sort.
    positions: Vec<u32>,
    /// Insertion index → index into the sorted `records`.
    by_insertion: Vec<usize>,
    prepared: bool,
}

impl CitySection {
    pub fn new(records: Vec<CityRecord>, mode: BuildMode) -> CitySection {
        CitySection {
            mode,
            records,
            flags: Vec::new(),
            positions: Vec::new(),
            by_insertion: Vec::new(),
            prepared: false,
        }
    }

    /// Sort the records and assign final record numbers. Idempotent: a
    /// second call is a no-op.
    pub fn prepare(&mut self, sort: &Sort) {
        if self.prepared {
            return;
        }
        self.prepared = true;

        let mut indexed: Vec<(usize, CityRecord)> = self.records.drain(..).enumerate().collect();
        indexed.sort_by_cached_key(|(_, r)| (r.map, sort.key(&r.name), r.city_local));

        self.positions = vec![0; indexed.len()];
        self.by_insertion = vec![0; indexed.len()];
        self.records = Vec::with_capacity(indexed.len());
        for (pos, (orig, record)) in indexed.into_iter().enumerate() {
            self.positions[orig] = pos as u32 + 1;
            self.by_insertion[orig] = pos;
            self.records.push(record);
        }

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

    /// Final 1-based record number of a city.
    pub fn position_of(&self, id: CityId) -> u32 {
        debug_assert!(self.prepared);
        self.positions[id.0 as usize]
    }

    /// The city a handle refers to.
    pub fn get(&self, id: CityId) -> &CityRecord {
        debug_assert!(self.prepared);
        &self.records[self.by_insertion[id.0 as usize]]
    }

    /// Records in final section order.
    pub fn records(&self) -> &[CityRecord] {
        debug_assert!(self.prepared);
        &self.records
    }

    /// Per-map record ranges for the map index.
    pub fn map_ranges(&self, num_maps: usize) -> Vec<(u32, u32)> {
        map_ranges(self.records.iter().map(|r| r.map), num_maps)
    }
}

impl Section for CitySection {
    fn n_records(&self) -> usize {
        self.records.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        match self.mode {
            BuildMode::Full => sizes.map() + 2 + sizes.section(13) + 3 + sizes.str_off() + 1,
            BuildMode::ForDevice => sizes.map() + 2 + 3 + 1,
        }
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for (record, &flags) in self.records.iter().zip(&self.flags) {
            put_n(writer, sizes.map(), record.map as u32)?;
            writer.write_u16::<LittleEndian>(record.city_local)?;
            if self.mode == BuildMode::Full {
                let region_ptr = record.region.map_or(0, |r| r.0 + 1);
                put_n(writer, sizes.section(13), region_ptr)?;
            }
            put_n(writer, 3, record.lbl)?;
            if self.mode == BuildMode::Full {
                put_n(writer, sizes.str_off(), record.name_off)?;
            }
            writer.write_u8(flags)?;
        }
        Ok(())
    }

    fn extra(&self) -> u32 {
        0x02
    }
}
