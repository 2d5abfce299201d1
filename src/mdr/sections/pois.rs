//! Sections 11 and 12: the POI table and its name index.
//!
//! Section 11 keeps ingest order (map-major by construction), so the map
//! index can address each map's POIs as one contiguous range. The one-byte
//! group slot `city_local` is the reason a (map, city) group cannot hold
//! more than 255 points. Section 12 is the global name ordering over the
//! same records, written in full builds only.

use std::io::Write;

use crate::mdr::codec::put_n;
use crate::mdr::config::{BuildMode, Sort};
use crate::mdr::records::PoiRecord;
use crate::mdr::sizes::PointerSizes;
use byteorder::WriteBytesExt;

use super::cities::{CitySection, FLAG_NAME_BREAK};
use super::{map_ranges, Section};

pub struct PoiSection {
    mode: BuildMode,
    records: Vec<PoiRecord>,
    /// Resolved 1-based city record numbers, parallel to `records`.
    city_ptrs: Vec<u32>,
    prepared: bool,
}

impl PoiSection {
    pub fn new(records: Vec<PoiRecord>, mode: BuildMode) -> PoiSection {
        PoiSection {
            mode,
            records,
            city_ptrs: Vec::new(),
            prepared: false,
        }
    }

    /// Resolve city pointers against the finalized city section. The
    /// record order itself is already final. Idempotent.
    pub fn prepare(&mut self, cities: &CitySection) {
        if self.prepared {
            return;
        }
        self.prepared = true;
        self.city_ptrs = self
            .records
            .iter()
            .map(|r| r.city.map_or(0, |c| cities.position_of(c)))
            .collect();
    }

    /// Records in final section order (1-based record number = index + 1).
    pub fn records(&self) -> &[PoiRecord] {
        debug_assert!(self.prepared);
        &self.records
    }

    /// Per-map record ranges for the map index.
    pub fn map_ranges(&self, num_maps: usize) -> Vec<(u32, u32)> {
        map_ranges(self.records.iter().map(|r| r.map), num_maps)
    }
}

impl Section for PoiSection {
    fn n_records(&self) -> usize {
        self.records.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        match self.mode {
            BuildMode::Full => sizes.map() + 1 + 3 + sizes.section(5) + sizes.str_off(),
            BuildMode::ForDevice => sizes.map() + 1 + 3 + sizes.section(5),
        }
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for (record, &city_ptr) in self.records.iter().zip(&self.city_ptrs) {
            put_n(writer, sizes.map(), record.map as u32)?;
            writer.write_u8(record.city_local)?;
            put_n(writer, 3, record.lbl)?;
            put_n(writer, sizes.section(5), city_ptr)?;
            if self.mode == BuildMode::Full {
                put_n(writer, sizes.str_off(), record.name_off)?;
            }
        }
        Ok(())
    }

    fn extra(&self) -> u32 {
        0x13
    }
}

/// Section 12: POI record numbers in global name order.
pub struct PoiNameIndex {
    rows: Vec<(u32, u8)>,
}

impl PoiNameIndex {
    pub fn build(pois: &PoiSection, sort: &Sort) -> PoiNameIndex {
        let mut order: Vec<u32> = (1..=pois.records().len() as u32).collect();
        order.sort_by_cached_key(|&n| sort.key(&pois.records()[n as usize - 1].name));

        let mut rows = Vec::with_capacity(order.len());
        let mut prev_key: Option<Vec<u8>> = None;
        for n in order {
            let key = sort.key(&pois.records()[n as usize - 1].name);
            let mut flags = 0;
            if prev_key.as_deref() != Some(key.as_slice()) {
                flags |= FLAG_NAME_BREAK;
            }
            prev_key = Some(key);
            rows.push((n, flags));
        }
        PoiNameIndex { rows }
    }
}

impl Section for PoiNameIndex {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        sizes.section(11) + 1
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for &(poi_ptr, flags) in &self.rows {
            put_n(writer, sizes.section(11), poi_ptr)?;
            writer.write_u8(flags)?;
        }
        Ok(())
    }
}
