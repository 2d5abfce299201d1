//! Section 6: the postal code table.
//!
//! Record layout: map index, 3-byte label offset, string offset (full
//! builds). Map-major order, code order within each map.

use std::io::Write;

use crate::mdr::codec::put_n;
use crate::mdr::config::{BuildMode, Sort};
use crate::mdr::records::ZipRecord;
use crate::mdr::sizes::PointerSizes;

use super::{map_ranges, Section};

pub struct ZipSection {
    mode: BuildMode,
    records: Vec<ZipRecord>,
    prepared: bool,
}

impl ZipSection {
    pub fn new(records: Vec<ZipRecord>, mode: BuildMode) -> ZipSection {
        ZipSection {
            mode,
            records,
            prepared: false,
        }
    }

    /// Sort the records into final order. Idempotent.
    pub fn prepare(&mut self, sort: &Sort) {
        if self.prepared {
            return;
        }
        self.prepared = true;
        self.records
            .sort_by_cached_key(|r| (r.map, sort.key(&r.code), r.lbl));
    }

    /// Per-map record ranges for the map index.
    pub fn map_ranges(&self, num_maps: usize) -> Vec<(u32, u32)> {
        map_ranges(self.records.iter().map(|r| r.map), num_maps)
    }
}

impl Section for ZipSection {
    fn n_records(&self) -> usize {
        self.records.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        match self.mode {
            BuildMode::Full => sizes.map() + 3 + sizes.str_off(),
            BuildMode::ForDevice => sizes.map() + 3,
        }
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for record in &self.records {
            put_n(writer, sizes.map(), record.map as u32)?;
            put_n(writer, 3, record.lbl)?;
            if self.mode == BuildMode::Full {
                put_n(writer, sizes.str_off(), record.name_off)?;
            }
        }
        Ok(())
    }
}
