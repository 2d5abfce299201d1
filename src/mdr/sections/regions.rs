//! Section 13: the region table.
//!
//! Records stay in ingest order; a region's 1-based record number is
//! therefore its insertion order, which is what the region pointers in
//! other sections were handed out against. The name-sorted view lives in
//! section 23. Not written in device builds.

use std::io::Write;

use crate::mdr::codec::put_n;
use crate::mdr::records::{RegionId, RegionRecord};
use crate::mdr::sizes::PointerSizes;
use byteorder::{LittleEndian, WriteBytesExt};

use super::Section;

pub struct RegionSection {
    records: Vec<RegionRecord>,
}

impl RegionSection {
    pub fn new(records: Vec<RegionRecord>) -> RegionSection {
        RegionSection { records }
    }

    pub fn records(&self) -> &[RegionRecord] {
        &self.records
    }

    pub fn get(&self, id: RegionId) -> &RegionRecord {
        &self.records[id.0 as usize]
    }
}

impl Section for RegionSection {
    fn n_records(&self) -> usize {
        self.records.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        sizes.map() + 2 + 2 + 3 + sizes.str_off()
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for record in &self.records {
            put_n(writer, sizes.map(), record.map as u32)?;
            writer.write_u16::<LittleEndian>(record.region_local)?;
            writer.write_u16::<LittleEndian>(record.country_local)?;
            put_n(writer, 3, record.lbl)?;
            put_n(writer, sizes.str_off(), record.name_off)?;
        }
        Ok(())
    }
}
