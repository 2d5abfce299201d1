//! Section 14: the country table.
//!
//! Ingest order, like the region table; section 24 carries the sorted
//! view. Not written in device builds.

use std::io::Write;

use crate::mdr::codec::put_n;
use crate::mdr::records::{CountryId, CountryRecord};
use crate::mdr::sizes::PointerSizes;
use byteorder::{LittleEndian, WriteBytesExt};

use super::Section;

pub struct CountrySection {
    records: Vec<CountryRecord>,
}

impl CountrySection {
    pub fn new(records: Vec<CountryRecord>) -> CountrySection {
        CountrySection { records }
    }

    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn get(&self, id: CountryId) -> &CountryRecord {
        &self.records[id.0 as usize]
    }
}

impl Section for CountrySection {
    fn n_records(&self) -> usize {
        self.records.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        sizes.map() + 2 + 3 + sizes.str_off()
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for record in &self.records {
            put_n(writer, sizes.map(), record.map as u32)?;
            writer.write_u16::<LittleEndian>(record.country_local)?;
            put_n(writer, 3, record.lbl)?;
            put_n(writer, sizes.str_off(), record.name_off)?;
        }
        Ok(())
    }
}
