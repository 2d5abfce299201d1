//! Sections 17, 18 and 19: the for-device indexes.
//!
//! Devices do not get the string pool or the desktop-only sorted views;
//! instead they get POIs pre-sorted by type (19), a type → group start
//! table (18) and the composite name index (17), which carries its own
//! encoded text so name search works without section 15.

use std::io::Write;

use crate::mdr::codec::put_n;
use crate::mdr::config::Sort;
use crate::mdr::sizes::PointerSizes;
use byteorder::{LittleEndian, WriteBytesExt};

use super::cities::CitySection;
use super::pois::PoiSection;
use super::streets::StreetSection;
use super::streets_by::GroupedStreetSection;
use super::Section;

/// Section 19: POI record numbers in (type, name) order.
pub struct DevicePoiSection {
    rows: Vec<u32>,
    /// `(full type, first section-19 record)` per distinct type.
    type_starts: Vec<(u16, u32)>,
}

impl DevicePoiSection {
    pub fn build(pois: &PoiSection, sort: &Sort) -> DevicePoiSection {
        let records = pois.records();
        let mut order: Vec<u32> = (1..=records.len() as u32).collect();
        order.sort_by_cached_key(|&n| {
            let r = &records[n as usize - 1];
            (r.full_type, sort.key(&r.name))
        });

        let mut type_starts = Vec::new();
        for (row, &n) in order.iter().enumerate() {
            let full_type = records[n as usize - 1].full_type;
            if type_starts.last().map(|&(t, _)| t) != Some(full_type) {
                type_starts.push((full_type, row as u32 + 1));
            }
        }

        DevicePoiSection {
            rows: order,
            type_starts,
        }
    }

    pub fn type_starts(&self) -> &[(u16, u32)] {
        &self.type_starts
    }
}

impl Section for DevicePoiSection {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        sizes.section(11)
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for &poi_ptr in &self.rows {
            put_n(writer, sizes.section(11), poi_ptr)?;
        }
        Ok(())
    }
}

/// Section 18: type → first section-19 record.
pub struct DevicePoiTypeIndex {
    rows: Vec<(u16, u32)>,
}

impl DevicePoiTypeIndex {
    pub fn build(device_pois: &DevicePoiSection) -> DevicePoiTypeIndex {
        DevicePoiTypeIndex {
            rows: device_pois.type_starts().to_vec(),
        }
    }
}

impl Section for DevicePoiTypeIndex {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        2 + sizes.section(19)
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for &(full_type, first) in &self.rows {
            writer.write_u16::<LittleEndian>(full_type)?;
            put_n(writer, sizes.section(19), first)?;
        }
        Ok(())
    }
}

/// Entry kinds in the composite name index.
pub const KIND_CITY: u8 = 1;
pub const KIND_STREET: u8 = 2;
pub const KIND_POI: u8 = 3;
pub const KIND_STREET_BY_COUNTRY: u8 = 4;

/// Section 17: one merged name ordering across cities, streets, POIs and
/// streets-by-country.
///
/// Variable-size entries (`kind`, 3-byte record number, encoded name,
/// NUL), so the header's item size is 0 and the entry count is carried in
/// the extra flag word instead.
pub struct CompositeNameIndex {
    /// (kind, record number, encoded name) in name order.
    entries: Vec<(u8, u32, Vec<u8>)>,
}

impl CompositeNameIndex {
    pub fn build(
        cities: &CitySection,
        streets: &StreetSection,
        pois: &PoiSection,
        streets_by_country: &GroupedStreetSection,
        sort: &Sort,
    ) -> CompositeNameIndex {
        let mut keyed: Vec<(Vec<u8>, u8, u32, Vec<u8>)> = Vec::new();

        let push = |keyed: &mut Vec<(Vec<u8>, u8, u32, Vec<u8>)>, kind: u8, n: u32, name: &str| {
            let encoded = sort.encoding().encode(name).0.into_owned();
            keyed.push((sort.key(name), kind, n, encoded));
        };

        for (i, city) in cities.records().iter().enumerate() {
            push(&mut keyed, KIND_CITY, i as u32 + 1, &city.name);
        }
        for (i, street) in streets.records().iter().enumerate() {
            push(&mut keyed, KIND_STREET, i as u32 + 1, &street.name);
        }
        for (i, poi) in pois.records().iter().enumerate() {
            push(&mut keyed, KIND_POI, i as u32 + 1, &poi.name);
        }
        for (row, street_ptr) in streets_by_country.street_ptrs().enumerate() {
            let name = &streets.records()[street_ptr as usize - 1].name;
            push(&mut keyed, KIND_STREET_BY_COUNTRY, row as u32 + 1, name);
        }

        keyed.sort();
        CompositeNameIndex {
            entries: keyed
                .into_iter()
                .map(|(_, kind, n, name)| (kind, n, name))
                .collect(),
        }
    }
}

impl Section for CompositeNameIndex {
    fn n_records(&self) -> usize {
        self.entries.len()
    }

    fn item_size(&self, _sizes: &PointerSizes) -> usize {
        0
    }

    fn write_records(&self, writer: &mut dyn Write, _sizes: &PointerSizes) -> std::io::Result<()> {
        for (kind, record, name) in &self.entries {
            writer.write_u8(*kind)?;
            put_n(writer, 3, *record)?;
            writer.write_all(name)?;
            writer.write_u8(0)?;
        }
        Ok(())
    }

    fn extra(&self) -> u32 {
        self.entries.len() as u32
    }
}
