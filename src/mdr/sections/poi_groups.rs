//! Sections 9 and 10: POIs grouped by type.
//!
//! Section 10 lists POI record numbers ordered by (type, name); section 9
//! holds, for each type in section 4 order, the first section-10 record
//! of that type's group. Section 9's item size depends on section 10's
//! final count, which is why both are built before any width is frozen.

use std::io::Write;

use crate::mdr::codec::put_n;
use crate::mdr::config::Sort;
use crate::mdr::sizes::PointerSizes;
use byteorder::WriteBytesExt;

use super::poi_types::PoiTypeSection;
use super::pois::PoiSection;
use super::Section;

/// Flag bit on a section 10 record: the POI belongs to a city.
pub const FLAG_HAS_CITY: u8 = 0x01;

/// Flag bit on a section 10 record: the POI is itself a city point.
pub const FLAG_IS_CITY: u8 = 0x02;

/// Section 10: POI record numbers in (type, name) order.
pub struct PoiTypeGroups {
    rows: Vec<(u32, u8)>,
    /// One `(first section-10 record)` per section 4 type, same order.
    group_starts: Vec<u32>,
}

impl PoiTypeGroups {
    pub fn build(pois: &PoiSection, types: &PoiTypeSection, sort: &Sort) -> PoiTypeGroups {
        let records = pois.records();
        let mut order: Vec<u32> = (1..=records.len() as u32).collect();
        order.sort_by_cached_key(|&n| {
            let r = &records[n as usize - 1];
            (r.full_type, sort.key(&r.name))
        });

        let mut rows = Vec::with_capacity(order.len());
        for &n in &order {
            let r = &records[n as usize - 1];
            let mut flags = 0;
            if r.city.is_some() {
                flags |= FLAG_HAS_CITY;
            }
            if r.is_city {
                flags |= FLAG_IS_CITY;
            }
            rows.push((n, flags));
        }

        // Group starts follow section 4's ascending type order; every
        // type in section 4 came from at least one POI, so each group is
        // non-empty.
        let mut group_starts = Vec::with_capacity(types.types().len());
        let mut row = 0usize;
        for &full_type in types.types() {
            while records[order[row] as usize - 1].full_type < full_type {
                row += 1;
            }
            group_starts.push(row as u32 + 1);
        }

        PoiTypeGroups { rows, group_starts }
    }

    pub fn group_starts(&self) -> &[u32] {
        &self.group_starts
    }
}

impl Section for PoiTypeGroups {
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

/// Section 9: first section-10 record of each type group.
pub struct PoiGroupIndex {
    rows: Vec<u32>,
}

impl PoiGroupIndex {
    pub fn build(groups: &PoiTypeGroups) -> PoiGroupIndex {
        PoiGroupIndex {
            rows: groups.group_starts().to_vec(),
        }
    }
}

impl Section for PoiGroupIndex {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        sizes.section(10)
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for &first in &self.rows {
            put_n(writer, sizes.section(10), first)?;
        }
        Ok(())
    }
}
