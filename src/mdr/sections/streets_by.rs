//! Sections 20, 21 and 22: streets regrouped by city, region and country.
//!
//! Each is the same shape: pointers into the street table (section 7),
//! ordered by the grouping name first and the street name second, with a
//! flag bit marking the first record of every group. The group starts are
//! kept around because the name-cluster sections (28, 29) point at them.

use std::collections::HashMap;
use std::io::Write;

use crate::mdr::codec::put_n;
use crate::mdr::config::Sort;
use crate::mdr::records::StreetRecord;
use crate::mdr::sizes::PointerSizes;
use byteorder::WriteBytesExt;

use super::cities::CitySection;
use super::countries::CountrySection;
use super::regions::RegionSection;
use super::streets::StreetSection;
use super::Section;

/// Flag bit set on the first street of each name group.
pub const FLAG_GROUP_BREAK: u8 = 0x01;

/// A street table regrouped under another entity's name.
pub struct GroupedStreetSection {
    rows: Vec<(u32, u8)>,
    /// Collation key of the group name → first 1-based record number.
    first_by_group: HashMap<Vec<u8>, u32>,
}

impl GroupedStreetSection {
    /// Section 20: streets that belong to a city, by city name.
    pub fn by_city(
        streets: &StreetSection,
        cities: &CitySection,
        sort: &Sort,
    ) -> GroupedStreetSection {
        Self::build(streets, sort, |street| {
            street.city.map(|c| sort.key(&cities.get(c).name))
        })
    }

    /// Section 21: streets whose city lies in a region, by region name.
    pub fn by_region(
        streets: &StreetSection,
        cities: &CitySection,
        regions: &RegionSection,
        sort: &Sort,
    ) -> GroupedStreetSection {
        Self::build(streets, sort, |street| {
            let city = cities.get(street.city?);
            Some(sort.key(&regions.get(city.region?).name))
        })
    }

    /// Section 22: streets reachable through a region's country, by
    /// country name.
    pub fn by_country(
        streets: &StreetSection,
        cities: &CitySection,
        regions: &RegionSection,
        countries: &CountrySection,
        sort: &Sort,
    ) -> GroupedStreetSection {
        Self::build(streets, sort, |street| {
            let city = cities.get(street.city?);
            let region = regions.get(city.region?);
            Some(sort.key(&countries.get(region.country).name))
        })
    }

    fn build(
        streets: &StreetSection,
        sort: &Sort,
        group_key: impl Fn(&StreetRecord) -> Option<Vec<u8>>,
    ) -> GroupedStreetSection {
        let records = streets.records();
        let mut entries: Vec<(Vec<u8>, Vec<u8>, u32)> = Vec::new();
        for (i, street) in records.iter().enumerate() {
            if let Some(key) = group_key(street) {
                entries.push((key, sort.key(&street.name), i as u32 + 1));
            }
        }
        entries.sort();

        let mut rows = Vec::with_capacity(entries.len());
        let mut first_by_group = HashMap::new();
        let mut prev_group: Option<&[u8]> = None;
        for (group_key, _, street_ptr) in &entries {
            let mut flags = 0;
            if prev_group != Some(group_key.as_slice()) {
                flags |= FLAG_GROUP_BREAK;
                first_by_group.insert(group_key.clone(), rows.len() as u32 + 1);
            }
            prev_group = Some(group_key.as_slice());
            rows.push((*street_ptr, flags));
        }

        GroupedStreetSection {
            rows,
            first_by_group,
        }
    }

    /// First record of the group whose name has this collation key, or 0.
    pub fn first_for_key(&self, key: &[u8]) -> u32 {
        self.first_by_group.get(key).copied().unwrap_or(0)
    }

    /// Street record numbers in section order, for the composite index.
    pub fn street_ptrs(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.iter().map(|&(ptr, _)| ptr)
    }
}

impl Section for GroupedStreetSection {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        sizes.section(7) + 1
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for &(street_ptr, flags) in &self.rows {
            put_n(writer, sizes.section(7), street_ptr)?;
            writer.write_u8(flags)?;
        }
        Ok(())
    }
}
