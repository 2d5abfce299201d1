//! Sections 23–29: the name-ordered derivatives.
//!
//! These sections never own entities; they are orderings of, and pointers
//! into, the base tables, built only after those tables have final record
//! numbers:
//!
//! - 23/24: regions and countries in name order
//! - 25/27: cities regrouped under their country/region name
//! - 28/29: one record per distinct region/country name, pointing at the
//!   start of that name's group in each of the sections grouped the same
//!   way
//! - 26: section 28 re-ordered by name

use std::collections::{HashMap, HashSet};
use std::io::Write;

use crate::mdr::codec::put_n;
use crate::mdr::config::{BuildMode, Sort};
use crate::mdr::sizes::PointerSizes;
use byteorder::WriteBytesExt;

use super::cities::{CitySection, FLAG_NAME_BREAK};
use super::countries::CountrySection;
use super::regions::RegionSection;
use super::streets_by::GroupedStreetSection;
use super::Section;

/// Section 23: region record numbers in name order.
pub struct SortedRegionSection {
    rows: Vec<(u32, u8)>,
    first_by_key: HashMap<Vec<u8>, u32>,
}

impl SortedRegionSection {
    pub fn build(regions: &RegionSection, sort: &Sort) -> SortedRegionSection {
        let records = regions.records();
        let mut order: Vec<u32> = (1..=records.len() as u32).collect();
        order.sort_by_cached_key(|&n| {
            let r = &records[n as usize - 1];
            (sort.key(&r.name), r.map, n)
        });

        let mut rows = Vec::with_capacity(order.len());
        let mut first_by_key = HashMap::new();
        let mut prev_key: Option<Vec<u8>> = None;
        for n in order {
            let key = sort.key(&records[n as usize - 1].name);
            let mut flags = 0;
            if prev_key.as_deref() != Some(key.as_slice()) {
                flags |= FLAG_NAME_BREAK;
                first_by_key.insert(key.clone(), rows.len() as u32 + 1);
            }
            prev_key = Some(key);
            rows.push((n, flags));
        }
        SortedRegionSection { rows, first_by_key }
    }

    pub fn first_for_key(&self, key: &[u8]) -> u32 {
        self.first_by_key.get(key).copied().unwrap_or(0)
    }
}

impl Section for SortedRegionSection {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        sizes.section(13) + 1
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for &(region_ptr, flags) in &self.rows {
            put_n(writer, sizes.section(13), region_ptr)?;
            writer.write_u8(flags)?;
        }
        Ok(())
    }
}

/// Section 24: country record numbers in name order.
///
/// Device builds have no country table to point into, so the record falls
/// back to the inline map/label pair.
pub struct SortedCountrySection {
    mode: BuildMode,
    /// (country record number, map, label offset, flags)
    rows: Vec<(u32, u16, u32, u8)>,
    first_by_key: HashMap<Vec<u8>, u32>,
}

impl SortedCountrySection {
    pub fn build(countries: &CountrySection, sort: &Sort, mode: BuildMode) -> SortedCountrySection {
        let records = countries.records();
        let mut order: Vec<u32> = (1..=records.len() as u32).collect();
        order.sort_by_cached_key(|&n| {
            let r = &records[n as usize - 1];
            (sort.key(&r.name), r.map, n)
        });

        let mut rows = Vec::with_capacity(order.len());
        let mut first_by_key = HashMap::new();
        let mut prev_key: Option<Vec<u8>> = None;
        for n in order {
            let r = &records[n as usize - 1];
            let key = sort.key(&r.name);
            let mut flags = 0;
            if prev_key.as_deref() != Some(key.as_slice()) {
                flags |= FLAG_NAME_BREAK;
                first_by_key.insert(key.clone(), rows.len() as u32 + 1);
            }
            prev_key = Some(key);
            rows.push((n, r.map, r.lbl, flags));
        }
        SortedCountrySection {
            mode,
            rows,
            first_by_key,
        }
    }

    pub fn first_for_key(&self, key: &[u8]) -> u32 {
        self.first_by_key.get(key).copied().unwrap_or(0)
    }
}

impl Section for SortedCountrySection {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        match self.mode {
            BuildMode::Full => sizes.section(14) + 1,
            BuildMode::ForDevice => sizes.map() + 3 + 1,
        }
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for &(country_ptr, map, lbl, flags) in &self.rows {
            match self.mode {
                BuildMode::Full => put_n(writer, sizes.section(14), country_ptr)?,
                BuildMode::ForDevice => {
                    put_n(writer, sizes.map(), map as u32)?;
                    put_n(writer, 3, lbl)?;
                }
            }
            writer.write_u8(flags)?;
        }
        Ok(())
    }
}

/// Sections 25 and 27: city record numbers regrouped under the name of
/// their country (25) or region (27).
pub struct GroupedCitySection {
    rows: Vec<(u32, u8)>,
    first_by_group: HashMap<Vec<u8>, u32>,
}

impl GroupedCitySection {
    /// Section 25: cities whose region→country chain resolves.
    pub fn by_country(
        cities: &CitySection,
        regions: &RegionSection,
        countries: &CountrySection,
        sort: &Sort,
    ) -> GroupedCitySection {
        Self::build(cities, sort, |city_region| {
            let region = regions.get(city_region?);
            Some(sort.key(&countries.get(region.country).name))
        })
    }

    /// Section 27: cities that lie in a region.
    pub fn by_region(
        cities: &CitySection,
        regions: &RegionSection,
        sort: &Sort,
    ) -> GroupedCitySection {
        Self::build(cities, sort, |city_region| {
            Some(sort.key(&regions.get(city_region?).name))
        })
    }

    fn build(
        cities: &CitySection,
        sort: &Sort,
        group_key: impl Fn(Option<crate::mdr::records::RegionId>) -> Option<Vec<u8>>,
    ) -> GroupedCitySection {
        let mut entries: Vec<(Vec<u8>, Vec<u8>, u32)> = Vec::new();
        for (i, city) in cities.records().iter().enumerate() {
            if let Some(key) = group_key(city.region) {
                entries.push((key, sort.key(&city.name), i as u32 + 1));
            }
        }
        entries.sort();

        let mut rows = Vec::with_capacity(entries.len());
        let mut first_by_group = HashMap::new();
        let mut prev_group: Option<&[u8]> = None;
        for (group_key, _, city_ptr) in &entries {
            let mut flags = 0;
            if prev_group != Some(group_key.as_slice()) {
                flags |= FLAG_NAME_BREAK;
                first_by_group.insert(group_key.clone(), rows.len() as u32 + 1);
            }
            prev_group = Some(group_key.as_slice());
            rows.push((*city_ptr, flags));
        }

        GroupedCitySection {
            rows,
            first_by_group,
        }
    }

    pub fn first_for_key(&self, key: &[u8]) -> u32 {
        self.first_by_group.get(key).copied().unwrap_or(0)
    }
}

impl Section for GroupedCitySection {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        sizes.section(5) + 1
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for &(city_ptr, flags) in &self.rows {
            put_n(writer, sizes.section(5), city_ptr)?;
            writer.write_u8(flags)?;
        }
        Ok(())
    }
}

/// Section 28: one record per distinct region name, in order of the
/// name's first appearance, pointing at the name's group start in
/// sections 23, 21 and 27.
pub struct RegionNameSection {
    /// (mdr23 ptr, string offset, mdr21 ptr, mdr27 ptr, collation key)
    rows: Vec<(u32, u32, u32, u32, Vec<u8>)>,
}

impl RegionNameSection {
    pub fn build(
        regions: &RegionSection,
        sorted_regions: &SortedRegionSection,
        streets_by_region: &GroupedStreetSection,
        cities_by_region: &GroupedCitySection,
        sort: &Sort,
    ) -> RegionNameSection {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        for region in regions.records() {
            let key = sort.key(&region.name);
            if !seen.insert(key.clone()) {
                continue;
            }
            rows.push((
                sorted_regions.first_for_key(&key),
                region.name_off,
                streets_by_region.first_for_key(&key),
                cities_by_region.first_for_key(&key),
                key,
            ));
        }
        RegionNameSection { rows }
    }

    /// Collation keys in record order, for section 26.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.rows.iter().map(|r| r.4.as_slice())
    }
}

impl Section for RegionNameSection {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        sizes.section(23) + sizes.str_off() + sizes.section(21) + sizes.section(27)
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for (mdr23, name_off, mdr21, mdr27, _) in &self.rows {
            put_n(writer, sizes.section(23), *mdr23)?;
            put_n(writer, sizes.str_off(), *name_off)?;
            put_n(writer, sizes.section(21), *mdr21)?;
            put_n(writer, sizes.section(27), *mdr27)?;
        }
        Ok(())
    }

    // Purpose of the flag value is not known.
    fn extra(&self) -> u32 {
        0x7
    }
}

/// Section 26: section 28's records in name order.
pub struct SortedRegionNameIndex {
    rows: Vec<u32>,
}

impl SortedRegionNameIndex {
    pub fn build(region_names: &RegionNameSection) -> SortedRegionNameIndex {
        let mut order: Vec<(usize, &[u8])> = region_names.keys().enumerate().collect();
        order.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(&b.0)));
        SortedRegionNameIndex {
            rows: order.into_iter().map(|(i, _)| i as u32 + 1).collect(),
        }
    }
}

impl Section for SortedRegionNameIndex {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        sizes.section(28)
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for &mdr28_ptr in &self.rows {
            put_n(writer, sizes.section(28), mdr28_ptr)?;
        }
        Ok(())
    }
}

/// Section 29: one record per distinct country name, pointing at the
/// name's group start in sections 24, 22 and 25.
pub struct CountryNameSection {
    mode: BuildMode,
    /// (mdr24 ptr, string offset, mdr22 ptr, mdr25 ptr)
    rows: Vec<(u32, u32, u32, u32)>,
}

impl CountryNameSection {
    pub fn build(
        countries: &CountrySection,
        sorted_countries: &SortedCountrySection,
        streets_by_country: &GroupedStreetSection,
        cities_by_country: &GroupedCitySection,
        sort: &Sort,
        mode: BuildMode,
    ) -> CountryNameSection {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        for country in countries.records() {
            let key = sort.key(&country.name);
            if !seen.insert(key.clone()) {
                continue;
            }
            rows.push((
                sorted_countries.first_for_key(&key),
                country.name_off,
                streets_by_country.first_for_key(&key),
                cities_by_country.first_for_key(&key),
            ));
        }
        CountryNameSection { mode, rows }
    }
}

impl Section for CountryNameSection {
    fn n_records(&self) -> usize {
        self.rows.len()
    }

    fn item_size(&self, sizes: &PointerSizes) -> usize {
        let base = sizes.section(24) + sizes.section(22) + sizes.section(25);
        match self.mode {
            BuildMode::Full => base + sizes.str_off(),
            BuildMode::ForDevice => base,
        }
    }

    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()> {
        for &(mdr24, name_off, mdr22, mdr25) in &self.rows {
            put_n(writer, sizes.section(24), mdr24)?;
            if self.mode == BuildMode::Full {
                put_n(writer, sizes.str_off(), name_off)?;
            }
            put_n(writer, sizes.section(22), mdr22)?;
            put_n(writer, sizes.section(25), mdr25)?;
        }
        Ok(())
    }

    fn extra(&self) -> u32 {
        0x3
    }
}
