//! Core MDR writer module
//!
//! [`MdrFile`] collects entities map by map, then serializes the whole
//! index in one pass. The build is strictly two-phase: every `add_*` call
//! happens before [`write`](MdrFile::write), which freezes the string
//! pool, finalizes each section, resolves the pointer widths from the
//! final record counts and streams the sections in a fixed order that
//! satisfies their mutual dependencies.

pub mod codec;
pub mod config;
pub mod error;
pub mod header;
pub mod reader;
pub mod records;
pub mod sections;
pub mod sizes;
pub mod strings;

use std::collections::{BTreeSet, HashMap};
use std::io::{Seek, Write};
use std::mem;

use log::{debug, error, info, warn};

use config::{is_section_included, BuildMode, MdrConfig, Sort};
use error::{MdrError, Result};
use header::{MdrHeader, FLAG_FOR_DEVICE, SECTION_MAX};
use records::{
    can_be_indexed, strip_garmin_codes, CityId, CityRecord, CountryId, CountryRecord, PoiRecord,
    RegionId, RegionRecord, StreetRecord, ZipRecord,
};
use sections::cities::CitySection;
use sections::countries::CountrySection;
use sections::device::{CompositeNameIndex, DevicePoiSection, DevicePoiTypeIndex};
use sections::map_index::MapIndexSection;
use sections::poi_groups::{PoiGroupIndex, PoiTypeGroups};
use sections::poi_types::PoiTypeSection;
use sections::pois::{PoiNameIndex, PoiSection};
use sections::regions::RegionSection;
use sections::sorted_names::{
    CountryNameSection, GroupedCitySection, RegionNameSection, SortedCountrySection,
    SortedRegionNameIndex, SortedRegionSection,
};
use sections::streets::StreetSection;
use sections::streets_by::GroupedStreetSection;
use sections::zips::ZipSection;
use sections::{Section, StringSection};
use sizes::PointerSizes;
use strings::StringPool;

/// The MDR index file under construction.
///
/// Add a map, then every entity belonging to it, before adding the next
/// map. Once [`write`](MdrFile::write) has run the builder is spent.
pub struct MdrFile {
    mode: BuildMode,
    sort: Option<Sort>,
    strings: Option<StringPool>,

    maps: Vec<u32>,
    countries: Vec<CountryRecord>,
    regions: Vec<RegionRecord>,
    cities: Vec<CityRecord>,
    zips: Vec<ZipRecord>,
    streets: Vec<StreetRecord>,
    pois: Vec<PoiRecord>,
    poi_types: BTreeSet<u16>,

    /// Indexed cities in the current map, for the 16-bit local slot.
    cities_in_map: u32,
    /// Points per (map, city) group, for the 8-bit local slot.
    poi_group_counts: HashMap<(u16, Option<CityId>), u16>,
}

impl MdrFile {
    pub fn new(config: MdrConfig) -> MdrFile {
        let strings = config
            .sort
            .as_ref()
            .map(|sort| StringPool::new(sort.encoding()));
        MdrFile {
            mode: config.mode,
            sort: config.sort,
            strings,
            maps: Vec::new(),
            countries: Vec::new(),
            regions: Vec::new(),
            cities: Vec::new(),
            zips: Vec::new(),
            streets: Vec::new(),
            pois: Vec::new(),
            poi_types: BTreeSet::new(),
            cities_in_map: 0,
            poi_group_counts: HashMap::new(),
        }
    }

    /// Register a map. All entities added afterwards belong to it, until
    /// the next `add_map`.
    ///
    /// The first map's code page decides the index's code page and sort;
    /// later maps with a different code page are accepted with a warning,
    /// as merged map sets are expected to be consistent.
    pub fn add_map(&mut self, map_number: u32, codepage: u16) -> Result<()> {
        match &self.sort {
            None => {
                let sort = Sort::for_code_page(codepage)?;
                self.strings = Some(StringPool::new(sort.encoding()));
                self.sort = Some(sort);
            }
            Some(sort) => {
                if codepage != 0 && sort.codepage() != codepage {
                    warn!(
                        "input files have different code pages: index uses {}, map {} has {}",
                        sort.codepage(),
                        map_number,
                        codepage
                    );
                }
            }
        }
        self.maps.push(map_number);
        self.cities_in_map = 0;
        debug!("map {} registered as index {}", map_number, self.maps.len());
        Ok(())
    }

    pub fn add_country(&mut self, country_local: u16, lbl: u32, name: &str) -> CountryId {
        let map = self.current_map();
        let name_off = self.intern(name);
        let id = CountryId(self.countries.len() as u32);
        self.countries.push(CountryRecord {
            map,
            country_local,
            lbl,
            name: name.to_string(),
            name_off,
        });
        id
    }

    pub fn add_region(
        &mut self,
        region_local: u16,
        country: CountryId,
        lbl: u32,
        name: &str,
    ) -> RegionId {
        let map = self.current_map();
        let name_off = self.intern(name);
        let country_local = self.countries[country.0 as usize].country_local;
        let id = RegionId(self.regions.len() as u32);
        self.regions.push(RegionRecord {
            map,
            region_local,
            country,
            country_local,
            lbl,
            name: name.to_string(),
            name_off,
        });
        id
    }

    /// Add a city. Cities without a label are not searchable and are not
    /// indexed; a map that runs out of 16-bit city slots drops the rest.
    pub fn add_city(&mut self, region: Option<RegionId>, lbl: u32, name: &str) -> Option<CityId> {
        let map = self.current_map();
        if lbl == 0 {
            return None;
        }
        if self.cities_in_map == u16::MAX as u32 {
            error!(
                "too many indexed cities in map {}; dropping {:?}",
                self.maps[map as usize - 1], name
            );
            return None;
        }
        self.cities_in_map += 1;
        let name_off = self.intern(name);
        let id = CityId(self.cities.len() as u32);
        self.cities.push(CityRecord {
            map,
            city_local: self.cities_in_map as u16,
            region,
            lbl,
            name: name.to_string(),
            name_off,
        });
        Some(id)
    }

    pub fn add_zip(&mut self, lbl: u32, code: &str) {
        let map = self.current_map();
        let name_off = self.intern(code);
        self.zips.push(ZipRecord {
            map,
            lbl,
            code: code.to_string(),
            name_off,
        });
    }

    /// Add one street name. Roads with several labels call this once per
    /// label.
    pub fn add_street(&mut self, lbl: u32, name: &str, city: Option<CityId>) {
        let map = self.current_map();
        if lbl == 0 {
            return;
        }
        let name = strip_garmin_codes(name);
        let name_off = self.intern(&name);
        self.streets.push(StreetRecord {
            map,
            lbl,
            name,
            city,
            name_off,
        });
    }

    /// Add a point of interest. Types outside the searchable range are
    /// ignored; a (map, city) group holds at most 255 points because the
    /// group slot on disk is a single byte, and further points are
    /// dropped with an error.
    pub fn add_point(
        &mut self,
        full_type: u16,
        lbl: u32,
        name: &str,
        city: Option<CityId>,
        is_city: bool,
    ) {
        let map = self.current_map();
        if !can_be_indexed(full_type) {
            return;
        }
        let count = self.poi_group_counts.entry((map, city)).or_insert(0);
        if *count == u8::MAX as u16 {
            error!("more than 255 points in one city group; dropping {:?}", name);
            return;
        }
        *count += 1;
        let city_local = *count as u8;
        let name_off = self.intern(name);
        self.pois.push(PoiRecord {
            map,
            city_local,
            lbl,
            full_type,
            city,
            is_city,
            name: name.to_string(),
            name_off,
        });
        self.poi_types.insert(full_type);
    }

    fn current_map(&self) -> u16 {
        assert!(!self.maps.is_empty(), "add_map must be called first");
        self.maps.len() as u16
    }

    fn intern(&mut self, text: &str) -> u32 {
        self.strings
            .as_mut()
            .expect("string pool exists once a map is added")
            .intern(text)
    }

    /// Serialize the index.
    ///
    /// Phase one finalizes every section: the string pool is frozen, base
    /// tables are sorted and get their final record numbers, and each
    /// derived section is built from read-only views of the tables it
    /// depends on, in dependency order. Phase two resolves all pointer
    /// widths from the final counts. Phase three reserves the header,
    /// streams the sections and patches the header in at the start.
    pub fn write<W: Write + Seek>(&mut self, writer: &mut W) -> Result<()> {
        let mode = self.mode;
        let sort = match &self.sort {
            Some(sort) => sort.clone(),
            None => Sort::for_code_page(0)?,
        };
        let mut strings = self
            .strings
            .take()
            .unwrap_or_else(|| StringPool::new(sort.encoding()));
        strings.freeze();
        if strings.len_bytes() > 0xff_ffff {
            return Err(MdrError::StringPoolOverflow {
                size: strings.len_bytes(),
            });
        }

        let num_maps = self.maps.len();
        info!(
            "writing {:?} index: {} maps, {} strings, code page {}",
            mode,
            num_maps,
            strings.num_strings(),
            sort.codepage()
        );

        // Finalize the base tables first: everything else points at their
        // final record numbers.
        let mut cities = CitySection::new(mem::take(&mut self.cities), mode);
        cities.prepare(&sort);
        let mut streets = StreetSection::new(mem::take(&mut self.streets), mode);
        streets.prepare(&sort, &cities);
        let mut pois = PoiSection::new(mem::take(&mut self.pois), mode);
        pois.prepare(&cities);
        let mut zips = ZipSection::new(mem::take(&mut self.zips), mode);
        zips.prepare(&sort);
        let regions = RegionSection::new(mem::take(&mut self.regions));
        let countries = CountrySection::new(mem::take(&mut self.countries));

        // Derived sections, each from the finalized views it depends on.
        let poi_types = PoiTypeSection::new(&self.poi_types);
        let poi_groups = PoiTypeGroups::build(&pois, &poi_types, &sort);
        let poi_group_index = PoiGroupIndex::build(&poi_groups);
        let poi_names = PoiNameIndex::build(&pois, &sort);
        let streets_by_city = GroupedStreetSection::by_city(&streets, &cities, &sort);
        let streets_by_region = GroupedStreetSection::by_region(&streets, &cities, &regions, &sort);
        let streets_by_country =
            GroupedStreetSection::by_country(&streets, &cities, &regions, &countries, &sort);
        let sorted_regions = SortedRegionSection::build(&regions, &sort);
        let sorted_countries = SortedCountrySection::build(&countries, &sort, mode);
        let cities_by_country = GroupedCitySection::by_country(&cities, &regions, &countries, &sort);
        let cities_by_region = GroupedCitySection::by_region(&cities, &regions, &sort);
        let region_names = RegionNameSection::build(
            &regions,
            &sorted_regions,
            &streets_by_region,
            &cities_by_region,
            &sort,
        );
        let region_name_index = SortedRegionNameIndex::build(&region_names);
        let country_names = CountryNameSection::build(
            &countries,
            &sorted_countries,
            &streets_by_country,
            &cities_by_country,
            &sort,
            mode,
        );
        let device_pois = DevicePoiSection::build(&pois, &sort);
        let device_poi_types = DevicePoiTypeIndex::build(&device_pois);
        let composite =
            CompositeNameIndex::build(&cities, &streets, &pois, &streets_by_country, &sort);

        let mut map_index = MapIndexSection::new(mem::take(&mut self.maps), mode);
        if mode == BuildMode::Full {
            map_index.add_ranges(5, cities.map_ranges(num_maps));
            map_index.add_ranges(6, zips.map_ranges(num_maps));
            map_index.add_ranges(7, streets.map_ranges(num_maps));
            map_index.add_ranges(11, pois.map_ranges(num_maps));
        }

        // All counts are final now; freeze the pointer widths.
        let mut counts = [0u64; SECTION_MAX + 1];
        counts[1] = map_index.n_records() as u64;
        counts[4] = poi_types.n_records() as u64;
        counts[5] = cities.n_records() as u64;
        counts[6] = zips.n_records() as u64;
        counts[7] = streets.n_records() as u64;
        counts[9] = poi_group_index.n_records() as u64;
        counts[10] = poi_groups.n_records() as u64;
        counts[11] = pois.n_records() as u64;
        counts[12] = poi_names.n_records() as u64;
        counts[13] = regions.n_records() as u64;
        counts[14] = countries.n_records() as u64;
        counts[15] = strings.num_strings() as u64;
        counts[17] = composite.n_records() as u64;
        counts[18] = device_poi_types.n_records() as u64;
        counts[19] = device_pois.n_records() as u64;
        counts[20] = streets_by_city.n_records() as u64;
        counts[21] = streets_by_region.n_records() as u64;
        counts[22] = streets_by_country.n_records() as u64;
        counts[23] = sorted_regions.n_records() as u64;
        counts[24] = sorted_countries.n_records() as u64;
        counts[25] = cities_by_country.n_records() as u64;
        counts[26] = region_name_index.n_records() as u64;
        counts[27] = cities_by_region.n_records() as u64;
        counts[28] = region_names.n_records() as u64;
        counts[29] = country_names.n_records() as u64;
        let sizes = PointerSizes::resolve(mode, &counts, strings.len_bytes(), num_maps as u64);

        let mut header = MdrHeader::new();
        header.codepage = sort.codepage();
        header.sort_id = sort.id();
        header.flags = if mode == BuildMode::ForDevice {
            FLAG_FOR_DEVICE
        } else {
            0
        };
        header.num_maps = num_maps as u16;
        MdrHeader::reserve(writer)?;

        // The fixed write order. Sections the build mode excludes are
        // skipped inside write_section via the same policy the resolver
        // used, and finished sections are dropped to bound peak memory.
        write_section(writer, &mut header, mode, 4, &poi_types, &sizes)?;
        drop(poi_types);
        write_section(writer, &mut header, mode, 11, &pois, &sizes)?;
        write_section(writer, &mut header, mode, 19, &device_pois, &sizes)?;
        drop(device_pois);
        write_section(writer, &mut header, mode, 18, &device_poi_types, &sizes)?;
        drop(device_poi_types);
        write_section(writer, &mut header, mode, 10, &poi_groups, &sizes)?;
        drop(poi_groups);
        write_section(writer, &mut header, mode, 9, &poi_group_index, &sizes)?;
        drop(poi_group_index);
        write_section(writer, &mut header, mode, 7, &streets, &sizes)?;
        write_section(writer, &mut header, mode, 5, &cities, &sizes)?;
        write_section(writer, &mut header, mode, 6, &zips, &sizes)?;
        drop(zips);
        write_section(writer, &mut header, mode, 20, &streets_by_city, &sizes)?;
        drop(streets_by_city);
        write_section(writer, &mut header, mode, 21, &streets_by_region, &sizes)?;
        drop(streets_by_region);
        write_section(writer, &mut header, mode, 22, &streets_by_country, &sizes)?;
        drop(streets_by_country);
        write_section(writer, &mut header, mode, 17, &composite, &sizes)?;
        drop(composite);
        drop(streets);
        drop(cities);
        write_section(writer, &mut header, mode, 12, &poi_names, &sizes)?;
        drop(poi_names);
        drop(pois);
        write_section(writer, &mut header, mode, 13, &regions, &sizes)?;
        drop(regions);
        write_section(writer, &mut header, mode, 14, &countries, &sizes)?;
        drop(countries);
        write_section(writer, &mut header, mode, 15, &StringSection(&strings), &sizes)?;
        drop(strings);
        write_section(writer, &mut header, mode, 23, &sorted_regions, &sizes)?;
        drop(sorted_regions);
        write_section(writer, &mut header, mode, 24, &sorted_countries, &sizes)?;
        drop(sorted_countries);
        write_section(writer, &mut header, mode, 25, &cities_by_country, &sizes)?;
        drop(cities_by_country);
        write_section(writer, &mut header, mode, 26, &region_name_index, &sizes)?;
        drop(region_name_index);
        write_section(writer, &mut header, mode, 27, &cities_by_region, &sizes)?;
        drop(cities_by_region);
        write_section(writer, &mut header, mode, 28, &region_names, &sizes)?;
        drop(region_names);
        write_section(writer, &mut header, mode, 29, &country_names, &sizes)?;
        drop(country_names);

        // The map index goes last: it describes every other section.
        map_index.write(writer, &mut header)?;

        let total = writer.stream_position()?;
        header.patch(writer)?;
        info!("index written: {} bytes", total);
        Ok(())
    }
}

/// Write one section and do the header bookkeeping.
///
/// Empty and mode-excluded sections are skipped, leaving their header
/// entries all-zero. Fixed-width sections are checked to have streamed
/// exactly `records × item size` bytes; anything else means a record
/// layout disagrees with its declared item size and the file would be
/// unreadable.
fn write_section<W: Write + Seek>(
    writer: &mut W,
    header: &mut MdrHeader,
    mode: BuildMode,
    number: u8,
    section: &dyn Section,
    sizes: &PointerSizes,
) -> Result<()> {
    if !is_section_included(mode, number) || section.n_records() == 0 {
        return Ok(());
    }

    let start = writer.stream_position()?;
    section.write_records(writer, sizes)?;
    let end = writer.stream_position()?;

    let item_size = section.item_size(sizes);
    if item_size > 0 {
        let expected = (section.n_records() * item_size) as u64;
        if end - start != expected {
            return Err(MdrError::SectionSizeMismatch {
                section: number,
                expected,
                written: end - start,
            });
        }
        header.set_item_size(number, item_size as u16);
    }
    header.set_position(number, start as u32);
    header.set_end(number, end as u32);
    header.set_extra(number, section.extra());
    debug!(
        "section {:2}: {:#x}..{:#x}, {} records, item size {}",
        number,
        start,
        end,
        section.n_records(),
        item_size
    );
    Ok(())
}
