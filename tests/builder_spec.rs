//! End-to-end build scenarios: one map with two countries, three regions,
//! five cities, ten streets, four POIs and two postal codes, written as a
//! full and as a for-device index, then read back.

use std::io::Cursor;

use mdr_index::mdr::codec::{read_n, width_for_count};
use mdr_index::mdr::header::HEADER_LEN;
use mdr_index::{MdrConfig, MdrFile, MdrReader};

const MAP_NUMBER: u32 = 63240001;

const STREETS: &[(&str, usize)] = &[
    // (name, city index into CITIES; usize::MAX = no city)
    ("Main Street", 0),
    ("Oak Avenue", 0),
    ("Elm Street", 1),
    ("Maple Road", 1),
    ("King Street", 2),
    ("Queen Street", 2),
    ("High Street", 3),
    ("Mill Lane", 3),
    ("Bank Street", 4),
    ("Bridge Road", usize::MAX),
];

const CITIES: &[(&str, usize)] = &[
    // (name, region index)
    ("Springfield", 0),
    ("Portland", 1),
    ("Toronto", 2),
    ("Salem", 1),
    ("Ottawa", 2),
];

const POIS: &[(u16, &str, usize)] = &[
    (0x2a05, "Blue Moon Diner", 0),
    (0x2b01, "Grand Hotel", 2),
    (0x2c04, "City Museum", 1),
    (0x2a05, "Harbour Grill", 4),
];

fn build_sample(for_device: bool) -> Vec<u8> {
    let mut mdr = MdrFile::new(MdrConfig::default().for_device(for_device));
    mdr.add_map(MAP_NUMBER, 1252).expect("add map");

    let usa = mdr.add_country(1, 0x10, "United States");
    let canada = mdr.add_country(2, 0x20, "Canada");
    let regions = [
        mdr.add_region(1, usa, 0x30, "Illinois"),
        mdr.add_region(2, usa, 0x31, "Oregon"),
        mdr.add_region(3, canada, 0x32, "Ontario"),
    ];

    let mut cities = Vec::new();
    for (i, &(name, region)) in CITIES.iter().enumerate() {
        let city = mdr
            .add_city(Some(regions[region]), 0x100 + i as u32, name)
            .expect("city indexed");
        cities.push(city);
    }

    for (i, &(name, city)) in STREETS.iter().enumerate() {
        let city = cities.get(city).copied();
        mdr.add_street(0x200 + i as u32, name, city);
    }

    for (i, &(full_type, name, city)) in POIS.iter().enumerate() {
        mdr.add_point(full_type, 0x300 + i as u32, name, Some(cities[city]), false);
    }

    mdr.add_zip(0x400, "62701");
    mdr.add_zip(0x401, "97201");

    let mut out = Cursor::new(Vec::new());
    mdr.write(&mut out).expect("write index");
    out.into_inner()
}

fn expected_strings() -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    names.push("United States".into());
    names.push("Canada".into());
    for region in ["Illinois", "Oregon", "Ontario"] {
        names.push(region.into());
    }
    for &(name, _) in CITIES {
        names.push(name.into());
    }
    for &(name, _) in STREETS {
        names.push(name.into());
    }
    for &(_, name, _) in POIS {
        names.push(name.into());
    }
    names.push("62701".into());
    names.push("97201".into());
    names
}

#[test]
fn full_build_round_trips() {
    let bytes = build_sample(false);
    let mut reader = MdrReader::new(Cursor::new(bytes)).expect("parse header");

    assert!(!reader.is_for_device());
    assert_eq!(reader.header.codepage, 1252);
    assert_eq!(reader.header.num_maps, 1);
    assert_eq!(reader.map_numbers().expect("map table"), vec![MAP_NUMBER]);

    const EXPECTED_COUNTS: &[(u8, u32)] = &[
        (1, 1),   // one map
        (4, 3),   // three distinct POI types
        (5, 5),   // cities
        (6, 2),   // postal codes
        (7, 10),  // street names
        (9, 3),   // one group per POI type
        (10, 4),  // POIs regrouped by type
        (11, 4),  // POIs
        (12, 4),  // POI name index
        (13, 3),  // regions
        (14, 2),  // countries
        (20, 9),  // streets with a city
        (21, 9),  // streets with a region
        (22, 9),  // streets with a country
        (23, 3),  // sorted regions
        (24, 2),  // sorted countries
        (25, 5),  // cities by country
        (26, 3),  // sorted region names
        (27, 5),  // cities by region
        (28, 3),  // distinct region names
        (29, 2),  // distinct country names
    ];
    for &(section, count) in EXPECTED_COUNTS {
        assert_eq!(
            reader.record_count(section),
            count,
            "record count of section {}",
            section
        );
    }

    // Two countries fit an 8-bit pointer, so a sorted-country record is
    // that pointer plus the flag byte.
    assert_eq!(reader.section(24).item_size, 2);

    let present = reader.present_sections();
    for number in [2u8, 3, 8, 16, 17, 18, 19] {
        assert!(
            !present.contains(&number),
            "section {} must be absent from a full build",
            number
        );
    }

    // Every present section sits after the header, ends after it starts,
    // and spans a whole number of records.
    for &number in &present {
        let entry = *reader.section(number);
        assert!(entry.offset >= HEADER_LEN as u32, "section {}", number);
        assert!(entry.end > entry.offset, "section {}", number);
        if entry.item_size > 0 {
            assert_eq!(
                entry.len_bytes() % entry.item_size as u32,
                0,
                "section {} spans partial records",
                number
            );
        }
    }

    // The pool holds exactly the distinct names, in insertion order.
    let strings = reader.strings().expect("string pool");
    assert_eq!(strings, expected_strings());

    // Each map's contribution to the map-indexed sections is the whole
    // section here, since there is only one map.
    let subsections = reader.map_subsections(0).expect("subsections");
    assert_eq!(
        subsections,
        vec![(5, 1, 5), (6, 1, 2), (7, 1, 10), (11, 1, 4)]
    );
}

#[test]
fn city_records_reference_the_map() {
    let bytes = build_sample(false);
    let reader = MdrReader::new(Cursor::new(bytes.clone())).expect("parse header");

    let entry = *reader.section(5);
    let pool_len = reader.section(15).len_bytes() as u64;
    let map_width = width_for_count(1);
    let region_width = width_for_count(reader.record_count(13) as u64);
    let str_width = width_for_count(pool_len);
    assert_eq!(
        entry.item_size as usize,
        map_width + 2 + region_width + 3 + str_width + 1,
        "city record layout"
    );

    let mut cursor = Cursor::new(&bytes[entry.offset as usize..entry.end as usize]);
    let mut seen_locals = Vec::new();
    for _ in 0..reader.record_count(5) {
        let map = read_n(&mut cursor, map_width).expect("map field");
        assert_eq!(map, 1, "city record points at the only map");
        let city_local = read_n(&mut cursor, 2).expect("local index");
        seen_locals.push(city_local);
        let region = read_n(&mut cursor, region_width).expect("region pointer");
        assert!(
            (1..=reader.record_count(13)).contains(&region),
            "region pointer {} out of range",
            region
        );
        read_n(&mut cursor, 3).expect("label");
        let name_off = read_n(&mut cursor, str_width).expect("string offset");
        assert!((name_off as u64) < pool_len);
        read_n(&mut cursor, 1).expect("flags");
    }
    seen_locals.sort_unstable();
    assert_eq!(seen_locals, vec![1, 2, 3, 4, 5]);
}

#[test]
fn builds_are_deterministic() {
    // No iteration-order dependence may leak into the output: the same
    // input must serialize to the same bytes every time.
    assert_eq!(build_sample(false), build_sample(false));
    assert_eq!(build_sample(true), build_sample(true));
}

#[test]
fn device_build_filters_sections() {
    let full_bytes = build_sample(false);
    let device_bytes = build_sample(true);
    let full = MdrReader::new(Cursor::new(full_bytes)).expect("full header");
    let mut device = MdrReader::new(Cursor::new(device_bytes)).expect("device header");

    assert!(device.is_for_device());

    const DENIED: &[u8] = &[12, 13, 14, 15, 21, 23, 26, 27, 28];
    for &number in DENIED {
        assert!(
            !device.section(number).is_present(),
            "section {} must not appear in a device build",
            number
        );
        assert!(
            full.section(number).is_present(),
            "section {} must appear in the full build of the same input",
            number
        );
    }

    for number in [17u8, 18, 19] {
        assert!(
            device.section(number).is_present(),
            "device-only section {} missing",
            number
        );
        assert!(!full.section(number).is_present());
    }

    assert_eq!(device.record_count(19), 4, "POIs by type");
    assert_eq!(device.record_count(18), 3, "one entry per POI type");

    // The composite name index is a blob: cities + streets + POIs +
    // streets-by-country entries, counted in the extra field.
    let composite = *device.section(17);
    assert_eq!(composite.item_size, 0);
    assert_eq!(composite.extra, 5 + 10 + 4 + 9);

    // Device city records drop the region pointer and the string offset.
    assert_eq!(device.section(5).item_size as usize, 1 + 2 + 3 + 1);

    assert_eq!(device.map_numbers().expect("map table"), vec![MAP_NUMBER]);
    assert!(
        device.map_subsections(0).is_err(),
        "device map index has no subsections"
    );
}
