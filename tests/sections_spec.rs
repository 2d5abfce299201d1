//! Section-level contracts: prepare idempotence and the capacity limits
//! that drop records instead of corrupting the file.

use std::io::Cursor;

use mdr_index::mdr::config::{BuildMode, MdrConfig, Sort};
use mdr_index::mdr::header::SECTION_MAX;
use mdr_index::mdr::records::CityRecord;
use mdr_index::mdr::sections::cities::CitySection;
use mdr_index::mdr::sections::Section;
use mdr_index::mdr::sizes::PointerSizes;
use mdr_index::{MdrFile, MdrReader};

fn sample_cities() -> Vec<CityRecord> {
    ["Zagreb", "Aachen", "Milan", "Aachen", "Berlin"]
        .iter()
        .enumerate()
        .map(|(i, name)| CityRecord {
            map: 1,
            city_local: i as u16 + 1,
            region: None,
            lbl: 0x100 + i as u32,
            name: name.to_string(),
            name_off: i as u32 + 1,
        })
        .collect()
}

fn serialize(section: &dyn Section, sizes: &PointerSizes) -> Vec<u8> {
    let mut buf = Vec::new();
    section.write_records(&mut buf, sizes).expect("serialize");
    buf
}

#[test]
fn prepare_twice_changes_nothing() {
    let sort = Sort::for_code_page(1252).expect("sort");
    let mut counts = [0u64; SECTION_MAX + 1];
    counts[5] = 5;
    let sizes = PointerSizes::resolve(BuildMode::Full, &counts, 64, 1);

    let mut section = CitySection::new(sample_cities(), BuildMode::Full);
    section.prepare(&sort);
    let once = serialize(&section, &sizes);

    section.prepare(&sort);
    let twice = serialize(&section, &sizes);

    assert_eq!(once, twice, "a second prepare must not re-sort or re-flag");
    assert_eq!(once.len(), 5 * section.item_size(&sizes));
}

#[test]
fn city_sort_is_name_ordered_within_a_map() {
    let sort = Sort::for_code_page(1252).expect("sort");
    let mut section = CitySection::new(sample_cities(), BuildMode::Full);
    section.prepare(&sort);

    let names: Vec<&str> = section.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Aachen", "Aachen", "Berlin", "Milan", "Zagreb"]);
}

#[test]
fn poi_group_overflow_drops_the_extra_points() {
    let mut mdr = MdrFile::new(MdrConfig::default());
    mdr.add_map(1, 1252).expect("add map");
    let city = mdr.add_city(None, 0x10, "Megalopolis").expect("city");

    // The group slot on disk is one byte: the 256th point and later ones
    // must be skipped, not written.
    for i in 0..300u32 {
        mdr.add_point(0x2a05, 0x100 + i, &format!("Kiosk {}", i), Some(city), false);
    }

    let mut out = Cursor::new(Vec::new());
    mdr.write(&mut out).expect("write index");

    let reader = MdrReader::new(Cursor::new(out.into_inner())).expect("parse header");
    assert_eq!(reader.record_count(11), 255);
    assert_eq!(reader.record_count(10), 255);
}

#[test]
fn unlabelled_cities_are_not_indexed() {
    let mut mdr = MdrFile::new(MdrConfig::default());
    mdr.add_map(1, 1252).expect("add map");
    assert!(mdr.add_city(None, 0, "Ghost Town").is_none());
    assert!(mdr.add_city(None, 0x10, "Real Town").is_some());

    let mut out = Cursor::new(Vec::new());
    mdr.write(&mut out).expect("write index");

    let mut reader = MdrReader::new(Cursor::new(out.into_inner())).expect("parse header");
    assert_eq!(reader.record_count(5), 1);
    assert_eq!(reader.strings().expect("pool"), vec!["Real Town".to_string()]);
}
