//! Unit-level properties of the codec, the pointer-size resolver, the
//! string pool and the build-mode policy.

use mdr_index::mdr::codec::{fits, put_n, read_n, width_for_count};
use mdr_index::mdr::config::{is_section_included, BuildMode, Sort};
use mdr_index::mdr::header::SECTION_MAX;
use mdr_index::mdr::records::{can_be_indexed, strip_garmin_codes};
use mdr_index::mdr::sizes::PointerSizes;
use mdr_index::mdr::strings::StringPool;

#[test]
fn pointer_width_boundaries() {
    const CASES: &[(u64, usize)] = &[
        (0, 1),
        (1, 1),
        (255, 1),
        (256, 2),
        (65535, 2),
        (65536, 3),
        (1 << 24, 3),
    ];
    for &(count, want) in CASES {
        assert_eq!(width_for_count(count), want, "count {}", count);
    }
}

#[test]
fn codec_round_trips_every_width() {
    const CASES: &[(usize, u32)] = &[
        (1, 0),
        (1, 0xff),
        (2, 0x100),
        (2, 0xffff),
        (3, 0x10000),
        (3, 0xff_ffff),
    ];
    for &(width, value) in CASES {
        assert!(fits(width, value));
        let mut buf = Vec::new();
        put_n(&mut buf, width, value).expect("write");
        assert_eq!(buf.len(), width, "width {} value {:#x}", width, value);
        let back = read_n(&mut buf.as_slice(), width).expect("read");
        assert_eq!(back, value, "width {} value {:#x}", width, value);
    }
}

#[test]
#[should_panic(expected = "does not fit")]
fn codec_refuses_overflowing_values() {
    let mut buf = Vec::new();
    let _ = put_n(&mut buf, 1, 256);
}

#[test]
fn resolver_picks_minimal_widths() {
    let mut counts = [0u64; SECTION_MAX + 1];
    counts[5] = 5;
    counts[14] = 256;
    counts[7] = 70_000;
    let sizes = PointerSizes::resolve(BuildMode::Full, &counts, 300, 2);
    assert_eq!(sizes.section(5), 1);
    assert_eq!(sizes.section(14), 2, "256 records need two bytes");
    assert_eq!(sizes.section(7), 3);
    assert_eq!(sizes.str_off(), 2);
    assert_eq!(sizes.map(), 1);
}

#[test]
#[should_panic(expected = "not sized")]
fn resolver_refuses_sections_outside_the_build() {
    let counts = [0u64; SECTION_MAX + 1];
    let sizes = PointerSizes::resolve(BuildMode::ForDevice, &counts, 1, 1);
    // The string pool is not part of a device build.
    let _ = sizes.section(15);
}

#[test]
fn device_policy_filters_both_ways() {
    for number in 1..=SECTION_MAX as u8 {
        let full = is_section_included(BuildMode::Full, number);
        let device = is_section_included(BuildMode::ForDevice, number);
        match number {
            17 | 18 | 19 => {
                assert!(!full, "section {} is device-only", number);
                assert!(device);
            }
            12 | 13 | 14 | 15 | 21 | 23 | 26 | 27 | 28 => {
                assert!(full);
                assert!(!device, "section {} is dropped on devices", number);
            }
            _ => {
                assert!(full);
                assert!(device);
            }
        }
    }
}

#[test]
fn string_pool_dedups_and_preserves_order() {
    let sort = Sort::for_code_page(1252).expect("sort");
    let mut pool = StringPool::new(sort.encoding());

    let a = pool.intern("Springfield");
    let b = pool.intern("Portland");
    let c = pool.intern("Springfield");
    assert_eq!(a, c, "same text must map to the same offset");
    assert_ne!(a, b);
    assert!(b > a, "offsets grow with insertion order");
    assert_eq!(pool.num_strings(), 2);

    // "Springfield" + NUL starts right after the reserved entry.
    assert_eq!(a, 1);
    assert_eq!(b, a + "Springfield".len() as u32 + 1);

    assert!(!pool.is_frozen());
    pool.freeze();
    assert!(pool.is_frozen());
}

#[test]
fn string_pool_encodes_with_the_code_page() {
    let sort = Sort::for_code_page(1252).expect("sort");
    let mut pool = StringPool::new(sort.encoding());
    let off = pool.intern("café") as usize;
    // windows-1252: 'é' is a single 0xe9 byte.
    assert_eq!(&pool.as_bytes()[off..off + 5], &[b'c', b'a', b'f', 0xe9, 0]);
}

#[test]
fn sort_keys_fold_case_but_stay_deterministic() {
    let sort = Sort::for_code_page(1252).expect("sort");
    assert!(sort.key("apple") < sort.key("Banana"), "order ignores case");
    assert!(sort.key("Zoo") > sort.key("ant"));
    assert_ne!(
        sort.key("Paris"),
        sort.key("PARIS"),
        "differently-cased names stay distinct"
    );
}

#[test]
fn garmin_control_codes_are_stripped() {
    assert_eq!(strip_garmin_codes("\u{05}I-55"), "I-55");
    assert_eq!(strip_garmin_codes("Main\u{1d}Street"), "MainStreet");
    assert_eq!(strip_garmin_codes("Plain Road"), "Plain Road");
}

#[test]
fn only_searchable_poi_types_are_indexed() {
    assert!(can_be_indexed(0x2a05), "restaurants are searchable");
    assert!(can_be_indexed(0x3000));
    assert!(!can_be_indexed(0x2905));
    assert!(!can_be_indexed(0x3100));
    assert!(!can_be_indexed(0x0100));
}
