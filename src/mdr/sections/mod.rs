//! The index sections.
//!
//! One module per cohesive group: base entity tables, the per-type POI
//! groupings, the street groupings, the name-sorted derivatives and the
//! device-only indexes. Every section implements [`Section`] so the write
//! plan can do uniform header bookkeeping, but preparation is deliberately
//! not part of the trait: each section is finalized from exactly the
//! inputs it depends on, and the write plan wires those up explicitly.

pub mod cities;
pub mod countries;
pub mod device;
pub mod map_index;
pub mod poi_groups;
pub mod poi_types;
pub mod pois;
pub mod regions;
pub mod sorted_names;
pub mod streets;
pub mod streets_by;
pub mod zips;

use std::io::Write;

use super::sizes::PointerSizes;
use super::strings::StringPool;

/// The serialization contract common to all sections.
pub trait Section {
    /// Number of records. For blob sections this is the entry count.
    fn n_records(&self) -> usize;

    /// Frozen per-record byte width, computed from the resolved pointer
    /// sizes and the build mode. Blob sections return 0.
    fn item_size(&self, sizes: &PointerSizes) -> usize;

    /// Stream the record data. Fixed-width sections write exactly
    /// `n_records() * item_size(sizes)` bytes; the write plan checks this.
    fn write_records(&self, writer: &mut dyn Write, sizes: &PointerSizes) -> std::io::Result<()>;

    /// Section-specific header flag word.
    fn extra(&self) -> u32 {
        0
    }
}

/// Section 15 adapter: the string pool streamed as a blob.
///
/// Item size 0 — records are the NUL-terminated strings themselves and
/// are addressed by byte offset, not by record number.
pub struct StringSection<'a>(pub &'a StringPool);

impl Section for StringSection<'_> {
    fn n_records(&self) -> usize {
        self.0.num_strings()
    }

    fn item_size(&self, _sizes: &PointerSizes) -> usize {
        0
    }

    fn write_records(&self, writer: &mut dyn Write, _sizes: &PointerSizes) -> std::io::Result<()> {
        writer.write_all(self.0.as_bytes())
    }
}

/// Per-map `(first, count)` record ranges for a map-major section.
///
/// `maps` yields each record's 1-based map index in section order, which
/// must be non-decreasing (records grouped by map). Maps that contributed
/// nothing get `(0, 0)`.
pub(crate) fn map_ranges(maps: impl Iterator<Item = u16>, num_maps: usize) -> Vec<(u32, u32)> {
    let mut ranges = vec![(0u32, 0u32); num_maps];
    let mut last_map = 0u16;
    for (i, map) in maps.enumerate() {
        debug_assert!(map >= last_map, "records not grouped by map");
        last_map = map;
        let range = &mut ranges[map as usize - 1];
        if range.1 == 0 {
            range.0 = i as u32 + 1;
        }
        range.1 += 1;
    }
    ranges
}
