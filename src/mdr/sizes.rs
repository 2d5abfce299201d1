//! The pointer-size resolver.
//!
//! Every cross-section pointer field is 1, 2 or 3 bytes wide depending on
//! how many records its target section ended up with, which in turn is only
//! known once ingest is over and every derived section has been built. The
//! resolver therefore runs exactly once, over the final counts of all
//! sections included in the build, and the result is immutable from then
//! on: sections receive it by shared reference when they compute their item
//! size and when they serialize.

use super::codec::width_for_count;
use super::config::{is_section_included, BuildMode};
use super::header::SECTION_MAX;

/// Frozen pointer widths for one build.
///
/// Sections excluded by the build mode are deliberately unsized: asking for
/// their width means some record still points at a section that will not
/// exist in the output, which is a bug in the write plan, not a runtime
/// condition.
#[derive(Debug)]
pub struct PointerSizes {
    widths: [Option<u8>; SECTION_MAX + 1],
    str_off: u8,
    map: u8,
}

impl PointerSizes {
    /// Resolve widths from final record counts.
    ///
    /// `counts[n]` is the record count of section `n` (index 0 unused).
    /// `pool_len` is the final byte length of the string pool and
    /// `num_maps` the number of maps registered.
    pub fn resolve(
        mode: BuildMode,
        counts: &[u64; SECTION_MAX + 1],
        pool_len: u64,
        num_maps: u64,
    ) -> PointerSizes {
        let mut widths = [None; SECTION_MAX + 1];
        for (section, width) in widths.iter_mut().enumerate().skip(1) {
            if is_section_included(mode, section as u8) {
                *width = Some(width_for_count(counts[section]) as u8);
            }
        }
        PointerSizes {
            widths,
            str_off: width_for_count(pool_len) as u8,
            map: width_for_count(num_maps) as u8,
        }
    }

    /// Byte width of a record pointer into `section`.
    pub fn section(&self, section: u8) -> usize {
        self.widths[section as usize]
            .unwrap_or_else(|| panic!("section {} is not sized in this build", section))
            as usize
    }

    /// Byte width of a string-pool offset.
    pub fn str_off(&self) -> usize {
        self.str_off as usize
    }

    /// Byte width of a map index.
    pub fn map(&self) -> usize {
        self.map as usize
    }
}
