//! Section 4: the POI type table.
//!
//! One 3-byte record per distinct indexed point type, ascending: main
//! type byte, subtype byte, one zero filler byte.

use std::collections::BTreeSet;
use std::io::Write;

use crate::mdr::sizes::PointerSizes;
use byteorder::WriteBytesExt;

use super::Section;

pub struct PoiTypeSection {
    types: Vec<u16>,
}

impl PoiTypeSection {
    pub fn new(types: &BTreeSet<u16>) -> PoiTypeSection {
        PoiTypeSection {
            types: types.iter().copied().collect(),
        }
    }

    /// Distinct full types in ascending order; section 9 groups follow
    /// this order.
    pub fn types(&self) -> &[u16] {
        &self.types
    }
}

impl Section for PoiTypeSection {
    fn n_records(&self) -> usize {
        self.types.len()
    }

    fn item_size(&self, _sizes: &PointerSizes) -> usize {
        3
    }

    fn write_records(&self, writer: &mut dyn Write, _sizes: &PointerSizes) -> std::io::Result<()> {
        for &full_type in &self.types {
            writer.write_u8((full_type >> 8) as u8)?;
            writer.write_u8((full_type & 0xff) as u8)?;
            writer.write_u8(0)?;
        }
        Ok(())
    }
}
