//! Entity records accumulated during ingest, and the typed handles that
//! link them together.
//!
//! A record's position in its section is never stored explicitly; it is
//! implied by the record's final place in the section's write order. The
//! handles returned by the `add_*` calls identify an entity by insertion
//! order so that later entities (a street's city, a region's country) can
//! refer to it before final record numbers exist.

/// Handle to a country added with `add_country`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountryId(pub(crate) u32);

/// Handle to a region added with `add_region`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(pub(crate) u32);

/// Handle to a city added with `add_city`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CityId(pub(crate) u32);

/// A country (section 14 record).
#[derive(Debug)]
pub struct CountryRecord {
    pub map: u16,
    pub country_local: u16,
    pub lbl: u32,
    pub name: String,
    pub name_off: u32,
}

/// A region (section 13 record).
#[derive(Debug)]
pub struct RegionRecord {
    pub map: u16,
    pub region_local: u16,
    pub country: CountryId,
    pub country_local: u16,
    pub lbl: u32,
    pub name: String,
    pub name_off: u32,
}

/// A city (section 5 record).
#[derive(Debug)]
pub struct CityRecord {
    pub map: u16,
    /// 1-based index of the city within its map.
    pub city_local: u16,
    pub region: Option<RegionId>,
    pub lbl: u32,
    pub name: String,
    pub name_off: u32,
}

/// One indexed street name (section 7 record).
///
/// A road with several names contributes one record per name.
#[derive(Debug)]
pub struct StreetRecord {
    pub map: u16,
    pub lbl: u32,
    /// The name with Garmin control codes stripped; this is what the
    /// string pool stores.
    pub name: String,
    pub city: Option<CityId>,
    pub name_off: u32,
}

/// A point of interest (section 11 record).
#[derive(Debug)]
pub struct PoiRecord {
    pub map: u16,
    /// 1-based index of the point within its (map, city) group. The
    /// on-disk slot is a single byte, which is where the 255-per-group
    /// capacity limit comes from.
    pub city_local: u8,
    pub lbl: u32,
    pub full_type: u16,
    pub city: Option<CityId>,
    pub is_city: bool,
    pub name: String,
    pub name_off: u32,
}

/// A postal code (section 6 record).
#[derive(Debug)]
pub struct ZipRecord {
    pub map: u16,
    pub lbl: u32,
    pub code: String,
    pub name_off: u32,
}

/// Whether a point type is worth a search-index entry.
///
/// Only the searchable POI categories are indexed; map furniture and
/// line/area types are not.
pub fn can_be_indexed(full_type: u16) -> bool {
    (0x2a00..0x3100).contains(&full_type)
}

/// Remove Garmin control codes from a label.
///
/// Highway shield prefixes (0x01–0x06) and the part separators
/// (0x1b–0x1f) affect rendering, not searching, so the indexed string
/// drops them.
pub fn strip_garmin_codes(name: &str) -> String {
    name.chars()
        .filter(|&c| !matches!(c, '\u{01}'..='\u{06}' | '\u{1b}'..='\u{1f}'))
        .collect()
}
