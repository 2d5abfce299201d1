//! Build configuration: output variant, code page and collation.

use encoding_rs::Encoding;

use super::error::{MdrError, Result};

/// Which variant of the index file is being produced.
///
/// Devices consume a reduced file: the plain-text sections are replaced by
/// the composite name index (17) and the POI type indexes (18, 19), and the
/// sections only desktop software reads are left out entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Full,
    ForDevice,
}

/// Sections that are dropped from a for-device build.
const DEVICE_EXCLUDED: &[u8] = &[12, 13, 14, 15, 21, 23, 26, 27, 28];

/// Sections that exist only in a for-device build.
const DEVICE_ONLY: &[u8] = &[17, 18, 19];

/// Single policy point deciding whether a section belongs to a build.
///
/// Both the pointer-size resolver and the write plan consult this, so a
/// section that is not written is also never sized and never pointed at.
pub fn is_section_included(mode: BuildMode, section: u8) -> bool {
    match mode {
        BuildMode::Full => !DEVICE_ONLY.contains(&section),
        BuildMode::ForDevice => !DEVICE_EXCLUDED.contains(&section),
    }
}

/// Configuration for an [`MdrFile`](super::MdrFile) build.
#[derive(Debug, Clone)]
pub struct MdrConfig {
    pub mode: BuildMode,
    /// Collation override. When `None`, the sort is taken from the code
    /// page of the first map added.
    pub sort: Option<Sort>,
}

impl Default for MdrConfig {
    fn default() -> Self {
        MdrConfig {
            mode: BuildMode::Full,
            sort: None,
        }
    }
}

impl MdrConfig {
    pub fn for_device(mut self, yes: bool) -> Self {
        self.mode = if yes { BuildMode::ForDevice } else { BuildMode::Full };
        self
    }
}

/// Text collation for the index.
///
/// All name-ordered sections use the same sort: names are case-folded,
/// encoded with the active code page and compared bytewise, with the raw
/// name as tie-breaker so equal-folding names still order deterministically.
#[derive(Debug, Clone)]
pub struct Sort {
    codepage: u16,
    id: u16,
    encoding: &'static Encoding,
}

impl Sort {
    /// Build the sort for a code page.
    ///
    /// Supported: 0 (treated as 1252), 874, 1250–1258 and 65001 (UTF-8).
    pub fn for_code_page(codepage: u16) -> Result<Sort> {
        let effective = if codepage == 0 { 1252 } else { codepage };
        let encoding = encoding_for_code_page(effective)
            .ok_or(MdrError::UnsupportedCodePage(codepage))?;
        Ok(Sort {
            codepage: effective,
            id: effective,
            encoding,
        })
    }

    pub fn codepage(&self) -> u16 {
        self.codepage
    }

    /// Collation identifier written to the header.
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Collation key for a name. Compare keys bytewise to get index order.
    pub fn key(&self, name: &str) -> Vec<u8> {
        let folded: String = name.chars().flat_map(char::to_uppercase).collect();
        let (encoded, _, _) = self.encoding.encode(&folded);
        let mut key = encoded.into_owned();
        // Tie-break on the raw text so "MAIN st" and "Main St" have a
        // stable relative order.
        key.push(0);
        key.extend_from_slice(name.as_bytes());
        key
    }
}

/// Map a Windows code-page number onto an `encoding_rs` encoding.
pub fn encoding_for_code_page(codepage: u16) -> Option<&'static Encoding> {
    let label = match codepage {
        65001 => "utf-8".to_string(),
        874 => "windows-874".to_string(),
        1250..=1258 => format!("windows-{}", codepage),
        _ => return None,
    };
    Encoding::for_label(label.as_bytes())
}
