//! Which script and language combinations of a font need full layout for a set of glyphs.
//!
//! A renderer can skip layout for text when every feature that would touch its glyphs is one
//! it implements itself (kerning from a simple pair table, for example). This module walks
//! the `GSUB` and `GPOS` tables and reports the writing systems where some other feature has
//! a lookup that covers one of the glyphs.

use rustc_hash::FxHashSet;

use crate::binary::read::FontTable;
use crate::error::ParseError;
use crate::font::LayoutFont;
use crate::layout::{
    Coverage, LangSys, LayoutTable, LayoutTableKind, LookupList, LookupSubtable, PosLookupType,
    SubstLookupType, SubtableType,
};
use crate::size;
use crate::tag;

/// A set of glyph ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphSet {
    bits: Vec<u32>,
    min: Option<u16>,
    max: Option<u16>,
}

impl GlyphSet {
    pub fn new() -> GlyphSet {
        GlyphSet::default()
    }

    pub fn insert(&mut self, glyph: u16) {
        let word = usize::from(glyph) / 32;
        if word >= self.bits.len() {
            self.bits.resize(word + 1, 0);
        }
        self.bits[word] |= 1 << (glyph % 32);
        self.min = Some(self.min.map_or(glyph, |min| min.min(glyph)));
        self.max = Some(self.max.map_or(glyph, |max| max.max(glyph)));
    }

    /// Insert `start..=end`.
    pub fn insert_range(&mut self, start: u16, end: u16) {
        for glyph in start..=end {
            self.insert(glyph);
        }
    }

    pub fn contains(&self, glyph: u16) -> bool {
        let word = usize::from(glyph) / 32;
        match self.bits.get(word) {
            Some(bits) => bits & (1 << (glyph % 32)) != 0,
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    pub fn min(&self) -> Option<u16> {
        self.min
    }

    pub fn max(&self) -> Option<u16> {
        self.max
    }

    /// Whether any glyph of `start..=end` is in the set.
    pub fn intersects_range(&self, start: u16, end: u16) -> bool {
        let (min, max) = match (self.min, self.max) {
            (Some(min), Some(max)) => (min, max),
            _ => return false,
        };
        let start = start.max(min);
        let end = end.min(max);
        start <= end && (start..=end).any(|glyph| self.contains(glyph))
    }
}

impl FromIterator<u16> for GlyphSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> GlyphSet {
        let mut set = GlyphSet::new();
        for glyph in iter {
            set.insert(glyph);
        }
        set
    }
}

/// A script and language system. The default language system of a script is `DFLT`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WritingSystem {
    pub script: u32,
    pub lang: u32,
}

/// List the writing systems of the font where a feature not in `simple_features` has a lookup
/// that applies to a glyph in `glyphs`.
///
/// The required feature of a language system is checked like any other. Writing systems are
/// reported once each, `GSUB` before `GPOS`, in the order the tables list them.
pub fn complex_language_list(
    font: &dyn LayoutFont,
    simple_features: &[u32],
    glyphs: &GlyphSet,
) -> Result<Vec<WritingSystem>, ParseError> {
    let mut seen = FxHashSet::default();
    let mut complex = Vec::new();
    for kind in [LayoutTableKind::Gsub, LayoutTableKind::Gpos] {
        let data = match font.table_data(kind.tag())? {
            Some(data) => data,
            None => continue,
        };
        let table = LayoutTable::new(FontTable::new(&data), kind)?;
        for writing_system in complex_writing_systems(&table, simple_features, glyphs)? {
            if seen.insert(writing_system) {
                complex.push(writing_system);
            }
        }
    }
    Ok(complex)
}

fn complex_writing_systems(
    table: &LayoutTable<'_>,
    simple_features: &[u32],
    glyphs: &GlyphSet,
) -> Result<Vec<WritingSystem>, ParseError> {
    let (script_list, lookup_list) = match (table.script_list()?, table.lookup_list()?) {
        (Some(script_list), Some(lookup_list)) => (script_list, lookup_list),
        _ => return Ok(Vec::new()),
    };

    let mut complex = Vec::new();
    for script_index in 0..usize::from(script_list.len()?) {
        let script = script_list.script(script_index)?;
        let script_tag = script_list.script_tag(script_index)?;
        let mut langsys_list = Vec::new();
        if let Some(langsys) = script.default_langsys()? {
            langsys_list.push((tag::DFLT, langsys));
        }
        for langsys_index in 0..usize::from(script.langsys_count()?) {
            langsys_list.push((
                script.langsys_tag(langsys_index)?,
                script.langsys(langsys_index)?,
            ));
        }

        for (lang_tag, langsys) in langsys_list {
            if langsys_is_complex(table, &lookup_list, &langsys, simple_features, glyphs)? {
                complex.push(WritingSystem {
                    script: script_tag,
                    lang: lang_tag,
                });
            }
        }
    }
    Ok(complex)
}

fn langsys_is_complex(
    table: &LayoutTable<'_>,
    lookup_list: &LookupList<'_>,
    langsys: &LangSys<'_>,
    simple_features: &[u32],
    glyphs: &GlyphSet,
) -> Result<bool, ParseError> {
    let feature_list = match table.feature_list()? {
        Some(feature_list) => feature_list,
        None => return Ok(false),
    };
    let mut feature_indices = Vec::new();
    if let Some(required) = langsys.required_feature_index()? {
        feature_indices.push(usize::from(required));
    }
    for index in 0..usize::from(langsys.feature_count()?) {
        feature_indices.push(usize::from(langsys.feature_index(index)?));
    }

    for feature_index in feature_indices {
        if simple_features.contains(&feature_list.feature_tag(feature_index)?) {
            continue;
        }
        for lookup_index in feature_list.feature(feature_index)?.lookup_indices()? {
            let lookup = lookup_list.lookup(usize::from(lookup_index))?;
            for subtable_index in 0..usize::from(lookup.subtable_count()) {
                if let Some(subtable) = lookup.subtable(subtable_index)? {
                    if subtable_applies_to(table.table(), subtable, glyphs)? {
                        return Ok(true);
                    }
                }
            }
        }
    }
    Ok(false)
}

/// Whether the subtable could apply to one of `glyphs`, judged by its coverage.
///
/// Mark attachment subtables need both the mark and the glyph it attaches to to be present.
/// Unknown formats never apply.
pub fn subtable_applies_to(
    table: FontTable<'_>,
    subtable: LookupSubtable,
    glyphs: &GlyphSet,
) -> Result<bool, ParseError> {
    let offset = subtable.offset;
    let format = table.read_u16(offset)?;
    let first_coverage_field = match subtable.subtable_type {
        SubtableType::Pos(
            PosLookupType::MarkBasePos | PosLookupType::MarkLigPos | PosLookupType::MarkMarkPos,
        ) => {
            if format != 1 {
                return Ok(false);
            }
            return Ok(coverage_intersects(table, offset, offset + size::U16, glyphs)?
                && coverage_intersects(table, offset, offset + 2 * size::U16, glyphs)?);
        }
        SubtableType::Subst(SubstLookupType::ContextSubst)
        | SubtableType::Pos(PosLookupType::ContextPos) => match format {
            1 | 2 => offset + size::U16,
            // Format 3 lists a coverage table per input glyph, the first checks the first glyph.
            3 => offset + 3 * size::U16,
            _ => return Ok(false),
        },
        SubtableType::Subst(SubstLookupType::ChainContextSubst)
        | SubtableType::Pos(PosLookupType::ChainContextPos) => match format {
            1 | 2 => offset + size::U16,
            3 => {
                let backtrack_count = usize::from(table.read_u16(offset + size::U16)?);
                offset + 3 * size::U16 + backtrack_count * size::U16
            }
            _ => return Ok(false),
        },
        SubtableType::Subst(SubstLookupType::SingleSubst)
        | SubtableType::Pos(PosLookupType::SinglePos)
        | SubtableType::Pos(PosLookupType::PairPos) => match format {
            1 | 2 => offset + size::U16,
            _ => return Ok(false),
        },
        SubtableType::Subst(_) | SubtableType::Pos(PosLookupType::CursivePos) => match format {
            1 => offset + size::U16,
            _ => return Ok(false),
        },
    };
    coverage_intersects(table, offset, first_coverage_field, glyphs)
}

fn coverage_intersects(
    table: FontTable<'_>,
    base: usize,
    field: usize,
    glyphs: &GlyphSet,
) -> Result<bool, ParseError> {
    match Coverage::at_offset16(table, base, field)? {
        Some(coverage) => Ok(coverage
            .glyph_ranges()?
            .into_iter()
            .any(|(start, end)| glyphs.intersects_range(start, end))),
        None => Ok(false),
    }
}
