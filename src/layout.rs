//! Views over the common OpenType Layout table structures shared by `GSUB` and `GPOS`.
//!
//! Every view is a cheap `(table, offset)` pair into a borrowed `FontTable`. Nothing is parsed
//! ahead of time: each query reads the bytes it needs through the bounds checked accessor, so
//! a view can be created and thrown away freely.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2>

use std::cmp::Ordering;
use std::convert::TryFrom;

use crate::binary::read::FontTable;
use crate::context::LookupFlag;
use crate::error::{ParseError, ShapingError};
use crate::size;
use crate::tag;

/// Which of the two layout tables a `LayoutTable` was loaded from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutTableKind {
    Gsub,
    Gpos,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubstLookupType {
    SingleSubst,
    MultipleSubst,
    AlternateSubst,
    LigatureSubst,
    ContextSubst,
    ChainContextSubst,
    ReverseChainSingleSubst,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PosLookupType {
    SinglePos,
    PairPos,
    CursivePos,
    MarkBasePos,
    MarkLigPos,
    MarkMarkPos,
    ContextPos,
    ChainContextPos,
}

/// Lookup type of a subtable, with extension indirection already resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubtableType {
    Subst(SubstLookupType),
    Pos(PosLookupType),
}

pub enum LookupType {
    Normal(SubtableType),
    Extension,
    /// A lookup type this implementation does not know. Never matches.
    Unknown,
}

/// A subtable ready for dispatch: its real type and its offset from the start of the table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LookupSubtable {
    pub subtable_type: SubtableType,
    pub offset: usize,
}

/// The `GSUB` or `GPOS` table header.
#[derive(Copy, Clone, Debug)]
pub struct LayoutTable<'a> {
    table: FontTable<'a>,
    kind: LayoutTableKind,
}

#[derive(Copy, Clone, Debug)]
pub struct ScriptList<'a> {
    table: FontTable<'a>,
    offset: usize,
}

#[derive(Copy, Clone, Debug)]
pub struct ScriptTable<'a> {
    table: FontTable<'a>,
    offset: usize,
}

#[derive(Copy, Clone, Debug)]
pub struct LangSys<'a> {
    table: FontTable<'a>,
    offset: usize,
}

#[derive(Copy, Clone, Debug)]
pub struct FeatureList<'a> {
    table: FontTable<'a>,
    offset: usize,
}

#[derive(Copy, Clone, Debug)]
pub struct FeatureTable<'a> {
    table: FontTable<'a>,
    offset: usize,
}

#[derive(Copy, Clone, Debug)]
pub struct LookupList<'a> {
    table: FontTable<'a>,
    offset: usize,
    kind: LayoutTableKind,
}

/// A lookup table, with its header read once.
#[derive(Copy, Clone, Debug)]
pub struct Lookup<'a> {
    table: FontTable<'a>,
    offset: usize,
    kind: LayoutTableKind,
    lookup_type: u16,
    lookup_flag: LookupFlag,
    subtable_count: u16,
}

#[derive(Copy, Clone, Debug)]
pub struct Coverage<'a> {
    table: FontTable<'a>,
    offset: usize,
}

#[derive(Copy, Clone, Debug)]
pub struct ClassDef<'a> {
    table: FontTable<'a>,
    offset: usize,
}

impl LayoutTableKind {
    pub fn from_tag(table_tag: u32) -> Result<LayoutTableKind, ShapingError> {
        match table_tag {
            tag::GSUB => Ok(LayoutTableKind::Gsub),
            tag::GPOS => Ok(LayoutTableKind::Gpos),
            _ => Err(ShapingError::UnsupportedTable(table_tag)),
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            LayoutTableKind::Gsub => tag::GSUB,
            LayoutTableKind::Gpos => tag::GPOS,
        }
    }

    pub fn check_lookup_type(self, lookup_type: u16) -> LookupType {
        match self {
            LayoutTableKind::Gsub => match lookup_type {
                1 => LookupType::Normal(SubtableType::Subst(SubstLookupType::SingleSubst)),
                2 => LookupType::Normal(SubtableType::Subst(SubstLookupType::MultipleSubst)),
                3 => LookupType::Normal(SubtableType::Subst(SubstLookupType::AlternateSubst)),
                4 => LookupType::Normal(SubtableType::Subst(SubstLookupType::LigatureSubst)),
                5 => LookupType::Normal(SubtableType::Subst(SubstLookupType::ContextSubst)),
                6 => LookupType::Normal(SubtableType::Subst(SubstLookupType::ChainContextSubst)),
                7 => LookupType::Extension,
                8 => LookupType::Normal(SubtableType::Subst(
                    SubstLookupType::ReverseChainSingleSubst,
                )),
                _ => LookupType::Unknown,
            },
            LayoutTableKind::Gpos => match lookup_type {
                1 => LookupType::Normal(SubtableType::Pos(PosLookupType::SinglePos)),
                2 => LookupType::Normal(SubtableType::Pos(PosLookupType::PairPos)),
                3 => LookupType::Normal(SubtableType::Pos(PosLookupType::CursivePos)),
                4 => LookupType::Normal(SubtableType::Pos(PosLookupType::MarkBasePos)),
                5 => LookupType::Normal(SubtableType::Pos(PosLookupType::MarkLigPos)),
                6 => LookupType::Normal(SubtableType::Pos(PosLookupType::MarkMarkPos)),
                7 => LookupType::Normal(SubtableType::Pos(PosLookupType::ContextPos)),
                8 => LookupType::Normal(SubtableType::Pos(PosLookupType::ChainContextPos)),
                9 => LookupType::Extension,
                _ => LookupType::Unknown,
            },
        }
    }
}

impl<'a> LayoutTable<'a> {
    /// Offsets of the script, feature and lookup lists follow the version.
    const HEADER_SIZE: usize = 5 * size::U16;

    pub fn new(table: FontTable<'a>, kind: LayoutTableKind) -> Result<LayoutTable<'a>, ParseError> {
        let major_version = table.read_u16(0)?;
        let _minor_version = table.read_u16(size::U16)?;
        if major_version != 1 {
            return Err(ParseError::BadVersion);
        }
        if table.len() < Self::HEADER_SIZE {
            return Err(ParseError::BadEof);
        }
        Ok(LayoutTable { table, kind })
    }

    pub fn kind(&self) -> LayoutTableKind {
        self.kind
    }

    pub fn table(&self) -> FontTable<'a> {
        self.table
    }

    pub fn script_list(&self) -> Result<Option<ScriptList<'a>>, ParseError> {
        let table = self.table;
        Ok(table
            .read_offset16(0, 4)?
            .map(|offset| ScriptList { table, offset }))
    }

    pub fn feature_list(&self) -> Result<Option<FeatureList<'a>>, ParseError> {
        let table = self.table;
        Ok(table
            .read_offset16(0, 6)?
            .map(|offset| FeatureList { table, offset }))
    }

    pub fn lookup_list(&self) -> Result<Option<LookupList<'a>>, ParseError> {
        let table = self.table;
        let kind = self.kind;
        Ok(table
            .read_offset16(0, 8)?
            .map(|offset| LookupList {
                table,
                offset,
                kind,
            }))
    }

    pub fn find_script(&self, script_tag: u32) -> Result<Option<ScriptTable<'a>>, ParseError> {
        match self.script_list()? {
            Some(script_list) => script_list.find_script(script_tag),
            None => Ok(None),
        }
    }

    /// Find `script_tag`, falling back to the `DFLT` script.
    pub fn find_script_or_default(
        &self,
        script_tag: u32,
    ) -> Result<Option<ScriptTable<'a>>, ParseError> {
        if let Some(script_table) = self.find_script(script_tag)? {
            return Ok(Some(script_table));
        }
        self.find_script(tag::DFLT)
    }

    pub fn lookup_count(&self) -> Result<usize, ParseError> {
        match self.lookup_list()? {
            Some(lookup_list) => Ok(usize::from(lookup_list.len()?)),
            None => Ok(0),
        }
    }
}

impl<'a> ScriptList<'a> {
    const RECORD_SIZE: usize = size::U32 + size::U16;

    pub fn len(&self) -> Result<u16, ParseError> {
        self.table.read_u16(self.offset)
    }

    pub fn script_tag(&self, index: usize) -> Result<u32, ParseError> {
        self.table
            .read_u32(self.offset + size::U16 + index * Self::RECORD_SIZE)
    }

    pub fn script(&self, index: usize) -> Result<ScriptTable<'a>, ParseError> {
        let record = self.offset + size::U16 + index * Self::RECORD_SIZE;
        let offset = self
            .table
            .read_offset16(self.offset, record + size::U32)?
            .ok_or(ParseError::BadOffset)?;
        Ok(ScriptTable {
            table: self.table,
            offset,
        })
    }

    pub fn find_script(&self, script_tag: u32) -> Result<Option<ScriptTable<'a>>, ParseError> {
        for index in 0..usize::from(self.len()?) {
            if self.script_tag(index)? == script_tag {
                return self.script(index).map(Some);
            }
        }
        Ok(None)
    }
}

impl<'a> ScriptTable<'a> {
    const RECORD_SIZE: usize = size::U32 + size::U16;

    pub fn default_langsys(&self) -> Result<Option<LangSys<'a>>, ParseError> {
        let table = self.table;
        Ok(table
            .read_offset16(self.offset, self.offset)?
            .map(|offset| LangSys { table, offset }))
    }

    pub fn langsys_count(&self) -> Result<u16, ParseError> {
        self.table.read_u16(self.offset + size::U16)
    }

    pub fn langsys_tag(&self, index: usize) -> Result<u32, ParseError> {
        self.table
            .read_u32(self.offset + 2 * size::U16 + index * Self::RECORD_SIZE)
    }

    pub fn langsys(&self, index: usize) -> Result<LangSys<'a>, ParseError> {
        let record = self.offset + 2 * size::U16 + index * Self::RECORD_SIZE;
        let offset = self
            .table
            .read_offset16(self.offset, record + size::U32)?
            .ok_or(ParseError::BadOffset)?;
        Ok(LangSys {
            table: self.table,
            offset,
        })
    }

    pub fn find_langsys(&self, langsys_tag: u32) -> Result<Option<LangSys<'a>>, ParseError> {
        for index in 0..usize::from(self.langsys_count()?) {
            if self.langsys_tag(index)? == langsys_tag {
                return self.langsys(index).map(Some);
            }
        }
        Ok(None)
    }

    /// Find `langsys_tag`, falling back to the default language system of the script.
    pub fn find_langsys_or_default(
        &self,
        opt_langsys_tag: Option<u32>,
    ) -> Result<Option<LangSys<'a>>, ParseError> {
        if let Some(langsys_tag) = opt_langsys_tag {
            if let Some(langsys) = self.find_langsys(langsys_tag)? {
                return Ok(Some(langsys));
            }
        }
        self.default_langsys()
    }
}

impl<'a> LangSys<'a> {
    /// The required feature index, if the language system has one.
    pub fn required_feature_index(&self) -> Result<Option<u16>, ParseError> {
        match self.table.read_u16(self.offset + size::U16)? {
            0xFFFF => Ok(None),
            index => Ok(Some(index)),
        }
    }

    pub fn feature_count(&self) -> Result<u16, ParseError> {
        self.table.read_u16(self.offset + 2 * size::U16)
    }

    pub fn feature_index(&self, index: usize) -> Result<u16, ParseError> {
        self.table
            .read_u16(self.offset + 3 * size::U16 + index * size::U16)
    }
}

impl<'a> FeatureList<'a> {
    const RECORD_SIZE: usize = size::U32 + size::U16;

    pub fn len(&self) -> Result<u16, ParseError> {
        self.table.read_u16(self.offset)
    }

    pub fn feature_tag(&self, index: usize) -> Result<u32, ParseError> {
        self.check_index(index)?;
        self.table
            .read_u32(self.offset + size::U16 + index * Self::RECORD_SIZE)
    }

    pub fn feature(&self, index: usize) -> Result<FeatureTable<'a>, ParseError> {
        self.check_index(index)?;
        let record = self.offset + size::U16 + index * Self::RECORD_SIZE;
        let offset = self
            .table
            .read_offset16(self.offset, record + size::U32)?
            .ok_or(ParseError::BadOffset)?;
        Ok(FeatureTable {
            table: self.table,
            offset,
        })
    }

    fn check_index(&self, index: usize) -> Result<(), ParseError> {
        if index < usize::from(self.len()?) {
            Ok(())
        } else {
            Err(ParseError::BadIndex)
        }
    }
}

impl<'a> FeatureTable<'a> {
    pub fn lookup_count(&self) -> Result<u16, ParseError> {
        self.table.read_u16(self.offset + size::U16)
    }

    pub fn lookup_index(&self, index: usize) -> Result<u16, ParseError> {
        self.table
            .read_u16(self.offset + 2 * size::U16 + index * size::U16)
    }

    pub fn lookup_indices(&self) -> Result<Vec<u16>, ParseError> {
        (0..usize::from(self.lookup_count()?))
            .map(|index| self.lookup_index(index))
            .collect()
    }
}

impl<'a> LookupList<'a> {
    pub fn len(&self) -> Result<u16, ParseError> {
        self.table.read_u16(self.offset)
    }

    pub fn lookup(&self, lookup_index: usize) -> Result<Lookup<'a>, ParseError> {
        if lookup_index >= usize::from(self.len()?) {
            return Err(ParseError::BadIndex);
        }
        let offset = self
            .table
            .read_offset16(self.offset, self.offset + size::U16 + lookup_index * size::U16)?
            .ok_or(ParseError::BadOffset)?;
        Lookup::new(self.table, offset, self.kind)
    }
}

impl<'a> Lookup<'a> {
    fn new(
        table: FontTable<'a>,
        offset: usize,
        kind: LayoutTableKind,
    ) -> Result<Lookup<'a>, ParseError> {
        let mut ctxt = table.ctxt_at(offset);
        let lookup_type = ctxt.read_u16be()?;
        let lookup_flag = LookupFlag(ctxt.read_u16be()?);
        let subtable_count = ctxt.read_u16be()?;
        Ok(Lookup {
            table,
            offset,
            kind,
            lookup_type,
            lookup_flag,
            subtable_count,
        })
    }

    pub fn lookup_type(&self) -> u16 {
        self.lookup_type
    }

    pub fn lookup_flag(&self) -> LookupFlag {
        self.lookup_flag
    }

    pub fn subtable_count(&self) -> u16 {
        self.subtable_count
    }

    fn subtable_offset(&self, index: usize) -> Result<Option<usize>, ParseError> {
        self.table
            .read_offset16(self.offset, self.offset + 3 * size::U16 + index * size::U16)
    }

    /// Resolve subtable `index` to its real type and location.
    ///
    /// Extension subtables are followed one level. Unknown lookup types, unknown extension
    /// formats, NULL offsets and extensions that point at another extension all yield `None`.
    pub fn subtable(&self, index: usize) -> Result<Option<LookupSubtable>, ParseError> {
        let offset = match self.subtable_offset(index)? {
            Some(offset) => offset,
            None => return Ok(None),
        };
        match self.kind.check_lookup_type(self.lookup_type) {
            LookupType::Normal(subtable_type) => Ok(Some(LookupSubtable {
                subtable_type,
                offset,
            })),
            LookupType::Extension => {
                let mut ctxt = self.table.ctxt_at(offset);
                let format = ctxt.read_u16be()?;
                let extension_lookup_type = ctxt.read_u16be()?;
                let extension_offset = usize::try_from(ctxt.read_u32be()?)?;
                if format != 1 {
                    return Ok(None);
                }
                match self.kind.check_lookup_type(extension_lookup_type) {
                    LookupType::Normal(subtable_type) => Ok(Some(LookupSubtable {
                        subtable_type,
                        offset: offset + extension_offset,
                    })),
                    LookupType::Extension | LookupType::Unknown => Ok(None),
                }
            }
            LookupType::Unknown => Ok(None),
        }
    }

    /// Whether this lookup processes glyphs from the end of the run backwards.
    ///
    /// Only reverse chaining substitution does. For an extension lookup the type of the first
    /// subtable decides.
    pub fn is_reversal(&self) -> Result<bool, ParseError> {
        let reverse = SubtableType::Subst(SubstLookupType::ReverseChainSingleSubst);
        match self.kind.check_lookup_type(self.lookup_type) {
            LookupType::Normal(subtable_type) => Ok(subtable_type == reverse),
            LookupType::Extension if self.subtable_count > 0 => Ok(self
                .subtable(0)?
                .map_or(false, |subtable| subtable.subtable_type == reverse)),
            LookupType::Extension | LookupType::Unknown => Ok(false),
        }
    }
}

/// Binary search `count` sorted records, `compare` reporting how record `index` orders
/// relative to the target.
pub(crate) fn binary_search_by<F>(count: usize, mut compare: F) -> Result<Option<usize>, ParseError>
where
    F: FnMut(usize) -> Result<Ordering, ParseError>,
{
    let mut low = 0;
    let mut high = count;
    while low < high {
        let mid = low + (high - low) / 2;
        match compare(mid)? {
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid,
            Ordering::Equal => return Ok(Some(mid)),
        }
    }
    Ok(None)
}

impl<'a> Coverage<'a> {
    const RANGE_RECORD_SIZE: usize = 3 * size::U16;

    pub fn new(table: FontTable<'a>, offset: usize) -> Coverage<'a> {
        Coverage { table, offset }
    }

    /// Coverage table at the 16-bit offset stored at `field`, relative to `base`.
    pub fn at_offset16(
        table: FontTable<'a>,
        base: usize,
        field: usize,
    ) -> Result<Option<Coverage<'a>>, ParseError> {
        Ok(table
            .read_offset16(base, field)?
            .map(|offset| Coverage { table, offset }))
    }

    /// The coverage index of `glyph`, or `None` if the glyph is not covered.
    pub fn glyph_coverage_value(&self, glyph: u16) -> Result<Option<u16>, ParseError> {
        let table = &self.table;
        match table.read_u16(self.offset)? {
            1 => {
                let glyph_count = usize::from(table.read_u16(self.offset + size::U16)?);
                let array = self.offset + 2 * size::U16;
                // The glyph indices must be in numerical order for binary searching of the list.
                // https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#coverage-format-1
                let found = binary_search_by(glyph_count, |index| {
                    Ok(table.read_u16(array + index * size::U16)?.cmp(&glyph))
                })?;
                Ok(found.and_then(|index| u16::try_from(index).ok()))
            }
            2 => {
                let range_count = usize::from(table.read_u16(self.offset + size::U16)?);
                let array = self.offset + 2 * size::U16;
                let found = binary_search_by(range_count, |index| {
                    let record = array + index * Self::RANGE_RECORD_SIZE;
                    let start_glyph = table.read_u16(record)?;
                    let end_glyph = table.read_u16(record + size::U16)?;
                    Ok(if end_glyph < glyph {
                        Ordering::Less
                    } else if start_glyph > glyph {
                        Ordering::Greater
                    } else {
                        Ordering::Equal
                    })
                })?;
                match found {
                    Some(index) => {
                        let record = array + index * Self::RANGE_RECORD_SIZE;
                        let start_glyph = table.read_u16(record)?;
                        let start_coverage_index = table.read_u16(record + 2 * size::U16)?;
                        Ok(Some(
                            start_coverage_index.wrapping_add(glyph - start_glyph),
                        ))
                    }
                    None => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    /// Convenience method to count the total number of glyphs covered
    pub fn glyph_count(&self) -> Result<usize, ParseError> {
        Ok(self
            .glyph_ranges()?
            .iter()
            .map(|&(start, end)| usize::from(end) - usize::from(start) + 1)
            .sum())
    }

    /// The covered glyphs as inclusive `(start, end)` ranges in table order.
    ///
    /// Format 1 tables yield one single-glyph range per glyph. Unknown formats cover nothing.
    pub fn glyph_ranges(&self) -> Result<Vec<(u16, u16)>, ParseError> {
        let table = &self.table;
        match table.read_u16(self.offset)? {
            1 => {
                let glyph_count = usize::from(table.read_u16(self.offset + size::U16)?);
                let array = self.offset + 2 * size::U16;
                (0..glyph_count)
                    .map(|index| {
                        let glyph = table.read_u16(array + index * size::U16)?;
                        Ok((glyph, glyph))
                    })
                    .collect()
            }
            2 => {
                let range_count = usize::from(table.read_u16(self.offset + size::U16)?);
                let array = self.offset + 2 * size::U16;
                let mut ranges = Vec::with_capacity(range_count);
                for index in 0..range_count {
                    let record = array + index * Self::RANGE_RECORD_SIZE;
                    let start_glyph = table.read_u16(record)?;
                    let end_glyph = table.read_u16(record + size::U16)?;
                    if start_glyph <= end_glyph {
                        ranges.push((start_glyph, end_glyph));
                    }
                }
                Ok(ranges)
            }
            _ => Ok(Vec::new()),
        }
    }
}

impl<'a> ClassDef<'a> {
    const RANGE_RECORD_SIZE: usize = 3 * size::U16;

    pub fn new(table: FontTable<'a>, offset: usize) -> ClassDef<'a> {
        ClassDef { table, offset }
    }

    /// Class definition table at the 16-bit offset stored at `field`, relative to `base`.
    pub fn at_offset16(
        table: FontTable<'a>,
        base: usize,
        field: usize,
    ) -> Result<Option<ClassDef<'a>>, ParseError> {
        Ok(table
            .read_offset16(base, field)?
            .map(|offset| ClassDef { table, offset }))
    }

    /// The class of `glyph`. Glyphs not assigned a class are in class 0.
    pub fn glyph_class_value(&self, glyph: u16) -> Result<u16, ParseError> {
        let table = &self.table;
        match table.read_u16(self.offset)? {
            1 => {
                let start_glyph = table.read_u16(self.offset + size::U16)?;
                let glyph_count = table.read_u16(self.offset + 2 * size::U16)?;
                if glyph >= start_glyph && glyph - start_glyph < glyph_count {
                    let index = usize::from(glyph - start_glyph);
                    table.read_u16(self.offset + 3 * size::U16 + index * size::U16)
                } else {
                    Ok(0)
                }
            }
            2 => {
                let range_count = usize::from(table.read_u16(self.offset + size::U16)?);
                let array = self.offset + 2 * size::U16;
                let found = binary_search_by(range_count, |index| {
                    let record = array + index * Self::RANGE_RECORD_SIZE;
                    let start_glyph = table.read_u16(record)?;
                    let end_glyph = table.read_u16(record + size::U16)?;
                    Ok(if end_glyph < glyph {
                        Ordering::Less
                    } else if start_glyph > glyph {
                        Ordering::Greater
                    } else {
                        Ordering::Equal
                    })
                })?;
                match found {
                    Some(index) => {
                        table.read_u16(array + index * Self::RANGE_RECORD_SIZE + 2 * size::U16)
                    }
                    None => Ok(0),
                }
            }
            _ => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::writer::{self, coverage_format1, coverage_format2, TtfType::*};

    #[test]
    fn test_coverage_format1() {
        let data = coverage_format1(&[3, 7, 20, 21, 400]);
        let coverage = Coverage::new(FontTable::new(&data), 0);

        assert_eq!(coverage.glyph_coverage_value(3), Ok(Some(0)));
        assert_eq!(coverage.glyph_coverage_value(21), Ok(Some(3)));
        assert_eq!(coverage.glyph_coverage_value(400), Ok(Some(4)));
        assert_eq!(coverage.glyph_coverage_value(4), Ok(None));
        assert_eq!(coverage.glyph_coverage_value(0), Ok(None));
        assert_eq!(coverage.glyph_coverage_value(401), Ok(None));
        assert_eq!(coverage.glyph_count(), Ok(5));
    }

    #[test]
    fn test_coverage_format2() {
        let data = coverage_format2(&[(10, 14, 0), (30, 30, 5), (40, 45, 6)]);
        let coverage = Coverage::new(FontTable::new(&data), 0);

        assert_eq!(coverage.glyph_coverage_value(10), Ok(Some(0)));
        assert_eq!(coverage.glyph_coverage_value(14), Ok(Some(4)));
        assert_eq!(coverage.glyph_coverage_value(30), Ok(Some(5)));
        assert_eq!(coverage.glyph_coverage_value(42), Ok(Some(8)));
        assert_eq!(coverage.glyph_coverage_value(15), Ok(None));
        assert_eq!(coverage.glyph_coverage_value(46), Ok(None));
        assert_eq!(coverage.glyph_count(), Ok(12));
        assert_eq!(
            coverage.glyph_ranges(),
            Ok(vec![(10, 14), (30, 30), (40, 45)])
        );
    }

    #[test]
    fn test_coverage_index_is_monotonic() {
        for data in &[
            coverage_format1(&[1, 2, 5, 9, 100, 1000, 65535]),
            coverage_format2(&[(1, 3, 0), (8, 8, 3), (20, 29, 4), (500, 510, 14)]),
        ] {
            let coverage = Coverage::new(FontTable::new(data), 0);
            let mut last = None;
            for glyph in 0..=u16::MAX {
                if let Some(index) = coverage.glyph_coverage_value(glyph).unwrap() {
                    if let Some(last) = last {
                        assert!(index > last, "glyph {} index {} <= {}", glyph, index, last);
                    }
                    last = Some(index);
                }
            }
        }
    }

    #[test]
    fn test_coverage_unknown_format() {
        let data = writer::convert(&[UInt16(3), UInt16(1), UInt16(5)]);
        let coverage = Coverage::new(FontTable::new(&data), 0);

        assert_eq!(coverage.glyph_coverage_value(5), Ok(None));
        assert_eq!(coverage.glyph_count(), Ok(0));
    }

    #[test]
    fn test_coverage_truncated() {
        // Claims three glyphs but only holds two
        let data = writer::convert(&[UInt16(1), UInt16(3), UInt16(5), UInt16(6)]);
        let coverage = Coverage::new(FontTable::new(&data), 0);

        assert_eq!(coverage.glyph_coverage_value(7), Err(ParseError::BadEof));
    }

    #[test]
    fn test_class_def_format1() {
        let data = writer::class_def_format1(10, &[1, 0, 2]);
        let class_def = ClassDef::new(FontTable::new(&data), 0);

        assert_eq!(class_def.glyph_class_value(9), Ok(0));
        assert_eq!(class_def.glyph_class_value(10), Ok(1));
        assert_eq!(class_def.glyph_class_value(11), Ok(0));
        assert_eq!(class_def.glyph_class_value(12), Ok(2));
        assert_eq!(class_def.glyph_class_value(13), Ok(0));
    }

    #[test]
    fn test_class_def_format2() {
        let data = writer::class_def_format2(&[(5, 9, 1), (20, 20, 3), (21, 30, 2)]);
        let class_def = ClassDef::new(FontTable::new(&data), 0);

        assert_eq!(class_def.glyph_class_value(4), Ok(0));
        assert_eq!(class_def.glyph_class_value(5), Ok(1));
        assert_eq!(class_def.glyph_class_value(9), Ok(1));
        assert_eq!(class_def.glyph_class_value(20), Ok(3));
        assert_eq!(class_def.glyph_class_value(25), Ok(2));
        assert_eq!(class_def.glyph_class_value(31), Ok(0));
    }

    #[test]
    fn test_class_def_unknown_format() {
        let data = writer::convert(&[UInt16(9), UInt16(0)]);
        let class_def = ClassDef::new(FontTable::new(&data), 0);

        assert_eq!(class_def.glyph_class_value(1), Ok(0));
    }

    #[test]
    fn test_layout_table_lists() {
        let data = writer::layout_table(
            tag::LATN,
            None,
            &[(tag::LIGA, vec![1]), (tag::KERN, vec![0])],
            &[
                writer::lookup(1, 0, &[writer::convert(&[UInt16(1), UInt16(6), Int16(1)])]),
                writer::lookup(1, 8, &[]),
            ],
        );
        let table = LayoutTable::new(FontTable::new(&data), LayoutTableKind::Gsub).unwrap();

        let script = table.find_script(tag::LATN).unwrap().expect("no latn script");
        assert!(table.find_script(tag::ARAB).unwrap().is_none());
        assert!(table.find_script_or_default(tag::ARAB).unwrap().is_none());
        let langsys = script.default_langsys().unwrap().expect("no default langsys");
        assert_eq!(langsys.required_feature_index(), Ok(None));
        assert_eq!(langsys.feature_count(), Ok(2));

        let feature_list = table.feature_list().unwrap().unwrap();
        assert_eq!(feature_list.feature_tag(0), Ok(tag::LIGA));
        assert_eq!(feature_list.feature(1).unwrap().lookup_indices(), Ok(vec![0]));
        assert_eq!(feature_list.feature_tag(2), Err(ParseError::BadIndex));

        let lookup_list = table.lookup_list().unwrap().unwrap();
        assert_eq!(table.lookup_count(), Ok(2));
        let lookup = lookup_list.lookup(1).unwrap();
        assert_eq!(lookup.lookup_flag().0, 8);
        assert_eq!(lookup.subtable_count(), 0);
        assert!(matches!(lookup_list.lookup(2), Err(ParseError::BadIndex)));

        let subtable = lookup_list.lookup(0).unwrap().subtable(0).unwrap().unwrap();
        assert_eq!(
            subtable.subtable_type,
            SubtableType::Subst(SubstLookupType::SingleSubst)
        );
    }

    #[test]
    fn test_layout_table_bad_version() {
        let data = writer::convert(&[UInt16(2), UInt16(0), UInt16(0), UInt16(0), UInt16(0)]);
        assert!(matches!(
            LayoutTable::new(FontTable::new(&data), LayoutTableKind::Gpos),
            Err(ParseError::BadVersion)
        ));
    }

    #[test]
    fn test_extension_resolution() {
        let single = writer::convert(&[UInt16(1), UInt16(6), Int16(1)]);
        let mut ext = writer::convert(&[UInt16(1), UInt16(1), UInt32(8)]);
        ext.extend(single);
        let nested_ext = writer::convert(&[UInt16(1), UInt16(7), UInt32(8)]);
        let data = writer::layout_table(
            tag::DFLT,
            None,
            &[],
            &[writer::lookup(7, 0, &[ext, nested_ext])],
        );
        let table = LayoutTable::new(FontTable::new(&data), LayoutTableKind::Gsub).unwrap();
        let lookup = table.lookup_list().unwrap().unwrap().lookup(0).unwrap();

        let subtable = lookup.subtable(0).unwrap().expect("extension not resolved");
        assert_eq!(
            subtable.subtable_type,
            SubtableType::Subst(SubstLookupType::SingleSubst)
        );
        assert_eq!(table.table().read_u16(subtable.offset), Ok(1));
        assert_eq!(lookup.subtable(1), Ok(None));
        assert_eq!(lookup.is_reversal(), Ok(false));
    }

    #[test]
    fn test_unknown_lookup_type() {
        let data = writer::layout_table(
            tag::DFLT,
            None,
            &[],
            &[writer::lookup(12, 0, &[writer::convert(&[UInt16(1)])])],
        );
        let table = LayoutTable::new(FontTable::new(&data), LayoutTableKind::Gpos).unwrap();
        let lookup = table.lookup_list().unwrap().unwrap().lookup(0).unwrap();

        assert_eq!(lookup.subtable(0), Ok(None));
    }
}
