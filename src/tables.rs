//! Access to the tables of an OpenType font file.

use crate::binary::read::{ReadCtxt, ReadScope};
use crate::error::ParseError;
use crate::font::LayoutFont;
use crate::glyph_position::LayoutOffset;
use crate::size;
use crate::tag;

use std::borrow::Cow;
use std::convert::TryFrom;

/// Magic value identifying a CFF font (`OTTO`)
pub const CFF_MAGIC: u32 = tag::OTTO;

/// Magic number identifying TrueType 1.0
///
/// The version number 1.0 as a 16.16 fixed-point value, indicating TrueType glyph data.
pub const TTF_MAGIC: u32 = 0x00010000;

/// Magic value identifying a TrueType font collection `ttcf`
pub const TTCF_MAGIC: u32 = tag::TTCF;

pub trait FontTableProvider {
    /// Return data for the specified table if present
    fn table_data<'a>(&'a self, tag: u32) -> Result<Option<Cow<'a, [u8]>>, ParseError>;

    fn has_table<'a>(&'a self, tag: u32) -> bool;

    fn read_table_data<'a>(&'a self, tag: u32) -> Result<Cow<'a, [u8]>, ParseError> {
        self.table_data(tag)?.ok_or(ParseError::MissingValue)
    }
}

pub struct OpenTypeFont<'a> {
    pub scope: ReadScope<'a>,
    pub data: OpenTypeData<'a>,
}

/// An OpenTypeFont containing a single font or a collection of fonts
pub enum OpenTypeData<'a> {
    Single(OffsetTable),
    Collection(TTCHeader<'a>),
}

/// TrueType collection header
pub struct TTCHeader<'a> {
    pub major_version: u16,
    pub minor_version: u16,
    offset_tables: &'a [u8],
}

/// OpenType Offset Table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/otff#organization-of-an-opentype-font>
#[derive(Clone, Debug)]
pub struct OffsetTable {
    pub sfnt_version: u32,
    pub table_records: Vec<TableRecord>,
}

/// Serves the tables of one font in a file.
pub struct OffsetTableFontProvider<'a> {
    scope: ReadScope<'a>,
    offset_table: Cow<'a, OffsetTable>,
}

/// An entry in the Offset Table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/otff#organization-of-an-opentype-font>
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Hash)]
pub struct TableRecord {
    pub table_tag: u32,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

impl<'a> OpenTypeFont<'a> {
    pub fn read(scope: ReadScope<'a>) -> Result<OpenTypeFont<'a>, ParseError> {
        let mut ctxt = scope.ctxt();
        let mut peek = ctxt.clone();
        let magic = peek.read_u32be()?;
        match magic {
            TTF_MAGIC | CFF_MAGIC => {
                let offset_table = OffsetTable::read(&mut ctxt)?;
                let font = OpenTypeData::Single(offset_table);
                Ok(OpenTypeFont { scope, data: font })
            }
            TTCF_MAGIC => {
                let ttc_header = TTCHeader::read(&mut ctxt)?;
                let font = OpenTypeData::Collection(ttc_header);
                Ok(OpenTypeFont { scope, data: font })
            }
            _ => Err(ParseError::BadVersion),
        }
    }

    /// The table provider for the font at `index`. `index` is ignored for a single font.
    pub fn table_provider(
        &'a self,
        index: usize,
    ) -> Result<OffsetTableFontProvider<'a>, ParseError> {
        match &self.data {
            OpenTypeData::Single(offset_table) => Ok(OffsetTableFontProvider {
                offset_table: Cow::Borrowed(offset_table),
                scope: self.scope,
            }),
            OpenTypeData::Collection(ttc) => {
                let offset = usize::try_from(ttc.offset_table(index)?)?;
                let offset_table = OffsetTable::read(&mut self.scope.offset(offset).ctxt())?;
                Ok(OffsetTableFontProvider {
                    offset_table: Cow::Owned(offset_table),
                    scope: self.scope,
                })
            }
        }
    }
}

impl<'a> TTCHeader<'a> {
    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let ttc_tag = ctxt.read_u32be()?;
        match ttc_tag {
            TTCF_MAGIC => {
                let major_version = ctxt.read_u16be()?;
                let minor_version = ctxt.read_u16be()?;
                ctxt.check(major_version == 1 || major_version == 2)?;
                let num_fonts = usize::try_from(ctxt.read_u32be()?)?;
                let offset_tables = ctxt.read_slice(num_fonts * size::U32)?;
                Ok(TTCHeader {
                    major_version,
                    minor_version,
                    offset_tables,
                })
            }
            _ => Err(ParseError::BadVersion),
        }
    }

    pub fn num_fonts(&self) -> usize {
        self.offset_tables.len() / size::U32
    }

    fn offset_table(&self, index: usize) -> Result<u32, ParseError> {
        if index >= self.num_fonts() {
            return Err(ParseError::BadIndex);
        }
        Ok(ReadScope::new(self.offset_tables)
            .offset(index * size::U32)
            .ctxt()
            .read_u32be()?)
    }
}

impl OffsetTable {
    fn read(ctxt: &mut ReadCtxt<'_>) -> Result<Self, ParseError> {
        let sfnt_version = ctxt.read_u32be()?;
        match sfnt_version {
            TTF_MAGIC | CFF_MAGIC => {
                let num_tables = ctxt.read_u16be()?;
                let _search_range = ctxt.read_u16be()?;
                let _entry_selector = ctxt.read_u16be()?;
                let _range_shift = ctxt.read_u16be()?;
                let table_records = (0..num_tables)
                    .map(|_| TableRecord::read(ctxt))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(OffsetTable {
                    sfnt_version,
                    table_records,
                })
            }
            _ => Err(ParseError::BadVersion),
        }
    }

    pub fn find_table_record(&self, tag: u32) -> Option<TableRecord> {
        self.table_records
            .iter()
            .find(|table_record| table_record.table_tag == tag)
            .copied()
    }

    pub fn read_table<'a>(
        &self,
        scope: &ReadScope<'a>,
        tag: u32,
    ) -> Result<Option<ReadScope<'a>>, ParseError> {
        if let Some(table_record) = self.find_table_record(tag) {
            let table = table_record.read_table(scope)?;
            Ok(Some(table))
        } else {
            Ok(None)
        }
    }
}

impl TableRecord {
    pub const SIZE: usize = 4 * size::U32;

    fn read(ctxt: &mut ReadCtxt<'_>) -> Result<Self, ParseError> {
        Ok(TableRecord {
            table_tag: ctxt.read_u32be()?,
            checksum: ctxt.read_u32be()?,
            offset: ctxt.read_u32be()?,
            length: ctxt.read_u32be()?,
        })
    }

    pub fn read_table<'a>(&self, scope: &ReadScope<'a>) -> Result<ReadScope<'a>, ParseError> {
        let offset = usize::try_from(self.offset)?;
        let length = usize::try_from(self.length)?;
        scope.offset_length(offset, length)
    }
}

impl<'a> FontTableProvider for OffsetTableFontProvider<'a> {
    fn table_data<'b>(&'b self, tag: u32) -> Result<Option<Cow<'b, [u8]>>, ParseError> {
        self.offset_table
            .read_table(&self.scope, tag)
            .map(|scope| scope.map(|scope| Cow::Borrowed(scope.data())))
    }

    fn has_table<'b>(&'b self, tag: u32) -> bool {
        self.offset_table.find_table_record(tag).is_some()
    }
}

// The table directory carries no outline data so contour points are never available and
// anchors fall back to their design coordinates.
impl<'a> LayoutFont for OffsetTableFontProvider<'a> {
    fn glyph_contour_point(&self, _glyph_id: u16, _point_index: u16) -> Option<LayoutOffset> {
        None
    }
}

impl<T: FontTableProvider> FontTableProvider for Box<T> {
    fn table_data<'a>(&'a self, tag: u32) -> Result<Option<Cow<'a, [u8]>>, ParseError> {
        self.as_ref().table_data(tag)
    }

    fn has_table<'a>(&'a self, tag: u32) -> bool {
        self.as_ref().has_table(tag)
    }
}

impl<T: LayoutFont> LayoutFont for Box<T> {
    fn glyph_contour_point(&self, glyph_id: u16, point_index: u16) -> Option<LayoutOffset> {
        self.as_ref().glyph_contour_point(glyph_id, point_index)
    }
}
