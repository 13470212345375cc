//! `GDEF` font table view.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/gdef>

use crate::binary::read::FontTable;
use crate::error::ParseError;
use crate::glyph_run::GlyphFlags;
use crate::layout::ClassDef;
use crate::size;

pub const GLYPH_CLASS_NONE: u16 = 0;
pub const GLYPH_CLASS_BASE: u16 = 1;
pub const GLYPH_CLASS_LIGATURE: u16 = 2;
pub const GLYPH_CLASS_MARK: u16 = 3;
pub const GLYPH_CLASS_COMPONENT: u16 = 4;

#[derive(Copy, Clone, Debug)]
pub struct GDEFTable<'a> {
    opt_glyph_classdef: Option<ClassDef<'a>>,
    opt_mark_attach_classdef: Option<ClassDef<'a>>,
}

impl<'a> GDEFTable<'a> {
    pub fn new(table: FontTable<'a>) -> Result<GDEFTable<'a>, ParseError> {
        let mut ctxt = table.ctxt_at(0);
        let major_version = ctxt.read_u16be()?;
        ctxt.check_version(major_version == 1)?;
        let _minor_version = ctxt.read_u16be()?;
        let glyph_classdef_offset = usize::from(ctxt.read_u16be()?);
        let _attach_list_offset = ctxt.read_u16be()?;
        let _lig_caret_list_offset = ctxt.read_u16be()?;
        // MarkAttachClassDef was added in OpenType 1.2 without a change of version, so it is
        // always read.
        let mark_attach_classdef_offset = usize::from(ctxt.read_u16be()?);

        Ok(GDEFTable {
            opt_glyph_classdef: Self::classdef_at(table, glyph_classdef_offset)?,
            opt_mark_attach_classdef: Self::classdef_at(table, mark_attach_classdef_offset)?,
        })
    }

    /// Offsets that are NULL or point inside the header are treated as absent.
    fn classdef_at(table: FontTable<'a>, offset: usize) -> Result<Option<ClassDef<'a>>, ParseError> {
        let gdef_header_size = 6 * size::U16;
        if offset < gdef_header_size {
            return Ok(None);
        }
        // Reject a class definition that starts past the end of the table up front.
        let _format = table.read_u16(offset)?;
        Ok(Some(ClassDef::new(table, offset)))
    }

    pub fn has_mark_attach_classdef(&self) -> bool {
        self.opt_mark_attach_classdef.is_some()
    }

    /// The GDEF glyph class of `glyph`, `GLYPH_CLASS_NONE` without a glyph class definition.
    pub fn glyph_class(&self, glyph: u16) -> Result<u16, ParseError> {
        match &self.opt_glyph_classdef {
            Some(classdef) => classdef.glyph_class_value(glyph),
            None => Ok(GLYPH_CLASS_NONE),
        }
    }

    pub fn mark_attach_class(&self, glyph: u16) -> Result<u16, ParseError> {
        match &self.opt_mark_attach_classdef {
            Some(classdef) => classdef.glyph_class_value(glyph),
            None => Ok(GLYPH_CLASS_NONE),
        }
    }
}

/// Glyph type bits for `glyph`, derived from its GDEF class.
pub fn glyph_type(opt_gdef_table: Option<&GDEFTable<'_>>, glyph: u16) -> Result<GlyphFlags, ParseError> {
    let class = match opt_gdef_table {
        Some(gdef) => gdef.glyph_class(glyph)?,
        None => GLYPH_CLASS_NONE,
    };
    Ok(match class {
        GLYPH_CLASS_BASE => GlyphFlags::BASE,
        GLYPH_CLASS_LIGATURE => GlyphFlags::LIGATURE,
        GLYPH_CLASS_MARK => GlyphFlags::MARK,
        GLYPH_CLASS_COMPONENT => GlyphFlags::COMPONENT,
        _ => GlyphFlags::UNASSIGNED,
    })
}
