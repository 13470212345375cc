//! The mutable glyph sequence that layout operates on.

use bitflags::bitflags;

use crate::error::{ParseError, ShapingError};
use crate::gdef::{self, GDEFTable};

bitflags! {
    /// Per-glyph type and state.
    ///
    /// The low three bits hold the glyph type, the rest are independent state bits.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct GlyphFlags: u16 {
        const UNASSIGNED        = 0x0000;
        const BASE              = 0x0001;
        const LIGATURE          = 0x0002;
        const MARK              = 0x0003;
        const COMPONENT         = 0x0004;
        /// The glyph was substituted and its type has not been looked up yet.
        const UNRESOLVED        = 0x0007;
        const TYPE_MASK         = 0x0007;
        const SUBSTITUTED       = 0x0010;
        const POSITIONED        = 0x0020;
        const CURSIVE_CONNECTED = 0x0040;
    }
}

impl GlyphFlags {
    pub fn glyph_type(self) -> GlyphFlags {
        self & GlyphFlags::TYPE_MASK
    }

    /// These flags with the type bits replaced by `glyph_type`.
    pub fn with_glyph_type(self, glyph_type: GlyphFlags) -> GlyphFlags {
        self.difference(GlyphFlags::TYPE_MASK) | glyph_type.glyph_type()
    }

    pub fn is_base(self) -> bool {
        self.glyph_type() == GlyphFlags::BASE
    }

    pub fn is_ligature(self) -> bool {
        self.glyph_type() == GlyphFlags::LIGATURE
    }

    pub fn is_mark(self) -> bool {
        self.glyph_type() == GlyphFlags::MARK
    }

    pub fn is_unresolved(self) -> bool {
        self.glyph_type() == GlyphFlags::UNRESOLVED
    }
}

/// A run of glyphs and the map from the source characters to them.
///
/// The glyph ids, flags, first characters and ligature component counts are kept in four
/// parallel sequences that always have the same length. `insert_copies` and `remove` are the
/// only operations that change the length and they change all four together.
///
/// The character map has one entry per source character, holding the index of the glyph the
/// character is rendered by. Layout keeps every entry pointing at a glyph in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRun {
    glyphs: Vec<u16>,
    flags: Vec<GlyphFlags>,
    first_chars: Vec<usize>,
    ligature_counts: Vec<u16>,
    char_map: Vec<usize>,
}

impl GlyphRun {
    /// A run where character `i` maps to glyph `i`.
    pub fn new(glyphs: Vec<u16>) -> GlyphRun {
        let len = glyphs.len();
        GlyphRun {
            glyphs,
            flags: vec![GlyphFlags::UNASSIGNED; len],
            first_chars: (0..len).collect(),
            ligature_counts: vec![1; len],
            char_map: (0..len).collect(),
        }
    }

    /// A run with an explicit character to glyph map.
    ///
    /// Each glyph's first character is the lowest character mapped to it. A glyph no character
    /// maps to takes the first character of the glyph before it.
    pub fn with_char_map(glyphs: Vec<u16>, char_map: Vec<usize>) -> Result<GlyphRun, ShapingError> {
        let len = glyphs.len();
        let mut first_chars = vec![usize::MAX; len];
        for (char_index, &glyph_index) in char_map.iter().enumerate() {
            match first_chars.get_mut(glyph_index) {
                Some(first_char) => *first_char = (*first_char).min(char_index),
                None => {
                    return Err(ShapingError::BadCharMap {
                        char_index,
                        glyph_index,
                    })
                }
            }
        }
        let mut previous = 0;
        for first_char in first_chars.iter_mut() {
            if *first_char == usize::MAX {
                *first_char = previous;
            }
            previous = *first_char;
        }
        Ok(GlyphRun {
            glyphs,
            flags: vec![GlyphFlags::UNASSIGNED; len],
            first_chars,
            ligature_counts: vec![1; len],
            char_map,
        })
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.char_map.len()
    }

    pub fn glyphs(&self) -> &[u16] {
        &self.glyphs
    }

    pub fn glyph(&self, index: usize) -> u16 {
        self.glyphs[index]
    }

    pub fn set_glyph(&mut self, index: usize, glyph: u16) {
        self.glyphs[index] = glyph;
    }

    pub fn flags(&self, index: usize) -> GlyphFlags {
        self.flags[index]
    }

    pub fn set_flags(&mut self, index: usize, flags: GlyphFlags) {
        self.flags[index] = flags;
    }

    pub(crate) fn insert_flags(&mut self, index: usize, flags: GlyphFlags) {
        self.flags[index] |= flags;
    }

    /// Index of the first source character of the glyph.
    pub fn first_char(&self, index: usize) -> usize {
        self.first_chars[index]
    }

    pub fn set_first_char(&mut self, index: usize, first_char: usize) {
        self.first_chars[index] = first_char;
    }

    /// Number of ligature components the glyph was formed from.
    pub fn ligature_count(&self, index: usize) -> u16 {
        self.ligature_counts[index]
    }

    pub fn set_ligature_count(&mut self, index: usize, count: u16) {
        self.ligature_counts[index] = count;
    }

    pub fn char_map(&self) -> &[usize] {
        &self.char_map
    }

    pub(crate) fn char_map_mut(&mut self) -> &mut [usize] {
        &mut self.char_map
    }

    /// Insert `count` copies of the glyph at `index` directly after it.
    pub fn insert_copies(&mut self, index: usize, count: usize) {
        let at = index + 1;
        let glyph = self.glyphs[index];
        let flags = self.flags[index];
        let first_char = self.first_chars[index];
        let ligature_count = self.ligature_counts[index];
        self.glyphs
            .splice(at..at, std::iter::repeat(glyph).take(count));
        self.flags
            .splice(at..at, std::iter::repeat(flags).take(count));
        self.first_chars
            .splice(at..at, std::iter::repeat(first_char).take(count));
        self.ligature_counts
            .splice(at..at, std::iter::repeat(ligature_count).take(count));
    }

    /// Remove `count` glyphs starting at `index`.
    pub fn remove(&mut self, index: usize, count: usize) {
        let range = index..index + count;
        self.glyphs.drain(range.clone());
        self.flags.drain(range.clone());
        self.first_chars.drain(range.clone());
        self.ligature_counts.drain(range);
    }

    /// Recompute the type bits of glyphs `first..after_last` from GDEF.
    ///
    /// Only unresolved glyphs are updated unless `do_all` is set. The state bits are kept.
    pub fn update_glyph_flags(
        &mut self,
        opt_gdef_table: Option<&GDEFTable<'_>>,
        first: usize,
        after_last: usize,
        do_all: bool,
    ) -> Result<(), ParseError> {
        let after_last = after_last.min(self.len());
        for index in first..after_last {
            let flags = self.flags[index];
            if do_all || flags.is_unresolved() {
                let glyph_type = gdef::glyph_type(opt_gdef_table, self.glyphs[index])?;
                self.flags[index] = flags.with_glyph_type(glyph_type);
            }
        }
        Ok(())
    }
}
