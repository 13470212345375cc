//! Error types

use crate::binary::read::ReadEof;
use crate::tag::DisplayTag;
use std::fmt;

/// Error returned from the layout entry points
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ShapingError {
    /// The font data is malformed. The caller should fall back to unshaped rendering.
    Parse(ParseError),
    /// The glyph advances or offsets supplied for positioning do not match the glyph run.
    PositionsLength {
        glyphs: usize,
        advances: usize,
        offsets: usize,
    },
    /// A character map entry supplied by the caller does not point at a glyph in the run.
    BadCharMap { char_index: usize, glyph_index: usize },
    /// The table tag passed to the driver is neither `GSUB` nor `GPOS`.
    UnsupportedTable(u32),
}

impl From<ParseError> for ShapingError {
    fn from(error: ParseError) -> Self {
        ShapingError::Parse(error)
    }
}

impl fmt::Display for ShapingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapingError::Parse(err) => write!(f, "shaping parse: {}", err),
            ShapingError::PositionsLength {
                glyphs,
                advances,
                offsets,
            } => write!(
                f,
                "{} glyphs but {} advances and {} offsets supplied",
                glyphs, advances, offsets
            ),
            ShapingError::BadCharMap {
                char_index,
                glyph_index,
            } => write!(
                f,
                "character {} maps to glyph {} outside the glyph run",
                char_index, glyph_index
            ),
            ShapingError::UnsupportedTable(tag) => {
                write!(f, "'{}' is not a layout table", DisplayTag(*tag))
            }
        }
    }
}

impl std::error::Error for ShapingError {}

/// Errors that originate when parsing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    BadEof,
    BadValue,
    BadVersion,
    BadOffset,
    BadIndex,
    MissingValue,
}

impl From<ReadEof> for ParseError {
    fn from(_error: ReadEof) -> Self {
        ParseError::BadEof
    }
}

impl From<std::num::TryFromIntError> for ParseError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        ParseError::BadValue
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadEof => write!(f, "end of data reached unexpectedly"),
            ParseError::BadValue => write!(f, "invalid value"),
            ParseError::BadVersion => write!(f, "unexpected data version"),
            ParseError::BadOffset => write!(f, "invalid data offset"),
            ParseError::BadIndex => write!(f, "invalid data index"),
            ParseError::MissingValue => write!(f, "an expected data value was missing"),
        }
    }
}

impl std::error::Error for ParseError {}
