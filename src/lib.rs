#![warn(rust_2018_idioms)]

//! OpenType Layout for shaping text.
//!
//! Applies the lookups of a font's `GSUB` and `GPOS` tables to a run of glyph ids, guided by
//! the `GDEF` table. Start with `engine::substitute_glyphs` and `engine::position_glyphs`.

/// Reading of binary data.
pub mod binary;
/// Which writing systems of a font need full layout for a set of glyphs.
pub mod complexity;
pub mod context;
pub mod engine;
pub mod error;
pub mod font;
pub mod gdef;
pub mod glyph_position;
pub mod glyph_run;
pub mod gpos;
pub mod gsub;
pub mod layout;
pub mod size;
pub mod tables;
pub mod tag;
pub mod workspace;
