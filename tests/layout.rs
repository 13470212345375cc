mod common;

use otlayout::binary::read::ReadScope;
use otlayout::engine::{self, Feature, MAX_CONTEXT_NESTING_LEVEL};
use otlayout::error::{ParseError, ShapingError};
use otlayout::font::{LayoutMetrics, TextFlowDirection};
use otlayout::glyph_position::LayoutOffset;
use otlayout::glyph_run::{GlyphFlags, GlyphRun};
use otlayout::tables::OpenTypeFont;
use otlayout::tag;
use otlayout::workspace::Workspace;

use common::writer::{self, TtfType::*, Writer};

fn single_subst_range(start: u16, end: u16, delta: i16) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(UInt16(1));
    let coverage = w.placeholder();
    w.write(Int16(delta));
    w.append_at(coverage, 0, &writer::coverage_format2(&[(start, end, 0)]));
    w.into_inner()
}

/// Context format 3 matching one glyph in `start..=end`, with `(sequence, lookup)` records.
fn context_format3(start: u16, end: u16, records: &[(u16, u16)]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_all(&[UInt16(3), UInt16(1), UInt16(records.len() as u16)]);
    let coverage = w.placeholder();
    for (sequence_index, lookup_index) in records {
        w.write_all(&[UInt16(*sequence_index), UInt16(*lookup_index)]);
    }
    w.append_at(coverage, 0, &writer::coverage_format2(&[(start, end, 0)]));
    w.into_inner()
}

/// Ligature substitution with a single ligature from `components`.
fn ligature_subst(components: &[u16], ligature_glyph: u16) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(UInt16(1));
    let coverage = w.placeholder();
    w.write(UInt16(1));
    let ligature_set = w.placeholder();
    w.append_at(coverage, 0, &writer::coverage_format1(&components[..1]));
    w.patch_offset(ligature_set, 0);
    let set_start = w.offset();
    w.write(UInt16(1));
    let ligature = w.placeholder();
    w.patch_offset(ligature, set_start);
    w.write_all(&[UInt16(ligature_glyph), UInt16(components.len() as u16)]);
    for component in &components[1..] {
        w.write(UInt16(*component));
    }
    w.into_inner()
}

fn multiple_subst(glyph: u16, sequence: &[u16]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(UInt16(1));
    let coverage = w.placeholder();
    w.write(UInt16(1));
    let sequence_offset = w.placeholder();
    w.append_at(coverage, 0, &writer::coverage_format1(&[glyph]));
    w.patch_offset(sequence_offset, 0);
    w.write(UInt16(sequence.len() as u16));
    for glyph in sequence {
        w.write(UInt16(*glyph));
    }
    w.into_inner()
}

fn alternate_subst(glyph: u16, alternates: &[u16]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(UInt16(1));
    let coverage = w.placeholder();
    w.write(UInt16(1));
    let alternate_set = w.placeholder();
    w.append_at(coverage, 0, &writer::coverage_format1(&[glyph]));
    w.patch_offset(alternate_set, 0);
    w.write(UInt16(alternates.len() as u16));
    for alternate in alternates {
        w.write(UInt16(*alternate));
    }
    w.into_inner()
}

/// Pair adjustment format 1 changing the advance of `first` when followed by `second`.
fn kern_pair(first: u16, second: u16, x_advance: i16) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(UInt16(1));
    let coverage = w.placeholder();
    // value format 1 is X_ADVANCE, value format 2 is empty
    w.write_all(&[UInt16(0x0004), UInt16(0), UInt16(1)]);
    let pair_set = w.placeholder();
    w.append_at(coverage, 0, &writer::coverage_format1(&[first]));
    w.patch_offset(pair_set, 0);
    w.write_all(&[UInt16(1), UInt16(second), Int16(x_advance)]);
    w.into_inner()
}

fn substitute(
    tables: &[(u32, Vec<u8>)],
    features: &[Feature],
    run: &mut GlyphRun,
) -> Result<(), ShapingError> {
    let data = writer::sfnt(tables);
    let font_file = OpenTypeFont::read(ReadScope::new(&data))?;
    let provider = font_file.table_provider(0)?;
    engine::substitute_glyphs(&provider, tag::LATN, None, features, run, None)
}

#[test]
fn test_context_nesting_is_capped() {
    // Lookup 1 adds one to the glyph through lookup 0, then applies itself again.
    let gsub = writer::layout_table(
        tag::LATN,
        None,
        &[(tag::CALT, vec![1])],
        &[
            writer::lookup(1, 0, &[single_subst_range(1, 100, 1)]),
            writer::lookup(5, 0, &[context_format3(1, 100, &[(0, 0), (0, 1)])]),
        ],
    );
    let mut run = GlyphRun::new(vec![1]);
    substitute(
        &[(tag::GSUB, gsub)],
        &[Feature::everywhere(tag::CALT)],
        &mut run,
    )
    .unwrap();

    assert_eq!(run.glyphs(), &[1 + MAX_CONTEXT_NESTING_LEVEL as u16]);
}

#[test]
fn test_ligature_updates_char_map() {
    let gsub = writer::layout_table(
        tag::LATN,
        None,
        &[(tag::LIGA, vec![0])],
        &[writer::lookup(4, 0, &[ligature_subst(&[10, 11], 100)])],
    );
    let mut run = GlyphRun::new(vec![10, 11, 12, 10, 11]);
    substitute(
        &[(tag::GSUB, gsub)],
        &[Feature::everywhere(tag::LIGA)],
        &mut run,
    )
    .unwrap();

    assert_eq!(run.glyphs(), &[100, 12, 100]);
    assert_eq!(run.char_map(), &[0, 0, 1, 2, 2]);
    assert_eq!(run.ligature_count(0), 2);
    assert_eq!(run.first_char(2), 3);
    assert_eq!(run.flags(0), GlyphFlags::SUBSTITUTED);
    assert_eq!(run.flags(1), GlyphFlags::UNASSIGNED);
}

#[test]
fn test_multiple_subst_updates_char_map() {
    let gsub = writer::layout_table(
        tag::LATN,
        None,
        &[(tag::CCMP, vec![0])],
        &[writer::lookup(2, 0, &[multiple_subst(5, &[6, 7])])],
    );
    let mut run = GlyphRun::new(vec![5, 8]);
    substitute(
        &[(tag::GSUB, gsub)],
        &[Feature::everywhere(tag::CCMP)],
        &mut run,
    )
    .unwrap();

    assert_eq!(run.glyphs(), &[6, 7, 8]);
    assert_eq!(run.char_map(), &[0, 2]);
    assert_eq!(run.first_char(1), 0);
}

#[test]
fn test_feature_range_and_parameter() {
    let gsub = writer::layout_table(
        tag::LATN,
        None,
        &[(tag::SALT, vec![0])],
        &[writer::lookup(3, 0, &[alternate_subst(20, &[21, 22])])],
    );
    let mut run = GlyphRun::new(vec![20, 20, 20, 20]);
    substitute(
        &[(tag::GSUB, gsub)],
        &[
            Feature::new(tag::SALT, 1, 1, 2),
            Feature::new(tag::SALT, 2, 1, 1),
            // Disabled
            Feature::new(tag::SALT, 3, 1, 0),
        ],
        &mut run,
    )
    .unwrap();

    assert_eq!(run.glyphs(), &[20, 22, 21, 20]);
}

#[test]
fn test_required_feature_applies_without_request() {
    let gsub = writer::layout_table(
        tag::LATN,
        Some(1),
        &[
            (tag::LIGA, vec![0]),
            (tag::RLIG, vec![1]),
        ],
        &[
            writer::lookup(1, 0, &[single_subst_range(1, 1, 1)]),
            writer::lookup(1, 0, &[single_subst_range(3, 3, 1)]),
        ],
    );
    let mut run = GlyphRun::new(vec![1, 3]);
    substitute(&[(tag::GSUB, gsub)], &[], &mut run).unwrap();

    assert_eq!(run.glyphs(), &[1, 4]);
}

#[test]
fn test_workspace_reuse() {
    let gsub = writer::layout_table(
        tag::LATN,
        None,
        &[(tag::LIGA, vec![0]), (tag::CCMP, vec![1])],
        &[
            writer::lookup(4, 0, &[ligature_subst(&[10, 11], 100)]),
            writer::lookup(2, 0, &[multiple_subst(5, &[6, 7])]),
        ],
    );
    let data = writer::sfnt(&[(tag::GSUB, gsub)]);
    let font_file = OpenTypeFont::read(ReadScope::new(&data)).unwrap();
    let provider = font_file.table_provider(0).unwrap();
    let mut workspace = Workspace::new();

    let mut run = GlyphRun::new(vec![10, 11, 5]);
    engine::substitute_glyphs(
        &provider,
        tag::LATN,
        None,
        &[Feature::everywhere(tag::LIGA), Feature::everywhere(tag::CCMP)],
        &mut run,
        Some(&mut workspace),
    )
    .unwrap();
    assert_eq!(run.glyphs(), &[100, 6, 7]);
    let storage_len = workspace.storage_len();

    // Only the second feature this time
    let mut run = GlyphRun::new(vec![10, 11, 5]);
    engine::substitute_glyphs(
        &provider,
        tag::LATN,
        None,
        &[Feature::new(tag::LIGA, 0, 3, 0), Feature::everywhere(tag::CCMP)],
        &mut run,
        Some(&mut workspace),
    )
    .unwrap();
    assert_eq!(run.glyphs(), &[10, 11, 6, 7]);
    assert_eq!(workspace.storage_len(), storage_len);
}

#[test]
fn test_position_kern_pair() {
    let gpos = writer::layout_table(
        tag::LATN,
        None,
        &[(tag::KERN, vec![0])],
        &[writer::lookup(2, 0, &[kern_pair(10, 11, -50)])],
    );
    let data = writer::sfnt(&[(tag::GPOS, gpos)]);
    let font_file = OpenTypeFont::read(ReadScope::new(&data)).unwrap();
    let provider = font_file.table_provider(0).unwrap();

    let mut run = GlyphRun::new(vec![10, 11, 10, 12]);
    let mut advances = vec![500; 4];
    let mut offsets = vec![LayoutOffset::default(); 4];
    engine::position_glyphs(
        &provider,
        tag::LATN,
        None,
        LayoutMetrics::unscaled(TextFlowDirection::LeftToRight),
        &[Feature::everywhere(tag::KERN)],
        &mut run,
        &mut advances,
        &mut offsets,
        None,
    )
    .unwrap();

    assert_eq!(advances, vec![450, 500, 500, 500]);
    assert_eq!(offsets, vec![LayoutOffset::default(); 4]);
    assert!(run.flags(0).contains(GlyphFlags::POSITIONED));
    assert!(!run.flags(2).contains(GlyphFlags::POSITIONED));
}

#[test]
fn test_position_kern_pair_scaled() {
    let gpos = writer::layout_table(
        tag::DFLT,
        None,
        &[(tag::KERN, vec![0])],
        &[writer::lookup(2, 0, &[kern_pair(10, 11, -100)])],
    );
    let data = writer::sfnt(&[(tag::GPOS, gpos)]);
    let font_file = OpenTypeFont::read(ReadScope::new(&data)).unwrap();
    let provider = font_file.table_provider(0).unwrap();

    let mut run = GlyphRun::new(vec![10, 11]);
    let mut advances = vec![8, 8];
    let mut offsets = vec![LayoutOffset::default(); 2];
    engine::position_glyphs(
        &provider,
        tag::ARAB,
        Some(tag::ARAB),
        LayoutMetrics::new(TextFlowDirection::LeftToRight, 1000, 16, 16),
        &[Feature::everywhere(tag::KERN)],
        &mut run,
        &mut advances,
        &mut offsets,
        None,
    )
    .unwrap();

    // -100 units at 16px per 1000 unit em rounds to -2px
    assert_eq!(advances, vec![6, 8]);
}

#[test]
fn test_bad_char_map() {
    let gsub = writer::layout_table(tag::LATN, None, &[], &[]);
    let mut run = GlyphRun::new(vec![1, 2]);
    // Drop the second glyph without touching the character map
    run.remove(1, 1);

    assert_eq!(
        substitute(&[(tag::GSUB, gsub)], &[], &mut run),
        Err(ShapingError::BadCharMap {
            char_index: 1,
            glyph_index: 1
        })
    );
}

#[test]
fn test_truncated_table() {
    let mut gsub = writer::layout_table(
        tag::LATN,
        None,
        &[(tag::LIGA, vec![0])],
        &[writer::lookup(4, 0, &[ligature_subst(&[10, 11], 100)])],
    );
    gsub.truncate(gsub.len() - 2);
    let mut run = GlyphRun::new(vec![10, 11]);

    assert_eq!(
        substitute(
            &[(tag::GSUB, gsub)],
            &[Feature::everywhere(tag::LIGA)],
            &mut run
        ),
        Err(ShapingError::Parse(ParseError::BadEof))
    );
}
