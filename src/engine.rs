//! The layout driver: applies the lookups enabled by a set of features to a glyph run.
//!
//! For each lookup in lookup list order the driver finds the ranges of the run that the
//! caller's features enable it for, and walks each range applying the lookup at every glyph.
//! Substitutions may grow or shrink the run as they go, so the end of the range is kept in
//! step with the run length after every successful application.

use log::trace;

use crate::binary::read::FontTable;
use crate::context::{self, next_glyph_in_lookup, Direction};
use crate::error::{ParseError, ShapingError};
use crate::font::{LayoutFont, LayoutMetrics};
use crate::gdef::GDEFTable;
use crate::glyph_position::LayoutOffset;
use crate::glyph_run::GlyphRun;
use crate::gpos;
use crate::gsub;
use crate::layout::{
    LangSys, LayoutTable, LayoutTableKind, Lookup, LookupList, PosLookupType, SubstLookupType,
    SubtableType,
};
use crate::tag;
use crate::workspace::Workspace;

/// Maximum depth of contextual lookups invoking other lookups.
pub const MAX_CONTEXT_NESTING_LEVEL: usize = 16;

/// A feature requested by the caller over a range of characters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    pub tag: u32,
    /// Index of the first character the feature applies to.
    pub start: usize,
    /// Number of characters the feature applies to.
    pub length: usize,
    /// Zero disables the feature. Alternate substitution uses it as a 1-based index.
    pub parameter: u32,
}

impl Feature {
    pub fn new(tag: u32, start: usize, length: usize, parameter: u32) -> Feature {
        Feature {
            tag,
            start,
            length,
            parameter,
        }
    }

    /// The feature enabled over every character.
    pub fn everywhere(tag: u32) -> Feature {
        Feature::new(tag, 0, usize::MAX, 1)
    }

    fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }
}

/// Outcome of trying a lookup or subtable at a glyph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LookupResult {
    pub matched: bool,
    /// Where processing continues. Always set, even without a match.
    pub next_glyph: usize,
}

impl LookupResult {
    pub fn no_match(glyph: usize) -> LookupResult {
        LookupResult {
            matched: false,
            next_glyph: glyph + 1,
        }
    }

    pub fn matched(next_glyph: usize) -> LookupResult {
        LookupResult {
            matched: true,
            next_glyph,
        }
    }
}

/// Everything a subtable handler reads and writes while a layout call is in progress.
pub struct LookupContext<'a, 'r> {
    pub font: &'a dyn LayoutFont,
    pub table: LayoutTable<'a>,
    pub lookup_list: LookupList<'a>,
    pub gdef: Option<GDEFTable<'a>>,
    pub metrics: LayoutMetrics,
    pub run: &'r mut GlyphRun,
    /// Advance of each glyph. Empty when substituting.
    pub advances: &'r mut [i32],
    /// Offset of each glyph. Empty when substituting.
    pub offsets: &'r mut [LayoutOffset],
}

/// A contiguous range of glyphs a lookup is enabled for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct EnabledRange {
    first_glyph: usize,
    after_last_glyph: usize,
    parameter: u32,
    next_char: usize,
}

/// Apply the `GSUB` features of `script_tag`/`opt_lang_tag` to the glyph run.
///
/// The script falls back to `DFLT` and the language to the script's default language system.
/// A font without a `GSUB` table, or without a matching script or language system, leaves
/// the run unchanged.
pub fn substitute_glyphs(
    font: &dyn LayoutFont,
    script_tag: u32,
    opt_lang_tag: Option<u32>,
    features: &[Feature],
    run: &mut GlyphRun,
    workspace: Option<&mut Workspace>,
) -> Result<(), ShapingError> {
    let metrics = LayoutMetrics::unscaled(crate::font::TextFlowDirection::LeftToRight);
    layout_with_table(
        font,
        tag::GSUB,
        script_tag,
        opt_lang_tag,
        metrics,
        features,
        run,
        &mut [],
        &mut [],
        workspace,
    )
}

/// Apply the `GPOS` features of `script_tag`/`opt_lang_tag`, adjusting `advances` and
/// `offsets`.
///
/// Script and language fall back as for `substitute_glyphs`.
pub fn position_glyphs(
    font: &dyn LayoutFont,
    script_tag: u32,
    opt_lang_tag: Option<u32>,
    metrics: LayoutMetrics,
    features: &[Feature],
    run: &mut GlyphRun,
    advances: &mut [i32],
    offsets: &mut [LayoutOffset],
    workspace: Option<&mut Workspace>,
) -> Result<(), ShapingError> {
    layout_with_table(
        font,
        tag::GPOS,
        script_tag,
        opt_lang_tag,
        metrics,
        features,
        run,
        advances,
        offsets,
        workspace,
    )
}

fn layout_with_table(
    font: &dyn LayoutFont,
    table_tag: u32,
    script_tag: u32,
    opt_lang_tag: Option<u32>,
    metrics: LayoutMetrics,
    features: &[Feature],
    run: &mut GlyphRun,
    advances: &mut [i32],
    offsets: &mut [LayoutOffset],
    workspace: Option<&mut Workspace>,
) -> Result<(), ShapingError> {
    let kind = LayoutTableKind::from_tag(table_tag)?;
    let data = match font.table_data(table_tag)? {
        Some(data) => data,
        None => return Ok(()),
    };
    let table = LayoutTable::new(FontTable::new(&data), kind)?;
    let script = match table.find_script_or_default(script_tag)? {
        Some(script) => script,
        None => return Ok(()),
    };
    let langsys = match script.find_langsys_or_default(opt_lang_tag)? {
        Some(langsys) => langsys,
        None => return Ok(()),
    };
    apply_features(
        font, &table, metrics, &langsys, features, run, advances, offsets, workspace,
    )
}

/// Apply every lookup that `features` (or the required feature of `langsys`) enables.
///
/// `advances` and `offsets` must have one entry per glyph when `table` is a `GPOS` table and
/// are ignored for `GSUB`. A `Workspace` may be passed in to reuse its storage across calls.
pub fn apply_features(
    font: &dyn LayoutFont,
    table: &LayoutTable<'_>,
    metrics: LayoutMetrics,
    langsys: &LangSys<'_>,
    features: &[Feature],
    run: &mut GlyphRun,
    advances: &mut [i32],
    offsets: &mut [LayoutOffset],
    workspace: Option<&mut Workspace>,
) -> Result<(), ShapingError> {
    if table.kind() == LayoutTableKind::Gpos
        && (advances.len() != run.len() || offsets.len() != run.len())
    {
        return Err(ShapingError::PositionsLength {
            glyphs: run.len(),
            advances: advances.len(),
            offsets: offsets.len(),
        });
    }
    for (char_index, &glyph_index) in run.char_map().iter().enumerate() {
        if glyph_index >= run.len() {
            return Err(ShapingError::BadCharMap {
                char_index,
                glyph_index,
            });
        }
    }

    let lookup_list = match table.lookup_list()? {
        Some(lookup_list) => lookup_list,
        None => return Ok(()),
    };
    let mut local_workspace;
    let workspace = match workspace {
        Some(workspace) => workspace,
        None => {
            local_workspace = Workspace::new();
            &mut local_workspace
        }
    };
    compile_feature_set(table, langsys, features, workspace)?;

    let gdef_data = font.table_data(tag::GDEF)?;
    let gdef = match &gdef_data {
        Some(data) => Some(GDEFTable::new(FontTable::new(data))?),
        None => None,
    };
    run.update_glyph_flags(gdef.as_ref(), 0, run.len(), true)?;

    let mut ctx = LookupContext {
        font,
        table: *table,
        lookup_list,
        gdef,
        metrics,
        run,
        advances,
        offsets,
    };

    for lookup_index in 0..workspace.lookup_count() {
        if !workspace.is_lookup_enabled(lookup_index) {
            continue;
        }
        let lookup = lookup_list.lookup(lookup_index)?;
        let reversal = lookup.is_reversal()?;
        trace!(
            "lookup {} type {} flags {:#06x}",
            lookup_index,
            lookup.lookup_type(),
            lookup.lookup_flag().0
        );

        let mut char_start = 0;
        while let Some(range) =
            next_enabled_glyph_range(workspace, features, lookup_index, ctx.run, char_start)
        {
            trace!(
                "lookup {} over glyphs {}..{} parameter {}",
                lookup_index,
                range.first_glyph,
                range.after_last_glyph,
                range.parameter
            );
            if reversal {
                apply_reversal_range(&mut ctx, &lookup, range)?;
            } else {
                apply_range(&mut ctx, &lookup, range)?;
            }
            char_start = range.next_char;
        }
    }

    Ok(())
}

fn apply_range(
    ctx: &mut LookupContext<'_, '_>,
    lookup: &Lookup<'_>,
    range: EnabledRange,
) -> Result<(), ParseError> {
    let mut first = range.first_glyph;
    let mut after_last = range.after_last_glyph;
    while first < after_last {
        let glyphs_after = ctx.run.len() - after_last;
        let result = apply_lookup(ctx, lookup, range.parameter, first, after_last, 0)?;
        if result.matched {
            after_last = ctx.run.len() - glyphs_after;
            ctx.run
                .update_glyph_flags(ctx.gdef.as_ref(), first, result.next_glyph, false)?;
        }
        first = result.next_glyph;
    }
    Ok(())
}

fn apply_reversal_range(
    ctx: &mut LookupContext<'_, '_>,
    lookup: &Lookup<'_>,
    range: EnabledRange,
) -> Result<(), ParseError> {
    let first = range.first_glyph;
    let mut after_last = range.after_last_glyph;
    while after_last > first {
        let result = apply_lookup(ctx, lookup, range.parameter, first, after_last, 0)?;
        if result.matched {
            ctx.run
                .update_glyph_flags(ctx.gdef.as_ref(), result.next_glyph, after_last, false)?;
        }
        after_last = result.next_glyph;
    }
    Ok(())
}

/// Build the lookup enable bits for the required feature of `langsys` and the enabled
/// features in `features`.
///
/// Features are matched to the language system's features by tag. A feature that refers to a
/// lookup beyond the end of the lookup list is a `ParseError::BadIndex`.
pub fn compile_feature_set(
    table: &LayoutTable<'_>,
    langsys: &LangSys<'_>,
    features: &[Feature],
    workspace: &mut Workspace,
) -> Result<(), ParseError> {
    let lookup_count = table.lookup_count()?;
    workspace.reset(lookup_count, features.len());
    let feature_list = match table.feature_list()? {
        Some(feature_list) => feature_list,
        None => return Ok(()),
    };
    let check_lookup = |lookup_index: u16| {
        let lookup_index = usize::from(lookup_index);
        if lookup_index < lookup_count {
            Ok(lookup_index)
        } else {
            Err(ParseError::BadIndex)
        }
    };

    if let Some(required_index) = langsys.required_feature_index()? {
        let feature_table = feature_list.feature(usize::from(required_index))?;
        for lookup_index in feature_table.lookup_indices()? {
            workspace.set_required(check_lookup(lookup_index)?);
        }
    }

    let langsys_feature_count = usize::from(langsys.feature_count()?);
    for (feature_index, feature) in features.iter().enumerate() {
        if feature.parameter == 0 {
            continue;
        }
        for index in 0..langsys_feature_count {
            let langsys_feature = usize::from(langsys.feature_index(index)?);
            if feature_list.feature_tag(langsys_feature)? != feature.tag {
                continue;
            }
            let feature_table = feature_list.feature(langsys_feature)?;
            for lookup_index in feature_table.lookup_indices()? {
                workspace.set_feature(check_lookup(lookup_index)?, feature_index);
            }
        }
    }
    Ok(())
}

/// Find the next range of glyphs, starting from character `char_start`, that the lookup is
/// enabled for.
///
/// A lookup enabled by the required feature covers the whole run once with parameter 1.
/// Otherwise the range starts at the first character covered by an enabled feature and
/// stops where any enabled feature starts or ends, so each range has a single parameter.
fn next_enabled_glyph_range(
    workspace: &Workspace,
    features: &[Feature],
    lookup_index: usize,
    run: &GlyphRun,
    char_start: usize,
) -> Option<EnabledRange> {
    let char_count = run.char_count();
    if workspace.is_required(lookup_index) {
        return if char_start == 0 && !run.is_empty() {
            Some(EnabledRange {
                first_glyph: 0,
                after_last_glyph: run.len(),
                parameter: 1,
                next_char: char_count.max(1),
            })
        } else {
            None
        };
    }

    let mut position = char_start;
    while position < char_count {
        let mut opt_parameter = None;
        let mut end = char_count;
        let mut next_start = char_count;
        for (feature_index, feature) in features.iter().enumerate() {
            if feature.parameter == 0 || !workspace.is_feature_enabled(lookup_index, feature_index)
            {
                continue;
            }
            if feature.start <= position && position < feature.end() {
                if opt_parameter.is_none() {
                    opt_parameter = Some(feature.parameter);
                }
                end = end.min(feature.end());
            } else if feature.start > position {
                end = end.min(feature.start);
                next_start = next_start.min(feature.start);
            }
        }

        match opt_parameter {
            Some(parameter) => {
                let first_glyph = run.char_map()[position];
                let after_last_glyph = if end >= char_count {
                    run.len()
                } else {
                    run.char_map()[end]
                };
                return Some(EnabledRange {
                    first_glyph,
                    after_last_glyph: after_last_glyph.max(first_glyph),
                    parameter,
                    next_char: end,
                });
            }
            None => position = next_start,
        }
    }
    None
}

/// Apply `lookup` at the first glyph of `first..after_last` it does not skip.
///
/// Subtables are tried in order until one matches. Reverse chaining lookups instead work on
/// the last glyph of the range and report the glyph they worked on as `next_glyph`, which is
/// the end of the range for the next step backwards.
pub fn apply_lookup(
    ctx: &mut LookupContext<'_, '_>,
    lookup: &Lookup<'_>,
    parameter: u32,
    first: usize,
    after_last: usize,
    nesting_level: usize,
) -> Result<LookupResult, ParseError> {
    let lookup_flag = lookup.lookup_flag();

    if lookup.is_reversal()? {
        let opt_target = match after_last.checked_sub(1) {
            Some(last) if last >= first => next_glyph_in_lookup(
                ctx.gdef.as_ref(),
                ctx.run,
                last,
                lookup_flag,
                Direction::Backward,
            )?,
            _ => None,
        };
        let target = match opt_target {
            Some(target) if target >= first => target,
            _ => {
                return Ok(LookupResult {
                    matched: false,
                    next_glyph: first,
                })
            }
        };
        for index in 0..usize::from(lookup.subtable_count()) {
            if let Some(subtable) = lookup.subtable(index)? {
                if subtable.subtable_type
                    == SubtableType::Subst(SubstLookupType::ReverseChainSingleSubst)
                {
                    let result = gsub::apply_reverse_chain_single_subst(
                        ctx,
                        subtable.offset,
                        lookup_flag,
                        target,
                    )?;
                    if result.matched {
                        return Ok(result);
                    }
                }
            }
        }
        return Ok(LookupResult {
            matched: false,
            next_glyph: target,
        });
    }

    let first = match next_glyph_in_lookup(
        ctx.gdef.as_ref(),
        ctx.run,
        first,
        lookup_flag,
        Direction::Forward,
    )? {
        Some(index) if index < after_last => index,
        _ => {
            return Ok(LookupResult {
                matched: false,
                next_glyph: after_last,
            })
        }
    };

    for index in 0..usize::from(lookup.subtable_count()) {
        let subtable = match lookup.subtable(index)? {
            Some(subtable) => subtable,
            None => continue,
        };
        let offset = subtable.offset;
        let result = match subtable.subtable_type {
            SubtableType::Subst(subst_type) => match subst_type {
                SubstLookupType::SingleSubst => gsub::apply_single_subst(ctx, offset, first)?,
                SubstLookupType::MultipleSubst => gsub::apply_multiple_subst(ctx, offset, first)?,
                SubstLookupType::AlternateSubst => {
                    gsub::apply_alternate_subst(ctx, offset, parameter, first)?
                }
                SubstLookupType::LigatureSubst => {
                    gsub::apply_ligature_subst(ctx, offset, lookup_flag, first, after_last)?
                }
                SubstLookupType::ContextSubst => context::apply_context(
                    ctx,
                    offset,
                    lookup_flag,
                    parameter,
                    first,
                    after_last,
                    nesting_level,
                )?,
                SubstLookupType::ChainContextSubst => context::apply_chain_context(
                    ctx,
                    offset,
                    lookup_flag,
                    parameter,
                    first,
                    after_last,
                    nesting_level,
                )?,
                // Only applied from the end of a range, above.
                SubstLookupType::ReverseChainSingleSubst => LookupResult::no_match(first),
            },
            SubtableType::Pos(pos_type) => match pos_type {
                PosLookupType::SinglePos => gpos::apply_single_pos(ctx, offset, first)?,
                PosLookupType::PairPos => {
                    gpos::apply_pair_pos(ctx, offset, lookup_flag, first, after_last)?
                }
                PosLookupType::CursivePos => {
                    gpos::apply_cursive_pos(ctx, offset, lookup_flag, first)?
                }
                PosLookupType::MarkBasePos => {
                    gpos::apply_mark_base_pos(ctx, offset, lookup_flag, first)?
                }
                PosLookupType::MarkLigPos => {
                    gpos::apply_mark_lig_pos(ctx, offset, lookup_flag, first)?
                }
                PosLookupType::MarkMarkPos => {
                    gpos::apply_mark_mark_pos(ctx, offset, lookup_flag, first)?
                }
                PosLookupType::ContextPos => context::apply_context(
                    ctx,
                    offset,
                    lookup_flag,
                    parameter,
                    first,
                    after_last,
                    nesting_level,
                )?,
                PosLookupType::ChainContextPos => context::apply_chain_context(
                    ctx,
                    offset,
                    lookup_flag,
                    parameter,
                    first,
                    after_last,
                    nesting_level,
                )?,
            },
        };
        if result.matched {
            return Ok(result);
        }
    }

    Ok(LookupResult::no_match(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::FontTableProvider;
    use crate::tests::writer::{self, TtfType::*};
    use crate::tests::TestFont;

    fn workspace_for(features: &[Feature], lookup_count: usize) -> Workspace {
        let mut workspace = Workspace::new();
        workspace.reset(lookup_count, features.len());
        workspace
    }

    #[test]
    fn test_enabled_ranges_split_at_feature_boundaries() {
        let features = [
            Feature::new(tag::LIGA, 0, 4, 1),
            Feature::new(tag::SALT, 2, 4, 3),
            Feature::new(tag::SMCP, 7, 1, 1),
        ];
        let mut workspace = workspace_for(&features, 1);
        for index in 0..features.len() {
            workspace.set_feature(0, index);
        }
        let run = GlyphRun::new((0..10).collect());

        let mut ranges = Vec::new();
        let mut char_start = 0;
        while let Some(range) = next_enabled_glyph_range(&workspace, &features, 0, &run, char_start)
        {
            ranges.push((range.first_glyph, range.after_last_glyph, range.parameter));
            char_start = range.next_char;
        }
        assert_eq!(ranges, vec![(0, 2, 1), (2, 4, 1), (4, 6, 3), (7, 8, 1)]);
    }

    #[test]
    fn test_enabled_ranges_skip_disabled_features() {
        let features = [
            Feature::new(tag::LIGA, 0, 3, 0),
            Feature::new(tag::LIGA, 5, 10, 1),
        ];
        let mut workspace = workspace_for(&features, 2);
        workspace.set_feature(0, 1);
        let run = GlyphRun::with_char_map(vec![1, 2, 3, 4], vec![0, 0, 1, 1, 2, 2, 3, 3]).unwrap();

        let range = next_enabled_glyph_range(&workspace, &features, 0, &run, 0).unwrap();
        assert_eq!(range.first_glyph, 2);
        // Feature runs past the last character
        assert_eq!(range.after_last_glyph, 4);
        assert_eq!(range.next_char, 8);
        assert_eq!(
            next_enabled_glyph_range(&workspace, &features, 0, &run, 8),
            None
        );
        assert_eq!(
            next_enabled_glyph_range(&workspace, &features, 1, &run, 0),
            None
        );
    }

    #[test]
    fn test_required_feature_range() {
        let mut workspace = workspace_for(&[], 1);
        workspace.set_required(0);
        let run = GlyphRun::new(vec![1, 2, 3]);

        let range = next_enabled_glyph_range(&workspace, &[], 0, &run, 0).unwrap();
        assert_eq!((range.first_glyph, range.after_last_glyph, range.parameter), (0, 3, 1));
        assert_eq!(
            next_enabled_glyph_range(&workspace, &[], 0, &run, range.next_char),
            None
        );
    }

    #[test]
    fn test_compile_feature_set() {
        let single = writer::convert(&[UInt16(1), UInt16(6), Int16(1), UInt16(1), UInt16(1), UInt16(5)]);
        let data = writer::layout_table(
            tag::LATN,
            Some(2),
            &[
                (tag::LIGA, vec![1]),
                (tag::SMCP, vec![0, 1]),
                (tag::CCMP, vec![2]),
            ],
            &[
                writer::lookup(1, 0, &[single.clone()]),
                writer::lookup(1, 0, &[single.clone()]),
                writer::lookup(1, 0, &[single]),
            ],
        );
        let table = LayoutTable::new(FontTable::new(&data), LayoutTableKind::Gsub).unwrap();
        let langsys = table
            .find_script(tag::LATN)
            .unwrap()
            .unwrap()
            .default_langsys()
            .unwrap()
            .unwrap();
        let features = [
            Feature::everywhere(tag::SMCP),
            Feature::new(tag::LIGA, 0, 1, 0),
            Feature::everywhere(tag::KERN),
        ];
        let mut workspace = Workspace::new();
        compile_feature_set(&table, &langsys, &features, &mut workspace).unwrap();

        assert_eq!(workspace.lookup_count(), 3);
        assert!(workspace.is_feature_enabled(0, 0));
        assert!(workspace.is_feature_enabled(1, 0));
        assert!(!workspace.is_feature_enabled(1, 1));
        assert!(workspace.is_required(2));
        assert!(workspace.is_lookup_enabled(2));
        assert!(!workspace.is_required(0));
    }

    #[test]
    fn test_compile_feature_set_bad_lookup_index() {
        let data = writer::layout_table(tag::LATN, None, &[(tag::LIGA, vec![3])], &[]);
        let table = LayoutTable::new(FontTable::new(&data), LayoutTableKind::Gsub).unwrap();
        let langsys = table
            .find_script(tag::LATN)
            .unwrap()
            .unwrap()
            .default_langsys()
            .unwrap()
            .unwrap();
        let mut workspace = Workspace::new();

        assert_eq!(
            compile_feature_set(
                &table,
                &langsys,
                &[Feature::everywhere(tag::LIGA)],
                &mut workspace
            ),
            Err(ParseError::BadIndex)
        );
    }

    #[test]
    fn test_single_subst_end_to_end() {
        // Single substitution format 1, coverage {5}, delta +1
        let mut w = writer::Writer::new();
        w.write(UInt16(1));
        let coverage = w.placeholder();
        w.write(Int16(1));
        w.append_at(coverage, 0, &writer::coverage_format1(&[5]));
        let gsub = writer::layout_table(
            tag::DFLT,
            None,
            &[(tag::CCMP, vec![0])],
            &[writer::lookup(1, 0, &[w.into_inner()])],
        );
        let font = TestFont::new(vec![(tag::GSUB, gsub)]);
        let data = font.table_data(tag::GSUB).unwrap().unwrap();
        let table = LayoutTable::new(FontTable::new(&data), LayoutTableKind::Gsub).unwrap();
        let lookup_list = table.lookup_list().unwrap().unwrap();
        let lookup = lookup_list.lookup(0).unwrap();
        let mut run = GlyphRun::new(vec![5]);

        let mut ctx = LookupContext {
            font: &font,
            table,
            lookup_list,
            gdef: None,
            metrics: LayoutMetrics::unscaled(crate::font::TextFlowDirection::LeftToRight),
            run: &mut run,
            advances: &mut [],
            offsets: &mut [],
        };
        let result = apply_lookup(&mut ctx, &lookup, 1, 0, 1, 0).unwrap();
        assert_eq!(result, LookupResult::matched(1));
        assert_eq!(run.glyphs(), &[6]);
        assert_eq!(
            run.flags(0),
            crate::glyph_run::GlyphFlags::UNRESOLVED | crate::glyph_run::GlyphFlags::SUBSTITUTED
        );

        // Through the driver the glyph is reclassified; there is no GDEF table
        let mut run = GlyphRun::new(vec![5, 7, 5]);
        substitute_glyphs(
            &font,
            tag::LATN,
            None,
            &[Feature::everywhere(tag::CCMP)],
            &mut run,
            None,
        )
        .unwrap();
        assert_eq!(run.glyphs(), &[6, 7, 6]);
        assert_eq!(run.flags(0), crate::glyph_run::GlyphFlags::SUBSTITUTED);
        assert_eq!(run.flags(1), crate::glyph_run::GlyphFlags::UNASSIGNED);
    }

    #[test]
    fn test_positions_length_checked() {
        let gpos = writer::layout_table(tag::DFLT, None, &[], &[]);
        let font = TestFont::new(vec![(tag::GPOS, gpos)]);
        let mut run = GlyphRun::new(vec![1, 2]);
        let mut advances = vec![0; 1];
        let mut offsets = vec![LayoutOffset::default(); 2];

        assert_eq!(
            position_glyphs(
                &font,
                tag::LATN,
                None,
                LayoutMetrics::unscaled(crate::font::TextFlowDirection::LeftToRight),
                &[],
                &mut run,
                &mut advances,
                &mut offsets,
                None,
            ),
            Err(ShapingError::PositionsLength {
                glyphs: 2,
                advances: 1,
                offsets: 2
            })
        );
    }

    #[test]
    fn test_missing_table_is_a_no_op() {
        let font = TestFont::new(Vec::new());
        let mut run = GlyphRun::new(vec![1, 2]);
        substitute_glyphs(
            &font,
            tag::LATN,
            Some(tag::LATN),
            &[Feature::everywhere(tag::LIGA)],
            &mut run,
            None,
        )
        .unwrap();
        assert_eq!(run, GlyphRun::new(vec![1, 2]));
    }
}
