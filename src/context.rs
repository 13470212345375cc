//! Lookup flags, cursor navigation and contextual lookup matching shared by `GSUB` and `GPOS`.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#lookup-table>

use itertools::Itertools;
use log::{debug, warn};
use tinyvec::TinyVec;

use crate::binary::read::FontTable;
use crate::engine::{self, LookupContext, LookupResult, MAX_CONTEXT_NESTING_LEVEL};
use crate::error::ParseError;
use crate::gdef::GDEFTable;
use crate::glyph_run::GlyphRun;
use crate::layout::{ClassDef, Coverage};
use crate::size;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LookupFlag(pub u16);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IgnoreMarks {
    NoIgnoreMarks,
    IgnoreAllMarks,
    IgnoreMarksExcept(u8),
}

/// Which glyphs a lookup skips over.
#[derive(Copy, Clone, Debug)]
pub struct MatchType {
    ignore_bases: bool,
    ignore_ligatures: bool,
    ignore_marks: IgnoreMarks,
}

/// Direction of a cursor step through the glyph run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl LookupFlag {
    pub const RIGHT_TO_LEFT: u16 = 0x0001;
    pub const IGNORE_BASE_GLYPHS: u16 = 0x0002;
    pub const IGNORE_LIGATURES: u16 = 0x0004;
    pub const IGNORE_MARKS: u16 = 0x0008;
    pub const MARK_ATTACHMENT_TYPE_MASK: u16 = 0xFF00;

    pub fn get_rtl(self) -> bool {
        (self.0 & Self::RIGHT_TO_LEFT) != 0
    }

    pub fn get_ignore_bases(self) -> bool {
        (self.0 & Self::IGNORE_BASE_GLYPHS) != 0
    }

    pub fn get_ignore_ligatures(self) -> bool {
        (self.0 & Self::IGNORE_LIGATURES) != 0
    }

    pub fn get_ignore_marks(self) -> IgnoreMarks {
        if (self.0 & Self::IGNORE_MARKS) != 0 {
            IgnoreMarks::IgnoreAllMarks
        } else if self.0 & Self::MARK_ATTACHMENT_TYPE_MASK != 0 {
            IgnoreMarks::IgnoreMarksExcept((self.0 >> 8) as u8)
        } else {
            IgnoreMarks::NoIgnoreMarks
        }
    }

    /// These flags with marks ignored as well.
    pub fn ignoring_marks(self) -> LookupFlag {
        LookupFlag(self.0 | Self::IGNORE_MARKS)
    }
}

impl MatchType {
    pub fn from_lookup_flag(lookup_flag: LookupFlag) -> MatchType {
        MatchType {
            ignore_bases: lookup_flag.get_ignore_bases(),
            ignore_ligatures: lookup_flag.get_ignore_ligatures(),
            ignore_marks: lookup_flag.get_ignore_marks(),
        }
    }

    /// Whether the glyph at `index` takes part in the lookup.
    pub fn match_glyph(
        self,
        opt_gdef_table: Option<&GDEFTable<'_>>,
        run: &GlyphRun,
        index: usize,
    ) -> Result<bool, ParseError> {
        let flags = run.flags(index);
        if flags.is_base() {
            return Ok(!self.ignore_bases);
        }
        if flags.is_ligature() {
            return Ok(!self.ignore_ligatures);
        }
        if flags.is_mark() {
            return match self.ignore_marks {
                IgnoreMarks::NoIgnoreMarks => Ok(true),
                IgnoreMarks::IgnoreAllMarks => Ok(false),
                IgnoreMarks::IgnoreMarksExcept(mark_class) => match opt_gdef_table {
                    Some(gdef) if gdef.has_mark_attach_classdef() => {
                        Ok(gdef.mark_attach_class(run.glyph(index))? == u16::from(mark_class))
                    }
                    _ => Ok(true),
                },
            };
        }
        Ok(true)
    }
}

/// Find the first glyph at or after (`Forward`) or at or before (`Backward`) `start` that the
/// lookup does not skip.
///
/// Returns `None` when the search runs off either end of the run.
pub fn next_glyph_in_lookup(
    opt_gdef_table: Option<&GDEFTable<'_>>,
    run: &GlyphRun,
    start: usize,
    lookup_flag: LookupFlag,
    direction: Direction,
) -> Result<Option<usize>, ParseError> {
    let match_type = MatchType::from_lookup_flag(lookup_flag);
    let mut index = start;
    while index < run.len() {
        if match_type.match_glyph(opt_gdef_table, run, index)? {
            return Ok(Some(index));
        }
        index = match direction {
            Direction::Forward => index + 1,
            Direction::Backward => match index.checked_sub(1) {
                Some(prev) => prev,
                None => return Ok(None),
            },
        };
    }
    Ok(None)
}

/// Step back from the glyph at `index` to the previous glyph the lookup does not skip.
pub fn prev_glyph_in_lookup(
    opt_gdef_table: Option<&GDEFTable<'_>>,
    run: &GlyphRun,
    index: usize,
    lookup_flag: LookupFlag,
) -> Result<Option<usize>, ParseError> {
    match index.checked_sub(1) {
        Some(start) => {
            next_glyph_in_lookup(opt_gdef_table, run, start, lookup_flag, Direction::Backward)
        }
        None => Ok(None),
    }
}

/// How the values of a rule sequence are compared with glyphs.
#[derive(Copy, Clone, Debug)]
pub(crate) enum GlyphTable<'a> {
    /// Glyph ids.
    ById,
    /// Class values of the class definition. A missing class definition puts every glyph in
    /// class 0.
    ByClassDef(Option<ClassDef<'a>>),
    /// Offsets to coverage tables, relative to the given subtable.
    ByCoverage(usize),
}

/// A counted array of 16-bit values in a rule, matched against glyphs.
#[derive(Copy, Clone, Debug)]
pub(crate) struct MatchSequence<'a> {
    table: FontTable<'a>,
    glyph_table: GlyphTable<'a>,
    offset: usize,
    len: usize,
}

impl<'a> MatchSequence<'a> {
    pub(crate) fn new(
        table: FontTable<'a>,
        glyph_table: GlyphTable<'a>,
        offset: usize,
        len: usize,
    ) -> MatchSequence<'a> {
        MatchSequence {
            table,
            glyph_table,
            offset,
            len,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Offset just past the end of the array.
    fn end(&self) -> usize {
        self.offset + self.len * size::U16
    }

    pub(crate) fn matches(&self, index: usize, glyph: u16) -> Result<bool, ParseError> {
        let value_offset = self.offset + index * size::U16;
        match self.glyph_table {
            GlyphTable::ById => Ok(self.table.read_u16(value_offset)? == glyph),
            GlyphTable::ByClassDef(opt_class_def) => {
                let class = match opt_class_def {
                    Some(class_def) => class_def.glyph_class_value(glyph)?,
                    None => 0,
                };
                Ok(self.table.read_u16(value_offset)? == class)
            }
            GlyphTable::ByCoverage(base) => {
                match Coverage::at_offset16(self.table, base, value_offset)? {
                    Some(coverage) => Ok(coverage.glyph_coverage_value(glyph)?.is_some()),
                    None => Ok(false),
                }
            }
        }
    }
}

/// One rule of a contextual or chaining contextual subtable.
#[derive(Copy, Clone, Debug)]
struct ContextRule<'a> {
    backtrack: Option<MatchSequence<'a>>,
    /// The input sequence. Formats 1 and 2 leave out the first glyph, which the subtable
    /// coverage has already matched.
    input: MatchSequence<'a>,
    input_includes_first: bool,
    lookahead: Option<MatchSequence<'a>>,
    records_offset: usize,
    record_count: usize,
}

impl<'a> ContextRule<'a> {
    /// Number of glyphs in the input sequence, the first glyph included.
    fn input_glyph_count(&self) -> usize {
        if self.input_includes_first {
            self.input.len()
        } else {
            self.input.len() + 1
        }
    }

    /// Match the rule at `first`, returning the index of the last input glyph.
    fn match_at(
        &self,
        opt_gdef_table: Option<&GDEFTable<'_>>,
        run: &GlyphRun,
        lookup_flag: LookupFlag,
        first: usize,
        after_last: usize,
    ) -> Result<Option<usize>, ParseError> {
        if self.input_glyph_count() == 0 {
            return Ok(None);
        }
        let skip = if self.input_includes_first {
            if !self.input.matches(0, run.glyph(first))? {
                return Ok(None);
            }
            0
        } else {
            1
        };

        let mut last = first;
        for component in 1..self.input_glyph_count() {
            match next_glyph_in_lookup(
                opt_gdef_table,
                run,
                last + 1,
                lookup_flag,
                Direction::Forward,
            )? {
                Some(index)
                    if index < after_last
                        && self.input.matches(component - skip, run.glyph(index))? =>
                {
                    last = index
                }
                _ => return Ok(None),
            }
        }

        if let Some(backtrack) = &self.backtrack {
            if !match_backtrack(opt_gdef_table, run, backtrack, lookup_flag, first)? {
                return Ok(None);
            }
        }
        if let Some(lookahead) = &self.lookahead {
            if !match_lookahead(opt_gdef_table, run, lookahead, lookup_flag, last)? {
                return Ok(None);
            }
        }

        Ok(Some(last))
    }
}

/// Match `backtrack` against the glyphs before `first`, nearest glyph first.
pub(crate) fn match_backtrack(
    opt_gdef_table: Option<&GDEFTable<'_>>,
    run: &GlyphRun,
    backtrack: &MatchSequence<'_>,
    lookup_flag: LookupFlag,
    first: usize,
) -> Result<bool, ParseError> {
    let mut position = first;
    for component in 0..backtrack.len() {
        match prev_glyph_in_lookup(opt_gdef_table, run, position, lookup_flag)? {
            Some(index) if backtrack.matches(component, run.glyph(index))? => position = index,
            _ => return Ok(false),
        }
    }
    Ok(true)
}

/// Match `lookahead` against the glyphs after `last`.
pub(crate) fn match_lookahead(
    opt_gdef_table: Option<&GDEFTable<'_>>,
    run: &GlyphRun,
    lookahead: &MatchSequence<'_>,
    lookup_flag: LookupFlag,
    last: usize,
) -> Result<bool, ParseError> {
    let mut position = last;
    for component in 0..lookahead.len() {
        match next_glyph_in_lookup(
            opt_gdef_table,
            run,
            position + 1,
            lookup_flag,
            Direction::Forward,
        )? {
            Some(index) if lookahead.matches(component, run.glyph(index))? => position = index,
            _ => return Ok(false),
        }
    }
    Ok(true)
}

/// Read a format 1 or 2 `SequenceRule`/`ClassSequenceRule`.
fn read_rule<'a>(
    table: FontTable<'a>,
    rule: usize,
    glyph_table: GlyphTable<'a>,
) -> Result<ContextRule<'a>, ParseError> {
    let mut ctxt = table.ctxt_at(rule);
    let glyph_count = usize::from(ctxt.read_u16be()?);
    let record_count = usize::from(ctxt.read_u16be()?);
    let input = MatchSequence::new(
        table,
        glyph_table,
        rule + 2 * size::U16,
        glyph_count.saturating_sub(1),
    );
    Ok(ContextRule {
        backtrack: None,
        input,
        input_includes_first: glyph_count == 0,
        lookahead: None,
        records_offset: input.end(),
        record_count,
    })
}

/// Read a format 1 or 2 `ChainedSequenceRule`/`ChainedClassSequenceRule`.
fn read_chain_rule<'a>(
    table: FontTable<'a>,
    rule: usize,
    glyph_tables: [GlyphTable<'a>; 3],
) -> Result<ContextRule<'a>, ParseError> {
    let [backtrack_table, input_table, lookahead_table] = glyph_tables;
    let backtrack_count = usize::from(table.read_u16(rule)?);
    let backtrack = MatchSequence::new(table, backtrack_table, rule + size::U16, backtrack_count);
    let input_count = usize::from(table.read_u16(backtrack.end())?);
    let input = MatchSequence::new(
        table,
        input_table,
        backtrack.end() + size::U16,
        input_count.saturating_sub(1),
    );
    let lookahead_count = usize::from(table.read_u16(input.end())?);
    let lookahead = MatchSequence::new(
        table,
        lookahead_table,
        input.end() + size::U16,
        lookahead_count,
    );
    let record_count = usize::from(table.read_u16(lookahead.end())?);
    Ok(ContextRule {
        backtrack: Some(backtrack),
        input,
        input_includes_first: input_count == 0,
        lookahead: Some(lookahead),
        records_offset: lookahead.end() + size::U16,
        record_count,
    })
}

/// Apply a contextual subtable (`GSUB` type 5 or `GPOS` type 7).
pub fn apply_context(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    lookup_flag: LookupFlag,
    parameter: u32,
    first: usize,
    after_last: usize,
    nesting_level: usize,
) -> Result<LookupResult, ParseError> {
    let table = ctx.table.table();
    let glyph = ctx.run.glyph(first);
    let rules = match table.read_u16(subtable)? {
        1 => {
            let coverage_index = match coverage_value(table, subtable, glyph)? {
                Some(index) => index,
                None => return Ok(LookupResult::no_match(first)),
            };
            let set_count = table.read_u16(subtable + 2 * size::U16)?;
            if coverage_index >= set_count {
                return Ok(LookupResult::no_match(first));
            }
            let set_field = subtable + 3 * size::U16 + usize::from(coverage_index) * size::U16;
            rule_set(table, subtable, set_field, |rule| {
                read_rule(table, rule, GlyphTable::ById)
            })?
        }
        2 => {
            if coverage_value(table, subtable, glyph)?.is_none() {
                return Ok(LookupResult::no_match(first));
            }
            let class_def = ClassDef::at_offset16(table, subtable, subtable + 2 * size::U16)?;
            let class = match class_def {
                Some(class_def) => class_def.glyph_class_value(glyph)?,
                None => 0,
            };
            let set_count = table.read_u16(subtable + 3 * size::U16)?;
            if class >= set_count {
                warn!(
                    "class {} exceeds class set count {} in context subtable",
                    class, set_count
                );
                return Ok(LookupResult::no_match(first));
            }
            let set_field = subtable + 4 * size::U16 + usize::from(class) * size::U16;
            rule_set(table, subtable, set_field, |rule| {
                read_rule(table, rule, GlyphTable::ByClassDef(class_def))
            })?
        }
        3 => {
            let glyph_count = usize::from(table.read_u16(subtable + size::U16)?);
            let record_count = usize::from(table.read_u16(subtable + 2 * size::U16)?);
            let input = MatchSequence::new(
                table,
                GlyphTable::ByCoverage(subtable),
                subtable + 3 * size::U16,
                glyph_count,
            );
            vec![ContextRule {
                backtrack: None,
                input,
                input_includes_first: true,
                lookahead: None,
                records_offset: input.end(),
                record_count,
            }]
        }
        _ => return Ok(LookupResult::no_match(first)),
    };
    apply_first_matching_rule(ctx, &rules, lookup_flag, parameter, first, after_last, nesting_level)
}

/// Apply a chaining contextual subtable (`GSUB` type 6 or `GPOS` type 8).
pub fn apply_chain_context(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    lookup_flag: LookupFlag,
    parameter: u32,
    first: usize,
    after_last: usize,
    nesting_level: usize,
) -> Result<LookupResult, ParseError> {
    let table = ctx.table.table();
    let glyph = ctx.run.glyph(first);
    let rules = match table.read_u16(subtable)? {
        1 => {
            let coverage_index = match coverage_value(table, subtable, glyph)? {
                Some(index) => index,
                None => return Ok(LookupResult::no_match(first)),
            };
            let set_count = table.read_u16(subtable + 2 * size::U16)?;
            if coverage_index >= set_count {
                return Ok(LookupResult::no_match(first));
            }
            let set_field = subtable + 3 * size::U16 + usize::from(coverage_index) * size::U16;
            rule_set(table, subtable, set_field, |rule| {
                read_chain_rule(table, rule, [GlyphTable::ById; 3])
            })?
        }
        2 => {
            if coverage_value(table, subtable, glyph)?.is_none() {
                return Ok(LookupResult::no_match(first));
            }
            let backtrack_class_def =
                ClassDef::at_offset16(table, subtable, subtable + 2 * size::U16)?;
            let input_class_def = ClassDef::at_offset16(table, subtable, subtable + 3 * size::U16)?;
            let lookahead_class_def =
                ClassDef::at_offset16(table, subtable, subtable + 4 * size::U16)?;
            let class = match input_class_def {
                Some(class_def) => class_def.glyph_class_value(glyph)?,
                None => 0,
            };
            let set_count = table.read_u16(subtable + 5 * size::U16)?;
            if class >= set_count {
                warn!(
                    "class {} exceeds class set count {} in chaining context subtable",
                    class, set_count
                );
                return Ok(LookupResult::no_match(first));
            }
            let set_field = subtable + 6 * size::U16 + usize::from(class) * size::U16;
            let glyph_tables = [
                GlyphTable::ByClassDef(backtrack_class_def),
                GlyphTable::ByClassDef(input_class_def),
                GlyphTable::ByClassDef(lookahead_class_def),
            ];
            rule_set(table, subtable, set_field, |rule| {
                read_chain_rule(table, rule, glyph_tables)
            })?
        }
        3 => {
            let by_coverage = GlyphTable::ByCoverage(subtable);
            let backtrack_count = usize::from(table.read_u16(subtable + size::U16)?);
            let backtrack =
                MatchSequence::new(table, by_coverage, subtable + 2 * size::U16, backtrack_count);
            let input_count = usize::from(table.read_u16(backtrack.end())?);
            let input =
                MatchSequence::new(table, by_coverage, backtrack.end() + size::U16, input_count);
            let lookahead_count = usize::from(table.read_u16(input.end())?);
            let lookahead =
                MatchSequence::new(table, by_coverage, input.end() + size::U16, lookahead_count);
            let record_count = usize::from(table.read_u16(lookahead.end())?);
            vec![ContextRule {
                backtrack: Some(backtrack),
                input,
                input_includes_first: true,
                lookahead: Some(lookahead),
                records_offset: lookahead.end() + size::U16,
                record_count,
            }]
        }
        _ => return Ok(LookupResult::no_match(first)),
    };
    apply_first_matching_rule(ctx, &rules, lookup_flag, parameter, first, after_last, nesting_level)
}

pub(crate) fn coverage_value(
    table: FontTable<'_>,
    subtable: usize,
    glyph: u16,
) -> Result<Option<u16>, ParseError> {
    match Coverage::at_offset16(table, subtable, subtable + size::U16)? {
        Some(coverage) => coverage.glyph_coverage_value(glyph),
        None => Ok(None),
    }
}

/// Read the rules of the rule set at the 16-bit offset stored at `set_field`.
///
/// A NULL rule set has no rules.
fn rule_set<'a, F>(
    table: FontTable<'a>,
    subtable: usize,
    set_field: usize,
    read: F,
) -> Result<Vec<ContextRule<'a>>, ParseError>
where
    F: Fn(usize) -> Result<ContextRule<'a>, ParseError>,
{
    let set = match table.read_offset16(subtable, set_field)? {
        Some(set) => set,
        None => return Ok(Vec::new()),
    };
    let rule_count = usize::from(table.read_u16(set)?);
    let mut rules = Vec::with_capacity(rule_count);
    for index in 0..rule_count {
        if let Some(rule) = table.read_offset16(set, set + size::U16 + index * size::U16)? {
            rules.push(read(rule)?);
        }
    }
    Ok(rules)
}

fn apply_first_matching_rule(
    ctx: &mut LookupContext<'_, '_>,
    rules: &[ContextRule<'_>],
    lookup_flag: LookupFlag,
    parameter: u32,
    first: usize,
    after_last: usize,
    nesting_level: usize,
) -> Result<LookupResult, ParseError> {
    for rule in rules {
        let opt_last = rule.match_at(ctx.gdef.as_ref(), ctx.run, lookup_flag, first, after_last)?;
        if let Some(last) = opt_last {
            return apply_nested_lookups(
                ctx,
                rule,
                lookup_flag,
                parameter,
                first,
                last,
                after_last,
                nesting_level,
            );
        }
    }
    Ok(LookupResult::no_match(first))
}

/// Apply the sequence lookup records of a matched rule.
///
/// Records run in increasing `(lookup index, sequence index)` order and duplicates run once.
/// Each nested lookup is applied one nesting level deeper. A rule matched at
/// `MAX_CONTEXT_NESTING_LEVEL` does not match.
fn apply_nested_lookups(
    ctx: &mut LookupContext<'_, '_>,
    rule: &ContextRule<'_>,
    lookup_flag: LookupFlag,
    parameter: u32,
    first: usize,
    last: usize,
    after_last: usize,
    nesting_level: usize,
) -> Result<LookupResult, ParseError> {
    if nesting_level >= MAX_CONTEXT_NESTING_LEVEL {
        debug!(
            "contextual lookup nesting limit of {} reached at glyph {}",
            MAX_CONTEXT_NESTING_LEVEL, first
        );
        return Ok(LookupResult::no_match(first));
    }

    let table = ctx.table.table();
    let mut records = TinyVec::<[(u16, u16); 8]>::new();
    for index in 0..rule.record_count {
        let record = rule.records_offset + index * 2 * size::U16;
        let sequence_index = table.read_u16(record)?;
        let lookup_index = table.read_u16(record + size::U16)?;
        records.push((lookup_index, sequence_index));
    }
    records.sort_unstable();

    let mut last = last;
    let mut after_last = after_last;
    for (lookup_index, sequence_index) in records.iter().copied().dedup() {
        let mut opt_position = Some(first);
        for _ in 0..sequence_index {
            opt_position = match opt_position {
                Some(position) => next_glyph_in_lookup(
                    ctx.gdef.as_ref(),
                    ctx.run,
                    position + 1,
                    lookup_flag,
                    Direction::Forward,
                )?,
                None => None,
            };
        }
        let position = match opt_position {
            Some(position) if position < after_last => position,
            _ => continue,
        };

        let lookup = ctx.lookup_list.lookup(usize::from(lookup_index))?;
        let len_before = ctx.run.len();
        let result = engine::apply_lookup(
            ctx,
            &lookup,
            parameter,
            position,
            after_last,
            nesting_level + 1,
        )?;
        if result.matched {
            let len_after = ctx.run.len();
            after_last = (after_last + len_after).saturating_sub(len_before);
            last = (last + len_after).saturating_sub(len_before);
            ctx.run
                .update_glyph_flags(ctx.gdef.as_ref(), position, result.next_glyph, false)?;
        }
    }

    Ok(LookupResult {
        matched: true,
        next_glyph: last + 1,
    })
}
