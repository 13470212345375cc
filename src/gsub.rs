//! Glyph substitution (`gsub`) subtable handlers.
//!
//! > The Glyph Substitution (GSUB) table provides data for substition of glyphs for appropriate
//! > rendering of scripts, such as cursively-connecting forms in Arabic script, or for advanced
//! > typographic effects, such as ligatures.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/gsub>
//!
//! Contextual and chaining contextual substitution live in `context`, shared with `gpos`.

use log::trace;

use crate::binary::read::FontTable;
use crate::context::{
    self, coverage_value, next_glyph_in_lookup, Direction, GlyphTable, LookupFlag, MatchSequence,
};
use crate::engine::{LookupContext, LookupResult};
use crate::error::ParseError;
use crate::glyph_run::{GlyphFlags, GlyphRun};
use crate::size;

/// Replace the glyph at `index`, leaving its type to be looked up again.
fn substitute(run: &mut GlyphRun, index: usize, glyph: u16) {
    run.set_glyph(index, glyph);
    let flags = run.flags(index).with_glyph_type(GlyphFlags::UNRESOLVED);
    run.set_flags(index, flags | GlyphFlags::SUBSTITUTED);
}

/// Read element `index` of the counted array of 16-bit values at `array`.
fn read_array_u16(table: FontTable<'_>, array: usize, index: usize) -> Result<u16, ParseError> {
    let count = usize::from(table.read_u16(array)?);
    if index >= count {
        return Err(ParseError::BadIndex);
    }
    table.read_u16(array + size::U16 + index * size::U16)
}

/// Follow element `index` of a counted array of 16-bit offsets at `array`, relative to `base`.
fn read_array_offset16(
    table: FontTable<'_>,
    base: usize,
    array: usize,
    index: usize,
) -> Result<Option<usize>, ParseError> {
    let count = usize::from(table.read_u16(array)?);
    if index >= count {
        return Err(ParseError::BadIndex);
    }
    table.read_offset16(base, array + size::U16 + index * size::U16)
}

pub fn apply_single_subst(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    first: usize,
) -> Result<LookupResult, ParseError> {
    let table = ctx.table.table();
    let glyph = ctx.run.glyph(first);
    let coverage_index = match coverage_value(table, subtable, glyph)? {
        Some(coverage_index) => usize::from(coverage_index),
        None => return Ok(LookupResult::no_match(first)),
    };
    let new_glyph = match table.read_u16(subtable)? {
        1 => {
            let delta = table.read_i16(subtable + 2 * size::U16)?;
            glyph.wrapping_add(delta as u16)
        }
        2 => read_array_u16(table, subtable + 2 * size::U16, coverage_index)?,
        _ => return Ok(LookupResult::no_match(first)),
    };
    substitute(ctx.run, first, new_glyph);
    Ok(LookupResult::matched(first + 1))
}

/// Replace one glyph with a sequence of glyphs.
///
/// Character map entries after the glyph move with the glyphs following it. An empty sequence
/// deletes the glyph and the characters that mapped to it then map to the glyph that followed.
pub fn apply_multiple_subst(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    first: usize,
) -> Result<LookupResult, ParseError> {
    let table = ctx.table.table();
    if table.read_u16(subtable)? != 1 {
        return Ok(LookupResult::no_match(first));
    }
    let coverage_index = match coverage_value(table, subtable, ctx.run.glyph(first))? {
        Some(coverage_index) => usize::from(coverage_index),
        None => return Ok(LookupResult::no_match(first)),
    };
    let sequence =
        match read_array_offset16(table, subtable, subtable + 2 * size::U16, coverage_index)? {
            Some(sequence) => sequence,
            None => return Ok(LookupResult::no_match(first)),
        };
    let glyph_count = usize::from(table.read_u16(sequence)?);

    if glyph_count == 0 {
        // Deleting the only glyph would leave the characters nothing to map to.
        if ctx.run.len() == 1 {
            return Ok(LookupResult::no_match(first));
        }
        ctx.run.remove(first, 1);
        let last_glyph = ctx.run.len() - 1;
        for glyph_index in ctx.run.char_map_mut() {
            if *glyph_index > first {
                *glyph_index -= 1;
            }
            *glyph_index = (*glyph_index).min(last_glyph);
        }
        return Ok(LookupResult::matched(first));
    }

    let inserted = glyph_count - 1;
    ctx.run.insert_copies(first, inserted);
    for glyph_index in ctx.run.char_map_mut() {
        if *glyph_index > first {
            *glyph_index += inserted;
        }
    }
    for index in 0..glyph_count {
        let glyph = table.read_u16(sequence + size::U16 + index * size::U16)?;
        substitute(ctx.run, first + index, glyph);
    }
    trace!("glyph {} expanded to {} glyphs", first, glyph_count);
    Ok(LookupResult::matched(first + glyph_count))
}

/// Replace a glyph with the alternate selected by `parameter`, counting from 1.
pub fn apply_alternate_subst(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    parameter: u32,
    first: usize,
) -> Result<LookupResult, ParseError> {
    let table = ctx.table.table();
    if table.read_u16(subtable)? != 1 {
        return Ok(LookupResult::no_match(first));
    }
    let coverage_index = match coverage_value(table, subtable, ctx.run.glyph(first))? {
        Some(coverage_index) => usize::from(coverage_index),
        None => return Ok(LookupResult::no_match(first)),
    };
    let alternate_set =
        match read_array_offset16(table, subtable, subtable + 2 * size::U16, coverage_index)? {
            Some(alternate_set) => alternate_set,
            None => return Ok(LookupResult::no_match(first)),
        };
    let glyph_count = table.read_u16(alternate_set)?;
    let alternate_index = match usize::try_from(parameter) {
        Ok(parameter) if parameter >= 1 && parameter <= usize::from(glyph_count) => parameter - 1,
        _ => return Ok(LookupResult::no_match(first)),
    };
    let glyph = read_array_u16(table, alternate_set, alternate_index)?;
    substitute(ctx.run, first, glyph);
    Ok(LookupResult::matched(first + 1))
}

/// Replace a sequence of glyphs with a single ligature glyph.
///
/// Glyphs skipped by the lookup flags between the components are kept and end up after the
/// ligature. The ligature takes the earliest first character and the total component count
/// of the glyphs it replaces, and every character that mapped to a component maps to it.
pub fn apply_ligature_subst(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    lookup_flag: LookupFlag,
    first: usize,
    after_last: usize,
) -> Result<LookupResult, ParseError> {
    let table = ctx.table.table();
    if table.read_u16(subtable)? != 1 {
        return Ok(LookupResult::no_match(first));
    }
    let coverage_index = match coverage_value(table, subtable, ctx.run.glyph(first))? {
        Some(coverage_index) => usize::from(coverage_index),
        None => return Ok(LookupResult::no_match(first)),
    };
    let ligature_set =
        match read_array_offset16(table, subtable, subtable + 2 * size::U16, coverage_index)? {
            Some(ligature_set) => ligature_set,
            None => return Ok(LookupResult::no_match(first)),
        };

    let ligature_count = usize::from(table.read_u16(ligature_set)?);
    for index in 0..ligature_count {
        let ligature = match read_array_offset16(table, ligature_set, ligature_set, index)? {
            Some(ligature) => ligature,
            None => continue,
        };
        let ligature_glyph = table.read_u16(ligature)?;
        let component_count = usize::from(table.read_u16(ligature + size::U16)?);
        if component_count == 0 {
            return Err(ParseError::BadValue);
        }
        let components = MatchSequence::new(
            table,
            GlyphTable::ById,
            ligature + 2 * size::U16,
            component_count - 1,
        );
        if let Some(positions) = match_components(ctx, &components, lookup_flag, first, after_last)?
        {
            return Ok(form_ligature(ctx.run, &positions, ligature_glyph));
        }
    }

    Ok(LookupResult::no_match(first))
}

/// Find the glyphs matching the components after the first, returning the index of every
/// component glyph.
fn match_components(
    ctx: &LookupContext<'_, '_>,
    components: &MatchSequence<'_>,
    lookup_flag: LookupFlag,
    first: usize,
    after_last: usize,
) -> Result<Option<Vec<usize>>, ParseError> {
    let mut positions = Vec::with_capacity(components.len() + 1);
    positions.push(first);
    let mut last = first;
    for component in 0..components.len() {
        match next_glyph_in_lookup(
            ctx.gdef.as_ref(),
            ctx.run,
            last + 1,
            lookup_flag,
            Direction::Forward,
        )? {
            Some(index)
                if index < after_last && components.matches(component, ctx.run.glyph(index))? =>
            {
                positions.push(index);
                last = index;
            }
            _ => return Ok(None),
        }
    }
    Ok(Some(positions))
}

fn form_ligature(run: &mut GlyphRun, positions: &[usize], ligature_glyph: u16) -> LookupResult {
    let first = positions[0];
    let last = positions[positions.len() - 1];
    let first_char = positions
        .iter()
        .map(|&index| run.first_char(index))
        .min()
        .unwrap_or_else(|| run.first_char(first));
    let ligature_count = positions
        .iter()
        .fold(0u16, |count, &index| count.saturating_add(run.ligature_count(index)));

    substitute(run, first, ligature_glyph);
    run.set_first_char(first, first_char);
    run.set_ligature_count(first, ligature_count);
    for &index in positions[1..].iter().rev() {
        run.remove(index, 1);
    }

    let removed = &positions[1..];
    for glyph_index in run.char_map_mut() {
        if removed.binary_search(glyph_index).is_ok() {
            *glyph_index = first;
        } else {
            let shift = removed.partition_point(|&index| index < *glyph_index);
            *glyph_index -= shift;
        }
    }

    trace!(
        "{} glyphs from {} formed ligature {}",
        positions.len(),
        first,
        ligature_glyph
    );
    LookupResult::matched(last - removed.len() + 1)
}

/// Substitute the glyph at `target`, matching backtrack and lookahead coverage around it.
///
/// The lookup is applied from the end of the range backwards, so `next_glyph` is the
/// glyph worked on, which is also the end of the range for the next step.
pub fn apply_reverse_chain_single_subst(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    lookup_flag: LookupFlag,
    target: usize,
) -> Result<LookupResult, ParseError> {
    let no_match = LookupResult {
        matched: false,
        next_glyph: target,
    };
    let table = ctx.table.table();
    if table.read_u16(subtable)? != 1 {
        return Ok(no_match);
    }
    let coverage_index = match coverage_value(table, subtable, ctx.run.glyph(target))? {
        Some(coverage_index) => usize::from(coverage_index),
        None => return Ok(no_match),
    };

    let backtrack_count = usize::from(table.read_u16(subtable + 2 * size::U16)?);
    let backtrack = MatchSequence::new(
        table,
        GlyphTable::ByCoverage(subtable),
        subtable + 3 * size::U16,
        backtrack_count,
    );
    let lookahead_field = subtable + 3 * size::U16 + backtrack_count * size::U16;
    let lookahead_count = usize::from(table.read_u16(lookahead_field)?);
    let lookahead = MatchSequence::new(
        table,
        GlyphTable::ByCoverage(subtable),
        lookahead_field + size::U16,
        lookahead_count,
    );
    let substitutes = lookahead_field + size::U16 + lookahead_count * size::U16;

    let gdef = ctx.gdef.as_ref();
    if !context::match_backtrack(gdef, ctx.run, &backtrack, lookup_flag, target)?
        || !context::match_lookahead(gdef, ctx.run, &lookahead, lookup_flag, target)?
    {
        return Ok(no_match);
    }

    let glyph = read_array_u16(table, substitutes, coverage_index)?;
    substitute(ctx.run, target, glyph);
    Ok(LookupResult::matched(target))
}
