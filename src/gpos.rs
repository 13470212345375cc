//! Glyph positioning (`gpos`) subtable handlers.
//!
//! > The Glyph Positioning table (GPOS) provides precise control over glyph placement for
//! > sophisticated text layout and rendering in each script and language system that a font
//! > supports.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/gpos>
//!
//! Positions are accumulated into the caller's per-glyph advances and offsets, in pixels at
//! the size given by the layout metrics.

use log::warn;

use crate::binary::read::FontTable;
use crate::context::{coverage_value, next_glyph_in_lookup, prev_glyph_in_lookup, Direction, LookupFlag};
use crate::engine::{LookupContext, LookupResult};
use crate::error::ParseError;
use crate::font::{LayoutMetrics, TextFlowDirection};
use crate::glyph_position::{design_to_pixels, LayoutOffset};
use crate::glyph_run::GlyphFlags;
use crate::layout::{ClassDef, Coverage};
use crate::size;

/// Which fields a value record holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ValueFormat(u16);

impl ValueFormat {
    pub const X_PLACEMENT: u16 = 0x0001;
    pub const Y_PLACEMENT: u16 = 0x0002;
    pub const X_ADVANCE: u16 = 0x0004;
    pub const Y_ADVANCE: u16 = 0x0008;
    pub const X_PLACEMENT_DEVICE: u16 = 0x0010;
    pub const Y_PLACEMENT_DEVICE: u16 = 0x0020;
    pub const X_ADVANCE_DEVICE: u16 = 0x0040;
    pub const Y_ADVANCE_DEVICE: u16 = 0x0080;

    fn read(table: FontTable<'_>, offset: usize) -> Result<ValueFormat, ParseError> {
        let value_format = table.read_u16(offset)?;
        if value_format <= 0xFF {
            Ok(ValueFormat(value_format))
        } else {
            Err(ParseError::BadValue)
        }
    }

    /// Size in bytes of a value record in this format.
    pub fn size(self) -> usize {
        self.0.count_ones() as usize * size::U16
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    fn has(self, field: u16) -> bool {
        self.0 & field != 0
    }
}

/// A value record scaled to pixels, device adjustments included.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Adjust {
    pub x_placement: i32,
    pub y_placement: i32,
    pub x_advance: i32,
    pub y_advance: i32,
}

/// Read the value record at `record`. Device table offsets are relative to `base`.
fn read_value_record(
    table: FontTable<'_>,
    metrics: &LayoutMetrics,
    base: usize,
    record: usize,
    value_format: ValueFormat,
) -> Result<Adjust, ParseError> {
    let mut ctxt = table.ctxt_at(record);
    let mut read_value = |field: u16| -> Result<i32, ParseError> {
        if value_format.has(field) {
            Ok(i32::from(ctxt.read_i16be()?))
        } else {
            Ok(0)
        }
    };
    let x_placement = read_value(ValueFormat::X_PLACEMENT)?;
    let y_placement = read_value(ValueFormat::Y_PLACEMENT)?;
    let x_advance = read_value(ValueFormat::X_ADVANCE)?;
    let y_advance = read_value(ValueFormat::Y_ADVANCE)?;

    let units = metrics.design_em_height;
    let (x_ppem, y_ppem) = (metrics.pixels_em_width, metrics.pixels_em_height);
    let mut adjust = Adjust {
        x_placement: design_to_pixels(units, x_ppem, x_placement),
        y_placement: design_to_pixels(units, y_ppem, y_placement),
        x_advance: design_to_pixels(units, x_ppem, x_advance),
        y_advance: design_to_pixels(units, y_ppem, y_advance),
    };

    let device_fields = [
        (ValueFormat::X_PLACEMENT_DEVICE, x_ppem),
        (ValueFormat::Y_PLACEMENT_DEVICE, y_ppem),
        (ValueFormat::X_ADVANCE_DEVICE, x_ppem),
        (ValueFormat::Y_ADVANCE_DEVICE, y_ppem),
    ];
    let mut deltas = [0; 4];
    for (delta, (field, ppem)) in deltas.iter_mut().zip(device_fields) {
        if value_format.has(field) {
            let device_offset = usize::from(ctxt.read_u16be()?);
            if device_offset != 0 {
                *delta = device_delta(table, base + device_offset, ppem)?;
            }
        }
    }
    adjust.x_placement += deltas[0];
    adjust.y_placement += deltas[1];
    adjust.x_advance += deltas[2];
    adjust.y_advance += deltas[3];
    Ok(adjust)
}

/// Decode the hinting adjustment for `pixels_per_em` from the device table at `device`.
///
/// Sizes outside the table's range and variation index tables contribute nothing.
pub fn device_delta(
    table: FontTable<'_>,
    device: usize,
    pixels_per_em: u16,
) -> Result<i32, ParseError> {
    let mut ctxt = table.ctxt_at(device);
    let start_size = ctxt.read_u16be()?;
    let end_size = ctxt.read_u16be()?;
    let delta_format = ctxt.read_u16be()?;
    let bits = match delta_format {
        1 => 2,
        2 => 4,
        3 => 8,
        _ => return Ok(0),
    };
    if pixels_per_em < start_size || pixels_per_em > end_size {
        return Ok(0);
    }

    let index = usize::from(pixels_per_em - start_size);
    let per_word = 16 / bits;
    let word = table.read_u16(device + 3 * size::U16 + (index / per_word) * size::U16)?;
    let shift = 16 - bits * (index % per_word + 1);
    let raw = i32::from((word >> shift) & ((1 << bits) - 1));
    if raw >= 1 << (bits - 1) {
        Ok(raw - (1 << bits))
    } else {
        Ok(raw)
    }
}

/// Resolve the anchor table at `anchor` for `glyph` to a point in pixels.
///
/// Format 2 anchors use the glyph's contour point when the font can supply it. Unknown
/// formats give `None`.
fn read_anchor(
    ctx: &LookupContext<'_, '_>,
    table: FontTable<'_>,
    anchor: usize,
    glyph: u16,
) -> Result<Option<LayoutOffset>, ParseError> {
    let metrics = &ctx.metrics;
    let mut ctxt = table.ctxt_at(anchor);
    let format = ctxt.read_u16be()?;
    let x = i32::from(ctxt.read_i16be()?);
    let y = i32::from(ctxt.read_i16be()?);
    let units = metrics.design_em_height;
    let design_point = LayoutOffset::new(
        design_to_pixels(units, metrics.pixels_em_width, x),
        design_to_pixels(units, metrics.pixels_em_height, y),
    );

    match format {
        1 => Ok(Some(design_point)),
        2 => {
            let point_index = ctxt.read_u16be()?;
            Ok(Some(
                ctx.font
                    .glyph_contour_point(glyph, point_index)
                    .unwrap_or(design_point),
            ))
        }
        3 => {
            let mut point = design_point;
            if let Some(device) = table.read_offset16(anchor, anchor + 3 * size::U16)? {
                point.dx += device_delta(table, device, metrics.pixels_em_width)?;
            }
            if let Some(device) = table.read_offset16(anchor, anchor + 4 * size::U16)? {
                point.dy += device_delta(table, device, metrics.pixels_em_height)?;
            }
            Ok(Some(point))
        }
        _ => Ok(None),
    }
}

/// Move the mobile glyph so its anchor lands on the static glyph's anchor.
///
/// The vertical offset of the mobile glyph is set from the static glyph's. Horizontally the
/// advances of the glyphs between the two are taken into account and, with `use_advances`,
/// the difference goes into an advance (of the static glyph when it comes first in the
/// direction of text, otherwise the mobile glyph) instead of the mobile glyph's offset.
/// Vertical text directions are left alone.
pub fn align_anchors(
    direction: TextFlowDirection,
    advances: &mut [i32],
    offsets: &mut [LayoutOffset],
    static_index: usize,
    mobile_index: usize,
    static_anchor: LayoutOffset,
    mobile_anchor: LayoutOffset,
    use_advances: bool,
) {
    if !direction.is_horizontal() {
        return;
    }

    let (low, high) = if static_index < mobile_index {
        (static_index, mobile_index)
    } else {
        (mobile_index, static_index)
    };
    let between: i32 = advances[low + 1..high].iter().sum();

    offsets[mobile_index].dy = offsets[static_index].dy + static_anchor.dy - mobile_anchor.dy;

    let static_first = static_index < mobile_index;
    if (direction == TextFlowDirection::LeftToRight) == static_first {
        let dx = offsets[static_index].dx - advances[static_index] + static_anchor.dx
            - between
            - mobile_anchor.dx;
        if use_advances {
            advances[static_index] += dx;
        } else {
            offsets[mobile_index].dx = dx;
        }
    } else {
        let dx = offsets[static_index].dx + advances[mobile_index] + static_anchor.dx + between
            - mobile_anchor.dx;
        if use_advances {
            advances[mobile_index] -= dx;
        } else {
            offsets[mobile_index].dx = dx;
        }
    }
}

fn apply_adjust(ctx: &mut LookupContext<'_, '_>, index: usize, adjust: Adjust) {
    let offset = &mut ctx.offsets[index];
    offset.dx += adjust.x_placement;
    offset.dy += adjust.y_placement;
    if ctx.metrics.direction.is_horizontal() {
        ctx.advances[index] += adjust.x_advance;
    } else {
        ctx.advances[index] += adjust.y_advance;
    }
    ctx.run.insert_flags(index, GlyphFlags::POSITIONED);
}

pub fn apply_single_pos(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    first: usize,
) -> Result<LookupResult, ParseError> {
    let table = ctx.table.table();
    let coverage_index = match coverage_value(table, subtable, ctx.run.glyph(first))? {
        Some(coverage_index) => usize::from(coverage_index),
        None => return Ok(LookupResult::no_match(first)),
    };
    let value_format = ValueFormat::read(table, subtable + 2 * size::U16)?;
    let record = match table.read_u16(subtable)? {
        1 => subtable + 3 * size::U16,
        2 => {
            let value_count = usize::from(table.read_u16(subtable + 3 * size::U16)?);
            if coverage_index >= value_count {
                return Err(ParseError::BadIndex);
            }
            subtable + 4 * size::U16 + coverage_index * value_format.size()
        }
        _ => return Ok(LookupResult::no_match(first)),
    };
    let adjust = read_value_record(table, &ctx.metrics, subtable, record, value_format)?;
    apply_adjust(ctx, first, adjust);
    Ok(LookupResult::matched(first + 1))
}

/// Adjust a pair of glyphs. The second glyph is the next one the lookup does not skip.
///
/// When the second value record is empty the second glyph can start the next pair.
pub fn apply_pair_pos(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    lookup_flag: LookupFlag,
    first: usize,
    after_last: usize,
) -> Result<LookupResult, ParseError> {
    let table = ctx.table.table();
    let coverage_index = match coverage_value(table, subtable, ctx.run.glyph(first))? {
        Some(coverage_index) => usize::from(coverage_index),
        None => return Ok(LookupResult::no_match(first)),
    };
    let second = match next_glyph_in_lookup(
        ctx.gdef.as_ref(),
        ctx.run,
        first + 1,
        lookup_flag,
        Direction::Forward,
    )? {
        Some(second) if second < after_last => second,
        _ => return Ok(LookupResult::no_match(first)),
    };
    let second_glyph = ctx.run.glyph(second);
    let value_format1 = ValueFormat::read(table, subtable + 2 * size::U16)?;
    let value_format2 = ValueFormat::read(table, subtable + 3 * size::U16)?;
    let pair_size = value_format1.size() + value_format2.size();

    let record1 = match table.read_u16(subtable)? {
        1 => {
            let pair_set_count = usize::from(table.read_u16(subtable + 4 * size::U16)?);
            if coverage_index >= pair_set_count {
                return Err(ParseError::BadIndex);
            }
            let pair_set = match table.read_offset16(
                subtable,
                subtable + 5 * size::U16 + coverage_index * size::U16,
            )? {
                Some(pair_set) => pair_set,
                None => return Ok(LookupResult::no_match(first)),
            };
            let pair_value_count = usize::from(table.read_u16(pair_set)?);
            let record_size = size::U16 + pair_size;
            let records = pair_set + size::U16;
            let found = crate::layout::binary_search_by(pair_value_count, |index| {
                let glyph = table.read_u16(records + index * record_size)?;
                Ok(glyph.cmp(&second_glyph))
            })?;
            match found {
                Some(index) => records + index * record_size + size::U16,
                None => return Ok(LookupResult::no_match(first)),
            }
        }
        2 => {
            let class_def1 = ClassDef::at_offset16(table, subtable, subtable + 4 * size::U16)?;
            let class_def2 = ClassDef::at_offset16(table, subtable, subtable + 5 * size::U16)?;
            let class1_count = usize::from(table.read_u16(subtable + 6 * size::U16)?);
            let class2_count = usize::from(table.read_u16(subtable + 7 * size::U16)?);
            let class1 = match class_def1 {
                Some(class_def) => usize::from(class_def.glyph_class_value(ctx.run.glyph(first))?),
                None => 0,
            };
            let class2 = match class_def2 {
                Some(class_def) => usize::from(class_def.glyph_class_value(second_glyph)?),
                None => 0,
            };
            if class1 >= class1_count || class2 >= class2_count {
                warn!(
                    "pair class ({}, {}) outside {}x{} class records",
                    class1, class2, class1_count, class2_count
                );
                return Ok(LookupResult::no_match(first));
            }
            subtable + 8 * size::U16 + (class1 * class2_count + class2) * pair_size
        }
        _ => return Ok(LookupResult::no_match(first)),
    };

    let metrics = ctx.metrics;
    let adjust1 = read_value_record(table, &metrics, subtable, record1, value_format1)?;
    let record2 = record1 + value_format1.size();
    let adjust2 = read_value_record(table, &metrics, subtable, record2, value_format2)?;
    apply_adjust(ctx, first, adjust1);
    if value_format2.is_zero() {
        Ok(LookupResult::matched(second))
    } else {
        apply_adjust(ctx, second, adjust2);
        Ok(LookupResult::matched(second + 1))
    }
}

/// Connect the entry anchor of a glyph to the exit anchor of the glyph before it.
///
/// The glyph's advance is adjusted so the anchors meet horizontally. Vertically the later
/// glyph follows the earlier one, unless the lookup is flagged right to left, in which case
/// the earlier glyph and the glyphs already connected before it follow the later one.
pub fn apply_cursive_pos(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    lookup_flag: LookupFlag,
    first: usize,
) -> Result<LookupResult, ParseError> {
    let table = ctx.table.table();
    if table.read_u16(subtable)? != 1 {
        return Ok(LookupResult::no_match(first));
    }
    let entry_exit = |glyph: u16, field: usize| -> Result<Option<usize>, ParseError> {
        match coverage_value(table, subtable, glyph)? {
            Some(coverage_index) => {
                let coverage_index = usize::from(coverage_index);
                let count = usize::from(table.read_u16(subtable + 2 * size::U16)?);
                if coverage_index >= count {
                    return Err(ParseError::BadIndex);
                }
                let record = subtable + 3 * size::U16 + coverage_index * 2 * size::U16;
                table.read_offset16(subtable, record + field)
            }
            None => Ok(None),
        }
    };

    let glyph = ctx.run.glyph(first);
    let entry = match entry_exit(glyph, 0)? {
        Some(entry) => entry,
        None => return Ok(LookupResult::no_match(first)),
    };
    let prev = match prev_glyph_in_lookup(ctx.gdef.as_ref(), ctx.run, first, lookup_flag)? {
        Some(prev) => prev,
        None => return Ok(LookupResult::no_match(first)),
    };
    let prev_glyph = ctx.run.glyph(prev);
    let exit = match entry_exit(prev_glyph, size::U16)? {
        Some(exit) => exit,
        None => return Ok(LookupResult::no_match(first)),
    };
    let (entry_anchor, exit_anchor) = match (
        read_anchor(ctx, table, entry, glyph)?,
        read_anchor(ctx, table, exit, prev_glyph)?,
    ) {
        (Some(entry_anchor), Some(exit_anchor)) => (entry_anchor, exit_anchor),
        _ => return Ok(LookupResult::no_match(first)),
    };

    let direction = ctx.metrics.direction;
    let first_dy = ctx.offsets[first].dy;
    align_anchors(
        direction,
        ctx.advances,
        ctx.offsets,
        prev,
        first,
        exit_anchor,
        entry_anchor,
        true,
    );
    if lookup_flag.get_rtl() && direction.is_horizontal() {
        // The later glyph stays put and the chain ending at `prev` moves to meet it.
        let correction = first_dy + entry_anchor.dy - exit_anchor.dy - ctx.offsets[prev].dy;
        ctx.offsets[first].dy = first_dy;
        let mut index = prev;
        loop {
            ctx.offsets[index].dy += correction;
            if !ctx.run.flags(index).contains(GlyphFlags::CURSIVE_CONNECTED) {
                break;
            }
            index = match prev_glyph_in_lookup(ctx.gdef.as_ref(), ctx.run, index, lookup_flag)? {
                Some(index) => index,
                None => break,
            };
        }
    }

    ctx.run.insert_flags(prev, GlyphFlags::POSITIONED);
    ctx.run
        .insert_flags(first, GlyphFlags::POSITIONED | GlyphFlags::CURSIVE_CONNECTED);
    Ok(LookupResult::matched(first + 1))
}

/// The mark class and anchor offset of mark `mark_index` in the mark array at `mark_array`.
fn mark_record(
    table: FontTable<'_>,
    mark_array: usize,
    mark_index: usize,
) -> Result<(usize, Option<usize>), ParseError> {
    let mark_count = usize::from(table.read_u16(mark_array)?);
    if mark_index >= mark_count {
        return Err(ParseError::BadIndex);
    }
    let record = mark_array + size::U16 + mark_index * 2 * size::U16;
    let mark_class = usize::from(table.read_u16(record)?);
    let anchor = table.read_offset16(mark_array, record + size::U16)?;
    Ok((mark_class, anchor))
}

/// Anchor offset `mark_class` of row `row` in an array of anchor rows, relative to `array`.
fn anchor_row(
    table: FontTable<'_>,
    array: usize,
    row: usize,
    class_count: usize,
    mark_class: usize,
) -> Result<Option<usize>, ParseError> {
    let row_count = usize::from(table.read_u16(array)?);
    if row >= row_count {
        return Err(ParseError::BadIndex);
    }
    let field = array + size::U16 + (row * class_count + mark_class) * size::U16;
    table.read_offset16(array, field)
}

/// The parts shared by the three mark attachment subtables.
struct MarkAttachment {
    mark_class: usize,
    mark_anchor: usize,
    class_count: usize,
    attach_coverage_index: usize,
    attach_array: usize,
}

/// Read the mark's record and look up the glyph it attaches to in the second coverage table.
fn mark_attachment(
    ctx: &LookupContext<'_, '_>,
    subtable: usize,
    mark: usize,
    attach: usize,
) -> Result<Option<MarkAttachment>, ParseError> {
    let table = ctx.table.table();
    if table.read_u16(subtable)? != 1 {
        return Ok(None);
    }
    let mark_coverage_index = match coverage_value(table, subtable, ctx.run.glyph(mark))? {
        Some(index) => usize::from(index),
        None => return Ok(None),
    };
    let attach_coverage = Coverage::at_offset16(table, subtable, subtable + 2 * size::U16)?;
    let attach_coverage_index = match attach_coverage {
        Some(coverage) => match coverage.glyph_coverage_value(ctx.run.glyph(attach))? {
            Some(index) => usize::from(index),
            None => return Ok(None),
        },
        None => return Ok(None),
    };
    let class_count = usize::from(table.read_u16(subtable + 3 * size::U16)?);
    let mark_array = match table.read_offset16(subtable, subtable + 4 * size::U16)? {
        Some(mark_array) => mark_array,
        None => return Ok(None),
    };
    let attach_array = match table.read_offset16(subtable, subtable + 5 * size::U16)? {
        Some(attach_array) => attach_array,
        None => return Ok(None),
    };
    let (mark_class, mark_anchor) = mark_record(table, mark_array, mark_coverage_index)?;
    let mark_anchor = match mark_anchor {
        Some(mark_anchor) => mark_anchor,
        None => return Ok(None),
    };
    if mark_class >= class_count {
        warn!(
            "mark class {} outside the {} mark classes of the subtable",
            mark_class, class_count
        );
        return Ok(None);
    }
    Ok(Some(MarkAttachment {
        mark_class,
        mark_anchor,
        class_count,
        attach_coverage_index,
        attach_array,
    }))
}

/// Align the mark at `mark` with the anchor at `attach_anchor` on the glyph at `attach`.
fn attach_mark(
    ctx: &mut LookupContext<'_, '_>,
    mark: usize,
    attach: usize,
    mark_anchor: usize,
    attach_anchor: usize,
) -> Result<LookupResult, ParseError> {
    let table = ctx.table.table();
    let anchors = (
        read_anchor(ctx, table, attach_anchor, ctx.run.glyph(attach))?,
        read_anchor(ctx, table, mark_anchor, ctx.run.glyph(mark))?,
    );
    let (static_anchor, mobile_anchor) = match anchors {
        (Some(static_anchor), Some(mobile_anchor)) => (static_anchor, mobile_anchor),
        _ => return Ok(LookupResult::no_match(mark)),
    };
    align_anchors(
        ctx.metrics.direction,
        ctx.advances,
        ctx.offsets,
        attach,
        mark,
        static_anchor,
        mobile_anchor,
        false,
    );
    ctx.run.insert_flags(mark, GlyphFlags::POSITIONED);
    Ok(LookupResult::matched(mark + 1))
}

pub fn apply_mark_base_pos(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    lookup_flag: LookupFlag,
    first: usize,
) -> Result<LookupResult, ParseError> {
    let base = match prev_glyph_in_lookup(
        ctx.gdef.as_ref(),
        ctx.run,
        first,
        lookup_flag.ignoring_marks(),
    )? {
        Some(base) => base,
        None => return Ok(LookupResult::no_match(first)),
    };
    let attachment = match mark_attachment(ctx, subtable, first, base)? {
        Some(attachment) => attachment,
        None => return Ok(LookupResult::no_match(first)),
    };
    let table = ctx.table.table();
    let base_anchor = anchor_row(
        table,
        attachment.attach_array,
        attachment.attach_coverage_index,
        attachment.class_count,
        attachment.mark_class,
    )?;
    match base_anchor {
        Some(base_anchor) => attach_mark(ctx, first, base, attachment.mark_anchor, base_anchor),
        None => Ok(LookupResult::no_match(first)),
    }
}

/// Attach a mark to the ligature component it follows.
///
/// The component is found from the characters: it is the number of the ligature's characters
/// that come before the mark's first character, less one, limited to the components the
/// ligature has anchors for.
pub fn apply_mark_lig_pos(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    lookup_flag: LookupFlag,
    first: usize,
) -> Result<LookupResult, ParseError> {
    let ligature = match prev_glyph_in_lookup(
        ctx.gdef.as_ref(),
        ctx.run,
        first,
        lookup_flag.ignoring_marks(),
    )? {
        Some(ligature) => ligature,
        None => return Ok(LookupResult::no_match(first)),
    };
    let attachment = match mark_attachment(ctx, subtable, first, ligature)? {
        Some(attachment) => attachment,
        None => return Ok(LookupResult::no_match(first)),
    };
    let table = ctx.table.table();
    let ligature_count = usize::from(table.read_u16(attachment.attach_array)?);
    if attachment.attach_coverage_index >= ligature_count {
        return Err(ParseError::BadIndex);
    }
    let ligature_attach = match table.read_offset16(
        attachment.attach_array,
        attachment.attach_array + size::U16 + attachment.attach_coverage_index * size::U16,
    )? {
        Some(ligature_attach) => ligature_attach,
        None => return Ok(LookupResult::no_match(first)),
    };
    let component_count = usize::from(table.read_u16(ligature_attach)?);
    if component_count == 0 {
        return Ok(LookupResult::no_match(first));
    }

    let ligature_first_char = ctx.run.first_char(ligature);
    let char_map = ctx.run.char_map();
    let preceding_chars = (ligature_first_char..ctx.run.first_char(first))
        .filter(|&char_index| char_map.get(char_index) == Some(&ligature))
        .count();
    let component = preceding_chars.saturating_sub(1).min(component_count - 1);

    let ligature_anchor = anchor_row(
        table,
        ligature_attach,
        component,
        attachment.class_count,
        attachment.mark_class,
    )?;
    match ligature_anchor {
        Some(ligature_anchor) => {
            attach_mark(ctx, first, ligature, attachment.mark_anchor, ligature_anchor)
        }
        None => Ok(LookupResult::no_match(first)),
    }
}

/// Attach a mark to the mark before it.
pub fn apply_mark_mark_pos(
    ctx: &mut LookupContext<'_, '_>,
    subtable: usize,
    lookup_flag: LookupFlag,
    first: usize,
) -> Result<LookupResult, ParseError> {
    let prev = match prev_glyph_in_lookup(ctx.gdef.as_ref(), ctx.run, first, lookup_flag)? {
        Some(prev) if ctx.run.flags(prev).is_mark() => prev,
        _ => return Ok(LookupResult::no_match(first)),
    };
    let attachment = match mark_attachment(ctx, subtable, first, prev)? {
        Some(attachment) => attachment,
        None => return Ok(LookupResult::no_match(first)),
    };
    let table = ctx.table.table();
    let mark2_anchor = anchor_row(
        table,
        attachment.attach_array,
        attachment.attach_coverage_index,
        attachment.class_count,
        attachment.mark_class,
    )?;
    match mark2_anchor {
        Some(mark2_anchor) => attach_mark(ctx, first, prev, attachment.mark_anchor, mark2_anchor),
        None => Ok(LookupResult::no_match(first)),
    }
}
