//! Glyph offsets and design unit scaling.

use std::ops::{Add, AddAssign};

/// Offset of a glyph from its nominal pen position, in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutOffset {
    pub dx: i32,
    pub dy: i32,
}

impl LayoutOffset {
    pub const fn new(dx: i32, dy: i32) -> Self {
        LayoutOffset { dx, dy }
    }
}

impl Add for LayoutOffset {
    type Output = LayoutOffset;

    fn add(self, rhs: LayoutOffset) -> LayoutOffset {
        LayoutOffset::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl AddAssign for LayoutOffset {
    fn add_assign(&mut self, rhs: LayoutOffset) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

/// Scale `value` in design units to pixels, rounding to nearest.
///
/// The rounding bias is half a design unit per em, away from zero. When `design_units_per_em`
/// is zero the value is taken to be in device units already and is returned unchanged.
pub fn design_to_pixels(design_units_per_em: u16, pixels_per_em: u16, value: i32) -> i32 {
    if design_units_per_em == 0 {
        return value;
    }
    let units = i32::from(design_units_per_em);
    let half_units = units / 2;
    let mut pixels = i32::from(pixels_per_em) * value;
    if pixels > 0 {
        pixels += half_units;
    } else {
        pixels -= half_units;
    }
    pixels / units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_to_pixels_unscaled() {
        assert_eq!(design_to_pixels(0, 12, 345), 345);
        assert_eq!(design_to_pixels(0, 12, -345), -345);
    }

    #[test]
    fn test_design_to_pixels_rounds_to_nearest() {
        // 1000 units at 16ppem: 100 units = 1.6px
        assert_eq!(design_to_pixels(1000, 16, 100), 2);
        // 1.4px
        assert_eq!(design_to_pixels(1000, 14, 100), 1);
        assert_eq!(design_to_pixels(1000, 16, -100), -2);
        assert_eq!(design_to_pixels(1000, 14, -100), -1);
        assert_eq!(design_to_pixels(2048, 2048, 77), 77);
    }

    #[test]
    fn test_design_to_pixels_zero() {
        assert_eq!(design_to_pixels(1000, 16, 0), 0);
    }
}
