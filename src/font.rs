//! The font interface consumed by the layout engine and the metrics of a layout call.

use crate::glyph_position::LayoutOffset;
use crate::tables::FontTableProvider;

/// Capabilities the layout engine needs from a font.
///
/// Table access comes from `FontTableProvider`: a missing `GSUB`, `GPOS` or `GDEF` table is
/// reported as `Ok(None)` and is a normal state, not an error.
pub trait LayoutFont: FontTableProvider {
    /// The position of contour point `point_index` of `glyph_id`, in pixels at the current
    /// size, if the font is able to supply it.
    ///
    /// Only anchor format 2 asks for contour points. Returning `None` makes the anchor fall
    /// back to its design coordinates.
    fn glyph_contour_point(&self, glyph_id: u16, point_index: u16) -> Option<LayoutOffset>;
}

/// Direction in which glyphs advance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextFlowDirection {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl TextFlowDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(
            self,
            TextFlowDirection::LeftToRight | TextFlowDirection::RightToLeft
        )
    }
}

/// Scaling and direction information for one layout call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayoutMetrics {
    pub direction: TextFlowDirection,
    /// Design units per em. Zero means values are already in device units.
    pub design_em_height: u16,
    pub pixels_em_width: u16,
    pub pixels_em_height: u16,
}

impl LayoutMetrics {
    pub fn new(
        direction: TextFlowDirection,
        design_em_height: u16,
        pixels_em_width: u16,
        pixels_em_height: u16,
    ) -> LayoutMetrics {
        LayoutMetrics {
            direction,
            design_em_height,
            pixels_em_width,
            pixels_em_height,
        }
    }

    /// Metrics that leave design units unscaled.
    pub fn unscaled(direction: TextFlowDirection) -> LayoutMetrics {
        LayoutMetrics::new(direction, 0, 0, 0)
    }
}
