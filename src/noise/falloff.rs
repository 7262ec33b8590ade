//! Edge falloff tags for tiles on the grid perimeter.

use serde::{Deserialize, Serialize};

/// Which sides of a tile taper toward the baseline.
///
/// Derived from the tile's position in the grid. Y-axis names follow image
/// orientation: `pos_y` is the first sample row of a tile (`ly = 0`, tile row
/// 0 of the grid) and `neg_y` is the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeFalloffTag {
    #[default]
    None,
    EdgeXNeg,
    EdgeXPos,
    EdgeYNeg,
    EdgeYPos,
    CornerNegXPosY,
    CornerNegXNegY,
    CornerPosXPosY,
    CornerPosXNegY,
    /// Grid is a single tile wide; taper both X edges.
    BothX,
    /// Grid is a single tile tall; taper both Y edges.
    BothY,
    /// Grid is a single tile; taper all four edges.
    BothXAndY,
}

/// Per-side falloff switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FalloffSides {
    pub neg_x: bool,
    pub pos_x: bool,
    pub neg_y: bool,
    pub pos_y: bool,
}

impl EdgeFalloffTag {
    /// Returns the tag for the tile at `(cell_x, cell_y)` of a
    /// `range_x × range_y` grid.
    pub fn for_tile(cell_x: u32, cell_y: u32, range_x: u32, range_y: u32) -> Self {
        match (range_x <= 1, range_y <= 1) {
            (true, true) => return EdgeFalloffTag::BothXAndY,
            (true, false) => return EdgeFalloffTag::BothX,
            (false, true) => return EdgeFalloffTag::BothY,
            (false, false) => {}
        }

        let neg_x = cell_x == 0;
        let pos_x = cell_x + 1 == range_x;
        let pos_y = cell_y == 0;
        let neg_y = cell_y + 1 == range_y;

        match (neg_x, pos_x, pos_y, neg_y) {
            (true, _, true, _) => EdgeFalloffTag::CornerNegXPosY,
            (true, _, _, true) => EdgeFalloffTag::CornerNegXNegY,
            (_, true, true, _) => EdgeFalloffTag::CornerPosXPosY,
            (_, true, _, true) => EdgeFalloffTag::CornerPosXNegY,
            (true, _, _, _) => EdgeFalloffTag::EdgeXNeg,
            (_, true, _, _) => EdgeFalloffTag::EdgeXPos,
            (_, _, true, _) => EdgeFalloffTag::EdgeYPos,
            (_, _, _, true) => EdgeFalloffTag::EdgeYNeg,
            _ => EdgeFalloffTag::None,
        }
    }

    /// Sides that taper for this tag.
    pub fn sides(self) -> FalloffSides {
        let mut s = FalloffSides::default();
        match self {
            EdgeFalloffTag::None => {}
            EdgeFalloffTag::EdgeXNeg => s.neg_x = true,
            EdgeFalloffTag::EdgeXPos => s.pos_x = true,
            EdgeFalloffTag::EdgeYNeg => s.neg_y = true,
            EdgeFalloffTag::EdgeYPos => s.pos_y = true,
            EdgeFalloffTag::CornerNegXPosY => {
                s.neg_x = true;
                s.pos_y = true;
            }
            EdgeFalloffTag::CornerNegXNegY => {
                s.neg_x = true;
                s.neg_y = true;
            }
            EdgeFalloffTag::CornerPosXPosY => {
                s.pos_x = true;
                s.pos_y = true;
            }
            EdgeFalloffTag::CornerPosXNegY => {
                s.pos_x = true;
                s.neg_y = true;
            }
            EdgeFalloffTag::BothX => {
                s.neg_x = true;
                s.pos_x = true;
            }
            EdgeFalloffTag::BothY => {
                s.neg_y = true;
                s.pos_y = true;
            }
            EdgeFalloffTag::BothXAndY => {
                s = FalloffSides {
                    neg_x: true,
                    pos_x: true,
                    neg_y: true,
                    pos_y: true,
                };
            }
        }
        s
    }

    /// Short name used in logs and config files.
    pub const fn name(self) -> &'static str {
        match self {
            EdgeFalloffTag::None => "none",
            EdgeFalloffTag::EdgeXNeg => "edge_x_neg",
            EdgeFalloffTag::EdgeXPos => "edge_x_pos",
            EdgeFalloffTag::EdgeYNeg => "edge_y_neg",
            EdgeFalloffTag::EdgeYPos => "edge_y_pos",
            EdgeFalloffTag::CornerNegXPosY => "corner_neg_x_pos_y",
            EdgeFalloffTag::CornerNegXNegY => "corner_neg_x_neg_y",
            EdgeFalloffTag::CornerPosXPosY => "corner_pos_x_pos_y",
            EdgeFalloffTag::CornerPosXNegY => "corner_pos_x_neg_y",
            EdgeFalloffTag::BothX => "both_x",
            EdgeFalloffTag::BothY => "both_y",
            EdgeFalloffTag::BothXAndY => "both_x_and_y",
        }
    }

    /// Attenuation factor in [0, 1] at normalized tile coordinates.
    ///
    /// `u`, `v` are in [-1, 1] with `v = -1` on the first sample row. The factor
    /// is 0 on a tapered edge and reaches 1 at `width` (fraction of the tile)
    /// away from it. `width` is capped at 1 so the opposite edge, which a
    /// neighbouring tile may share, is never attenuated.
    pub fn attenuation(self, u: f64, v: f64, width: f64) -> f64 {
        let sides = self.sides();
        let mut factor = 1.0;
        // Distances from each edge, as a fraction of the tile.
        if sides.neg_x {
            factor *= ramp((u + 1.0) / 2.0, width);
        }
        if sides.pos_x {
            factor *= ramp((1.0 - u) / 2.0, width);
        }
        if sides.pos_y {
            factor *= ramp((v + 1.0) / 2.0, width);
        }
        if sides.neg_y {
            factor *= ramp((1.0 - v) / 2.0, width);
        }
        factor
    }
}

impl std::fmt::Display for EdgeFalloffTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Smoothstep from 0 at the edge to 1 at `width`.
fn ramp(distance: f64, width: f64) -> f64 {
    let width = width.min(1.0);
    if width <= 0.0 {
        return if distance > 0.0 { 1.0 } else { 0.0 };
    }
    let t = (distance / width).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
