//! Row layout for grouped elements.

#[cfg(test)]
#[path = "arrange_test.rs"]
mod arrange_test;

use crate::consts::{ARRANGE_ORIGIN, ARRANGE_PITCH};
use crate::element::{ElementId, ElementPatch};

/// Compute one position patch per element: group `i` occupies the row at
/// `y = origin + i * pitch`, and member `j` within its group sits at
/// `x = origin + j * pitch`. How elements are grouped is the caller's
/// choice; this only places what it is given.
#[must_use]
pub fn row_layout(groups: &[Vec<ElementId>]) -> Vec<(ElementId, ElementPatch)> {
    let (origin_x, origin_y) = ARRANGE_ORIGIN;
    let mut placements = Vec::new();
    let mut y = origin_y;
    for group in groups {
        let mut x = origin_x;
        for id in group {
            placements.push((id.clone(), ElementPatch::position(x, y)));
            x += ARRANGE_PITCH;
        }
        y += ARRANGE_PITCH;
    }
    placements
}
