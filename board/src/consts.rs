//! Shared numeric constants for the board crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width a resize may produce, in board units.
pub const MIN_ELEMENT_WIDTH: f64 = 100.0;

/// Smallest height a resize may produce, in board units.
pub const MIN_ELEMENT_HEIGHT: f64 = 80.0;

// ── Stacking ────────────────────────────────────────────────────

/// Running-maximum rank at which promotion compacts all ranks to `1..N`
/// before assigning, bounding rank growth.
pub const Z_RANK_CEILING: i64 = 1000;

// ── Creation defaults ───────────────────────────────────────────

/// Default footprint of a formula card.
pub const FORMULA_SIZE: (f64, f64) = (224.0, 200.0);

/// Default footprint of a note card.
pub const NOTE_SIZE: (f64, f64) = (224.0, 200.0);

/// Default footprint of a table card.
pub const TABLE_SIZE: (f64, f64) = (360.0, 240.0);

/// Default footprint of an image tile.
pub const IMAGE_SIZE: (f64, f64) = (200.0, 150.0);

/// Background tokens drawn from for freshly created cards.
pub const COLOR_PALETTE: [&str; 4] = ["#FEF3C7", "#DBEAFE", "#FCE7F3", "#D1FAE5"];

/// Background token for freshly created image tiles.
pub const IMAGE_COLOR: &str = "#ffffff";

// ── Layout ──────────────────────────────────────────────────────

/// Top-left corner of the arranged grid.
pub const ARRANGE_ORIGIN: (f64, f64) = (100.0, 100.0);

/// Spacing between grid columns and rows, in board units.
pub const ARRANGE_PITCH: f64 = 250.0;
