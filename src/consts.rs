/// Number of ball-placement categories (rows of the joint distribution).
pub const PLACEMENT_COUNT: usize = 9;

/// Number of stroke-technique categories (columns of the joint distribution).
pub const TECHNIQUE_COUNT: usize = 13;

/// Total number of (placement, technique) cells.
pub const CELL_COUNT: usize = PLACEMENT_COUNT * TECHNIQUE_COUNT;

/// Constant term of the nudge curve (C0). A nudge never moves less than `C0 / 100`.
pub const DEFAULT_DELTA_FLOOR: f64 = 1.0;

/// Parabolic term of the nudge curve (B0). Peak extra movement at p = 0.5.
pub const DEFAULT_DELTA_BULGE: f64 = 5.0;

/// How many predicted actions each flow layer displays.
pub const DEFAULT_TOP_K: usize = 5;

/// Flow edges at or below this weight are dropped as visual noise.
pub const DEFAULT_MIN_EDGE_WEIGHT: f64 = 1e-3;

/// Tolerance used when checking that a distribution sums to one.
pub const DEFAULT_SUM_TOLERANCE: f64 = 1e-9;
