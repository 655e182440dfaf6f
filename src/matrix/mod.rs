pub mod perturb;
pub mod store;
pub mod winrate;

pub use self::perturb::{Axis, DeltaCurve, Direction, NudgeTarget};
pub use self::store::JointMatrixStore;
pub use self::winrate::evaluate;

use crate::consts::{CELL_COUNT, PLACEMENT_COUNT, TECHNIQUE_COUNT};
use crate::labels::{Placement, Technique};
use serde::{Deserialize, Serialize};

/// Placement-major grid: `grid[placement][technique]`.
pub type Grid = [[f64; TECHNIQUE_COUNT]; PLACEMENT_COUNT];

pub const ZERO_GRID: Grid = [[0.0; TECHNIQUE_COUNT]; PLACEMENT_COUNT];

/// Probability over all (placement, technique) pairs, stored placement-major.
///
/// Source files ship this matrix technique-major; the only way in from raw
/// data is [`JointDistribution::from_technique_major`], which transposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDistribution {
    cells: Grid,
}

impl JointDistribution {
    pub fn from_cells(cells: Grid) -> Self {
        Self { cells }
    }

    pub fn uniform() -> Self {
        Self {
            cells: [[1.0 / CELL_COUNT as f64; TECHNIQUE_COUNT]; PLACEMENT_COUNT],
        }
    }

    /// Builds from source rows `raw[technique][placement]`. Missing or
    /// non-finite entries read as 0.
    pub fn from_technique_major(raw: &[Vec<f64>]) -> Self {
        let mut cells = ZERO_GRID;
        for (p, row) in cells.iter_mut().enumerate() {
            for (t, cell) in row.iter_mut().enumerate() {
                *cell = read_entry(raw, t, p);
            }
        }
        Self { cells }
    }

    #[inline(always)]
    pub fn get(&self, placement: usize, technique: usize) -> f64 {
        self.cells[placement][technique]
    }

    pub fn at(&self, placement: Placement, technique: Technique) -> f64 {
        self.cells[placement.index()][technique.index()]
    }

    pub fn cells(&self) -> &Grid {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut Grid {
        &mut self.cells
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }

    pub fn technique_marginal(&self, technique: usize) -> f64 {
        self.cells.iter().map(|row| row[technique]).sum()
    }

    pub fn placement_marginal(&self, placement: usize) -> f64 {
        self.cells[placement].iter().sum()
    }

    pub fn technique_marginals(&self) -> [f64; TECHNIQUE_COUNT] {
        let mut out = [0.0; TECHNIQUE_COUNT];
        for (t, slot) in out.iter_mut().enumerate() {
            *slot = self.technique_marginal(t);
        }
        out
    }

    pub fn placement_marginals(&self) -> [f64; PLACEMENT_COUNT] {
        let mut out = [0.0; PLACEMENT_COUNT];
        for (p, slot) in out.iter_mut().enumerate() {
            *slot = self.placement_marginal(p);
        }
        out
    }

    /// True when every entry lies in [0, 1] and the total is within `tolerance` of 1.
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        let in_range = self
            .cells
            .iter()
            .flatten()
            .all(|&v| v.is_finite() && (0.0..=1.0).contains(&v));
        in_range && (self.total() - 1.0).abs() <= tolerance
    }

    /// Cell-wise `self - base`.
    pub fn delta_from(&self, base: &JointDistribution) -> Grid {
        let mut out = ZERO_GRID;
        for (p, row) in out.iter_mut().enumerate() {
            for (t, cell) in row.iter_mut().enumerate() {
                *cell = self.cells[p][t] - base.cells[p][t];
            }
        }
        out
    }
}

/// Probability of winning the rally given each (technique, placement) choice.
///
/// Kept in the source's technique-major layout (`[technique][placement]`);
/// read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRateMatrix {
    by_technique: [[f64; PLACEMENT_COUNT]; TECHNIQUE_COUNT],
}

impl WinRateMatrix {
    pub fn from_technique_major(raw: &[Vec<f64>]) -> Self {
        let mut by_technique = [[0.0; PLACEMENT_COUNT]; TECHNIQUE_COUNT];
        for (t, row) in by_technique.iter_mut().enumerate() {
            for (p, cell) in row.iter_mut().enumerate() {
                *cell = read_entry(raw, t, p);
            }
        }
        Self { by_technique }
    }

    pub fn uniform(win_rate: f64) -> Self {
        Self {
            by_technique: [[win_rate; PLACEMENT_COUNT]; TECHNIQUE_COUNT],
        }
    }

    #[inline(always)]
    pub fn at(&self, technique: usize, placement: usize) -> f64 {
        self.by_technique[technique][placement]
    }

    /// Placement-major copy for display alongside a [`JointDistribution`].
    pub fn to_placement_major(&self) -> Grid {
        let mut out = ZERO_GRID;
        for (p, row) in out.iter_mut().enumerate() {
            for (t, cell) in row.iter_mut().enumerate() {
                *cell = self.by_technique[t][p];
            }
        }
        out
    }
}

fn read_entry(raw: &[Vec<f64>], outer: usize, inner: usize) -> f64 {
    raw.get(outer)
        .and_then(|row| row.get(inner))
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
