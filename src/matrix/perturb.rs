use super::{Grid, JointDistribution, ZERO_GRID};
use crate::config::DeltaParams;
use crate::consts::{DEFAULT_DELTA_BULGE, DEFAULT_DELTA_FLOOR, PLACEMENT_COUNT, TECHNIQUE_COUNT};
use crate::error::{ShotLensError, SlResult};
use crate::labels::Action;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    #[strum(serialize = "up", serialize = "increase")]
    Increase,
    #[strum(serialize = "down", serialize = "decrease")]
    Decrease,
}

impl Direction {
    #[inline(always)]
    pub fn sign(self) -> f64 {
        match self {
            Self::Increase => 1.0,
            Self::Decrease => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Axis {
    #[strum(serialize = "technique")]
    Technique,
    #[strum(serialize = "placement")]
    Placement,
}

impl Axis {
    pub fn len(self) -> usize {
        match self {
            Self::Technique => TECHNIQUE_COUNT,
            Self::Placement => PLACEMENT_COUNT,
        }
    }

    #[inline(always)]
    fn contains(self, index: usize, placement: usize, technique: usize) -> bool {
        match self {
            Self::Technique => technique == index,
            Self::Placement => placement == index,
        }
    }
}

/// What a nudge acts on: one joint cell, or a whole technique column /
/// placement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NudgeTarget {
    Cell { placement: usize, technique: usize },
    Marginal { axis: Axis, index: usize },
}

impl NudgeTarget {
    pub fn cell(placement: usize, technique: usize) -> Self {
        Self::Cell {
            placement,
            technique,
        }
    }

    pub fn technique(index: usize) -> Self {
        Self::Marginal {
            axis: Axis::Technique,
            index,
        }
    }

    pub fn placement(index: usize) -> Self {
        Self::Marginal {
            axis: Axis::Placement,
            index,
        }
    }

    pub fn validate(&self) -> SlResult<()> {
        let check = |axis: Axis, index: usize| {
            if index < axis.len() {
                Ok(())
            } else {
                Err(ShotLensError::TargetOutOfRange {
                    axis: match axis {
                        Axis::Technique => "technique",
                        Axis::Placement => "placement",
                    },
                    index,
                    len: axis.len(),
                })
            }
        };
        match *self {
            Self::Cell {
                placement,
                technique,
            } => {
                check(Axis::Placement, placement)?;
                check(Axis::Technique, technique)
            }
            Self::Marginal { axis, index } => check(axis, index),
        }
    }
}

/// Step size as a function of the mass being moved:
/// `delta(p) = (floor + 4 * bulge * p * (1 - p)) / 100`.
///
/// With the default coefficients the step is 0.01 at p = 0 or 1 and 0.06 at p = 0.5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaCurve {
    pub floor: f64,
    pub bulge: f64,
}

impl Default for DeltaCurve {
    fn default() -> Self {
        Self {
            floor: DEFAULT_DELTA_FLOOR,
            bulge: DEFAULT_DELTA_BULGE,
        }
    }
}

impl From<&DeltaParams> for DeltaCurve {
    fn from(params: &DeltaParams) -> Self {
        Self {
            floor: params.delta_floor,
            bulge: params.delta_bulge,
        }
    }
}

impl DeltaCurve {
    #[inline(always)]
    pub fn delta(&self, p: f64) -> f64 {
        (self.floor + 4.0 * self.bulge * p * (1.0 - p)) / 100.0
    }

    /// Moves `p` one step in `direction`, clamped to [0, 1].
    #[inline(always)]
    pub fn step(&self, p: f64, direction: Direction) -> f64 {
        (p + direction.sign() * self.delta(p)).clamp(0.0, 1.0)
    }
}

/// Applies one nudge to a copy of `matrix`.
///
/// Cell: the target moves by `delta(cell)`, every other cell is rescaled so
/// the matrix total is 1. Marginal: the chosen column/row is scaled to its new
/// marginal, then all remaining cells are rescaled to fill `1 - new`.
/// Zero denominators skip the affected scaling step.
pub fn nudge(
    matrix: &JointDistribution,
    direction: Direction,
    target: NudgeTarget,
    curve: &DeltaCurve,
) -> SlResult<JointDistribution> {
    target.validate()?;
    let mut out = matrix.clone();
    match target {
        NudgeTarget::Cell {
            placement,
            technique,
        } => nudge_cell(&mut out, placement, technique, direction, curve),
        NudgeTarget::Marginal { axis, index } => {
            nudge_marginal(&mut out, axis, index, direction, curve)
        }
    }
    Ok(out)
}

fn nudge_cell(
    m: &mut JointDistribution,
    placement: usize,
    technique: usize,
    direction: Direction,
    curve: &DeltaCurve,
) {
    let old = m.get(placement, technique);
    let new = curve.step(old, direction);
    if new == old {
        return;
    }

    let other_sum = m.total() - old;
    let cells = m.cells_mut();
    if other_sum > 0.0 {
        let scale = (1.0 - new) / other_sum;
        for (p, row) in cells.iter_mut().enumerate() {
            for (t, v) in row.iter_mut().enumerate() {
                if p != placement || t != technique {
                    *v *= scale;
                }
            }
        }
    }
    cells[placement][technique] = new;
}

fn nudge_marginal(
    m: &mut JointDistribution,
    axis: Axis,
    index: usize,
    direction: Direction,
    curve: &DeltaCurve,
) {
    let old = match axis {
        Axis::Technique => m.technique_marginal(index),
        Axis::Placement => m.placement_marginal(index),
    };
    // An empty lane cannot be scaled up proportionally.
    if old <= 0.0 {
        return;
    }
    let new = curve.step(old, direction);
    if new == old {
        return;
    }

    let inside = new / old;
    let mut other_sum = 0.0;
    for (p, row) in m.cells_mut().iter_mut().enumerate() {
        for (t, v) in row.iter_mut().enumerate() {
            if axis.contains(index, p, t) {
                *v *= inside;
            } else {
                other_sum += *v;
            }
        }
    }

    if other_sum > 0.0 {
        let outside = (1.0 - new) / other_sum;
        for (p, row) in m.cells_mut().iter_mut().enumerate() {
            for (t, v) in row.iter_mut().enumerate() {
                if !axis.contains(index, p, t) {
                    *v *= outside;
                }
            }
        }
    }
}

/// Change a recommendation applies to `base`: `+seed` on the recommended
/// cell, and `-seed * base[c] / total_other` on every other cell `c`.
///
/// `seed = delta(base[cell])`, capped at `total_other` so no cell goes negative.
pub fn seed_delta_grid(base: &JointDistribution, action: &Action, curve: &DeltaCurve) -> Grid {
    let (pi, ti) = (action.placement.index(), action.technique.index());
    let mut grid = ZERO_GRID;

    let target = base.get(pi, ti);
    let total_other = base.total() - target;
    if total_other <= 0.0 {
        return grid;
    }
    let moved = curve.delta(target).min(total_other);

    for (p, row) in grid.iter_mut().enumerate() {
        for (t, cell) in row.iter_mut().enumerate() {
            *cell = if p == pi && t == ti {
                moved
            } else {
                -moved * base.get(p, t) / total_other
            };
        }
    }
    grid
}

/// `base` shifted toward a recommended action. Always derived from base,
/// never from an already-edited matrix.
pub fn seed_from_recommendation(
    base: &JointDistribution,
    action: &Action,
    curve: &DeltaCurve,
) -> JointDistribution {
    let delta = seed_delta_grid(base, action, curve);
    let mut out = base.clone();
    for (row, drow) in out.cells_mut().iter_mut().zip(delta.iter()) {
        for (v, d) in row.iter_mut().zip(drow.iter()) {
            *v = (*v + d).max(0.0);
        }
    }
    out
}
