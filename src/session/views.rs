use super::context::StrokeContext;
use crate::consts::{PLACEMENT_COUNT, TECHNIQUE_COUNT};
use crate::flow::FlowGraph;
use crate::labels::{Placement, Technique};
use crate::lens::Lens;
use crate::matrix::perturb::seed_delta_grid;
use crate::matrix::{DeltaCurve, Grid, ZERO_GRID};
use crate::records::RecordId;
use serde::Serialize;

/// The model's unedited prediction for the stroke, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionView {
    pub overall_win_rate_percent: f64,
    pub technique_distribution_percent: [f64; TECHNIQUE_COUNT],
    pub placement_marginal_percent: [f64; PLACEMENT_COUNT],
    /// Joint distribution, placement-major.
    pub placement_distribution_percent: Grid,
    /// Win-rate table, placement-major.
    pub win_rate_distribution_percent: Grid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentView {
    /// Change against base, in percentage points, placement-major.
    pub adjustment_percent: Grid,
    /// Fraction in [0, 1].
    pub adjusted_win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub id: RecordId,
    pub label: String,
    pub win_rate_percent: f64,
    pub is_active: bool,
}

/// Everything a renderer needs after the last operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedViews {
    pub stroke: Option<usize>,
    pub lens: Lens,
    pub prediction: Option<PredictionView>,
    pub adjustment: Option<AdjustmentView>,
    pub records: Vec<RecordSummary>,
    pub flow: Option<FlowGraph>,
}

fn to_percent(grid: &Grid) -> Grid {
    let mut out = ZERO_GRID;
    for (row, src) in out.iter_mut().zip(grid.iter()) {
        for (v, s) in row.iter_mut().zip(src.iter()) {
            *v = s * 100.0;
        }
    }
    out
}

impl PredictionView {
    pub fn from_context(ctx: &StrokeContext) -> Self {
        let analysis = ctx.analysis();
        let base = ctx.store().base();

        // Prefer the file's own marginals; fall back to the joint's.
        let marginals = base.technique_marginals();
        let mut technique_distribution_percent = [0.0; TECHNIQUE_COUNT];
        for (t, slot) in Technique::all().iter().zip(technique_distribution_percent.iter_mut()) {
            let p = analysis
                .current_stroke_analysis
                .st_probs
                .get(t)
                .copied()
                .unwrap_or(marginals[t.index()]);
            *slot = p * 100.0;
        }

        let marginals = base.placement_marginals();
        let mut placement_marginal_percent = [0.0; PLACEMENT_COUNT];
        for (bp, slot) in Placement::all().iter().zip(placement_marginal_percent.iter_mut()) {
            let p = analysis
                .current_stroke_analysis
                .bp_probs
                .get(bp)
                .copied()
                .unwrap_or(marginals[bp.index()]);
            *slot = p * 100.0;
        }

        Self {
            overall_win_rate_percent: analysis.baseline_winrate * 100.0,
            technique_distribution_percent,
            placement_marginal_percent,
            placement_distribution_percent: to_percent(base.cells()),
            win_rate_distribution_percent: to_percent(&ctx.win_rates().to_placement_major()),
        }
    }
}

impl AdjustmentView {
    /// Under a recommendation lens this previews the seed without applying it.
    pub fn from_context(ctx: &StrokeContext, curve: &DeltaCurve) -> Self {
        if let Some(r) = ctx.lens().active_recommendation() {
            if let Ok(rec) = ctx.recommendation(r) {
                let seed = seed_delta_grid(ctx.store().base(), &rec.action(), curve);
                return Self {
                    adjustment_percent: to_percent(&seed),
                    adjusted_win_rate: ctx.analysis().baseline_winrate + rec.winrate_change,
                };
            }
        }

        let store = ctx.store();
        Self {
            adjustment_percent: to_percent(&store.current().delta_from(store.base())),
            adjusted_win_rate: ctx.current_win_rate(),
        }
    }
}

impl RecordSummary {
    pub fn list(ctx: &StrokeContext) -> Vec<Self> {
        let active = ctx.lens().active_record();
        ctx.log()
            .list()
            .map(|r| Self {
                id: r.id,
                label: r.label.clone(),
                win_rate_percent: r.win_rate * 100.0,
                is_active: active == Some(r.id),
            })
            .collect()
    }
}
