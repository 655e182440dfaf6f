pub mod context;
pub mod views;

pub use self::context::StrokeContext;
pub use self::views::{AdjustmentView, DerivedViews, PredictionView, RecordSummary};

use crate::analysis::{RallyBundle, RecommendationList};
use crate::config::EngineConfig;
use crate::error::{ShotLensError, SlResult};
use crate::flow::FlowGraphBuilder;
use crate::matrix::{Axis, DeltaCurve, Direction, NudgeTarget};
use crate::records::{AdjustmentRecordLog, RecordId, RecordIdGen};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// One loaded rally and the editing state of each of its strokes.
///
/// Only the selected stroke has a live [`StrokeContext`]; the record logs of
/// the others are parked in `saved_logs` until they are selected again.
/// Every mutating call ends with [`AnalysisSession::refresh`].
pub struct AnalysisSession {
    bundle: RallyBundle,
    config: EngineConfig,
    curve: DeltaCurve,
    flow: FlowGraphBuilder,
    ids: RecordIdGen,
    selected: Option<usize>,
    active: Option<StrokeContext>,
    saved_logs: HashMap<usize, AdjustmentRecordLog>,
    views: DerivedViews,
}

impl AnalysisSession {
    /// Opens the bundle on its default stroke.
    pub fn new(bundle: RallyBundle, config: EngineConfig) -> Self {
        let curve = DeltaCurve::from(&config.delta);
        let flow = FlowGraphBuilder::from(&config.flow);
        let default_stroke = bundle.default_stroke();

        let mut session = Self {
            bundle,
            config,
            curve,
            flow,
            ids: RecordIdGen::default(),
            selected: None,
            active: None,
            saved_logs: HashMap::new(),
            views: DerivedViews::default(),
        };
        if let Some(stroke) = default_stroke {
            session.load_stroke(stroke);
        }
        session.refresh();
        session
    }

    pub fn bundle(&self) -> &RallyBundle {
        &self.bundle
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selected_stroke(&self) -> Option<usize> {
        self.selected
    }

    pub fn context(&self) -> Option<&StrokeContext> {
        self.active.as_ref()
    }

    pub fn views(&self) -> &DerivedViews {
        &self.views
    }

    /// Saves the current stroke's log and loads `stroke` with a fresh working
    /// matrix and no lens. A stroke without analysis is selectable; its views
    /// are empty.
    pub fn select_stroke(&mut self, stroke: usize) -> SlResult<()> {
        if !self.bundle.rally.strokes().iter().any(|(n, _)| *n == stroke) {
            return Err(ShotLensError::Validation(format!(
                "Rally has no stroke {}",
                stroke
            )));
        }
        self.save_active();
        self.load_stroke(stroke);
        self.refresh();
        Ok(())
    }

    fn save_active(&mut self) {
        if let Some(ctx) = self.active.take() {
            let stroke = ctx.stroke();
            self.saved_logs.insert(stroke, ctx.into_log());
        }
    }

    fn load_stroke(&mut self, stroke: usize) {
        self.selected = Some(stroke);
        let log = self.saved_logs.remove(&stroke).unwrap_or_default();
        self.active = match self.bundle.analysis(stroke) {
            Some(analysis) => {
                let ctx = StrokeContext::new(stroke, analysis.clone(), log);
                let base = ctx.store().base();
                if !base.is_normalized(self.config.delta.sum_tolerance) {
                    warn!(stroke, total = base.total(), "base distribution is not normalized");
                }
                Some(ctx)
            }
            None => {
                debug!(stroke, "no analysis for stroke, views left empty");
                self.saved_logs.insert(stroke, log);
                None
            }
        };
        info!(stroke, "selected stroke");
    }

    fn context_mut(&mut self) -> SlResult<&mut StrokeContext> {
        self.active.as_mut().ok_or(ShotLensError::NoActiveAnalysis)
    }

    /// Recomputes every derived view from the live context.
    pub fn refresh(&mut self) {
        self.views = match &self.active {
            Some(ctx) => DerivedViews {
                stroke: self.selected,
                lens: ctx.lens(),
                prediction: Some(PredictionView::from_context(ctx)),
                adjustment: Some(AdjustmentView::from_context(ctx, &self.curve)),
                records: RecordSummary::list(ctx),
                flow: self.flow.build_for(&self.bundle, ctx.stroke()),
            },
            None => DerivedViews {
                stroke: self.selected,
                ..DerivedViews::default()
            },
        };
    }

    pub fn nudge(&mut self, direction: Direction, target: NudgeTarget) -> SlResult<RecordId> {
        let curve = self.curve;
        let ids = &mut self.ids;
        let ctx = self.active.as_mut().ok_or(ShotLensError::NoActiveAnalysis)?;
        let id = ctx.nudge(direction, target, &curve, ids)?;
        self.refresh();
        Ok(id)
    }

    pub fn nudge_cell(
        &mut self,
        direction: Direction,
        placement: usize,
        technique: usize,
    ) -> SlResult<RecordId> {
        self.nudge(direction, NudgeTarget::cell(placement, technique))
    }

    pub fn nudge_marginal(
        &mut self,
        direction: Direction,
        axis: Axis,
        index: usize,
    ) -> SlResult<RecordId> {
        self.nudge(direction, NudgeTarget::Marginal { axis, index })
    }

    pub fn select_recommendation(&mut self, list: RecommendationList, index: usize) -> SlResult<()> {
        self.context_mut()?.select_recommendation(list, index)?;
        self.refresh();
        Ok(())
    }

    pub fn select_record(&mut self, id: RecordId) -> SlResult<()> {
        self.context_mut()?.select_record(id)?;
        self.refresh();
        Ok(())
    }

    pub fn clear_selection(&mut self) -> SlResult<()> {
        self.context_mut()?.clear_selection();
        self.refresh();
        Ok(())
    }

    pub fn reset(&mut self) -> SlResult<()> {
        self.context_mut()?.reset();
        self.refresh();
        Ok(())
    }

    pub fn add_blank_record(&mut self) -> SlResult<RecordId> {
        let ids = &mut self.ids;
        let ctx = self.active.as_mut().ok_or(ShotLensError::NoActiveAnalysis)?;
        let id = ctx.add_blank_record(ids);
        self.refresh();
        Ok(id)
    }

    pub fn add_model_record(&mut self, list: RecommendationList, index: usize) -> SlResult<RecordId> {
        let ids = &mut self.ids;
        let ctx = self.active.as_mut().ok_or(ShotLensError::NoActiveAnalysis)?;
        let id = ctx.add_model_record(list, index, ids)?;
        self.refresh();
        Ok(id)
    }

    pub fn delete_record(&mut self, id: RecordId) -> SlResult<()> {
        self.context_mut()?.delete_record(id)?;
        self.refresh();
        Ok(())
    }
}
