use crate::analysis::{Recommendation, RecommendationList, StrokeAnalysis};
use crate::error::{ShotLensError, SlResult};
use crate::lens::{Lens, RecommendationRef};
use crate::matrix::perturb::{self, seed_from_recommendation};
use crate::matrix::{evaluate, DeltaCurve, Direction, JointMatrixStore, NudgeTarget, WinRateMatrix};
use crate::records::{AdjustmentRecord, AdjustmentRecordLog, RecordId, RecordIdGen, MANUAL_LABEL};
use tracing::{debug, info};

/// Everything owned by the stroke currently being edited.
#[derive(Debug, Clone)]
pub struct StrokeContext {
    stroke: usize,
    analysis: StrokeAnalysis,
    win_rates: WinRateMatrix,
    store: JointMatrixStore,
    log: AdjustmentRecordLog,
    lens: Lens,
}

impl StrokeContext {
    /// Fresh working state: current = base, no lens, `log` carried over from
    /// earlier visits to this stroke.
    pub fn new(stroke: usize, analysis: StrokeAnalysis, log: AdjustmentRecordLog) -> Self {
        let store = JointMatrixStore::new(analysis.joint());
        let win_rates = analysis.win_rates();
        Self {
            stroke,
            analysis,
            win_rates,
            store,
            log,
            lens: Lens::None,
        }
    }

    /// Gives the record log back for safekeeping.
    pub fn into_log(self) -> AdjustmentRecordLog {
        self.log
    }

    pub fn stroke(&self) -> usize {
        self.stroke
    }

    pub fn analysis(&self) -> &StrokeAnalysis {
        &self.analysis
    }

    pub fn win_rates(&self) -> &WinRateMatrix {
        &self.win_rates
    }

    pub fn store(&self) -> &JointMatrixStore {
        &self.store
    }

    pub fn log(&self) -> &AdjustmentRecordLog {
        &self.log
    }

    pub fn lens(&self) -> Lens {
        self.lens
    }

    pub fn recommendation(&self, r: RecommendationRef) -> SlResult<&Recommendation> {
        self.analysis
            .recommendation(r.list, r.index)
            .ok_or(ShotLensError::UnknownRecommendation {
                list: r.list,
                index: r.index,
            })
    }

    /// Win rate of the working matrix.
    pub fn current_win_rate(&self) -> f64 {
        evaluate(self.store.current(), &self.win_rates)
    }

    /// Applies one nudge and files the result in the record log.
    ///
    /// Under a recommendation lens the nudge starts from base seeded toward
    /// that recommendation (recomputed every call); otherwise it compounds on
    /// the working matrix.
    pub fn nudge(
        &mut self,
        direction: Direction,
        target: NudgeTarget,
        curve: &DeltaCurve,
        ids: &mut RecordIdGen,
    ) -> SlResult<RecordId> {
        let (start, based_on) = match self.lens {
            Lens::Recommendation(r) => {
                let action = self.recommendation(r)?.action();
                (
                    seed_from_recommendation(self.store.base(), &action, curve),
                    Some(action),
                )
            }
            Lens::Record(id) if !self.log.contains(id) => {
                return Err(ShotLensError::UnknownRecord(id));
            }
            _ => (self.store.current().clone(), None),
        };

        let next = perturb::nudge(&start, direction, target, curve)?;
        let win_rate = evaluate(&next, &self.win_rates);
        self.store.set_current(next.clone());

        let id = match (self.lens, based_on) {
            (Lens::Record(id), _) => {
                if let Some(record) = self.log.get_mut(id) {
                    record.overwrite(win_rate, next);
                }
                id
            }
            (_, Some(action)) => {
                let label = format!("Based on {}-{}", action.technique, action.placement);
                let id = self
                    .log
                    .append(AdjustmentRecord::new(ids.next_id(), label, win_rate, Some(next)));
                info!(stroke = self.stroke, record = %id, "promoted recommendation to record");
                id
            }
            _ => {
                let id = self.log.append(AdjustmentRecord::new(
                    ids.next_id(),
                    MANUAL_LABEL,
                    win_rate,
                    Some(next),
                ));
                debug!(stroke = self.stroke, record = %id, "created manual record");
                id
            }
        };
        self.lens = Lens::Record(id);
        Ok(id)
    }

    /// Working matrix stays as is until the next nudge.
    pub fn select_recommendation(&mut self, list: RecommendationList, index: usize) -> SlResult<()> {
        let r = RecommendationRef { list, index };
        self.recommendation(r)?;
        self.lens = Lens::Recommendation(r);
        Ok(())
    }

    /// Restores the record's snapshot, or base when it has none.
    pub fn select_record(&mut self, id: RecordId) -> SlResult<()> {
        let record = self.log.get(id).ok_or(ShotLensError::UnknownRecord(id))?;
        match &record.snapshot {
            Some(snapshot) => self.store.set_current(snapshot.clone()),
            None => self.store.reset(),
        }
        self.lens = Lens::Record(id);
        Ok(())
    }

    /// Drops the lens without touching the working matrix.
    pub fn clear_selection(&mut self) {
        self.lens.clear();
    }

    /// Working matrix back to base. An active record is rewritten to base and
    /// stays active; a recommendation lens is dropped.
    pub fn reset(&mut self) {
        self.store.reset();
        match self.lens {
            Lens::Record(id) => {
                let baseline = self.analysis.baseline_winrate;
                let base = self.store.base().clone();
                if let Some(record) = self.log.get_mut(id) {
                    record.overwrite(baseline, base);
                }
            }
            Lens::Recommendation(_) => self.lens.clear(),
            Lens::None => {}
        }
    }

    /// New record holding base, made active.
    pub fn add_blank_record(&mut self, ids: &mut RecordIdGen) -> RecordId {
        let id = self.log.append(AdjustmentRecord::new(
            ids.next_id(),
            MANUAL_LABEL,
            self.analysis.baseline_winrate,
            Some(self.store.base().clone()),
        ));
        self.store.reset();
        self.lens = Lens::Record(id);
        id
    }

    /// Copies a recommendation into the log without a snapshot. Lens and
    /// working matrix are untouched.
    pub fn add_model_record(
        &mut self,
        list: RecommendationList,
        index: usize,
        ids: &mut RecordIdGen,
    ) -> SlResult<RecordId> {
        let rec = self.recommendation(RecommendationRef { list, index })?;
        let label = format!("Model: {} {}", rec.st, rec.bp);
        let win_rate = rec.winrate;
        Ok(self
            .log
            .append(AdjustmentRecord::new(ids.next_id(), label, win_rate, None)))
    }

    /// Deleting the active record also reverts the working matrix to base.
    pub fn delete_record(&mut self, id: RecordId) -> SlResult<()> {
        self.log.remove(id).ok_or(ShotLensError::UnknownRecord(id))?;
        if self.lens.release_record(id) {
            self.store.reset();
        }
        Ok(())
    }
}
