use crate::reports;
use clap::Args;
use shotlens::analysis::{RallyBundle, RecommendationList};
use shotlens::config::EngineConfig;
use shotlens::error::{ShotLensError, SlResult};
use shotlens::labels::{Placement, Technique};
use shotlens::matrix::{Axis, Direction, NudgeTarget};
use shotlens::records::RecordId;
use shotlens::session::AnalysisSession;
use std::str::FromStr;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub config: EngineConfig,

    #[arg(short, long)]
    pub stroke: Option<usize>,

    /// Operation script, applied in order. One of:
    /// up|down:cell:<placement>:<technique>, up|down:tech:<technique>,
    /// up|down:place:<placement>, rec:<list>:<i>, record:<id>, add,
    /// model:<list>:<i>, delete:<id>, clear, reset
    #[arg(short, long = "op")]
    pub ops: Vec<SimOp>,

    /// Write the adjustment matrix (percent) to this CSV file.
    #[arg(long)]
    pub csv: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimOp {
    Nudge(Direction, NudgeTarget),
    Recommendation(RecommendationList, usize),
    Record(RecordId),
    AddBlank,
    AddModel(RecommendationList, usize),
    Delete(RecordId),
    Clear,
    Reset,
}

/// Label (`FH`) or zero-based index.
fn placement_index(s: &str) -> Result<usize, String> {
    Placement::from_str(&s.to_uppercase())
        .map(Placement::index)
        .or_else(|_| s.parse().map_err(|_| format!("bad placement '{}'", s)))
}

/// Label (`Topspin`) or zero-based index.
fn technique_index(s: &str) -> Result<usize, String> {
    Technique::from_str(s)
        .map(Technique::index)
        .or_else(|_| s.parse().map_err(|_| format!("bad technique '{}'", s)))
}

fn list_and_index(list: &str, index: &str) -> Result<(RecommendationList, usize), String> {
    let list = RecommendationList::from_str(list).map_err(|_| format!("bad list '{}'", list))?;
    let index = index.parse().map_err(|_| format!("bad index '{}'", index))?;
    Ok((list, index))
}

fn record_id(s: &str) -> Result<RecordId, String> {
    s.parse().map_err(|_| format!("bad record id '{}'", s))
}

impl FromStr for SimOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [dir @ ("up" | "down"), rest @ ..] => {
                let direction = Direction::from_str(dir).map_err(|e| e.to_string())?;
                let target = match rest {
                    ["cell", p, t] => NudgeTarget::cell(placement_index(p)?, technique_index(t)?),
                    ["tech", t] => NudgeTarget::Marginal {
                        axis: Axis::Technique,
                        index: technique_index(t)?,
                    },
                    ["place", p] => NudgeTarget::Marginal {
                        axis: Axis::Placement,
                        index: placement_index(p)?,
                    },
                    _ => return Err(format!("bad nudge target in '{}'", s)),
                };
                Ok(Self::Nudge(direction, target))
            }
            ["rec", list, i] => list_and_index(list, i).map(|(l, i)| Self::Recommendation(l, i)),
            ["model", list, i] => list_and_index(list, i).map(|(l, i)| Self::AddModel(l, i)),
            ["record", id] => record_id(id).map(Self::Record),
            ["delete", id] => record_id(id).map(Self::Delete),
            ["add"] => Ok(Self::AddBlank),
            ["clear"] => Ok(Self::Clear),
            ["reset"] => Ok(Self::Reset),
            _ => Err(format!("unknown operation '{}'", s)),
        }
    }
}

fn apply(session: &mut AnalysisSession, op: &SimOp) -> SlResult<()> {
    match op {
        SimOp::Nudge(direction, target) => session.nudge(*direction, *target).map(drop),
        SimOp::Recommendation(list, i) => session.select_recommendation(*list, *i),
        SimOp::Record(id) => session.select_record(*id),
        SimOp::AddBlank => session.add_blank_record().map(drop),
        SimOp::AddModel(list, i) => session.add_model_record(*list, *i).map(drop),
        SimOp::Delete(id) => session.delete_record(*id),
        SimOp::Clear => session.clear_selection(),
        SimOp::Reset => session.reset(),
    }
}

pub fn run(args: SimulateArgs, bundle: RallyBundle, config: EngineConfig) -> SlResult<()> {
    let mut session = AnalysisSession::new(bundle, config);
    if let Some(stroke) = args.stroke {
        session.select_stroke(stroke)?;
    }
    if session.context().is_none() {
        return Err(ShotLensError::NoActiveAnalysis);
    }

    for op in &args.ops {
        info!(?op, "applying");
        apply(&mut session, op)?;
    }

    let views = session.views();
    if let (Some(path), Some(adjustment)) = (&args.csv, &views.adjustment) {
        reports::write_adjustment_csv(path, adjustment)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(views)?);
        return Ok(());
    }

    if let Some(adjustment) = &views.adjustment {
        reports::print_adjustment(adjustment);
    }
    reports::print_records(&views.records);
    Ok(())
}
