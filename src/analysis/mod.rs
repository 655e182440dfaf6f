pub mod loader;

pub use self::loader::{LoadDiagnostic, RallyBundle};

use crate::labels::{Action, Placement, Technique};
use crate::matrix::{JointDistribution, WinRateMatrix};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumIter, EnumString};

// ---------------------------------------------------------------------------
// Rally file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RallyRecord {
    pub meta_info: RallyMeta,
    /// Keyed `"stroke<N>"`. Use [`RallyRecord::strokes`] for numeric order.
    pub rally_info: HashMap<String, RallyStroke>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RallyMeta {
    pub match_name: String,
    pub game_no: u32,
    pub rally_no: u32,
    pub player0: PlayerInfo,
    pub player1: PlayerInfo,
    pub start_player: String,
    pub win_side: String,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub video_position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RallyStroke {
    pub player: String,
    pub stroke_tech: Technique,
    pub ball_placement: Placement,
    #[serde(default)]
    pub context: Option<String>,
    /// Overrides the default `stroke<N>_analysis.json` file name.
    #[serde(default, rename = "analysis_file")]
    pub analysis_file: Option<String>,
}

impl RallyStroke {
    pub fn action(&self) -> Action {
        Action::new(self.stroke_tech, self.ball_placement)
    }
}

/// Parses `"stroke12"` into 12.
pub fn stroke_number(key: &str) -> Option<usize> {
    key.strip_prefix("stroke")?.parse().ok()
}

impl RallyRecord {
    /// Strokes sorted by their numeric index; keys that don't parse are skipped.
    pub fn strokes(&self) -> Vec<(usize, &RallyStroke)> {
        let mut out: Vec<(usize, &RallyStroke)> = self
            .rally_info
            .iter()
            .filter_map(|(k, v)| stroke_number(k).map(|n| (n, v)))
            .collect();
        out.sort_by_key(|(n, _)| *n);
        out
    }

    pub fn player_name(&self, player: &str) -> Option<&str> {
        match player {
            "player0" => Some(&self.meta_info.player0.name),
            "player1" => Some(&self.meta_info.player1.name),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Stroke analysis file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopKEntry {
    pub st: Technique,
    pub bp: Placement,
    pub prob: f64,
}

impl TopKEntry {
    pub fn action(&self) -> Action {
        Action::new(self.st, self.bp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub st: Technique,
    pub bp: Placement,
    pub prob: f64,
    pub winrate: f64,
    pub winrate_change: f64,
    #[serde(default)]
    pub rank: Option<u32>,
}

impl Recommendation {
    pub fn action(&self) -> Action {
        Action::new(self.st, self.bp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualActionInfo {
    pub prob: f64,
    pub winrate: f64,
    pub winrate_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualAction {
    pub st: Technique,
    pub bp: Placement,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub info: Option<ActualActionInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentStrokeAnalysis {
    #[serde(default)]
    pub top_k_distribution: Vec<TopKEntry>,
    #[serde(default)]
    pub st_probs: HashMap<Technique, f64>,
    #[serde(default)]
    pub bp_probs: HashMap<Placement, f64>,
    /// Technique-major, 13 x 9.
    pub joint_distribution: Vec<Vec<f64>>,
    /// Technique-major, 13 x 9.
    pub winrate_matrix: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardPrediction {
    pub stroke_idx: usize,
    pub stroke_key: String,
    pub player: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub top_k_distribution: Vec<TopKEntry>,
    #[serde(default)]
    pub st_probs: HashMap<Technique, f64>,
    #[serde(default)]
    pub bp_probs: HashMap<Placement, f64>,
    /// Transition weights from the previous layer, keyed by
    /// [`transition_key`](crate::labels::transition_key).
    #[serde(default)]
    pub top5_to_top5_flow: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrokeAnalysis {
    pub stroke_key: String,
    pub stroke_index: usize,
    pub player: String,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub model_used: Option<String>,
    pub actual_action: ActualAction,
    pub baseline_winrate: f64,
    #[serde(default)]
    pub avg_winrate: f64,
    pub current_stroke_analysis: CurrentStrokeAnalysis,
    #[serde(default)]
    pub top5_recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub frequent_but_losing: Vec<Recommendation>,
    #[serde(default)]
    pub rare_but_winning: Vec<Recommendation>,
    #[serde(default)]
    pub forward_propagation: Vec<ForwardPrediction>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecommendationList {
    #[strum(serialize = "top")]
    Top,
    FrequentButLosing,
    RareButWinning,
}

impl StrokeAnalysis {
    pub fn joint(&self) -> JointDistribution {
        JointDistribution::from_technique_major(&self.current_stroke_analysis.joint_distribution)
    }

    pub fn win_rates(&self) -> WinRateMatrix {
        WinRateMatrix::from_technique_major(&self.current_stroke_analysis.winrate_matrix)
    }

    pub fn recommendations(&self, list: RecommendationList) -> &[Recommendation] {
        match list {
            RecommendationList::Top => &self.top5_recommendations,
            RecommendationList::FrequentButLosing => &self.frequent_but_losing,
            RecommendationList::RareButWinning => &self.rare_but_winning,
        }
    }

    pub fn recommendation(&self, list: RecommendationList, index: usize) -> Option<&Recommendation> {
        self.recommendations(list).get(index)
    }
}
