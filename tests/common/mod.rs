#![allow(dead_code)]

use shotlens::analysis::{
    ActualAction, CurrentStrokeAnalysis, ForwardPrediction, PlayerInfo, RallyBundle, RallyMeta,
    RallyRecord, RallyStroke, Recommendation, RecommendationList, StrokeAnalysis, TopKEntry,
};
use shotlens::consts::{CELL_COUNT, PLACEMENT_COUNT, TECHNIQUE_COUNT};
use shotlens::labels::{transition_key, Action, Placement, Technique};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// 13 x 9 table with every cell equal to `v`.
pub fn filled_technique_major(v: f64) -> Vec<Vec<f64>> {
    vec![vec![v; PLACEMENT_COUNT]; TECHNIQUE_COUNT]
}

pub fn uniform_technique_major() -> Vec<Vec<f64>> {
    filled_technique_major(1.0 / CELL_COUNT as f64)
}

/// Win rates that differ per cell: `0.3 + 0.02 * t + 0.01 * p`.
pub fn graded_win_rates() -> Vec<Vec<f64>> {
    (0..TECHNIQUE_COUNT)
        .map(|t| {
            (0..PLACEMENT_COUNT)
                .map(|p| 0.3 + 0.02 * t as f64 + 0.01 * p as f64)
                .collect()
        })
        .collect()
}

pub fn top_k(entries: &[(Technique, Placement, f64)]) -> Vec<TopKEntry> {
    entries
        .iter()
        .map(|&(st, bp, prob)| TopKEntry { st, bp, prob })
        .collect()
}

pub fn rec(st: Technique, bp: Placement, winrate: f64, winrate_change: f64) -> Recommendation {
    Recommendation {
        st,
        bp,
        prob: 0.1,
        winrate,
        winrate_change,
        rank: None,
    }
}

/// Transition map over `(from, to, weight)` triples.
pub fn flow_map(pairs: &[(Action, Action, f64)]) -> HashMap<String, f64> {
    pairs
        .iter()
        .map(|(a, b, w)| (transition_key(a, b), *w))
        .collect()
}

pub fn forward(
    stroke: usize,
    entries: &[(Technique, Placement, f64)],
    flow: HashMap<String, f64>,
) -> ForwardPrediction {
    ForwardPrediction {
        stroke_idx: stroke - 1,
        stroke_key: format!("stroke{}", stroke),
        player: format!("P{}", stroke % 2),
        model: "test".into(),
        top_k_distribution: top_k(entries),
        st_probs: HashMap::new(),
        bp_probs: HashMap::new(),
        top5_to_top5_flow: flow,
    }
}

/// Builder for a stroke analysis record with uniform joint and graded win rates.
pub struct AnalysisBuilder {
    analysis: StrokeAnalysis,
}

impl AnalysisBuilder {
    pub fn new(stroke: usize) -> Self {
        Self {
            analysis: StrokeAnalysis {
                stroke_key: format!("stroke{}", stroke),
                stroke_index: stroke,
                player: "player0".into(),
                player_name: None,
                model_used: Some("test".into()),
                actual_action: ActualAction {
                    st: Technique::Push,
                    bp: Placement::Bs,
                    rank: None,
                    info: None,
                },
                baseline_winrate: 0.5,
                avg_winrate: 0.5,
                current_stroke_analysis: CurrentStrokeAnalysis {
                    top_k_distribution: Vec::new(),
                    st_probs: HashMap::new(),
                    bp_probs: HashMap::new(),
                    joint_distribution: uniform_technique_major(),
                    winrate_matrix: graded_win_rates(),
                },
                top5_recommendations: Vec::new(),
                frequent_but_losing: Vec::new(),
                rare_but_winning: Vec::new(),
                forward_propagation: Vec::new(),
            },
        }
    }

    pub fn joint(mut self, raw: Vec<Vec<f64>>) -> Self {
        self.analysis.current_stroke_analysis.joint_distribution = raw;
        self
    }

    pub fn win_rates(mut self, raw: Vec<Vec<f64>>) -> Self {
        self.analysis.current_stroke_analysis.winrate_matrix = raw;
        self
    }

    pub fn baseline(mut self, v: f64) -> Self {
        self.analysis.baseline_winrate = v;
        self
    }

    pub fn top_k(mut self, entries: &[(Technique, Placement, f64)]) -> Self {
        self.analysis.current_stroke_analysis.top_k_distribution = top_k(entries);
        self
    }

    pub fn recommendations(mut self, list: RecommendationList, recs: Vec<Recommendation>) -> Self {
        match list {
            RecommendationList::Top => self.analysis.top5_recommendations = recs,
            RecommendationList::FrequentButLosing => self.analysis.frequent_but_losing = recs,
            RecommendationList::RareButWinning => self.analysis.rare_but_winning = recs,
        }
        self
    }

    pub fn forward(mut self, chain: Vec<ForwardPrediction>) -> Self {
        self.analysis.forward_propagation = chain;
        self
    }

    pub fn build(self) -> StrokeAnalysis {
        self.analysis
    }
}

/// Realized actions for strokes 1..=5, repeated as needed.
pub const REALIZED: [(Technique, Placement); 5] = [
    (Technique::Others, Placement::Ms),
    (Technique::Push, Placement::Bh),
    (Technique::Topspin, Placement::Fl),
    (Technique::Block, Placement::Bl),
    (Technique::Smash, Placement::Fh),
];

pub fn rally(strokes: usize) -> RallyRecord {
    let rally_info = (1..=strokes)
        .map(|n| {
            let (st, bp) = REALIZED[(n - 1) % REALIZED.len()];
            (
                format!("stroke{}", n),
                RallyStroke {
                    player: format!("player{}", (n + 1) % 2),
                    stroke_tech: st,
                    ball_placement: bp,
                    context: None,
                    analysis_file: None,
                },
            )
        })
        .collect();

    RallyRecord {
        meta_info: RallyMeta {
            match_name: "Test Open".into(),
            game_no: 1,
            rally_no: 7,
            player0: PlayerInfo {
                name: "Alice".into(),
                video_position: "up".into(),
            },
            player1: PlayerInfo {
                name: "Bob".into(),
                video_position: "down".into(),
            },
            start_player: "player0".into(),
            win_side: "player1".into(),
            start_time: None,
            end_time: None,
        },
        rally_info,
    }
}

/// Rally of `strokes` strokes with a default analysis for every listed stroke.
pub fn bundle_with(strokes: usize, analyses: Vec<StrokeAnalysis>) -> RallyBundle {
    let map: BTreeMap<usize, StrokeAnalysis> =
        analyses.into_iter().map(|a| (a.stroke_index, a)).collect();
    RallyBundle::from_parts(rally(strokes), map)
}

pub fn standard_bundle() -> RallyBundle {
    let recs = vec![
        rec(Technique::Topspin, Placement::Fh, 0.62, 0.07),
        rec(Technique::Flick, Placement::Bs, 0.58, 0.03),
    ];
    bundle_with(
        3,
        vec![
            AnalysisBuilder::new(1).build(),
            AnalysisBuilder::new(2)
                .recommendations(RecommendationList::Top, recs)
                .build(),
            AnalysisBuilder::new(3).build(),
        ],
    )
}

/// Writes `rally.json` plus one analysis file per stroke not in `skip`.
/// Returns `(rally_path, analysis_dir)`.
pub fn write_rally_dir(root: &Path, strokes: usize, skip: &[usize]) -> (PathBuf, PathBuf) {
    let analysis_dir = root.join("analysis");
    fs::create_dir_all(&analysis_dir).unwrap();

    let rally_path = root.join("rally.json");
    fs::write(&rally_path, serde_json::to_string_pretty(&rally(strokes)).unwrap()).unwrap();

    for n in (1..=strokes).filter(|n| !skip.contains(n)) {
        let analysis = AnalysisBuilder::new(n)
            .top_k(&[
                (Technique::Topspin, Placement::Fh, 0.4),
                (Technique::Push, Placement::Bl, 0.3),
                (Technique::Block, Placement::Ms, 0.1),
            ])
            .recommendations(
                RecommendationList::Top,
                vec![rec(Technique::Topspin, Placement::Fh, 0.6, 0.1)],
            )
            .build();
        fs::write(
            analysis_dir.join(format!("stroke{}_analysis.json", n)),
            serde_json::to_string(&analysis).unwrap(),
        )
        .unwrap();
    }
    (rally_path, analysis_dir)
}
