use approx::assert_abs_diff_eq;
use shotlens::flow::{FlowGraphBuilder, PastStroke};
use shotlens::labels::{Action, Placement, Technique};

mod common;
use common::{bundle_with, flow_map, forward, AnalysisBuilder};

const STROKE2_TOP5: [(Technique, Placement, f64); 5] = [
    (Technique::Topspin, Placement::Fh, 0.40),
    (Technique::Push, Placement::Bl, 0.30),
    (Technique::Block, Placement::Ms, 0.15),
    (Technique::Smash, Placement::Fh, 0.10),
    (Technique::Lob, Placement::Bl, 0.05),
];

const STROKE3_TOP5: [(Technique, Placement, f64); 5] = [
    (Technique::Block, Placement::Bh, 0.30),
    (Technique::Push, Placement::Bs, 0.20),
    (Technique::Flick, Placement::Fs, 0.10),
    (Technique::Chopping, Placement::Ml, 0.10),
    (Technique::Twist, Placement::Bh, 0.05),
];

#[test]
fn test_past_active_forward_scenario() {
    println!("\n=== TEST: Past -> active -> forward flow ===");
    let topspin_fh = Action::new(Technique::Topspin, Placement::Fh);
    let block_ms = Action::new(Technique::Block, Placement::Ms);
    let block_bh = Action::new(Technique::Block, Placement::Bh);
    let push_bs = Action::new(Technique::Push, Placement::Bs);

    let map = flow_map(&[(topspin_fh, block_bh, 0.12), (block_ms, push_bs, 0.04)]);
    let analysis = AnalysisBuilder::new(2)
        .top_k(&STROKE2_TOP5)
        .forward(vec![forward(3, &STROKE3_TOP5, map)])
        .build();
    let past = [PastStroke {
        stroke: 1,
        player: "Alice".into(),
        action: Action::new(Technique::Push, Placement::Bh),
    }];

    let graph = FlowGraphBuilder::default().build(&past, 2, &analysis);
    assert_eq!(graph.layers.len(), 3);
    assert!(graph.layers[0].is_past);
    assert_eq!(graph.layers[0].nodes[0].probability, 1.0);
    assert!(!graph.layers[1].is_past);
    assert_eq!(graph.layers[2].stroke, 3);

    // stroke1 -> stroke2: dense continuity edges
    let first: Vec<_> = graph.edges_between(0).collect();
    assert_eq!(first.len(), 5);
    assert!(first.iter().all(|e| e.weight == 1.0 && e.continuity));

    // stroke2 -> stroke3: only the two mapped pairs
    let second: Vec<_> = graph.edges_between(1).collect();
    assert_eq!(second.len(), 2);
    let displayed: f64 = graph.layers[2].nodes.iter().map(|n| n.probability).sum();
    assert_abs_diff_eq!(displayed, 1.0, epsilon = 1e-12);

    let edge_for = |from: Action| {
        second
            .iter()
            .find(|e| graph.layers[1].nodes[e.from].action == from)
            .copied()
    };
    assert_abs_diff_eq!(edge_for(topspin_fh).unwrap().weight, 0.12 / displayed, epsilon = 1e-12);
    assert_abs_diff_eq!(edge_for(block_ms).unwrap().weight, 0.04 / displayed, epsilon = 1e-12);
    for unmapped in [
        Action::new(Technique::Push, Placement::Bl),
        Action::new(Technique::Smash, Placement::Fh),
        Action::new(Technique::Lob, Placement::Bl),
    ] {
        assert!(edge_for(unmapped).is_none());
    }
}

#[test]
fn test_active_layer_is_renormalized() {
    let analysis = AnalysisBuilder::new(2).top_k(&STROKE2_TOP5).build();
    let graph = FlowGraphBuilder::default().build(&[], 2, &analysis);
    let probs: Vec<f64> = graph.layers[0].nodes.iter().map(|n| n.probability).collect();
    assert_abs_diff_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(probs[0], 0.40, epsilon = 1e-12);
    assert!(graph.edges.is_empty());
}

#[test]
fn test_past_chain_from_bundle() {
    let bundle = bundle_with(
        4,
        vec![AnalysisBuilder::new(4)
            .top_k(&STROKE2_TOP5[..3])
            .build()],
    );
    let graph = FlowGraphBuilder::default().build_for(&bundle, 4).unwrap();

    assert_eq!(graph.layers.len(), 4);
    assert!(graph.layers[..3].iter().all(|l| l.is_past && l.nodes.len() == 1));
    assert_eq!(graph.layers[0].player, "Alice");
    assert_eq!(graph.edges_between(0).count(), 1);
    assert_eq!(graph.edges_between(1).count(), 1);
    assert_eq!(graph.edges_between(2).count(), 3);

    assert!(FlowGraphBuilder::default().build_for(&bundle, 2).is_none());
}

#[test]
fn test_forward_chain_uses_next_layer_map() {
    let a = Action::new(Technique::Block, Placement::Bh);
    let b = Action::new(Technique::Slide, Placement::Mh);
    let third = forward(3, &STROKE3_TOP5, flow_map(&[]));
    let fourth = forward(
        4,
        &[(Technique::Slide, Placement::Mh, 0.5), (Technique::Others, Placement::Ms, 0.5)],
        flow_map(&[(a, b, 0.25), (a, Action::new(Technique::Others, Placement::Ms), 0.0009)]),
    );
    let analysis = AnalysisBuilder::new(2)
        .top_k(&STROKE2_TOP5)
        .forward(vec![third, fourth])
        .build();

    let graph = FlowGraphBuilder::default().build(&[], 2, &analysis);
    assert_eq!(graph.layers.len(), 3);
    assert_eq!(graph.edges_between(0).count(), 0, "empty map draws nothing");

    let last: Vec<_> = graph.edges_between(1).collect();
    assert_eq!(last.len(), 1, "edges at or below the threshold are dropped");
    assert_abs_diff_eq!(last[0].weight, 0.25, epsilon = 1e-12);
    assert_eq!(graph.layers[2].nodes[last[0].to].action, b);
}

#[test]
fn test_top_k_follows_config() {
    let builder = FlowGraphBuilder {
        top_k: 2,
        min_edge_weight: 1e-3,
    };
    let analysis = AnalysisBuilder::new(2).top_k(&STROKE2_TOP5).build();
    let graph = builder.build(&[], 2, &analysis);
    assert_eq!(graph.layers[0].nodes.len(), 2);
    assert_abs_diff_eq!(graph.layers[0].nodes[0].probability, 0.4 / 0.7, epsilon = 1e-12);
}

#[test]
fn test_forward_layers_use_rally_player_names() {
    let mut beyond_rally = forward(5, &STROKE3_TOP5, flow_map(&[]));
    beyond_rally.player = "player1".into();
    let analysis = AnalysisBuilder::new(2)
        .top_k(&STROKE2_TOP5)
        .forward(vec![
            forward(3, &STROKE3_TOP5, flow_map(&[])),
            forward(4, &STROKE3_TOP5, flow_map(&[])),
            beyond_rally,
        ])
        .build();
    let bundle = bundle_with(3, vec![analysis]);
    let graph = FlowGraphBuilder::default().build_for(&bundle, 2).unwrap();

    let players: Vec<&str> = graph.layers.iter().map(|l| l.player.as_str()).collect();
    // stroke3 is in the rally; stroke4 has only an unknown code; stroke5 a known one.
    assert_eq!(players[2], "Alice");
    assert_eq!(players[3], "P0");
    assert_eq!(players[4], "Bob");
}
