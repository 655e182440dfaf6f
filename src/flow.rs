use crate::analysis::{RallyBundle, StrokeAnalysis, TopKEntry};
use crate::config::FlowParams;
use crate::labels::{transition_key, Action};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub action: Action,
    /// Share within the layer. Layers sum to 1 unless their source mass was 0.
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowLayer {
    pub stroke: usize,
    pub stroke_key: String,
    pub player: String,
    /// Realized stroke: one node, probability 1.
    pub is_past: bool,
    pub nodes: Vec<FlowNode>,
}

impl FlowLayer {
    fn displayed_mass(&self) -> f64 {
        self.nodes.iter().map(|n| n.probability).sum()
    }
}

/// Edge between node `from` of layer `layer` and node `to` of layer `layer + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEdge {
    pub layer: usize,
    pub from: usize,
    pub to: usize,
    pub weight: f64,
    /// Drawn for continuity out of a realized stroke; the weight carries no probability.
    pub continuity: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub layers: Vec<FlowLayer>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn edges_between(&self, layer: usize) -> impl Iterator<Item = &FlowEdge> {
        self.edges.iter().filter(move |e| e.layer == layer)
    }
}

/// A stroke that has already been played.
#[derive(Debug, Clone, PartialEq)]
pub struct PastStroke {
    pub stroke: usize,
    pub player: String,
    pub action: Action,
}

#[derive(Debug, Clone)]
pub struct FlowGraphBuilder {
    pub top_k: usize,
    pub min_edge_weight: f64,
}

impl Default for FlowGraphBuilder {
    fn default() -> Self {
        Self::from(&FlowParams::default())
    }
}

impl From<&FlowParams> for FlowGraphBuilder {
    fn from(params: &FlowParams) -> Self {
        Self {
            top_k: params.top_k,
            min_edge_weight: params.min_edge_weight,
        }
    }
}

impl FlowGraphBuilder {
    /// Graph for `stroke` of a loaded rally, or `None` without its analysis.
    pub fn build_for(&self, bundle: &RallyBundle, stroke: usize) -> Option<FlowGraph> {
        let analysis = bundle.analysis(stroke)?;
        let past: Vec<PastStroke> = bundle
            .rally
            .strokes()
            .into_iter()
            .filter(|(n, _)| *n < stroke)
            .map(|(n, s)| PastStroke {
                stroke: n,
                player: bundle
                    .rally
                    .player_name(&s.player)
                    .unwrap_or(&s.player)
                    .to_string(),
                action: s.action(),
            })
            .collect();
        let mut graph = self.build(&past, stroke, analysis);

        // Forward layers carry the raw player code; name them from the rally.
        for layer in graph.layers.iter_mut().skip(past.len() + 1) {
            let code = bundle
                .rally
                .rally_info
                .get(&layer.stroke_key)
                .map_or(layer.player.as_str(), |s| s.player.as_str());
            if let Some(name) = bundle.rally.player_name(code) {
                layer.player = name.to_string();
            }
        }
        Some(graph)
    }

    pub fn build(&self, past: &[PastStroke], stroke: usize, analysis: &StrokeAnalysis) -> FlowGraph {
        let forward = &analysis.forward_propagation;
        let mut layers = Vec::with_capacity(past.len() + 1 + forward.len());
        // Outgoing transition map per layer, aligned with `layers`.
        let mut outgoing: Vec<Option<&HashMap<String, f64>>> = Vec::with_capacity(layers.capacity());

        // 1. Realized strokes
        for p in past {
            layers.push(FlowLayer {
                stroke: p.stroke,
                stroke_key: format!("stroke{}", p.stroke),
                player: p.player.clone(),
                is_past: true,
                nodes: vec![FlowNode {
                    action: p.action,
                    probability: 1.0,
                }],
            });
            outgoing.push(None);
        }

        // 2. Active stroke
        layers.push(FlowLayer {
            stroke,
            stroke_key: analysis.stroke_key.clone(),
            player: analysis
                .player_name
                .clone()
                .unwrap_or_else(|| analysis.player.clone()),
            is_past: false,
            nodes: self.top_nodes(&analysis.current_stroke_analysis.top_k_distribution),
        });
        outgoing.push(forward.first().map(|f| &f.top5_to_top5_flow));

        // 3. Forward chain
        for (j, f) in forward.iter().enumerate() {
            layers.push(FlowLayer {
                stroke: f.stroke_idx + 1,
                stroke_key: f.stroke_key.clone(),
                player: f.player.clone(),
                is_past: false,
                nodes: self.top_nodes(&f.top_k_distribution),
            });
            outgoing.push(forward.get(j + 1).map(|n| &n.top5_to_top5_flow));
        }

        let mut edges = Vec::new();
        for i in 0..layers.len().saturating_sub(1) {
            let (src, dst) = (&layers[i], &layers[i + 1]);
            if src.is_past {
                self.dense_edges(i, src, dst, &mut edges);
            } else if let Some(map) = outgoing[i] {
                self.mapped_edges(i, src, dst, map, &mut edges);
            }
        }

        FlowGraph { layers, edges }
    }

    /// Top-k by probability, rescaled to sum to 1 within the layer.
    fn top_nodes(&self, dist: &[TopKEntry]) -> Vec<FlowNode> {
        let mut sorted: Vec<&TopKEntry> = dist.iter().filter(|e| e.prob.is_finite()).collect();
        sorted.sort_by(|a, b| b.prob.total_cmp(&a.prob));
        sorted.truncate(self.top_k);

        let mass: f64 = sorted.iter().map(|e| e.prob).sum();
        sorted
            .into_iter()
            .map(|e| FlowNode {
                action: e.action(),
                probability: if mass > 0.0 { e.prob / mass } else { e.prob },
            })
            .collect()
    }

    fn dense_edges(&self, layer: usize, src: &FlowLayer, dst: &FlowLayer, out: &mut Vec<FlowEdge>) {
        for from in 0..src.nodes.len() {
            for to in 0..dst.nodes.len() {
                out.push(FlowEdge {
                    layer,
                    from,
                    to,
                    weight: 1.0,
                    continuity: true,
                });
            }
        }
    }

    fn mapped_edges(
        &self,
        layer: usize,
        src: &FlowLayer,
        dst: &FlowLayer,
        map: &HashMap<String, f64>,
        out: &mut Vec<FlowEdge>,
    ) {
        let mass = dst.displayed_mass();
        for (from, a) in src.nodes.iter().enumerate() {
            for (to, b) in dst.nodes.iter().enumerate() {
                // Absent keys are zero, never inferred.
                let Some(&value) = map.get(&transition_key(&a.action, &b.action)) else {
                    continue;
                };
                let weight = if mass > 0.0 { value / mass } else { value };
                if weight > self.min_edge_weight {
                    out.push(FlowEdge {
                        layer,
                        from,
                        to,
                        weight,
                        continuity: false,
                    });
                }
            }
        }
    }
}
