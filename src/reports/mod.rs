use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use shotlens::analysis::{LoadDiagnostic, RallyBundle, Recommendation, RecommendationList};
use shotlens::error::SlResult;
use shotlens::flow::FlowGraph;
use shotlens::labels::{Placement, Technique};
use shotlens::matrix::Grid;
use shotlens::session::{AdjustmentView, PredictionView, RecordSummary};
use std::fs::File;
use std::path::Path;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right_align(table: &mut Table, from: usize, to: usize) {
    for i in from..=to {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn grid_header() -> Vec<Cell> {
    let mut header = vec![Cell::new("BP \\ ST").add_attribute(Attribute::Bold)];
    header.extend(Technique::all().iter().map(|t| Cell::new(t.to_string())));
    header
}

/// Placement rows by technique columns.
fn grid_table(grid: &Grid, signed: bool) -> Table {
    let mut table = new_table();
    table.set_header(grid_header());
    for (placement, row) in Placement::all().iter().zip(grid.iter()) {
        let mut cells = vec![Cell::new(placement.to_string()).add_attribute(Attribute::Bold)];
        cells.extend(row.iter().map(|&v| {
            if signed {
                let cell = Cell::new(format!("{:+.1}", v));
                match v {
                    v if v > 0.05 => cell.fg(Color::Green),
                    v if v < -0.05 => cell.fg(Color::Red),
                    _ => cell,
                }
            } else {
                Cell::new(format!("{:.1}", v))
            }
        }));
        table.add_row(cells);
    }
    right_align(&mut table, 1, Technique::all().len());
    table
}

pub fn print_rally_header(bundle: &RallyBundle) {
    let meta = &bundle.rally.meta_info;
    println!(
        "\n=== {} | Game {} | Rally {} ===",
        meta.match_name, meta.game_no, meta.rally_no
    );
    println!(
        "{} vs {} | strokes: {} | won by: {}",
        meta.player0.name,
        meta.player1.name,
        bundle.stroke_count(),
        bundle
            .rally
            .player_name(&meta.win_side)
            .unwrap_or(&meta.win_side)
    );
}

pub fn print_diagnostics(diagnostics: &[LoadDiagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let mut table = new_table();
    table.set_header(vec!["Stroke", "File", "Problem"]);
    for d in diagnostics {
        table.add_row(vec![
            Cell::new(d.stroke).fg(Color::Yellow),
            Cell::new(d.path.display()),
            Cell::new(&d.reason),
        ]);
    }
    println!("\nMissing analyses:\n{}", table);
}

pub fn print_prediction(stroke: usize, view: &PredictionView) {
    println!(
        "\n--- Stroke {} prediction | win rate {:.1}% ---",
        stroke, view.overall_win_rate_percent
    );

    let mut marginals = new_table();
    marginals.set_header(vec!["Technique", "P(%)"]);
    for (t, p) in Technique::all()
        .iter()
        .zip(view.technique_distribution_percent.iter())
    {
        marginals.add_row(vec![Cell::new(t.to_string()), Cell::new(format!("{:.1}", p))]);
    }
    right_align(&mut marginals, 1, 1);
    println!("{}", marginals);

    println!("Joint distribution (%):\n{}", grid_table(&view.placement_distribution_percent, false));
    println!("Win rate (%):\n{}", grid_table(&view.win_rate_distribution_percent, false));
}

pub fn print_recommendations(list: RecommendationList, recs: &[Recommendation]) {
    if recs.is_empty() {
        return;
    }
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("ST"),
        Cell::new("BP"),
        Cell::new("P(%)"),
        Cell::new("Win(%)").fg(Color::Cyan),
        Cell::new("Delta(pp)"),
    ]);
    for (i, r) in recs.iter().enumerate() {
        let delta = Cell::new(format!("{:+.1}", r.winrate_change * 100.0));
        table.add_row(vec![
            Cell::new(i),
            Cell::new(r.st.to_string()),
            Cell::new(r.bp.to_string()),
            Cell::new(format!("{:.1}", r.prob * 100.0)),
            Cell::new(format!("{:.1}", r.winrate * 100.0)).fg(Color::Cyan),
            if r.winrate_change >= 0.0 {
                delta.fg(Color::Green)
            } else {
                delta.fg(Color::Red)
            },
        ]);
    }
    right_align(&mut table, 3, 5);
    println!("\nRecommendations [{}]:\n{}", list, table);
}

pub fn print_flow(graph: &FlowGraph) {
    let mut layers = new_table();
    layers.set_header(vec!["Layer", "Stroke", "Player", "Kind", "Actions"]);
    for (i, layer) in graph.layers.iter().enumerate() {
        let actions: Vec<String> = layer
            .nodes
            .iter()
            .map(|n| format!("{} {:.0}%", n.action, n.probability * 100.0))
            .collect();
        let kind = if layer.is_past {
            Cell::new("past").fg(Color::DarkGrey)
        } else {
            Cell::new("predicted")
        };
        layers.add_row(vec![
            Cell::new(i),
            Cell::new(&layer.stroke_key),
            Cell::new(&layer.player),
            kind,
            Cell::new(actions.join("\n")),
        ]);
    }
    println!("\nRally flow:\n{}", layers);

    let mut edges = new_table();
    edges.set_header(vec!["From", "To", "Weight"]);
    for e in &graph.edges {
        let (src, dst) = (&graph.layers[e.layer], &graph.layers[e.layer + 1]);
        let weight = if e.continuity {
            Cell::new("-").fg(Color::DarkGrey)
        } else {
            Cell::new(format!("{:.3}", e.weight))
        };
        edges.add_row(vec![
            Cell::new(format!("{} {}", src.stroke_key, src.nodes[e.from].action)),
            Cell::new(format!("{} {}", dst.stroke_key, dst.nodes[e.to].action)),
            weight,
        ]);
    }
    right_align(&mut edges, 2, 2);
    println!("Transitions ({}):\n{}", graph.edges.len(), edges);
}

pub fn print_adjustment(view: &AdjustmentView) {
    println!(
        "\nAdjusted win rate: {:.2}%",
        view.adjusted_win_rate * 100.0
    );
    println!("Adjustment vs base (pp):\n{}", grid_table(&view.adjustment_percent, true));
}

pub fn print_records(records: &[RecordSummary]) {
    let mut table = new_table();
    table.set_header(vec!["", "Id", "Label", "Win(%)"]);
    for r in records {
        table.add_row(vec![
            Cell::new(if r.is_active { "*" } else { "" }).fg(Color::Green),
            Cell::new(r.id),
            Cell::new(&r.label),
            Cell::new(format!("{:.2}", r.win_rate_percent)),
        ]);
    }
    right_align(&mut table, 3, 3);
    println!("\nAdjustment log ({} records):\n{}", records.len(), table);
}

/// One row per placement, one column per technique.
pub fn write_adjustment_csv<P: AsRef<Path>>(path: P, view: &AdjustmentView) -> SlResult<()> {
    let mut wtr = csv::Writer::from_writer(File::create(path)?);

    let mut header = vec!["placement".to_string()];
    header.extend(Technique::all().iter().map(|t| t.to_string()));
    wtr.write_record(&header)?;

    for (placement, row) in Placement::all().iter().zip(view.adjustment_percent.iter()) {
        let mut record = vec![placement.to_string()];
        record.extend(row.iter().map(|v| format!("{:.6}", v)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
