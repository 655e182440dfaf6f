use shotlens::analysis::{RallyBundle, RecommendationList};
use shotlens::labels::{Placement, Technique};
use std::fs;
use tempfile::tempdir;

mod common;
use common::{write_rally_dir, AnalysisBuilder};

#[test]
fn test_load_complete_rally() {
    let dir = tempdir().unwrap();
    let (rally, analysis_dir) = write_rally_dir(dir.path(), 3, &[]);

    let bundle = RallyBundle::load(&rally, &analysis_dir).unwrap();
    assert_eq!(bundle.stroke_count(), 3);
    assert!(bundle.diagnostics.is_empty());
    assert_eq!(bundle.default_stroke(), Some(2));

    let analysis = bundle.analysis(2).unwrap();
    assert_eq!(analysis.stroke_index, 2);
    let rec = &analysis.recommendations(RecommendationList::Top)[0];
    assert_eq!((rec.st, rec.bp), (Technique::Topspin, Placement::Fh));
    assert!(analysis.joint().is_normalized(1e-9));
}

#[test]
fn test_missing_stroke_is_a_diagnostic() {
    let dir = tempdir().unwrap();
    let (rally, analysis_dir) = write_rally_dir(dir.path(), 4, &[3]);
    fs::write(analysis_dir.join("stroke4_analysis.json"), "{ not json").unwrap();

    let bundle = RallyBundle::load(&rally, &analysis_dir).unwrap();
    assert!(bundle.analysis(1).is_some());
    assert!(bundle.analysis(3).is_none());
    assert!(bundle.analysis(4).is_none());

    let failed: Vec<usize> = bundle.diagnostics.iter().map(|d| d.stroke).collect();
    assert_eq!(failed, vec![3, 4]);
    assert!(bundle.diagnostics[0]
        .path
        .ends_with("stroke3_analysis.json"));
}

#[test]
fn test_analysis_file_override() {
    let dir = tempdir().unwrap();
    let (rally_path, analysis_dir) = write_rally_dir(dir.path(), 1, &[1]);

    let mut rally: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&rally_path).unwrap()).unwrap();
    rally["rally_info"]["stroke1"]["analysis_file"] = "custom.json".into();
    fs::write(&rally_path, rally.to_string()).unwrap();
    fs::write(
        analysis_dir.join("custom.json"),
        serde_json::to_string(&AnalysisBuilder::new(1).baseline(0.61).build()).unwrap(),
    )
    .unwrap();

    let bundle = RallyBundle::load(&rally_path, &analysis_dir).unwrap();
    assert!(bundle.diagnostics.is_empty());
    assert_eq!(bundle.analysis(1).unwrap().baseline_winrate, 0.61);
    assert_eq!(bundle.default_stroke(), Some(1));
}

#[test]
fn test_bad_rally_file_is_fatal() {
    let dir = tempdir().unwrap();
    let rally = dir.path().join("rally.json");
    fs::write(&rally, "[]").unwrap();
    assert!(RallyBundle::load(&rally, dir.path()).is_err());
    assert!(RallyBundle::load(dir.path().join("absent.json"), dir.path()).is_err());
}

#[test]
fn test_technique_major_source_is_transposed() {
    let dir = tempdir().unwrap();
    let (rally, analysis_dir) = write_rally_dir(dir.path(), 1, &[1]);

    let mut raw = common::filled_technique_major(0.0);
    raw[Technique::Twist.index()][Placement::Bh.index()] = 1.0;
    let analysis = AnalysisBuilder::new(1).joint(raw).build();
    fs::write(
        analysis_dir.join("stroke1_analysis.json"),
        serde_json::to_string(&analysis).unwrap(),
    )
    .unwrap();

    let bundle = RallyBundle::load(&rally, &analysis_dir).unwrap();
    let joint = bundle.analysis(1).unwrap().joint();
    assert_eq!(joint.get(Placement::Bh.index(), Technique::Twist.index()), 1.0);
}
