use super::{RallyRecord, StrokeAnalysis};
use crate::error::{ShotLensError, SlResult};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A stroke whose analysis could not be loaded. Not fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadDiagnostic {
    pub stroke: usize,
    pub path: PathBuf,
    pub reason: String,
}

/// A rally plus whatever per-stroke analyses could be read.
#[derive(Debug, Clone)]
pub struct RallyBundle {
    pub rally: RallyRecord,
    pub analyses: BTreeMap<usize, StrokeAnalysis>,
    pub diagnostics: Vec<LoadDiagnostic>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> SlResult<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

impl RallyBundle {
    /// Reads the rally file, then `stroke<N>_analysis.json` (or the stroke's
    /// `analysis_file`) from `analysis_dir` for every stroke.
    ///
    /// Only the rally file itself is required. Per-stroke failures become
    /// [`LoadDiagnostic`]s.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(rally_file: P, analysis_dir: Q) -> SlResult<Self> {
        let rally_file = rally_file.as_ref();
        let rally: RallyRecord = read_json(rally_file).map_err(|e| {
            ShotLensError::Validation(format!(
                "Could not read rally file '{}': {}",
                rally_file.display(),
                e
            ))
        })?;

        let dir = analysis_dir.as_ref();
        let mut analyses = BTreeMap::new();
        let mut diagnostics = Vec::new();

        for (n, stroke) in rally.strokes() {
            let name = stroke
                .analysis_file
                .clone()
                .unwrap_or_else(|| format!("stroke{}_analysis.json", n));
            let path = dir.join(name);

            match read_json::<StrokeAnalysis>(&path) {
                Ok(analysis) => {
                    debug!(stroke = n, path = %path.display(), "loaded stroke analysis");
                    analyses.insert(n, analysis);
                }
                Err(e) => {
                    warn!(stroke = n, path = %path.display(), error = %e, "stroke analysis unavailable");
                    diagnostics.push(LoadDiagnostic {
                        stroke: n,
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            rally,
            analyses,
            diagnostics,
        })
    }

    /// Assembles a bundle from already-parsed parts.
    pub fn from_parts(rally: RallyRecord, analyses: BTreeMap<usize, StrokeAnalysis>) -> Self {
        Self {
            rally,
            analyses,
            diagnostics: Vec::new(),
        }
    }

    pub fn stroke_count(&self) -> usize {
        self.rally.strokes().len()
    }

    pub fn analysis(&self, stroke: usize) -> Option<&StrokeAnalysis> {
        self.analyses.get(&stroke)
    }

    /// Stroke 2 if the rally has at least two strokes, else stroke 1.
    pub fn default_stroke(&self) -> Option<usize> {
        let strokes: Vec<usize> = self.rally.strokes().iter().map(|(n, _)| *n).collect();
        if strokes.contains(&2) {
            Some(2)
        } else {
            strokes.first().copied()
        }
    }
}
