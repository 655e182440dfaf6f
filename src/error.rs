use crate::analysis::RecommendationList;
use crate::records::RecordId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShotLensError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("No analysis loaded for the selected stroke")]
    NoActiveAnalysis,

    #[error("Unknown adjustment record: {0}")]
    UnknownRecord(RecordId),

    #[error("Unknown recommendation: {list}[{index}]")]
    UnknownRecommendation {
        list: RecommendationList,
        index: usize,
    },

    #[error("{axis} index {index} is out of range (len {len})")]
    TargetOutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },
}

pub type SlResult<T> = Result<T, ShotLensError>;
