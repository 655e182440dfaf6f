use crate::analysis::RecommendationList;
use crate::records::RecordId;
use serde::{Deserialize, Serialize};

/// Context through which nudges are interpreted.
///
/// A single enum makes "recommendation and record both active" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lens {
    #[default]
    None,
    /// Read-only view of a ranked recommendation. Nudges seed from base.
    Recommendation(RecommendationRef),
    /// Nudges update this record in place.
    Record(RecordId),
}

/// Position of a recommendation within one of the three ranked lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRef {
    pub list: RecommendationList,
    pub index: usize,
}

impl Lens {
    pub fn active_record(&self) -> Option<RecordId> {
        match self {
            Self::Record(id) => Some(*id),
            _ => None,
        }
    }

    pub fn active_recommendation(&self) -> Option<RecommendationRef> {
        match self {
            Self::Recommendation(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn clear(&mut self) {
        *self = Self::None;
    }

    /// Clears the lens if it points at `id`. Returns whether it did.
    pub fn release_record(&mut self, id: RecordId) -> bool {
        if self.active_record() == Some(id) {
            self.clear();
            true
        } else {
            false
        }
    }
}
