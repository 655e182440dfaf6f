use crate::matrix::JointDistribution;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MANUAL_LABEL: &str = "Manual adjustment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adj-{}", self.0)
    }
}

/// Accepts both `adj-7` and a bare `7`.
impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("adj-").unwrap_or(s);
        digits.trim().parse().map(RecordId)
    }
}

/// Hands out session-wide ids; never reuses one.
#[derive(Debug, Clone, Default)]
pub struct RecordIdGen {
    next: u64,
}

impl RecordIdGen {
    pub fn next_id(&mut self) -> RecordId {
        self.next += 1;
        RecordId(self.next)
    }
}

/// A named snapshot of an edited distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub id: RecordId,
    pub label: String,
    /// Fraction in [0, 1].
    pub win_rate: f64,
    /// `None` for records copied from a recommendation that were never nudged.
    pub snapshot: Option<JointDistribution>,
}

impl AdjustmentRecord {
    pub fn new(
        id: RecordId,
        label: impl Into<String>,
        win_rate: f64,
        snapshot: Option<JointDistribution>,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            win_rate,
            snapshot,
        }
    }

    /// Replaces win rate and snapshot together.
    pub fn overwrite(&mut self, win_rate: f64, snapshot: JointDistribution) {
        self.win_rate = win_rate;
        self.snapshot = Some(snapshot);
    }
}

/// Insertion-ordered records for a single stroke.
///
/// The log only stores records. Which one is active is tracked by the
/// stroke's [`Lens`](crate::lens::Lens).
#[derive(Debug, Clone, Default)]
pub struct AdjustmentRecordLog {
    records: IndexMap<RecordId, AdjustmentRecord>,
}

impl AdjustmentRecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: AdjustmentRecord) -> RecordId {
        let id = record.id;
        self.records.insert(id, record);
        id
    }

    /// Removes and returns the record, keeping the order of the rest.
    pub fn remove(&mut self, id: RecordId) -> Option<AdjustmentRecord> {
        self.records.shift_remove(&id)
    }

    pub fn get(&self, id: RecordId) -> Option<&AdjustmentRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut AdjustmentRecord> {
        self.records.get_mut(&id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn list(&self) -> impl Iterator<Item = &AdjustmentRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(gen: &mut RecordIdGen, label: &str) -> AdjustmentRecord {
        AdjustmentRecord::new(gen.next_id(), label, 0.5, None)
    }

    #[test]
    fn test_ids_are_unique_and_formatted() {
        let mut gen = RecordIdGen::default();
        let a = gen.next_id();
        let b = gen.next_id();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "adj-1");
        assert_eq!("adj-2".parse::<RecordId>().unwrap(), b);
        assert_eq!("2".parse::<RecordId>().unwrap(), b);
        assert!("adj-x".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_remove_keeps_insertion_order() {
        let mut gen = RecordIdGen::default();
        let mut log = AdjustmentRecordLog::new();
        let a = log.append(record(&mut gen, "a"));
        let b = log.append(record(&mut gen, "b"));
        let c = log.append(record(&mut gen, "c"));

        assert_eq!(log.remove(b).map(|r| r.label), Some("b".to_string()));
        let order: Vec<RecordId> = log.list().map(|r| r.id).collect();
        assert_eq!(order, vec![a, c]);
        assert!(log.remove(b).is_none());
    }

    #[test]
    fn test_overwrite_sets_snapshot() {
        let mut gen = RecordIdGen::default();
        let mut log = AdjustmentRecordLog::new();
        let id = log.append(record(&mut gen, MANUAL_LABEL));
        let snap = JointDistribution::uniform();
        log.get_mut(id).unwrap().overwrite(0.61, snap.clone());
        let r = log.get(id).unwrap();
        assert_eq!(r.win_rate, 0.61);
        assert_eq!(r.snapshot.as_ref(), Some(&snap));
    }
}
