use super::JointDistribution;

/// Base and working joint distributions for the active stroke.
///
/// `base` is fixed at construction; every edit lands in `current`.
#[derive(Debug, Clone)]
pub struct JointMatrixStore {
    base: JointDistribution,
    current: JointDistribution,
}

impl JointMatrixStore {
    pub fn new(base: JointDistribution) -> Self {
        let current = base.clone();
        Self { base, current }
    }

    pub fn base(&self) -> &JointDistribution {
        &self.base
    }

    pub fn current(&self) -> &JointDistribution {
        &self.current
    }

    pub fn set_current(&mut self, matrix: JointDistribution) {
        self.current = matrix;
    }

    /// Working matrix becomes an exact copy of base.
    pub fn reset(&mut self) {
        self.current = self.base.clone();
    }

    pub fn is_modified(&self) -> bool {
        self.current != self.base
    }
}
