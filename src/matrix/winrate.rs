use super::{JointDistribution, WinRateMatrix};

/// Expected win rate of a shot distribution:
/// `sum over (p, t) of joint[p][t] * win_rates[t][p]`.
///
/// The joint is placement-major and the win-rate table technique-major, so the
/// lookup swaps the indices. No renormalization is applied.
pub fn evaluate(joint: &JointDistribution, win_rates: &WinRateMatrix) -> f64 {
    let mut total = 0.0;
    for (p, row) in joint.cells().iter().enumerate() {
        for (t, &prob) in row.iter().enumerate() {
            total += prob * win_rates.at(t, p);
        }
    }
    total
}
