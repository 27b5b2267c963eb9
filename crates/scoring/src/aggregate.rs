/// Truth score returned when there is nothing to aggregate.
pub const NEUTRAL_TRUTH_SCORE: f64 = 50.0;

/// Weight of contradiction relative to support in a claim's contribution.
const CONTRADICTION_WEIGHT: f64 = 0.5;

/// Anything carrying a support/contradiction pair in [0, 1].
pub trait AssessmentScores {
    fn support_score(&self) -> f64;
    fn contradiction_score(&self) -> f64;
}

impl AssessmentScores for (f64, f64) {
    fn support_score(&self) -> f64 {
        self.0
    }

    fn contradiction_score(&self) -> f64 {
        self.1
    }
}

/// Contribution of a single claim: support dampened by half the
/// contradiction, floored at zero.
pub fn claim_contribution<A: AssessmentScores + ?Sized>(assessment: &A) -> f64 {
    let support = finite_or_zero(assessment.support_score());
    let contradiction = finite_or_zero(assessment.contradiction_score());

    (support - CONTRADICTION_WEIGHT * contradiction).max(0.0)
}

/// Aggregate claim-level scores into a 0-100 truth score, rounded to two
/// decimals. No assessments means no evidence either way, so the result is
/// the neutral 50.0.
pub fn aggregate_truth_score<A: AssessmentScores>(assessments: &[A]) -> f64 {
    if assessments.is_empty() {
        return NEUTRAL_TRUTH_SCORE;
    }

    let total: f64 = assessments.iter().map(claim_contribution).sum();
    let avg = total / assessments.len() as f64;

    round_to(avg * 100.0, 2).clamp(0.0, 100.0)
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Round half to even, so exact ties like 2.25 go to 2.2.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
