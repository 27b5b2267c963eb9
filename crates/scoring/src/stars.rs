use crate::aggregate::{finite_or_zero, round_to};

pub const MIN_STARS: f64 = 1.0;
pub const MAX_STARS: f64 = 5.0;

/// 1-5 star rating. Clarity and evidence count equally, bias subtracts at a
/// reduced weight. The base is clamped to [0, 1] before scaling, so the
/// result always lands in [1.0, 5.0].
pub fn star_rating_from_quality(clarity: f64, evidence: f64, bias: f64) -> f64 {
    let base = 0.5 * clarity + 0.5 * evidence - 0.2 * bias;
    let base = finite_or_zero(base).clamp(0.0, 1.0);

    round_to(MIN_STARS + (MAX_STARS - MIN_STARS) * base, 1)
}
