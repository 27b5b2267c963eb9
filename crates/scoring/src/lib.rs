pub mod aggregate;
pub mod stars;
pub mod trust;

pub use aggregate::{AssessmentScores, NEUTRAL_TRUTH_SCORE, aggregate_truth_score, claim_contribution};
pub use stars::{MAX_STARS, MIN_STARS, star_rating_from_quality};
pub use trust::{DEFAULT_TRUST_WEIGHT, TrustWeightTable, trust_weight};
