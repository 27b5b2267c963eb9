use serde::{Deserialize, Serialize};

/// Weight returned when no table entry matches.
pub const DEFAULT_TRUST_WEIGHT: f64 = 0.6;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrustEntry {
    fragment: String,
    weight: f64,
}

/// Ordered domain table. The first matching entry wins, so more trusted or
/// more specific fragments have to come before generic ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustWeightTable {
    entries: Vec<TrustEntry>,
    default_weight: f64,
}

impl TrustWeightTable {
    pub fn new(entries: Vec<(String, f64)>, default_weight: f64) -> Self {
        let entries = entries
            .into_iter()
            .map(|(fragment, weight)| TrustEntry {
                fragment: fragment.to_lowercase(),
                weight: clamp_unit(weight),
            })
            .collect();

        Self {
            entries,
            default_weight: clamp_unit(default_weight),
        }
    }

    /// Credibility weight in [0, 1] for a source URL.
    pub fn weight(&self, url: &str) -> f64 {
        let url = url.to_lowercase();

        self.entries
            .iter()
            .find(|entry| url.contains(&entry.fragment) || url.ends_with(&entry.fragment))
            .map(|entry| entry.weight)
            .unwrap_or(self.default_weight)
    }
}

impl Default for TrustWeightTable {
    fn default() -> Self {
        let entries = [
            (".gov", 1.0),
            (".edu", 0.9),
            ("nature.com", 0.95),
            ("science.org", 0.95),
            ("nejm.org", 0.95),
            ("who.int", 0.95),
            ("un.org", 0.9),
            ("bbc.com", 0.8),
            ("reuters.com", 0.85),
            ("apnews.com", 0.82),
        ]
        .into_iter()
        .map(|(fragment, weight)| (fragment.to_string(), weight))
        .collect();

        Self::new(entries, DEFAULT_TRUST_WEIGHT)
    }
}

/// Weight of `url` under the default table.
pub fn trust_weight(url: &str) -> f64 {
    TrustWeightTable::default().weight(url)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
