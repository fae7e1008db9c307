//! Fitness-proportionate selection, used to pick which specie breeds next.

use rand::{Rng, RngCore};

/// Select a random element with probability weighted by score.
/// Negative scores are shifted so the lowest sits just above 0.
fn weighted_random_select<'a, T>(
    scored: &'a [(T, f64)],
    rng: &mut impl RngCore,
) -> Option<&'a (T, f64)> {
    let min_score = scored
        .iter()
        .map(|(_, s)| *s)
        .filter(|s| s.is_finite())
        .fold(f64::INFINITY, f64::min);
    if !min_score.is_finite() {
        return None;
    }

    let shift = if min_score < 0. { -min_score } else { 0. };
    let epsilon = 1e-6;
    let weight = |s: f64| if s.is_finite() { s + shift + epsilon } else { epsilon };

    let total_weight = scored.iter().map(|(_, s)| weight(*s)).sum::<f64>();
    let mut threshold = rng.random::<f64>() * total_weight;
    for pair in scored {
        threshold -= weight(pair.1);
        if threshold <= 0. {
            return Some(pair);
        }
    }

    // float error may leave a sliver of threshold
    scored.last()
}

/// A pool of scored elements to draw from
#[derive(Debug, Clone)]
pub struct RandomSelector<T> {
    scored: Vec<(T, f64)>,
}

impl<T> Default for RandomSelector<T> {
    fn default() -> Self {
        Self { scored: Vec::new() }
    }
}

impl<T> RandomSelector<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: T, score: f64) {
        self.scored.push((item, score));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scored.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scored.is_empty()
    }

    /// An element drawn with probability proportional to its shifted score, or `None` if empty
    pub fn random(&self, rng: &mut impl RngCore) -> Option<&T> {
        weighted_random_select(&self.scored, rng).map(|(item, _)| item)
    }

    pub fn reset(&mut self) {
        self.scored.clear();
    }
}

impl<T> FromIterator<(T, f64)> for RandomSelector<T> {
    fn from_iter<I: IntoIterator<Item = (T, f64)>>(iter: I) -> Self {
        Self {
            scored: iter.into_iter().collect(),
        }
    }
}
