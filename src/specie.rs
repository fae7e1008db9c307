//! Species: clusters of clients whose genomes are mutually similar. A [Specie] holds indices into
//! its population's client list, never the clients themselves.

use crate::{client::Client, config::Config, genome::Genome};
use core::cmp::Ordering;
use rand::{seq::IndexedRandom, RngCore};

#[derive(Debug, Clone)]
pub struct Specie {
    id: usize,
    members: Vec<usize>,
    representative: usize,
    pub score: f64,
}

impl Specie {
    /// A specie with client `representative` as its only member
    pub fn new(id: usize, representative: usize, clients: &mut [Client]) -> Self {
        clients[representative].species = Some(id);
        Self {
            id,
            members: vec![representative],
            representative,
            score: 0.,
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    #[inline]
    pub fn representative(&self) -> usize {
        self.representative
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add client `idx` if `force` is set, or if it's close enough to the representative
    pub fn put(&mut self, clients: &mut [Client], idx: usize, force: bool, config: &Config) -> bool {
        if !force && clients[idx].distance(&clients[self.representative], config) >= config.cp {
            return false;
        }

        clients[idx].species = Some(self.id);
        self.members.push(idx);
        true
    }

    /// Pick a new representative among the members, and drop everyone else
    pub fn reset(&mut self, clients: &mut [Client], rng: &mut impl RngCore) {
        self.score = 0.;
        let Some(&representative) = self.members.choose(rng) else {
            return;
        };

        self.representative = representative;
        for &idx in &self.members {
            clients[idx].species = None;
        }

        clients[self.representative].species = Some(self.id);
        self.members.clear();
        self.members.push(self.representative);
    }

    /// Set score to the mean score of the members
    pub fn evaluate_score(&mut self, clients: &[Client]) -> f64 {
        self.score = if self.members.is_empty() {
            0.
        } else {
            self.members.iter().map(|&idx| clients[idx].score).sum::<f64>()
                / self.members.len() as f64
        };
        self.score
    }

    /// Keep the top `survivors` fraction of members by raw score, rounded up. A member holding
    /// the best score survives wherever it ranks.
    pub fn kill(&mut self, clients: &mut [Client], survivors: f64) {
        self.members.sort_by(|&l, &r| {
            clients[r]
                .score_raw
                .partial_cmp(&clients[l].score_raw)
                .unwrap_or(Ordering::Equal)
        });

        let keep = (survivors * self.members.len() as f64).ceil() as usize;
        let mut rank = 0;
        self.members.retain(|&idx| {
            rank += 1;
            let alive = rank <= keep || clients[idx].best_score;
            if !alive {
                clients[idx].species = None;
            }
            alive
        });
    }

    /// Mark every member as unspecied, and forget them
    pub fn go_extinct(&mut self, clients: &mut [Client]) {
        for &idx in &self.members {
            clients[idx].species = None;
        }
        self.members.clear();
    }

    /// Cross two members drawn uniformly with replacement, the fitter one by score leading
    pub fn breed(
        &self,
        clients: &[Client],
        optimize: bool,
        config: &Config,
        rng: &mut impl RngCore,
    ) -> Option<Genome> {
        let l = &clients[*self.members.choose(rng)?];
        let r = &clients[*self.members.choose(rng)?];
        let fitness_cmp = l.score.partial_cmp(&r.score).unwrap_or(Ordering::Equal);
        Some(
            l.genome()
                .crossover(r.genome(), fitness_cmp, optimize, config, rng),
        )
    }
}
