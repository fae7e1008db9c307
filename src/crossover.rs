//! Alignment of two genomes by innovation number: compatibility distance, and crossover.

use crate::{
    config::Config,
    genome::{ConnectionGene, Gene, Genome, NodeGene},
    random::Happens,
};
use core::cmp::{max, Ordering};
use rand::RngCore;

/// Result of a merge-walk over two innovation-sorted gene lists
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub matched: usize,
    pub disjoint: usize,
    pub excess: usize,
    /// sum of parameter differences over matched genes
    pub param_diff: f64,
}

impl core::ops::Add for Alignment {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            matched: self.matched + rhs.matched,
            disjoint: self.disjoint + rhs.disjoint,
            excess: self.excess + rhs.excess,
            param_diff: self.param_diff + rhs.param_diff,
        }
    }
}

pub fn align<T: Gene>(l: &[T], r: &[T], diff: impl Fn(&T, &T) -> f64) -> Alignment {
    let mut alignment = Alignment::default();
    let (mut l_idx, mut r_idx) = (0, 0);
    while l_idx < l.len() && r_idx < r.len() {
        match l[l_idx].inno().cmp(&r[r_idx].inno()) {
            Ordering::Equal => {
                alignment.matched += 1;
                alignment.param_diff += diff(&l[l_idx], &r[r_idx]);
                l_idx += 1;
                r_idx += 1;
            }
            Ordering::Less => {
                alignment.disjoint += 1;
                l_idx += 1;
            }
            Ordering::Greater => {
                alignment.disjoint += 1;
                r_idx += 1;
            }
        }
    }

    alignment.excess = (l.len() - l_idx) + (r.len() - r_idx);
    alignment
}

fn align_genomes(l: &Genome, r: &Genome) -> Alignment {
    align(
        l.connections().as_slice(),
        r.connections().as_slice(),
        |l: &ConnectionGene, r| (l.weight - r.weight).abs(),
    ) + align(
        l.nodes().as_slice(),
        r.nodes().as_slice(),
        |l: &NodeGene, r| (l.bias - r.bias).abs(),
    )
}

/// (disjoint, excess) gene counts across both connections and nodes
pub fn disjoint_excess_count(l: &Genome, r: &Genome) -> (usize, usize) {
    let alignment = align_genomes(l, r);
    (alignment.disjoint, alignment.excess)
}

/// Mean weight and bias difference over matching genes. If genomes share no genes, it's 0
pub fn avg_param_diff(l: &Genome, r: &Genome) -> f64 {
    let alignment = align_genomes(l, r);
    if alignment.matched == 0 {
        0.
    } else {
        alignment.param_diff / alignment.matched as f64
    }
}

impl Genome {
    /// Compatibility distance to `other`. Symmetric, and 0 for identical genomes.
    pub fn distance(&self, other: &Self, config: &Config) -> f64 {
        let alignment = align_genomes(self, other);
        let param_diff = if alignment.matched == 0 {
            0.
        } else {
            alignment.param_diff / alignment.matched as f64
        };

        let size = max(self.connections().len(), other.connections().len()) as f64;
        let size = if size < config.ct { 1. } else { size };

        config.c1 * alignment.excess as f64 / size
            + config.c2 * alignment.disjoint as f64 / size
            + config.c3 * param_diff
    }

    /// Breed with `other`, where our fitness is `fitness_cmp` compared to theirs. Genes only the
    /// fitter parent carries are inherited, and genes only the weaker one carries are dropped;
    /// on a tie, `self` counts as the fitter parent. When `optimize` is set, disabled genes
    /// aren't inherited at all.
    pub fn crossover(
        &self,
        other: &Self,
        fitness_cmp: Ordering,
        optimize: bool,
        config: &Config,
        rng: &mut impl RngCore,
    ) -> Self {
        let (fit, weak) = match fitness_cmp {
            Ordering::Less => (other, self),
            Ordering::Equal | Ordering::Greater => (self, other),
        };

        let (l, r) = (fit.connections().as_slice(), weak.connections().as_slice());
        let mut inherited = Vec::with_capacity(l.len());
        let (mut l_idx, mut r_idx) = (0, 0);
        while l_idx < l.len() {
            let Some(r_gene) = r.get(r_idx) else {
                if !optimize || l[l_idx].enabled {
                    inherited.push(&l[l_idx]);
                }
                l_idx += 1;
                continue;
            };

            match l[l_idx].inno().cmp(&r_gene.inno()) {
                Ordering::Equal => {
                    if !optimize || (l[l_idx].enabled && r_gene.enabled) {
                        inherited.push(if rng.happens(config.crossover_pick_fitter) {
                            &l[l_idx]
                        } else {
                            r_gene
                        });
                    }
                    l_idx += 1;
                    r_idx += 1;
                }
                Ordering::Less => {
                    if !optimize || l[l_idx].enabled {
                        inherited.push(&l[l_idx]);
                    }
                    l_idx += 1;
                }
                Ordering::Greater => r_idx += 1,
            }
        }

        let mut child = Genome::with_nodes(
            fit.nodes()
                .iter()
                .filter(|n| !n.is_hidden())
                .cloned(),
        );
        for c in inherited {
            let endpoints = [c.from(), c.to()].map(|id| fit.node(id).or_else(|| weak.node(id)));
            let [Some(from), Some(to)] = endpoints else {
                continue;
            };
            child.insert_node(from.clone());
            child.insert_node(to.clone());
            child.insert_connection(c.clone());
        }

        child
    }
}
