pub mod gene;
pub mod set;

pub use gene::{ConnectionGene, Gene, NodeGene, MAX_NODES};
pub use set::GeneSet;

use crate::{
    config::Config,
    constants::CLADE_MAX_RETRIES,
    error::{NeatError, Result},
    innovation::InnoGen,
    random::{EvolutionEvent, Happens, Probabilities},
};
use fxhash::{FxHashMap, FxHashSet};
use gene::hash_code;
use log::trace;
use rand::{seq::IndexedRandom, Rng, RngCore};
use std::collections::VecDeque;

/// How a single call to [Genome::mutate] should behave
#[derive(Debug, Clone, Copy)]
pub struct MutationMode {
    /// this genome is already good enough: never grow, only prune and tune
    pub self_opt: bool,
    /// the whole population is optimizing: at most one of each mutation, and prune afterwards
    pub optimize: bool,
    /// multiplier on shift magnitudes
    pub pressure: f64,
}

impl Default for MutationMode {
    fn default() -> Self {
        Self {
            self_opt: false,
            optimize: false,
            pressure: 1.,
        }
    }
}

impl MutationMode {
    #[inline]
    fn capped(&self) -> bool {
        self.self_opt || self.optimize
    }
}

/// The genetic encoding of a single feed-forward network. Both gene collections are kept in
/// innovation order, and every connection's endpoints are present in `nodes`.
#[derive(Debug, Clone, Default)]
pub struct Genome {
    nodes: GeneSet<NodeGene>,
    connections: GeneSet<ConnectionGene>,
}

impl Genome {
    /// A genome with the given nodes and no connections
    pub fn with_nodes(nodes: impl IntoIterator<Item = NodeGene>) -> Self {
        let mut genome = Self {
            nodes: nodes.into_iter().collect(),
            connections: GeneSet::new(),
        };
        genome.nodes.sort();
        genome
    }

    /// Assemble a genome, rejecting any connection whose endpoints are missing from `nodes`
    pub fn from_parts(
        nodes: impl IntoIterator<Item = NodeGene>,
        connections: impl IntoIterator<Item = ConnectionGene>,
    ) -> Result<Self> {
        let mut genome = Self::with_nodes(nodes);
        for c in connections {
            if !genome.nodes.contains_key(c.from) || !genome.nodes.contains_key(c.to) {
                return Err(NeatError::DanglingConnection {
                    from: c.from,
                    to: c.to,
                });
            }
            genome.connections.insert_sorted(c);
        }
        Ok(genome)
    }

    #[inline]
    pub fn nodes(&self) -> &GeneSet<NodeGene> {
        &self.nodes
    }

    #[inline]
    pub fn connections(&self) -> &GeneSet<ConnectionGene> {
        &self.connections
    }

    #[inline]
    pub fn node(&self, inno: u64) -> Option<&NodeGene> {
        self.nodes.find(inno)
    }

    #[inline]
    pub fn connection(&self, from: u64, to: u64) -> Option<&ConnectionGene> {
        self.connections.find(hash_code(from, to))
    }

    #[inline]
    pub(crate) fn connection_mut(&mut self, from: u64, to: u64) -> Option<&mut ConnectionGene> {
        self.connections.find_mut(hash_code(from, to))
    }

    pub fn enabled_connections(&self) -> impl Iterator<Item = &ConnectionGene> {
        self.connections.iter().filter(|c| c.enabled)
    }

    #[inline]
    pub(crate) fn insert_node(&mut self, node: NodeGene) -> bool {
        self.nodes.insert_sorted(node)
    }

    /// Callers must have inserted both endpoints first
    #[inline]
    pub(crate) fn insert_connection(&mut self, connection: ConnectionGene) -> bool {
        self.connections.insert_sorted(connection)
    }

    /// Connect two random nodes of differing depth, shallow to deep. Returns the innovation of the
    /// new connection, or `None` if no pair was found or the pair is already connected.
    pub fn mutate_link(
        &mut self,
        inno: &mut InnoGen,
        config: &Config,
        rng: &mut impl RngCore,
    ) -> Option<u64> {
        for _ in 0..CLADE_MAX_RETRIES {
            let a = self.nodes.random(rng)?;
            let b = self.nodes.random(rng)?;
            if a.x == b.x {
                continue;
            }

            let (from, to) = if a.x < b.x { (a, b) } else { (b, a) };
            if self.connections.contains_key(hash_code(from.inno, to.inno)) {
                trace!("link {} -> {} already exists", from.inno, to.inno);
                return None;
            }

            let mut connection = inno.connection(from, to);
            let w = config.weight_random_strength;
            connection.weight = rng.random_range(-w..=w);

            let id = connection.inno;
            self.connections.insert_sorted(connection);
            return Some(id);
        }

        trace!("no pair of nodes with differing depth found");
        None
    }

    /// Split a random connection with a node halfway along it. Genomes splitting the same
    /// connection share the node. Returns the innovation of the middle node, or `None` if
    /// nothing changed.
    pub fn mutate_node(
        &mut self,
        inno: &mut InnoGen,
        config: &Config,
        rng: &mut impl RngCore,
    ) -> Result<Option<u64>> {
        let Some(original) = self.connections.random(rng).cloned() else {
            return Ok(None);
        };

        let (from, to) = match (self.node(original.from), self.node(original.to)) {
            (Some(from), Some(to)) => (from.clone(), to.clone()),
            _ => {
                return Err(NeatError::DanglingConnection {
                    from: original.from,
                    to: original.to,
                })
            }
        };

        let x = (from.x + to.x) / 2.;
        if x - from.x < config.min_split_gap {
            trace!("split of {} -> {} is too shallow", from.inno, to.inno);
            return Ok(None);
        }

        let middle = match inno.replace_index(from.inno, to.inno) {
            0 => {
                let middle = inno.new_node(x, (from.y + to.y) / 2.);
                inno.set_replace_index(from.inno, to.inno, middle.inno)?;
                middle
            }
            idx => inno.node(Some(idx)),
        };

        let mut head = inno.connection(&from, &middle);
        head.weight = 1.;
        let mut tail = inno.connection(&middle, &to);
        tail.weight = original.weight;
        tail.enabled = original.enabled;

        let added_head = self.connections.insert_sorted(head);
        let added_tail = self.connections.insert_sorted(tail);
        if !added_head && !added_tail {
            return Ok(None);
        }

        let middle_inno = middle.inno;
        self.nodes.insert_sorted(middle);

        if config.permanent_main_connections && from.is_input() && to.is_output() {
            if let Some(c) = self.connection_mut(from.inno, to.inno) {
                c.enabled = false;
            }
        } else {
            self.connections.remove(original.hash_code());
        }

        Ok(Some(middle_inno))
    }

    /// Nudge a random weight and a random non-input bias
    pub fn mutate_weight_shift(
        &mut self,
        config: &Config,
        pressure: f64,
        rng: &mut impl RngCore,
    ) -> bool {
        let weight = config.weight_shift_strength * pressure;
        let bias = config.bias_shift_strength * pressure;
        let shifted = self
            .random_connection_mut(rng)
            .map(|c| c.weight += shift(weight, rng))
            .is_some();

        self.random_bias_mut(rng)
            .map(|b| *b += shift(bias, rng))
            .is_some()
            || shifted
    }

    /// Replace a random weight and a random non-input bias with fresh values
    pub fn mutate_weight_random(&mut self, config: &Config, rng: &mut impl RngCore) -> bool {
        let randomized = self
            .random_connection_mut(rng)
            .map(|c| c.weight = redraw(c.weight, config.weight_random_strength, rng))
            .is_some();

        self.random_bias_mut(rng)
            .map(|b| *b = redraw(*b, config.bias_random_strength, rng))
            .is_some()
            || randomized
    }

    /// Flip a random connection on or off. When `optimizing`, disabled connections stay disabled.
    pub fn mutate_link_toggle(&mut self, optimizing: bool, rng: &mut impl RngCore) -> Option<u64> {
        let connection = self.random_connection_mut(rng)?;
        if optimizing && !connection.enabled {
            return None;
        }
        connection.enabled = !connection.enabled;
        Some(connection.inno)
    }

    fn random_connection_mut(&mut self, rng: &mut impl RngCore) -> Option<&mut ConnectionGene> {
        let idx = self.connections.random_index(rng)?;
        self.connections.get_mut(idx)
    }

    fn random_bias_mut(&mut self, rng: &mut impl RngCore) -> Option<&mut f64> {
        let candidates = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, n)| (!n.is_input()).then_some(idx))
            .collect::<Vec<_>>();
        let idx = *candidates.choose(rng)?;
        self.nodes.get_mut(idx).map(|n| &mut n.bias)
    }

    /// Remove every connection and hidden node that doesn't sit on an enabled path from some input
    /// to some output. Inputs and outputs always survive, as do input -> output connections when
    /// `keep_main` is set. Returns how many genes were removed.
    pub fn prune_dead_graph(&mut self, keep_main: bool) -> usize {
        let mut forward: FxHashMap<u64, Vec<u64>> = FxHashMap::default();
        let mut backward: FxHashMap<u64, Vec<u64>> = FxHashMap::default();
        for c in self.enabled_connections() {
            forward.entry(c.from).or_default().push(c.to);
            backward.entry(c.to).or_default().push(c.from);
        }

        let live_from = reachable(
            self.nodes.iter().filter(|n| n.is_input()).map(|n| n.inno),
            &forward,
        );
        let live_to = reachable(
            self.nodes.iter().filter(|n| n.is_output()).map(|n| n.inno),
            &backward,
        );

        let before = self.nodes.len() + self.connections.len();
        let nodes = &self.nodes;
        self.connections.retain(|c| {
            let main = nodes.find(c.from).is_some_and(|n| n.is_input())
                && nodes.find(c.to).is_some_and(|n| n.is_output());
            (keep_main && main)
                || (c.enabled && live_from.contains(&c.from) && live_to.contains(&c.to))
        });
        self.nodes.retain(|n| {
            !n.is_hidden() || (live_from.contains(&n.inno) && live_to.contains(&n.inno))
        });

        before - self.nodes.len() - self.connections.len()
    }

    /// Perform 0 or more mutations on this genome, with frequencies drawn from `config`
    pub fn mutate(
        &mut self,
        mode: MutationMode,
        inno: &mut InnoGen,
        config: &Config,
        rng: &mut impl RngCore,
    ) -> Result<()> {
        let capped = mode.capped();
        let grow =
            !mode.self_opt && (!mode.optimize || (self.connections.len() as f64) < config.ct);

        for evt in EvolutionEvent::ALL {
            if evt.structural() && !grow {
                continue;
            }

            for _ in 0..rng.rolls(config.probability(evt), capped) {
                match evt {
                    EvolutionEvent::MutateLink => {
                        self.mutate_link(inno, config, rng);
                    }
                    EvolutionEvent::MutateNode => {
                        self.mutate_node(inno, config, rng)?;
                    }
                    EvolutionEvent::MutateWeightShift => {
                        self.mutate_weight_shift(config, mode.pressure, rng);
                    }
                    EvolutionEvent::MutateWeightRandom => {
                        self.mutate_weight_random(config, rng);
                    }
                    EvolutionEvent::MutateToggleLink => {
                        self.mutate_link_toggle(capped, rng);
                    }
                }
            }
        }

        if capped {
            let pruned = self.prune_dead_graph(config.permanent_main_connections);
            if pruned > 0 {
                trace!("pruned {pruned} dead genes");
            }
        }

        Ok(())
    }
}

/// A non-zero delta within ±`strength`, or 0 if none turned up
fn shift(strength: f64, rng: &mut impl RngCore) -> f64 {
    (0..CLADE_MAX_RETRIES)
        .map(|_| rng.random_range(-strength..=strength))
        .find(|d| *d != 0.)
        .unwrap_or(0.)
}

/// A value within ±`strength` that differs from `current`, or 0 if none turned up
fn redraw(current: f64, strength: f64, rng: &mut impl RngCore) -> f64 {
    (0..CLADE_MAX_RETRIES)
        .map(|_| rng.random_range(-strength..=strength))
        .find(|v| *v != current)
        .unwrap_or(0.)
}

fn reachable(
    roots: impl Iterator<Item = u64>,
    edges: &FxHashMap<u64, Vec<u64>>,
) -> FxHashSet<u64> {
    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::new();
    for root in roots {
        if seen.insert(root) {
            queue.push_back(root);
        }
    }

    while let Some(at) = queue.pop_front() {
        for next in edges.get(&at).into_iter().flatten() {
            if seen.insert(*next) {
                queue.push_back(*next);
            }
        }
    }

    seen
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::{new_t, random::WyRng, test_t};
    use rand::{rngs::StdRng, SeedableRng};

    /// A registry holding `sensory` inputs and `action` outputs, and the empty genome over them
    pub(crate) fn seeded(sensory: usize, action: usize) -> (InnoGen, Genome) {
        let mut inno = InnoGen::new();
        let mut nodes = Vec::new();
        for i in 0..sensory {
            nodes.push(inno.new_node(0.01, (i + 1) as f64 / (sensory + 1) as f64));
        }
        for i in 0..action {
            nodes.push(inno.new_node(0.99, (i + 1) as f64 / (action + 1) as f64));
        }
        (inno, Genome::with_nodes(nodes))
    }

    pub(crate) fn connect(genome: &mut Genome, inno: &mut InnoGen, from: u64, to: u64, w: f64) {
        let (from, to) = (inno.node(Some(from)), inno.node(Some(to)));
        genome.nodes.insert_sorted(from.clone());
        genome.nodes.insert_sorted(to.clone());
        let mut c = inno.connection(&from, &to);
        c.weight = w;
        genome.connections.insert_sorted(c);
    }

    fn assert_consistent(genome: &Genome) {
        for c in genome.connections() {
            assert!(genome.node(c.from()).is_some(), "dangling from in {c:?}");
            assert!(genome.node(c.to()).is_some(), "dangling to in {c:?}");
        }
        let innos = genome.nodes().iter().map(|n| n.inno()).collect::<Vec<_>>();
        assert!(innos.windows(2).all(|w| w[0] < w[1]));
        let innos = genome
            .connections()
            .iter()
            .map(|c| c.inno())
            .collect::<Vec<_>>();
        assert!(innos.windows(2).all(|w| w[0] <= w[1]));
    }

    test_t!(
    mutate_link[T: WyRng | StdRng]() {
        let mut rng = T::seed_from_u64(1);
        let config = Config::default();
        let (mut inno, mut genome) = seeded(3, 2);

        let mut added = 0;
        for _ in 0..200 {
            if genome.mutate_link(&mut inno, &config, &mut rng).is_some() {
                added += 1;
            }
        }

        assert_eq!(added, genome.connections().len());
        assert!(added > 0 && added <= 6);
        for c in genome.connections() {
            let (from, to) = (genome.node(c.from()).unwrap(), genome.node(c.to()).unwrap());
            assert!(from.x < to.x);
            assert!(c.weight.abs() <= config.weight_random_strength);
        }
        assert_consistent(&genome);
    });

    test_t!(
    mutate_link_same_depth[T: WyRng | StdRng]() {
        let mut rng = T::seed_from_u64(2);
        let (mut inno, mut genome) = seeded(4, 0);
        for _ in 0..100 {
            assert_eq!(genome.mutate_link(&mut inno, &Config::default(), &mut rng), None);
        }
        assert!(genome.connections().is_empty());
    });

    test_t!(
    mutate_node_shared_identity[T: WyRng | StdRng]() {
        let mut rng = T::seed_from_u64(3);
        let config = Config::default();
        let (mut inno, base) = seeded(1, 1);
        let mut l = base.clone();
        let mut r = base.clone();
        connect(&mut l, &mut inno, 1, 2, 0.7);
        connect(&mut r, &mut inno, 1, 2, -0.3);

        let l_middle = l.mutate_node(&mut inno, &config, &mut rng).unwrap().unwrap();
        let r_middle = r.mutate_node(&mut inno, &config, &mut rng).unwrap().unwrap();
        assert_eq!(l_middle, 3);
        assert_eq!(l_middle, r_middle);
        assert_eq!(inno.node_count(), 3);

        let head = l.connection(1, 3).unwrap();
        let tail = l.connection(3, 2).unwrap();
        assert_eq!(head.weight, 1.);
        assert_eq!(tail.weight, 0.7);
        assert_eq!(r.connection(3, 2).unwrap().weight, -0.3);
        assert_eq!(head.inno(), r.connection(1, 3).unwrap().inno());
        crate::assert_f64_approx!(l.node(3).unwrap().x, 0.5);

        assert!(!l.connection(1, 2).unwrap().enabled);
        assert_consistent(&l);
        assert_consistent(&r);
    });

    test_t!(
    mutate_node_removes_hidden_edge[T: WyRng | StdRng]() {
        let mut rng = T::seed_from_u64(4);
        let config = new_t!(Config, permanent_main_connections = false);
        let (mut inno, mut genome) = seeded(1, 1);
        connect(&mut genome, &mut inno, 1, 2, 0.5);

        let middle = genome.mutate_node(&mut inno, &config, &mut rng).unwrap().unwrap();
        assert!(genome.connection(1, 2).is_none());
        assert_eq!(genome.connections().len(), 2);

        // splitting 1 -> 3 again lands on a fresh node between them
        while genome.connections().len() < 4 {
            genome.mutate_node(&mut inno, &config, &mut rng).unwrap();
        }
        assert!(genome.nodes().iter().any(|n| n.inno() != middle && n.is_hidden()));
        assert_consistent(&genome);
    });

    test_t!(
    mutate_node_saturated[T: WyRng | StdRng]() {
        let mut rng = T::seed_from_u64(5);
        let config = Config::default();
        let (mut inno, mut genome) = seeded(1, 1);
        connect(&mut genome, &mut inno, 1, 2, 0.5);
        genome.mutate_node(&mut inno, &config, &mut rng).unwrap().unwrap();

        // the disabled original still names node 3, whose halves are both present
        let mut noop = false;
        for _ in 0..100 {
            let mut g = genome.clone();
            if g.mutate_node(&mut inno, &config, &mut rng).unwrap().is_none() {
                noop = true;
                assert_eq!(g.connections().len(), genome.connections().len());
                assert_eq!(g.nodes().len(), genome.nodes().len());
                assert!(!g.connection(1, 2).unwrap().enabled);
            }
        }
        assert!(noop);
    });

    #[test]
    fn test_mutate_node_too_shallow() {
        let mut rng = WyRng::seed_from_u64(7);
        let config = new_t!(Config, min_split_gap = 0.6);
        let (mut inno, mut genome) = seeded(1, 1);
        connect(&mut genome, &mut inno, 1, 2, 0.5);
        assert_eq!(genome.mutate_node(&mut inno, &config, &mut rng).unwrap(), None);
        assert_eq!(inno.node_count(), 2);
        assert!(genome.connection(1, 2).unwrap().enabled);
    }

    #[test]
    fn test_mutate_node_empty() {
        let mut rng = WyRng::seed_from_u64(8);
        let (mut inno, mut genome) = seeded(2, 2);
        assert_eq!(
            genome
                .mutate_node(&mut inno, &Config::default(), &mut rng)
                .unwrap(),
            None
        );
    }

    test_t!(
    mutate_weights[T: WyRng | StdRng]() {
        let mut rng = T::seed_from_u64(9);
        let config = Config::default();
        let (mut inno, mut genome) = seeded(1, 1);
        connect(&mut genome, &mut inno, 1, 2, 0.5);

        assert!(genome.mutate_weight_shift(&config, 1., &mut rng));
        let shifted = genome.connection(1, 2).unwrap().weight;
        assert_ne!(shifted, 0.5);
        assert!((shifted - 0.5).abs() <= config.weight_shift_strength);
        assert_ne!(genome.node(2).unwrap().bias, 0.);
        assert_eq!(genome.node(1).unwrap().bias, 0.);

        assert!(genome.mutate_weight_random(&config, &mut rng));
        let randomized = genome.connection(1, 2).unwrap().weight;
        assert_ne!(randomized, shifted);
        assert!(randomized.abs() <= config.weight_random_strength);
    });

    #[test]
    fn test_mutate_weights_zero_strength() {
        let mut rng = WyRng::seed_from_u64(10);
        let config = new_t!(
            Config,
            weight_shift_strength = 0.,
            bias_shift_strength = 0.
        );
        let (mut inno, mut genome) = seeded(1, 1);
        connect(&mut genome, &mut inno, 1, 2, 0.5);
        genome.mutate_weight_shift(&config, 1., &mut rng);
        assert_eq!(genome.connection(1, 2).unwrap().weight, 0.5);
    }

    #[test]
    fn test_toggle_optimizing() {
        let mut rng = WyRng::seed_from_u64(11);
        let (mut inno, mut genome) = seeded(1, 1);
        connect(&mut genome, &mut inno, 1, 2, 0.5);

        assert!(genome.mutate_link_toggle(true, &mut rng).is_some());
        assert!(!genome.connection(1, 2).unwrap().enabled);
        for _ in 0..10 {
            assert_eq!(genome.mutate_link_toggle(true, &mut rng), None);
        }
        assert!(genome.mutate_link_toggle(false, &mut rng).is_some());
        assert!(genome.connection(1, 2).unwrap().enabled);
    }

    #[test]
    fn test_prune_dead_graph() {
        let (mut inno, mut genome) = seeded(2, 1);
        let a = inno.new_node(0.4, 0.5).inno();
        let b = inno.new_node(0.6, 0.5).inno();
        let dead_end = inno.new_node(0.5, 0.1).inno();
        let orphan = inno.new_node(0.5, 0.9).inno();

        connect(&mut genome, &mut inno, 1, a, 1.);
        connect(&mut genome, &mut inno, a, b, 1.);
        connect(&mut genome, &mut inno, b, 3, 1.);
        connect(&mut genome, &mut inno, 2, dead_end, 1.);
        connect(&mut genome, &mut inno, orphan, 3, 1.);
        connect(&mut genome, &mut inno, 2, 3, 1.);
        genome.connections.find_mut(hash_code(2, 3)).unwrap().enabled = false;

        let removed = genome.prune_dead_graph(false);
        assert_eq!(removed, 5);
        assert_eq!(
            genome.nodes().iter().map(|n| n.inno()).collect::<Vec<_>>(),
            vec![1, 2, 3, a, b]
        );
        assert_eq!(genome.connections().len(), 3);
        assert_consistent(&genome);
    }

    #[test]
    fn test_prune_keeps_main() {
        let (mut inno, mut genome) = seeded(1, 1);
        connect(&mut genome, &mut inno, 1, 2, 1.);
        genome.connections.find_mut(hash_code(1, 2)).unwrap().enabled = false;
        assert_eq!(genome.prune_dead_graph(true), 0);
        assert_eq!(genome.prune_dead_graph(false), 1);
        assert_eq!(genome.nodes().len(), 2);
    }

    test_t!(
    mutate_self_opt_never_grows[T: WyRng | StdRng]() {
        let mut rng = T::seed_from_u64(12);
        let config = new_t!(Config, probability_link = 5., probability_node = 5.);
        let (mut inno, mut genome) = seeded(2, 1);
        connect(&mut genome, &mut inno, 1, 3, 0.5);
        let mode = MutationMode { self_opt: true, ..MutationMode::default() };
        for _ in 0..50 {
            genome.mutate(mode, &mut inno, &config, &mut rng).unwrap();
        }
        assert!(genome.connections().len() <= 1);
        assert_eq!(genome.nodes().len(), 3);
    });

    test_t!(
    mutate_grows[T: WyRng | StdRng]() {
        let mut rng = T::seed_from_u64(13);
        let (mut inno, mut genome) = seeded(3, 2);
        for _ in 0..100 {
            genome
                .mutate(MutationMode::default(), &mut inno, &Config::default(), &mut rng)
                .unwrap();
            assert_consistent(&genome);
        }
        assert!(!genome.connections().is_empty());
        assert!(genome.nodes().iter().any(|n| n.is_hidden()));
    });

    #[test]
    fn test_from_parts_dangling() {
        let (mut inno, genome) = seeded(1, 1);
        let orphan = inno.new_node(0.5, 0.5);
        let action = inno.node(Some(2));
        let c = inno.connection(&orphan, &action);
        assert!(matches!(
            Genome::from_parts(genome.nodes().iter().cloned(), [c]),
            Err(NeatError::DanglingConnection { from: 3, to: 2 })
        ));
    }
}
