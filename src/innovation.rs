//! The innovation registry. Every population owns exactly one [InnoGen]; it hands out the
//! canonical identity of every node and connection ever discovered, so the same structural
//! mutation in two unrelated genomes lands on the same innovation number.
//!
//! Writes take `&mut self`, so concurrent discovery of an innovation can't race: anything
//! mutating genomes in parallel has to serialize on the registry first.

use crate::{
    error::{NeatError, Result},
    genome::{gene::hash_code, ConnectionGene, Gene, GeneSet, NodeGene},
};
use fxhash::FxHashMap;
use log::trace;

#[derive(Debug, Clone, Default)]
pub struct InnoGen {
    nodes: GeneSet<NodeGene>,
    connections: FxHashMap<u64, ConnectionGene>,
}

impl InnoGen {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Every node ever registered, in innovation order
    #[inline]
    pub fn nodes(&self) -> &GeneSet<NodeGene> {
        &self.nodes
    }

    /// Every connection ever registered, in innovation order
    pub fn connections(&self) -> Vec<&ConnectionGene> {
        let mut connections = self.connections.values().collect::<Vec<_>>();
        connections.sort_by_key(|c| c.inno());
        connections
    }

    /// The canonical node with innovation `id`, or a freshly registered one if `id` is `None` or
    /// not yet known
    pub fn node(&mut self, id: Option<u64>) -> NodeGene {
        match id {
            Some(id) if id >= 1 && id as usize <= self.nodes.len() => {
                self.nodes.as_slice()[id as usize - 1].clone()
            }
            _ => self.new_node(0.5, 0.5),
        }
    }

    /// Register a new node at position (x, y) under the next innovation number
    pub fn new_node(&mut self, x: f64, y: f64) -> NodeGene {
        let node = NodeGene::new(self.nodes.len() as u64 + 1, x, y);
        trace!("registered node {} at x={x}", node.inno);
        self.nodes.insert(node.clone());
        node
    }

    /// Canonical node for `inno`, reserving every missing innovation number up to it. Used when
    /// restoring genomes whose nodes this registry has never seen.
    pub(crate) fn adopt_node(&mut self, inno: u64, x: f64, y: f64) -> NodeGene {
        if inno >= 1 && inno as usize <= self.nodes.len() {
            return self.nodes.as_slice()[inno as usize - 1].clone();
        }

        while (self.nodes.len() as u64) + 1 < inno {
            self.new_node(0.5, 0.5);
        }
        self.new_node(x, y)
    }

    /// A copy of the canonical connection from -> to, registering it if this is the first time the
    /// path has been seen
    pub fn connection(&mut self, from: &NodeGene, to: &NodeGene) -> ConnectionGene {
        let key = hash_code(from.inno, to.inno);
        let next = self.connections.len() as u64 + 1;
        let canonical = self.connections.entry(key).or_insert_with(|| {
            trace!("registered connection {next}: {} -> {}", from.inno, to.inno);
            ConnectionGene::new(next, from.inno, to.inno)
        });

        ConnectionGene::new(canonical.inno, from.inno, to.inno)
    }

    /// Innovation of the node that splits from -> to, or 0 if no genome has split it yet
    pub fn replace_index(&self, from: u64, to: u64) -> u64 {
        self.connections
            .get(&hash_code(from, to))
            .map_or(0, |c| c.replace_index)
    }

    pub fn set_replace_index(&mut self, from: u64, to: u64, index: u64) -> Result<()> {
        let canonical = self
            .connections
            .get_mut(&hash_code(from, to))
            .ok_or(NeatError::UnregisteredConnection { from, to })?;
        canonical.replace_index = index;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn nodes(inno: &mut InnoGen) -> (NodeGene, NodeGene, NodeGene) {
        (
            inno.new_node(0.01, 0.3),
            inno.new_node(0.01, 0.6),
            inno.new_node(0.99, 0.5),
        )
    }

    #[test]
    fn test_node_sequence() {
        let mut inno = InnoGen::new();
        let (a, b, c) = nodes(&mut inno);
        assert_eq!((a.inno(), b.inno(), c.inno()), (1, 2, 3));
        assert_eq!(inno.node(Some(2)).inno(), 2);
        assert_eq!(inno.node(Some(2)).y, 0.6);
        assert_eq!(inno.node_count(), 3);

        assert_eq!(inno.node(None).inno(), 4);
        assert_eq!(inno.node(Some(10)).inno(), 5);
        assert_eq!(inno.node(Some(0)).inno(), 6);
    }

    #[test]
    fn test_connection_identity() {
        let mut inno = InnoGen::new();
        let (a, b, c) = nodes(&mut inno);

        let ac = inno.connection(&a, &c);
        let bc = inno.connection(&b, &c);
        assert_eq!(ac.inno(), 1);
        assert_eq!(bc.inno(), 2);
        assert_eq!(inno.connection(&a, &c).inno(), 1);
        assert_eq!(inno.connection(&b, &c).inno(), 2);
        assert_eq!(inno.connection(&c, &a).inno(), 3);
        assert_eq!(inno.connection_count(), 3);

        assert_eq!(
            inno.connections()
                .iter()
                .map(|c| c.inno())
                .collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_connection_copy_is_fresh() {
        let mut inno = InnoGen::new();
        let (a, _, c) = nodes(&mut inno);
        inno.connection(&a, &c);
        inno.set_replace_index(a.inno(), c.inno(), 9).unwrap();

        let copy = inno.connection(&a, &c);
        assert_eq!(copy.replace_index, 0);
        assert!(copy.enabled);
        assert_eq!(copy.weight, 1.);
    }

    #[test]
    fn test_replace_index() {
        let mut inno = InnoGen::new();
        let (a, b, c) = nodes(&mut inno);
        inno.connection(&a, &c);

        assert_eq!(inno.replace_index(a.inno(), c.inno()), 0);
        inno.set_replace_index(a.inno(), c.inno(), 7).unwrap();
        assert_eq!(inno.replace_index(a.inno(), c.inno()), 7);

        assert_eq!(inno.replace_index(b.inno(), c.inno()), 0);
        assert!(matches!(
            inno.set_replace_index(b.inno(), c.inno(), 7),
            Err(NeatError::UnregisteredConnection { from: 2, to: 3 })
        ));
    }

    #[test]
    fn test_adopt_node() {
        let mut inno = InnoGen::new();
        nodes(&mut inno);
        assert_eq!(inno.adopt_node(2, 0.2, 0.2).y, 0.6);

        let adopted = inno.adopt_node(6, 0.4, 0.7);
        assert_eq!(adopted.inno(), 6);
        assert_eq!(adopted.x, 0.4);
        assert_eq!(inno.node_count(), 6);
        assert_eq!(inno.new_node(0.5, 0.5).inno(), 7);
    }
}
