use crate::constants::{CLADE_INPUT_X, CLADE_MAX_NODES, CLADE_OUTPUT_X};
use core::hash::{Hash, Hasher};

pub const MAX_NODES: u64 = CLADE_MAX_NODES;

/// Something carrying an innovation number, and a key which makes it unique within a [super::GeneSet]
pub trait Gene: Clone {
    type Key: Copy + Eq + Hash;

    /// gene innovation id
    fn inno(&self) -> u64;

    fn key(&self) -> Self::Key;
}

#[derive(Debug, Clone)]
pub struct NodeGene {
    pub(crate) inno: u64,
    pub x: f64,
    pub y: f64,
    pub bias: f64,
}

impl NodeGene {
    pub fn new(inno: u64, x: f64, y: f64) -> Self {
        Self {
            inno,
            x,
            y,
            bias: 0.,
        }
    }

    #[inline]
    pub fn is_input(&self) -> bool {
        self.x <= CLADE_INPUT_X
    }

    #[inline]
    pub fn is_output(&self) -> bool {
        self.x >= CLADE_OUTPUT_X
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        !self.is_input() && !self.is_output()
    }
}

impl Gene for NodeGene {
    type Key = u64;

    fn inno(&self) -> u64 {
        self.inno
    }

    fn key(&self) -> u64 {
        self.inno
    }
}

impl PartialEq for NodeGene {
    fn eq(&self, other: &Self) -> bool {
        self.inno == other.inno
    }
}

impl Eq for NodeGene {}

impl Hash for NodeGene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inno.hash(state);
    }
}

/// A weighted path between two nodes, named by their innovation numbers.
/// Identity is the path alone: weight and enabled state don't participate in equality.
#[derive(Debug, Clone)]
pub struct ConnectionGene {
    pub(crate) inno: u64,
    pub(crate) from: u64,
    pub(crate) to: u64,
    pub weight: f64,
    pub enabled: bool,
    /// innovation of the node which splits this connection, 0 until it has been split
    pub replace_index: u64,
}

impl ConnectionGene {
    pub fn new(inno: u64, from: u64, to: u64) -> Self {
        Self {
            inno,
            from,
            to,
            weight: 1.,
            enabled: true,
            replace_index: 0,
        }
    }

    #[inline]
    pub fn from(&self) -> u64 {
        self.from
    }

    #[inline]
    pub fn to(&self) -> u64 {
        self.to
    }

    #[inline]
    pub fn path(&self) -> (u64, u64) {
        (self.from, self.to)
    }

    #[inline]
    pub fn hash_code(&self) -> u64 {
        hash_code(self.from, self.to)
    }
}

#[inline]
pub fn hash_code(from: u64, to: u64) -> u64 {
    from * MAX_NODES + to
}

impl Gene for ConnectionGene {
    type Key = u64;

    fn inno(&self) -> u64 {
        self.inno
    }

    fn key(&self) -> u64 {
        self.hash_code()
    }
}

impl PartialEq for ConnectionGene {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for ConnectionGene {}

impl Hash for ConnectionGene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_code().hash(state);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_connection_identity_ignores_params() {
        let mut l = ConnectionGene::new(3, 1, 4);
        let r = ConnectionGene::new(9, 1, 4);
        l.weight = -2.;
        l.enabled = false;
        assert_eq!(l, r);
        assert_eq!(l.hash_code(), r.hash_code());
        assert_ne!(l, ConnectionGene::new(3, 4, 1));
    }

    #[test]
    fn test_hash_code() {
        assert_eq!(hash_code(0, 7), 7);
        assert_eq!(hash_code(2, 3), 2 * (1 << 20) + 3);
    }

    #[test]
    fn test_node_kind() {
        assert!(NodeGene::new(1, CLADE_INPUT_X, 0.5).is_input());
        assert!(NodeGene::new(2, CLADE_OUTPUT_X, 0.5).is_output());
        assert!(NodeGene::new(3, 0.5, 0.5).is_hidden());
        assert_eq!(NodeGene::new(3, 0.5, 0.5), NodeGene::new(3, 0.1, 0.9));
    }
}
