//! The persisted shape of genomes and populations, and conversion to and from it.
//!
//! A record names nodes by innovation number only, so loading goes through an [InnoGen]: every
//! connection is re-resolved against the registry, and node innovations it hasn't seen yet are
//! reserved.

use crate::{
    error::{NeatError, Result},
    genome::{ConnectionGene, Gene, Genome, NodeGene},
    innovation::InnoGen,
};
use fxhash::FxHashMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fs, path::Path};

/// Types which persist as JSON, to strings and files
pub trait Record: Serialize + DeserializeOwned {
    fn to_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, Record::to_string(self)?)?;
        Ok(())
    }

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub innovation_number: u64,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub bias: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub replace_index: u64,
    pub enabled: bool,
    pub weight: f64,
    pub from: u64,
    pub to: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenomeRecord {
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<ConnectionRecord>,
}

/// A registry together with the genomes it issued innovations for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub registry: GenomeRecord,
    pub genomes: Vec<GenomeRecord>,
}

impl Record for GenomeRecord {}
impl Record for PopulationRecord {}

impl From<&NodeGene> for NodeRecord {
    fn from(node: &NodeGene) -> Self {
        Self {
            innovation_number: node.inno(),
            x: node.x,
            y: node.y,
            bias: node.bias,
        }
    }
}

impl From<&ConnectionGene> for ConnectionRecord {
    fn from(connection: &ConnectionGene) -> Self {
        Self {
            replace_index: connection.replace_index,
            enabled: connection.enabled,
            weight: connection.weight,
            from: connection.from(),
            to: connection.to(),
        }
    }
}

impl From<&Genome> for GenomeRecord {
    fn from(genome: &Genome) -> Self {
        Self {
            nodes: genome.nodes().iter().map(NodeRecord::from).collect(),
            connections: genome
                .connections()
                .iter()
                .map(ConnectionRecord::from)
                .collect(),
        }
    }
}

impl GenomeRecord {
    /// Every node and canonical connection of `inno`, in innovation order
    pub fn from_registry(inno: &InnoGen) -> Self {
        Self {
            nodes: inno.nodes().iter().map(NodeRecord::from).collect(),
            connections: inno
                .connections()
                .into_iter()
                .map(ConnectionRecord::from)
                .collect(),
        }
    }

    /// Rebuild the genome, registering its nodes and connections with `inno`. Connections
    /// pointing at a node absent from the record are rejected.
    pub fn to_genome(&self, inno: &mut InnoGen) -> Result<Genome> {
        let mut nodes = FxHashMap::default();
        for record in &self.nodes {
            if record.innovation_number == 0 {
                return Err(NeatError::UnknownNode(0));
            }

            inno.adopt_node(record.innovation_number, record.x, record.y);
            let mut node = NodeGene::new(record.innovation_number, record.x, record.y);
            node.bias = record.bias;
            nodes.insert(record.innovation_number, node);
        }

        let mut connections = Vec::with_capacity(self.connections.len());
        for record in &self.connections {
            let (Some(from), Some(to)) = (nodes.get(&record.from), nodes.get(&record.to)) else {
                return Err(NeatError::DanglingConnection {
                    from: record.from,
                    to: record.to,
                });
            };

            let mut connection = inno.connection(from, to);
            connection.weight = record.weight;
            connection.enabled = record.enabled;
            connection.replace_index = record.replace_index;
            connections.push(connection);
        }

        Genome::from_parts(nodes.into_values(), connections)
    }
}

impl InnoGen {
    /// Restore a registry saved with [GenomeRecord::from_registry]. Connections are registered
    /// in record order, so a record in innovation order keeps its numbering.
    pub fn from_record(record: &GenomeRecord) -> Result<Self> {
        let mut inno = InnoGen::new();
        let mut nodes = record.nodes.iter().collect::<Vec<_>>();
        nodes.sort_by_key(|n| n.innovation_number);
        for node in nodes {
            if node.innovation_number == 0 {
                return Err(NeatError::UnknownNode(0));
            }
            inno.adopt_node(node.innovation_number, node.x, node.y);
        }

        for c in &record.connections {
            let from = inno
                .nodes()
                .find(c.from)
                .cloned()
                .ok_or(NeatError::UnknownNode(c.from))?;
            let to = inno
                .nodes()
                .find(c.to)
                .cloned()
                .ok_or(NeatError::UnknownNode(c.to))?;
            inno.connection(&from, &to);
            if c.replace_index != 0 {
                inno.set_replace_index(c.from, c.to, c.replace_index)?;
            }
        }

        Ok(inno)
    }
}
