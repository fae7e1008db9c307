//! NEAT neuroevolution. A [Population] of [Client]s evolves feed-forward network topologies and
//! weights, clustered into [Specie]s by compatibility distance, while a population-wide
//! [InnoGen] keeps every structural innovation comparable across genomes.

pub mod client;
pub mod config;
pub mod constants;
pub mod crossover;
pub mod error;
pub mod genome;
pub mod innovation;
pub mod macros;
pub mod network;
pub mod population;
pub mod random;
pub mod reproduce;
pub mod serialize;
pub mod specie;
pub mod train;

pub use client::Client;
pub use config::Config;
pub use error::{ConfigError, NeatError, Result};
pub use genome::{ConnectionGene, Gene, Genome, MutationMode, NodeGene};
pub use innovation::InnoGen;
pub use network::{activate, Activation, Calculator, FromGenome, Network};
pub use population::Population;
pub use random::{Happens, Probabilities};
pub use reproduce::RandomSelector;
pub use serialize::{GenomeRecord, PopulationRecord, Record};
pub use specie::Specie;
pub use train::{EpochStats, FitOptions, FitReport};
