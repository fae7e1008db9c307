//! Errors surfaced to callers. Only contract violations live here: a mutation that finds nothing
//! to do reports it through its return value, never through [NeatError].

use thiserror::Error;

pub type Result<T> = core::result::Result<T, NeatError>;

#[derive(Debug, Error)]
pub enum NeatError {
    #[error("training data length mismatch: {x} input rows, {y} output rows")]
    LengthMismatch { x: usize, y: usize },
    #[error("{kind} row {row} has width {found}, expected {expected}")]
    DimensionMismatch {
        row: usize,
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("training data is empty")]
    EmptyTrainingData,
    #[error("validation split {0} is outside of [0, 1]")]
    InvalidValidationSplit(f64),
    #[error("validation split leaves no rows to train on")]
    NoTrainingRows,
    #[error("network expects {expected} inputs, got {found}")]
    InputSize { expected: usize, found: usize },
    #[error("no connection {from} -> {to} is registered")]
    UnregisteredConnection { from: u64, to: u64 },
    #[error("connection {from} -> {to} references a node absent from the genome")]
    DanglingConnection { from: u64, to: u64 },
    #[error("node {0} is not registered")]
    UnknownNode(u64),
    #[error("{found_inputs} -> {found_outputs} layout loaded, expected {inputs} -> {outputs}")]
    LayoutMismatch {
        inputs: usize,
        outputs: usize,
        found_inputs: usize,
        found_outputs: usize,
    },
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("population size must be at least 1")]
    EmptyPopulation,
    #[error("a population needs at least one input and one output")]
    NoTopology,
    #[error("coefficient {0} must be non-negative")]
    NegativeCoefficient(&'static str),
    #[error("compatibility threshold must be positive, got {0}")]
    CompatibilityThreshold(f64),
    #[error("survivor fraction must be within (0, 1], got {0}")]
    Survivors(f64),
    #[error("probability {0} must be non-negative and finite")]
    Probability(&'static str),
    #[error("strength {0} must be non-negative and finite")]
    Strength(&'static str),
}
