//! Centralized defaults for clade evolution parameters.
//!
//! All configurable parameters are defined here with the `CLADE_` prefix, and are the values a
//! [crate::Config] starts from before any overrides are applied.

// ============================================================================
// Topology
// ============================================================================

/// Depth of every input node
pub const CLADE_INPUT_X: f64 = 0.01;

/// Depth of every output node
pub const CLADE_OUTPUT_X: f64 = 0.99;

/// Multiplier separating `from` and `to` in a connection hash
pub const CLADE_MAX_NODES: u64 = 1 << 20;

/// Attempts made by randomized searches before giving up
pub const CLADE_MAX_RETRIES: usize = 10;

/// A split is abandoned when the new node would sit closer than this to its source
pub const CLADE_MIN_SPLIT_GAP: f64 = 1e-4;

// ============================================================================
// Compatibility Distance
// ============================================================================

/// Coefficient for excess genes in compatibility distance calculation
pub const CLADE_C1: f64 = 1.0;

/// Coefficient for disjoint genes in compatibility distance calculation
pub const CLADE_C2: f64 = 1.0;

/// Coefficient for parameter differences in compatibility distance calculation
pub const CLADE_C3: f64 = 0.4;

/// Genetic distance threshold for speciation
pub const CLADE_CP: f64 = 3.0;

/// Genome size below which distance is not normalized, and below which growth is always allowed
pub const CLADE_CT: f64 = 20.0;

// ============================================================================
// Selection
// ============================================================================

/// Fraction of every specie that survives [crate::Specie::kill]
pub const CLADE_SURVIVORS: f64 = 0.5;

/// Probability of inheriting a matching gene from the fitter parent in crossover
pub const CLADE_CROSSOVER_PICK_FITTER: f64 = 0.5;

// ============================================================================
// Genome Mutation Parameters
// ============================================================================

/// Probability of adding a new connection
pub const CLADE_PROBABILITY_LINK: f64 = 0.5;

/// Probability of splitting a connection (adding a node)
pub const CLADE_PROBABILITY_NODE: f64 = 0.2;

/// Probability of shifting a weight and a bias
pub const CLADE_PROBABILITY_WEIGHT_SHIFT: f64 = 1.5;

/// Probability of replacing a weight and a bias
pub const CLADE_PROBABILITY_WEIGHT_RANDOM: f64 = 0.2;

/// Probability of toggling a connection
pub const CLADE_PROBABILITY_TOGGLE_LINK: f64 = 0.05;

/// Bound of a single weight shift, before mutation pressure
pub const CLADE_WEIGHT_SHIFT_STRENGTH: f64 = 0.5;

/// Bound of a freshly drawn weight
pub const CLADE_WEIGHT_RANDOM_STRENGTH: f64 = 2.0;

/// Bound of a single bias shift, before mutation pressure
pub const CLADE_BIAS_SHIFT_STRENGTH: f64 = 0.3;

/// Bound of a freshly drawn bias
pub const CLADE_BIAS_RANDOM_STRENGTH: f64 = 1.0;

/// Client error below which a genome mutates in self-optimization mode
pub const CLADE_OPT_ERR_THRESHOLD: f64 = 0.02;

// ============================================================================
// Training
// ============================================================================

/// Growth of mutation pressure per epoch without improvement
pub const CLADE_PRESSURE_STEP: f64 = 1.1;

/// Upper bound on mutation pressure
pub const CLADE_PRESSURE_MAX: f64 = 4.0;
