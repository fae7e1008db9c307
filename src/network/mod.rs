//! Phenotypes: networks which may be constructed from [Genome]s in order to express their
//! behaviour.

pub mod calculator;

pub use calculator::Calculator;

use crate::{error::Result, genome::Genome};
use core::{convert::Infallible, str::FromStr};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub mod activate {
    pub fn linear(x: f64) -> f64 {
        x
    }

    pub fn sigmoid(x: f64) -> f64 {
        1. / (1. + (-x).exp())
    }

    pub fn tanh(x: f64) -> f64 {
        x.tanh()
    }

    pub fn relu(x: f64) -> f64 {
        if x < 0. {
            0.
        } else {
            x
        }
    }

    pub fn leaky_relu(x: f64) -> f64 {
        if x < 0. {
            0.01 * x
        } else {
            x
        }
    }

    /// Normalize `xs` in place into a probability distribution. The max is subtracted first, so
    /// large or all-equal inputs stay finite.
    pub fn softmax(xs: &mut [f64]) {
        let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return;
        }

        let mut total = 0.;
        for x in xs.iter_mut() {
            *x = (*x - max).exp();
            total += *x;
        }
        for x in xs.iter_mut() {
            *x /= total;
        }
    }
}

/// Activation applied by a network's hidden or output nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Activation {
    Linear,
    #[default]
    Sigmoid,
    Tanh,
    Relu,
    LeakyRelu,
    /// Applied over the whole output vector. Per node, it is the identity.
    Softmax,
}

impl Activation {
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Self::Linear | Self::Softmax => activate::linear(x),
            Self::Sigmoid => activate::sigmoid(x),
            Self::Tanh => activate::tanh(x),
            Self::Relu => activate::relu(x),
            Self::LeakyRelu => activate::leaky_relu(x),
        }
    }
}

/// Unrecognized names fall back to [Activation::Sigmoid]
impl FromStr for Activation {
    type Err = Infallible;

    fn from_str(s: &str) -> core::result::Result<Self, Infallible> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "linear" | "identity" => Self::Linear,
            "tanh" => Self::Tanh,
            "relu" => Self::Relu,
            "leaky_relu" | "leakyrelu" => Self::LeakyRelu,
            "softmax" => Self::Softmax,
            _ => Self::Sigmoid,
        })
    }
}

impl From<String> for Activation {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

/// The trait for all networks. Right now, only f64 values are used.
pub trait Network: Serialize + for<'de> Deserialize<'de> {
    /// Feed `input` through the network, returning its output.
    /// Input must be sized to the genome's input layer.
    fn step(&mut self, input: &[f64]) -> Result<&[f64]>;

    /// If the network is stateful, flush it's state
    fn flush(&mut self);

    /// The network's most recent output
    fn output(&self) -> &[f64];

    fn to_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_str(s: &str) -> Result<Self>
    where
        Self: Sized,
    {
        Ok(serde_json::from_str(s)?)
    }

    fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, Network::to_string(self)?)?;
        Ok(())
    }

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self>
    where
        Self: Sized,
    {
        <Self as Network>::from_str(&fs::read_to_string(path)?)
    }
}

/// For some [Genome], a network may construct itself from it.
pub trait FromGenome: Network {
    fn from_genome(genome: &Genome, hidden: Activation, output: Activation) -> Self;
}
