use super::{activate, Activation, FromGenome, Network};
use crate::{
    error::{NeatError, Result},
    genome::{Gene, Genome},
};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Neuron {
    bias: f64,
    /// (source neuron, weight) for every enabled connection into this one
    incoming: Vec<(usize, f64)>,
}

/// A feed-forward phenotype. Neurons are laid out inputs first, then hidden neurons ascending by
/// depth, then outputs, so a single pass in index order sees every source before its target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calculator {
    inputs: usize,
    outputs: usize,
    neurons: Vec<Neuron>,
    hidden: Activation,
    output: Activation,
    #[serde(skip)]
    state: Vec<f64>,
}

impl Calculator {
    #[inline]
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Evaluate `input` and return a copy of the output
    pub fn calculate(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        Ok(self.step(input)?.to_vec())
    }
}

impl Network for Calculator {
    fn step(&mut self, input: &[f64]) -> Result<&[f64]> {
        if input.len() != self.inputs {
            return Err(NeatError::InputSize {
                expected: self.inputs,
                found: input.len(),
            });
        }

        self.flush();
        self.state[..self.inputs].copy_from_slice(input);

        let first_output = self.neurons.len() - self.outputs;
        for (idx, neuron) in self.neurons.iter().enumerate().skip(self.inputs) {
            let sum = neuron
                .incoming
                .iter()
                .fold(neuron.bias, |acc, (from, w)| acc + w * self.state[*from]);
            self.state[idx] = if idx < first_output {
                self.hidden.apply(sum)
            } else {
                self.output.apply(sum)
            };
        }

        if self.output == Activation::Softmax {
            activate::softmax(&mut self.state[first_output..]);
        }

        Ok(&self.state[first_output..])
    }

    fn flush(&mut self) {
        self.state.clear();
        self.state.resize(self.neurons.len(), 0.);
    }

    fn output(&self) -> &[f64] {
        &self.state[self.state.len().saturating_sub(self.outputs)..]
    }
}

impl FromGenome for Calculator {
    fn from_genome(genome: &Genome, hidden: Activation, output: Activation) -> Self {
        let inputs = genome.nodes().iter().filter(|n| n.is_input());
        let outputs = genome.nodes().iter().filter(|n| n.is_output());
        let mut hiddens = genome
            .nodes()
            .iter()
            .filter(|n| n.is_hidden())
            .collect::<Vec<_>>();
        hiddens.sort_by(|l, r| l.x.total_cmp(&r.x));

        let (n_inputs, n_outputs) = (inputs.clone().count(), outputs.clone().count());
        let order = inputs
            .chain(hiddens)
            .chain(outputs)
            .collect::<Vec<_>>();
        let index = order
            .iter()
            .enumerate()
            .map(|(idx, n)| (n.inno(), idx))
            .collect::<FxHashMap<_, _>>();

        let mut neurons = order
            .iter()
            .map(|n| Neuron {
                bias: if n.is_input() { 0. } else { n.bias },
                incoming: Vec::new(),
            })
            .collect::<Vec<_>>();
        for c in genome.enabled_connections() {
            if let (Some(&from), Some(&to)) = (index.get(&c.from()), index.get(&c.to())) {
                if to >= n_inputs {
                    neurons[to].incoming.push((from, c.weight));
                }
            }
        }

        Self {
            inputs: n_inputs,
            outputs: n_outputs,
            state: vec![0.; neurons.len()],
            neurons,
            hidden,
            output,
        }
    }
}
