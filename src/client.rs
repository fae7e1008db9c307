use crate::{
    config::Config,
    error::Result,
    genome::{Genome, MutationMode},
    innovation::InnoGen,
    network::{Activation, Calculator, FromGenome, Network},
};
use rand::RngCore;

/// One member of a population: a genome, its fitness, and the network built from it
#[derive(Debug, Clone)]
pub struct Client {
    genome: Genome,
    pub score: f64,
    pub score_raw: f64,
    pub error: f64,
    /// the fittest client of the last evaluation, shielded from mutation
    pub best_score: bool,
    pub(crate) species: Option<usize>,
    hidden: Activation,
    output: Activation,
    calculator: Option<Calculator>,
}

impl Client {
    pub fn new(genome: Genome, hidden: Activation, output: Activation) -> Self {
        Self {
            genome,
            score: 0.,
            score_raw: 0.,
            error: f64::INFINITY,
            best_score: false,
            species: None,
            hidden,
            output,
            calculator: None,
        }
    }

    #[inline]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Replace the genome, discarding the network built from the old one
    pub fn set_genome(&mut self, genome: Genome) {
        self.genome = genome;
        self.calculator = None;
    }

    /// Id of the specie this client currently belongs to
    #[inline]
    pub fn species(&self) -> Option<usize> {
        self.species
    }

    #[inline]
    pub fn distance(&self, other: &Self, config: &Config) -> f64 {
        self.genome.distance(&other.genome, config)
    }

    /// Record the error of this client's network. Score is the inverse, `1 / (1 + error)`.
    pub fn set_fitness(&mut self, error: f64) {
        self.error = error;
        self.score_raw = 1. / (1. + error);
        self.score = self.score_raw;
    }

    /// Mutate the genome, unless this client holds the best score and `force` isn't set. A
    /// client whose error is already below the optimization threshold only tunes and prunes.
    pub fn mutate(
        &mut self,
        force: bool,
        optimize: bool,
        pressure: f64,
        inno: &mut InnoGen,
        config: &Config,
        rng: &mut impl RngCore,
    ) -> Result<()> {
        if self.best_score && !force {
            return Ok(());
        }

        let mode = MutationMode {
            self_opt: self.error < config.opt_err_threshold && !force,
            optimize,
            pressure,
        };
        self.genome.mutate(mode, inno, config, rng)?;
        self.calculator = None;
        Ok(())
    }

    /// Build the network now rather than on the next [Client::calculate]
    pub fn rebuild(&mut self) {
        self.calculator = Some(Calculator::from_genome(
            &self.genome,
            self.hidden,
            self.output,
        ));
    }

    pub fn calculate(&mut self, input: &[f64]) -> Result<&[f64]> {
        let calculator = self
            .calculator
            .get_or_insert_with(|| Calculator::from_genome(&self.genome, self.hidden, self.output));
        calculator.step(input)
    }
}
