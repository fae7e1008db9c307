//! Supervised training. Every epoch scores each client by its mean squared error over the
//! training rows, then evolves the population, until the best error falls under a threshold.

use crate::{
    client::Client,
    constants::{CLADE_PRESSURE_MAX, CLADE_PRESSURE_STEP},
    error::{NeatError, Result},
    genome::Genome,
    population::Population,
};
use core::ops::ControlFlow;
use log::info;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub epochs: usize,
    /// training stops once the best error is at or below this
    pub error_threshold: f64,
    /// fraction of rows, taken from the end, held out for validation
    pub validation_split: f64,
    pub verbose: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            epochs: 1000,
            error_threshold: 0.01,
            validation_split: 0.,
            verbose: false,
        }
    }
}

/// What an epoch hook gets to see
#[derive(Debug, Clone, PartialEq)]
pub struct EpochStats {
    /// 1-indexed
    pub epoch: usize,
    /// lowest training error among clients this epoch
    pub error: f64,
    /// error of this epoch's best client on the held out rows
    pub validation_error: Option<f64>,
    /// lowest training error of any epoch so far
    pub best_error: f64,
    pub species: usize,
    pub mutation_pressure: f64,
}

#[derive(Debug, Clone)]
pub struct FitReport {
    pub errors: Vec<f64>,
    /// same length as `errors`, if any rows were held out
    pub validation_errors: Option<Vec<f64>>,
    pub epochs: usize,
    /// the genome with the lowest training error of any epoch
    pub champion: Genome,
    /// whether training ended by reaching the error threshold
    pub stopped_early: bool,
}

/// Mean over every row and output of the squared difference. A network that blows up is
/// infinitely wrong.
pub fn mean_squared_error(client: &mut Client, x: &[Vec<f64>], y: &[Vec<f64>]) -> Result<f64> {
    let mut total = 0.;
    let mut count = 0;
    for (input, want) in x.iter().zip(y) {
        let have = client.calculate(input)?;
        for (h, w) in have.iter().zip(want) {
            total += (w - h).powi(2);
            count += 1;
        }
    }

    let error = if count == 0 { 0. } else { total / count as f64 };
    Ok(if error.is_finite() { error } else { f64::INFINITY })
}

impl Population {
    /// Train on `x` against `y`. See [Population::fit_with_hook].
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[Vec<f64>], options: FitOptions) -> Result<FitReport> {
        self.fit_with_hook(x, y, options, |_| ControlFlow::Continue(()))
    }

    /// Train on `x` against `y` for up to `options.epochs` epochs, evolving between them. Calls
    /// `hook` after scoring every epoch; [ControlFlow::Break] ends training before the next
    /// evolution.
    ///
    /// Data is checked up front: mismatched row counts or widths, empty data, and a validation
    /// split outside of [0, 1] fail before any epoch runs.
    pub fn fit_with_hook(
        &mut self,
        x: &[Vec<f64>],
        y: &[Vec<f64>],
        options: FitOptions,
        mut hook: impl FnMut(&EpochStats) -> ControlFlow<()>,
    ) -> Result<FitReport> {
        let train = self.check_training_data(x, y, options.validation_split)?;
        let (x_train, x_val) = x.split_at(train);
        let (y_train, y_val) = y.split_at(train);

        let mut errors = Vec::with_capacity(options.epochs);
        let mut validation_errors = (!x_val.is_empty()).then(Vec::new);
        let mut best: Option<(f64, Genome)> = None;
        let mut stopped_early = false;
        let mut epochs = 0;

        for epoch in 1..=options.epochs {
            epochs = epoch;
            let idx = self.evaluate(x_train, y_train)?;
            let error = self.clients()[idx].error;

            let improved = !matches!(&best, Some((best_error, _)) if error >= *best_error);
            if improved {
                self.mutation_pressure = 1.;
                best = Some((error, self.clients()[idx].genome().clone()));
            } else {
                self.mutation_pressure =
                    (self.mutation_pressure * CLADE_PRESSURE_STEP).min(CLADE_PRESSURE_MAX);
            }

            let validation_error = match validation_errors.as_mut() {
                Some(history) => {
                    let e = mean_squared_error(&mut self.clients_mut()[idx], x_val, y_val)?;
                    history.push(e);
                    Some(e)
                }
                None => None,
            };
            errors.push(error);

            let stats = EpochStats {
                epoch,
                error,
                validation_error,
                best_error: best.as_ref().map_or(error, |(e, _)| *e),
                species: self.species().len(),
                mutation_pressure: self.mutation_pressure,
            };
            if options.verbose {
                info!(
                    "epoch {epoch}: error {error:.6}, validation {validation_error:?}, {} species, pressure {:.2}",
                    stats.species, stats.mutation_pressure
                );
            }

            let flow = hook(&stats);
            if error <= options.error_threshold {
                info!(
                    "error {error:.6} reached threshold {} at epoch {epoch}",
                    options.error_threshold
                );
                stopped_early = true;
                break;
            }
            if flow.is_break() || epoch == options.epochs {
                break;
            }

            let optimize = stats.best_error < self.config().opt_err_threshold;
            self.evolve(optimize)?;
        }

        Ok(FitReport {
            errors,
            validation_errors,
            epochs,
            champion: best.map_or_else(|| self.empty_genome(), |(_, g)| g),
            stopped_early,
        })
    }

    /// Number of rows to train on, after holding out `validation_split` of them
    fn check_training_data(
        &self,
        x: &[Vec<f64>],
        y: &[Vec<f64>],
        validation_split: f64,
    ) -> Result<usize> {
        if x.len() != y.len() {
            return Err(NeatError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if x.is_empty() {
            return Err(NeatError::EmptyTrainingData);
        }

        for (rows, kind, expected) in [(x, "input", self.inputs()), (y, "output", self.outputs())] {
            if let Some((row, found)) = rows
                .iter()
                .map(Vec::len)
                .enumerate()
                .find(|(_, len)| *len != expected)
            {
                return Err(NeatError::DimensionMismatch {
                    row,
                    kind,
                    expected,
                    found,
                });
            }
        }

        if !(0. ..=1.).contains(&validation_split) {
            return Err(NeatError::InvalidValidationSplit(validation_split));
        }
        let train = x.len() - (x.len() as f64 * validation_split).floor() as usize;
        if train == 0 {
            return Err(NeatError::NoTrainingRows);
        }
        Ok(train)
    }

    /// Score every client, returning the index of the one with the lowest error
    fn evaluate(&mut self, x: &[Vec<f64>], y: &[Vec<f64>]) -> Result<usize> {
        #[cfg(feature = "parallel")]
        let errors = self
            .clients_mut()
            .par_iter_mut()
            .map(|c| mean_squared_error(c, x, y))
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let errors = self
            .clients_mut()
            .iter_mut()
            .map(|c| mean_squared_error(c, x, y))
            .collect::<Result<Vec<_>>>()?;

        for (client, error) in self.clients_mut().iter_mut().zip(&errors) {
            client.set_fitness(*error);
        }

        Ok(errors
            .iter()
            .enumerate()
            .min_by(|(_, l), (_, r)| l.total_cmp(r))
            .map_or(0, |(idx, _)| idx))
    }
}
