use clade::{
    network::{Activation, FromGenome, Network},
    Calculator, Config, FitOptions, GenomeRecord, Population, Record,
};
use core::ops::ControlFlow;
use std::error::Error;

const POPULATION: usize = 150;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let x = vec![vec![0., 0.], vec![0., 1.], vec![1., 0.], vec![1., 1.]];
    let y = vec![vec![0.], vec![1.], vec![1.], vec![0.]];

    let mut population = Population::new(
        2,
        1,
        POPULATION,
        Activation::Sigmoid,
        Activation::Tanh,
        Config::default(),
        None,
    )?;

    let options = FitOptions {
        epochs: 500,
        error_threshold: 0.01,
        ..FitOptions::default()
    };
    let report = population.fit_with_hook(&x, &y, options, |stats| {
        if stats.epoch % 25 == 1 {
            println!(
                "epoch {}: error {:.5} ({} species, pressure {:.2})",
                stats.epoch, stats.error, stats.species, stats.mutation_pressure
            );
        }
        ControlFlow::Continue(())
    })?;

    println!(
        "{} after {} epochs, best error {:.5}",
        if report.stopped_early { "solved" } else { "gave up" },
        report.epochs,
        report.errors.iter().copied().fold(f64::INFINITY, f64::min)
    );

    let mut network =
        Calculator::from_genome(&report.champion, Activation::Tanh, Activation::Sigmoid);
    for input in &x {
        println!("{input:?} -> {:.4}", network.step(input)?[0]);
    }
    println!("{}", GenomeRecord::from(&report.champion).to_string()?);

    Ok(())
}
