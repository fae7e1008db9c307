//! The population controller. A [Population] owns the innovation registry, every client, and the
//! species clustering them, and advances them one generation per [Population::evolve].

use crate::{
    client::Client,
    config::Config,
    constants::{CLADE_INPUT_X, CLADE_OUTPUT_X},
    error::{ConfigError, NeatError, Result},
    genome::{Genome, NodeGene},
    innovation::InnoGen,
    network::Activation,
    random::{default_rng, WyRng},
    reproduce::RandomSelector,
    serialize::{GenomeRecord, PopulationRecord},
    specie::Specie,
};
use log::debug;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct Population {
    inputs: usize,
    outputs: usize,
    config: Config,
    innogen: InnoGen,
    clients: Vec<Client>,
    species: Vec<Specie>,
    next_specie: usize,
    generation: usize,
    rng: WyRng,
    pub(crate) mutation_pressure: f64,
}

impl Population {
    /// A population of `size` clients over `inputs` input and `outputs` output nodes. Clients
    /// start from the genomes in `loaded`, cycled to fill the population, or else from the empty
    /// genome.
    pub fn new(
        inputs: usize,
        outputs: usize,
        size: usize,
        output: Activation,
        hidden: Activation,
        config: Config,
        loaded: Option<&PopulationRecord>,
    ) -> Result<Self> {
        Self::with_rng(
            inputs,
            outputs,
            size,
            (hidden, output),
            config,
            loaded,
            default_rng(),
        )
    }

    /// [Population::new], drawing every random decision from a generator seeded with `seed`
    #[allow(clippy::too_many_arguments)]
    pub fn with_seed(
        inputs: usize,
        outputs: usize,
        size: usize,
        output: Activation,
        hidden: Activation,
        config: Config,
        loaded: Option<&PopulationRecord>,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(
            inputs,
            outputs,
            size,
            (hidden, output),
            config,
            loaded,
            WyRng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        inputs: usize,
        outputs: usize,
        size: usize,
        (hidden, output): (Activation, Activation),
        config: Config,
        loaded: Option<&PopulationRecord>,
        rng: WyRng,
    ) -> Result<Self> {
        config.validate()?;
        if size == 0 {
            return Err(ConfigError::EmptyPopulation.into());
        }
        if inputs == 0 || outputs == 0 {
            return Err(ConfigError::NoTopology.into());
        }

        let mut innogen = match loaded {
            Some(record) => InnoGen::from_record(&record.registry)?,
            None => InnoGen::new(),
        };
        for i in 0..inputs {
            let y = (i + 1) as f64 / (inputs + 1) as f64;
            innogen.adopt_node(i as u64 + 1, CLADE_INPUT_X, y);
        }
        for i in 0..outputs {
            let y = (i + 1) as f64 / (outputs + 1) as f64;
            innogen.adopt_node((inputs + i) as u64 + 1, CLADE_OUTPUT_X, y);
        }
        check_layout(innogen.nodes().iter(), inputs, outputs)?;
        // inputs then outputs, in the leading innovation numbers
        let leading = || innogen.nodes().iter().take(inputs + outputs);
        if leading()
            .enumerate()
            .any(|(idx, n)| n.is_input() != (idx < inputs) || n.is_output() != (idx >= inputs))
        {
            let (found_inputs, found_outputs) = layout(leading());
            return Err(NeatError::LayoutMismatch {
                inputs,
                outputs,
                found_inputs,
                found_outputs,
            });
        }

        let genomes = loaded
            .map(|record| {
                record
                    .genomes
                    .iter()
                    .map(|g| {
                        let genome = g.to_genome(&mut innogen)?;
                        check_layout(genome.nodes().iter(), inputs, outputs)?;
                        Ok(genome)
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();
        let empty = Genome::with_nodes(innogen.nodes().iter().take(inputs + outputs).cloned());
        let clients = (0..size)
            .map(|idx| {
                let genome = match genomes.len() {
                    0 => empty.clone(),
                    n => genomes[idx % n].clone(),
                };
                Client::new(genome, hidden, output)
            })
            .collect::<Vec<_>>();

        debug!(
            "population of {size} over {inputs} -> {outputs}, {} genomes loaded",
            genomes.len()
        );
        Ok(Self {
            inputs,
            outputs,
            config,
            innogen,
            clients,
            species: Vec::new(),
            next_specie: 0,
            generation: 0,
            rng,
            mutation_pressure: 1.,
        })
    }

    #[inline]
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &InnoGen {
        &self.innogen
    }

    /// Direct access to the registry, for mutating genomes outside of [Population::evolve]
    #[inline]
    pub fn registry_mut(&mut self) -> &mut InnoGen {
        &mut self.innogen
    }

    #[inline]
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Scores may be set through here before calling [Population::evolve]
    #[inline]
    pub fn clients_mut(&mut self) -> &mut [Client] {
        &mut self.clients
    }

    #[inline]
    pub fn species(&self) -> &[Specie] {
        &self.species
    }

    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[inline]
    pub fn mutation_pressure(&self) -> f64 {
        self.mutation_pressure
    }

    /// The client flagged as best during the last [Population::evolve], or else the one with
    /// the highest score
    pub fn champion(&self) -> Option<&Client> {
        self.clients.iter().find(|c| c.best_score).or_else(|| {
            self.clients
                .iter()
                .max_by(|l, r| l.score.total_cmp(&r.score))
        })
    }

    /// A genome holding only this population's input and output nodes
    pub fn empty_genome(&self) -> Genome {
        Genome::with_nodes(
            self.innogen
                .nodes()
                .iter()
                .take(self.inputs + self.outputs)
                .cloned(),
        )
    }

    /// Advance one generation: cluster clients into species, kill the weakest of each, drop
    /// species left with one member, breed replacements for every client left without a specie,
    /// mutate everyone, and rebuild their networks.
    ///
    /// With `optimize` set, mutation tops out at one of each kind per genome and prunes dead
    /// genes afterwards.
    pub fn evolve(&mut self, optimize: bool) -> Result<()> {
        self.mark_champion();
        self.gen_species();
        self.kill();
        self.remove_extinct();
        self.reproduce(optimize);
        self.mutate(optimize)?;
        for client in self.clients.iter_mut() {
            client.rebuild();
        }

        self.generation += 1;
        debug!(
            "generation {}: {} species, {} nodes and {} connections registered",
            self.generation,
            self.species.len(),
            self.innogen.node_count(),
            self.innogen.connection_count()
        );
        Ok(())
    }

    fn mark_champion(&mut self) {
        let best = self
            .clients
            .iter()
            .enumerate()
            .max_by(|(_, l), (_, r)| l.score.total_cmp(&r.score))
            .map(|(idx, _)| idx);
        for (idx, client) in self.clients.iter_mut().enumerate() {
            client.best_score = Some(idx) == best;
        }
    }

    fn gen_species(&mut self) {
        for specie in self.species.iter_mut() {
            specie.reset(&mut self.clients, &mut self.rng);
        }

        for idx in 0..self.clients.len() {
            if self.clients[idx].species.is_some() {
                continue;
            }

            let mut placed = false;
            for specie in self.species.iter_mut() {
                if specie.put(&mut self.clients, idx, false, &self.config) {
                    placed = true;
                    break;
                }
            }

            if !placed {
                let id = self.next_specie;
                self.next_specie += 1;
                self.species.push(Specie::new(id, idx, &mut self.clients));
            }
        }

        for specie in self.species.iter_mut() {
            specie.evaluate_score(&self.clients);
        }
    }

    fn kill(&mut self) {
        for specie in self.species.iter_mut() {
            specie.kill(&mut self.clients, self.config.survivors);
        }
    }

    /// Species with one member or less go extinct, unless that member is the champion
    fn remove_extinct(&mut self) {
        let clients = &mut self.clients;
        let before = self.species.len();
        self.species.retain_mut(|specie| {
            let alive = specie.len() > 1
                || specie.members().iter().any(|&idx| clients[idx].best_score);
            if !alive {
                specie.go_extinct(clients);
            }
            alive
        });

        if before != self.species.len() {
            debug!("{} species went extinct", before - self.species.len());
        }
    }

    /// Breed a new genome for every client without a specie, from a specie picked by score
    fn reproduce(&mut self, optimize: bool) {
        let selector = self
            .species
            .iter()
            .enumerate()
            .map(|(idx, specie)| (idx, specie.score))
            .collect::<RandomSelector<_>>();

        let mut litter = Vec::new();
        for idx in 0..self.clients.len() {
            if self.clients[idx].species.is_some() {
                continue;
            }
            let Some(&specie) = selector.random(&mut self.rng) else {
                break;
            };
            if let Some(child) =
                self.species[specie].breed(&self.clients, optimize, &self.config, &mut self.rng)
            {
                litter.push((idx, specie, child));
            }
        }

        for (idx, specie, child) in litter {
            self.clients[idx].set_genome(child);
            self.species[specie].put(&mut self.clients, idx, true, &self.config);
        }
    }

    fn mutate(&mut self, optimize: bool) -> Result<()> {
        for client in self.clients.iter_mut() {
            client.mutate(
                false,
                optimize,
                self.mutation_pressure,
                &mut self.innogen,
                &self.config,
                &mut self.rng,
            )?;
        }
        Ok(())
    }

    /// The registry and every client's genome
    pub fn save(&self) -> PopulationRecord {
        PopulationRecord {
            registry: GenomeRecord::from_registry(&self.innogen),
            genomes: self
                .clients
                .iter()
                .map(|c| GenomeRecord::from(c.genome()))
                .collect(),
        }
    }

    /// Rebuild a saved genome against this population's registry. The genome must carry this
    /// population's inputs and outputs.
    pub fn load_genome(&mut self, record: &GenomeRecord) -> Result<Genome> {
        let genome = record.to_genome(&mut self.innogen)?;
        check_layout(genome.nodes().iter(), self.inputs, self.outputs)?;
        Ok(genome)
    }
}

/// Number of input and output nodes among `nodes`
fn layout<'a>(nodes: impl Iterator<Item = &'a NodeGene>) -> (usize, usize) {
    nodes.fold((0, 0), |(i, o), n| {
        (i + usize::from(n.is_input()), o + usize::from(n.is_output()))
    })
}

fn check_layout<'a>(
    nodes: impl Iterator<Item = &'a NodeGene>,
    inputs: usize,
    outputs: usize,
) -> Result<()> {
    match layout(nodes) {
        (i, o) if i == inputs && o == outputs => Ok(()),
        (found_inputs, found_outputs) => Err(NeatError::LayoutMismatch {
            inputs,
            outputs,
            found_inputs,
            found_outputs,
        }),
    }
}
