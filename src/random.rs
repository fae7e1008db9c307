use rand::{Rng, RngCore, SeedableRng};

/// Events whose frequency is configured through [Probabilities]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionEvent {
    MutateLink,
    MutateNode,
    MutateWeightShift,
    MutateWeightRandom,
    MutateToggleLink,
}

impl EvolutionEvent {
    pub const ALL: [Self; 5] = [
        Self::MutateLink,
        Self::MutateNode,
        Self::MutateWeightShift,
        Self::MutateWeightRandom,
        Self::MutateToggleLink,
    ];

    /// Whether this event grows the structure of a genome
    pub fn structural(&self) -> bool {
        matches!(self, Self::MutateLink | Self::MutateNode)
    }
}

pub trait Probabilities {
    /// Expected number of occurrences of `evt` per mutation. May exceed 1.
    fn probability(&self, evt: EvolutionEvent) -> f64;
}

pub trait Happens: RngCore {
    /// Roll once against probability `p`
    fn happens(&mut self, p: f64) -> bool;

    /// How many times an event with expectation `p` happens on this roll. The whole part of `p`
    /// always happens, and the fraction happens once more with that probability. When `capped`,
    /// `p` is clamped to 1 first so at most a single occurrence is possible.
    fn rolls(&mut self, p: f64, capped: bool) -> usize {
        if p.is_nan() || p <= 0. {
            return 0;
        }
        let p = if capped { p.min(1.) } else { p };

        let whole = p.trunc();
        whole as usize + usize::from(self.happens(p - whole))
    }
}

impl<R: RngCore> Happens for R {
    fn happens(&mut self, p: f64) -> bool {
        self.random::<f64>() < p
    }
}

#[derive(Debug, Clone)]
pub struct WyRng {
    state: u64,
}

impl WyRng {
    pub fn seeded(state: u64) -> Self {
        Self { state }
    }
}

impl RngCore for WyRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        const WY_CONST_0: u64 = 0x2d35_8dcc_aa6c_78a5;
        const WY_CONST_1: u64 = 0x8bb8_4b93_962e_acc9;
        self.state = self.state.wrapping_add(WY_CONST_0);
        let t = u128::from(self.state) * u128::from(self.state ^ WY_CONST_1);
        (t as u64) ^ (t >> 64) as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for WyRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::seeded(u64::from_le_bytes(seed))
    }
}

/// A [WyRng] seeded from the thread-local generator
pub fn default_rng() -> WyRng {
    WyRng::seeded(rand::rng().next_u64())
}
