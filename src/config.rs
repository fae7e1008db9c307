//! Tunable parameters of a [crate::Population]. Every field defaults to its `CLADE_` constant, so
//! any subset of fields is a valid set of overrides.

use crate::{
    constants::*,
    error::{ConfigError, Result},
    random::{EvolutionEvent, Probabilities},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// excess gene coefficient
    pub c1: f64,
    /// disjoint gene coefficient
    pub c2: f64,
    /// parameter difference coefficient
    pub c3: f64,
    /// compatibility threshold
    pub cp: f64,
    /// complexity threshold
    pub ct: f64,
    pub survivors: f64,

    pub probability_link: f64,
    pub probability_node: f64,
    pub probability_weight_shift: f64,
    pub probability_weight_random: f64,
    pub probability_toggle_link: f64,

    pub weight_shift_strength: f64,
    pub weight_random_strength: f64,
    pub bias_shift_strength: f64,
    pub bias_random_strength: f64,

    /// keep a split input -> output connection around, disabled, instead of removing it
    pub permanent_main_connections: bool,
    pub opt_err_threshold: f64,
    pub crossover_pick_fitter: f64,
    pub min_split_gap: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            c1: CLADE_C1,
            c2: CLADE_C2,
            c3: CLADE_C3,
            cp: CLADE_CP,
            ct: CLADE_CT,
            survivors: CLADE_SURVIVORS,
            probability_link: CLADE_PROBABILITY_LINK,
            probability_node: CLADE_PROBABILITY_NODE,
            probability_weight_shift: CLADE_PROBABILITY_WEIGHT_SHIFT,
            probability_weight_random: CLADE_PROBABILITY_WEIGHT_RANDOM,
            probability_toggle_link: CLADE_PROBABILITY_TOGGLE_LINK,
            weight_shift_strength: CLADE_WEIGHT_SHIFT_STRENGTH,
            weight_random_strength: CLADE_WEIGHT_RANDOM_STRENGTH,
            bias_shift_strength: CLADE_BIAS_SHIFT_STRENGTH,
            bias_random_strength: CLADE_BIAS_RANDOM_STRENGTH,
            permanent_main_connections: true,
            opt_err_threshold: CLADE_OPT_ERR_THRESHOLD,
            crossover_pick_fitter: CLADE_CROSSOVER_PICK_FITTER,
            min_split_gap: CLADE_MIN_SPLIT_GAP,
        }
    }
}

impl Config {
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        for (name, v) in [("c1", self.c1), ("c2", self.c2), ("c3", self.c3)] {
            if !(v >= 0.) {
                return Err(ConfigError::NegativeCoefficient(name));
            }
        }

        if !(self.cp > 0.) {
            return Err(ConfigError::CompatibilityThreshold(self.cp));
        }

        if !(self.survivors > 0. && self.survivors <= 1.) {
            return Err(ConfigError::Survivors(self.survivors));
        }

        for (name, p) in [
            ("probability_link", self.probability_link),
            ("probability_node", self.probability_node),
            ("probability_weight_shift", self.probability_weight_shift),
            ("probability_weight_random", self.probability_weight_random),
            ("probability_toggle_link", self.probability_toggle_link),
            ("crossover_pick_fitter", self.crossover_pick_fitter),
        ] {
            if !(p.is_finite() && p >= 0.) {
                return Err(ConfigError::Probability(name));
            }
        }

        for (name, s) in [
            ("weight_shift_strength", self.weight_shift_strength),
            ("weight_random_strength", self.weight_random_strength),
            ("bias_shift_strength", self.bias_shift_strength),
            ("bias_random_strength", self.bias_random_strength),
            ("ct", self.ct),
            ("min_split_gap", self.min_split_gap),
        ] {
            if !(s.is_finite() && s >= 0.) {
                return Err(ConfigError::Strength(name));
            }
        }

        Ok(())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }
}

impl Probabilities for Config {
    fn probability(&self, evt: EvolutionEvent) -> f64 {
        match evt {
            EvolutionEvent::MutateLink => self.probability_link,
            EvolutionEvent::MutateNode => self.probability_node,
            EvolutionEvent::MutateWeightShift => self.probability_weight_shift,
            EvolutionEvent::MutateWeightRandom => self.probability_weight_random,
            EvolutionEvent::MutateToggleLink => self.probability_toggle_link,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::new_t;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_overrides() {
        let config = Config::from_str(r#"{"cp": 1.5, "survivors": 0.3}"#).unwrap();
        assert_eq!(config.cp, 1.5);
        assert_eq!(config.survivors, 0.3);
        assert_eq!(config.c1, CLADE_C1);
        assert_eq!(config.probability_node, CLADE_PROBABILITY_NODE);
    }

    #[test]
    fn test_validate_rejects() {
        assert_eq!(
            new_t!(Config, survivors = 0.).validate(),
            Err(ConfigError::Survivors(0.))
        );
        assert_eq!(
            new_t!(Config, survivors = 1.5).validate(),
            Err(ConfigError::Survivors(1.5))
        );
        assert_eq!(
            new_t!(Config, cp = 0.).validate(),
            Err(ConfigError::CompatibilityThreshold(0.))
        );
        assert_eq!(
            new_t!(Config, c3 = -1.).validate(),
            Err(ConfigError::NegativeCoefficient("c3"))
        );
        assert_eq!(
            new_t!(Config, probability_node = f64::INFINITY).validate(),
            Err(ConfigError::Probability("probability_node"))
        );
        assert_eq!(
            new_t!(Config, bias_random_strength = -0.1).validate(),
            Err(ConfigError::Strength("bias_random_strength"))
        );
    }

    #[test]
    fn test_probabilities() {
        let config = new_t!(Config, probability_link = 2.5, probability_toggle_link = 0.);
        assert_eq!(config.probability(EvolutionEvent::MutateLink), 2.5);
        assert_eq!(config.probability(EvolutionEvent::MutateToggleLink), 0.);
    }
}
