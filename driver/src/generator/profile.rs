use anyhow::ensure;
use phasorcore::math::phasor_sum;
use phasorcore::scenario::{Scenario, ScenarioSet};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for synthesizing unbalanced three-phase scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub scenarios: usize,
    pub seed: u64,
    pub nominal_current: f64,
    /// Relative spread of current magnitudes around nominal.
    pub current_spread: f64,
    /// Maximum deviation in degrees from the 0/120/240 pattern.
    pub angle_jitter: f64,
    pub nominal_voltage: f64,
    pub voltage_spread: f64,
    /// Probability that a scenario carries a neutral displacement.
    pub displacement_probability: f64,
    pub max_unn: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            scenarios: 4,
            seed: 0,
            nominal_current: 10.0,
            current_spread: 0.3,
            angle_jitter: 15.0,
            nominal_voltage: 50.0,
            voltage_spread: 0.15,
            displacement_probability: 0.75,
            max_unn: 8.0,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.scenarios > 0, "generator needs at least one scenario");
        ensure!(
            (0.0..1.0).contains(&self.current_spread) && (0.0..1.0).contains(&self.voltage_spread),
            "spreads must lie in [0, 1)"
        );
        ensure!(
            (0.0..=1.0).contains(&self.displacement_probability),
            "displacement probability must lie in [0, 1]"
        );
        ensure!(
            self.nominal_current > 0.0 && self.nominal_voltage > 0.0 && self.max_unn > 0.0,
            "nominal magnitudes must be positive"
        );
        Ok(())
    }
}

fn jitter(rng: &mut StdRng, spread: f64) -> f64 {
    rng.gen_range(-1.0..1.0) * spread
}

fn build_scenario(config: &GeneratorConfig, rng: &mut StdRng) -> Scenario {
    let mut currents = Vec::with_capacity(3);
    let mut current_angles = Vec::with_capacity(3);
    for phase in 0..3 {
        currents.push(config.nominal_current * (1.0 + jitter(rng, config.current_spread)));
        let angle = 120.0 * phase as f64 + jitter(rng, config.angle_jitter);
        current_angles.push(angle.rem_euclid(360.0));
    }

    let inn = phasor_sum(&currents, &current_angles).norm();

    let voltages = (0..3)
        .map(|_| config.nominal_voltage * (1.0 + jitter(rng, config.voltage_spread)))
        .collect();

    let u_nn = if rng.gen_bool(config.displacement_probability) {
        Some(rng.gen_range(0.5..=config.max_unn.max(0.5)))
    } else {
        Some(0.0)
    };

    Scenario::new(currents, current_angles, voltages, u_nn, inn)
}

pub fn build_scenarios_from_config(config: &GeneratorConfig) -> anyhow::Result<ScenarioSet> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let scenarios = (0..config.scenarios)
        .map(|_| build_scenario(config, &mut rng))
        .collect();
    Ok(ScenarioSet::new(scenarios))
}

pub fn build_scenarios(count: usize, seed: u64) -> anyhow::Result<ScenarioSet> {
    let config = GeneratorConfig {
        scenarios: count,
        seed,
        ..Default::default()
    };
    build_scenarios_from_config(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_requested_scenarios() {
        let set = build_scenarios(6, 3).unwrap();
        assert_eq!(set.len(), 6);
        for (index, scenario) in set.iter().enumerate() {
            scenario.validate(index).unwrap();
            assert_eq!(scenario.currents.len(), 3);
            assert!(scenario.current_angles.iter().all(|a| (0.0..360.0).contains(a)));
            assert!(scenario.inn >= 0.0);
        }
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let first = build_scenarios(5, 42).unwrap();
        let second = build_scenarios(5, 42).unwrap();
        let other = build_scenarios(5, 43).unwrap();
        assert_eq!(first.scenarios(), second.scenarios());
        assert_ne!(first.scenarios(), other.scenarios());
    }

    #[test]
    fn generator_without_spread_is_balanced() {
        let config = GeneratorConfig {
            scenarios: 2,
            current_spread: 0.0,
            angle_jitter: 0.0,
            displacement_probability: 0.0,
            ..Default::default()
        };
        let set = build_scenarios_from_config(&config).unwrap();
        let scenario = set.get(0).unwrap();
        assert_eq!(scenario.currents, vec![10.0, 10.0, 10.0]);
        assert_eq!(scenario.u_nn, Some(0.0));
        assert!(scenario.inn < 1e-9);
    }

    #[test]
    fn generated_inn_is_length_of_current_phasor_sum() {
        let set = build_scenarios(4, 11).unwrap();
        for scenario in set.iter() {
            let (re, im) = scenario
                .currents
                .iter()
                .zip(&scenario.current_angles)
                .map(|(m, a)| (m * a.to_radians().cos(), m * a.to_radians().sin()))
                .fold((0.0, 0.0), |(re, im), (x, y)| (re + x, im + y));
            assert!((scenario.inn - re.hypot(im)).abs() < 1e-9);
        }
    }

    #[test]
    fn generator_rejects_empty_request() {
        assert!(build_scenarios(0, 1).is_err());
    }
}
