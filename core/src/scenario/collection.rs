use crate::math::phasor::inn_angle;
use crate::prelude::{DiagramError, DiagramResult};
use crate::scenario::record::Scenario;
use std::cell::OnceCell;

/// Ordered scenarios plus the lazily computed neutral current angles.
///
/// An angle is computed on its first query and kept for the lifetime of the
/// set. Editing a scenario through [`ScenarioSet::scenario_mut`] afterwards
/// does not refresh it.
#[derive(Debug, Default)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
    inn_angles: Vec<OnceCell<f64>>,
}

impl ScenarioSet {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        let inn_angles = scenarios.iter().map(|_| OnceCell::new()).collect();
        Self {
            scenarios,
            inn_angles,
        }
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, index: usize) -> DiagramResult<&Scenario> {
        self.scenarios
            .get(index)
            .ok_or(DiagramError::ScenarioIndex {
                index,
                len: self.scenarios.len(),
            })
    }

    pub fn scenario_mut(&mut self, index: usize) -> DiagramResult<&mut Scenario> {
        let len = self.scenarios.len();
        self.scenarios
            .get_mut(index)
            .ok_or(DiagramError::ScenarioIndex { index, len })
    }

    /// Angle of I_NN for scenario `index`, memoized on first success.
    pub fn inn_angle(&self, index: usize) -> DiagramResult<f64> {
        let scenario = self.get(index)?;
        if let Some(angle) = self.inn_angles[index].get() {
            return Ok(*angle);
        }
        scenario.validate(index)?;
        Ok(*self.inn_angles[index]
            .get_or_init(|| inn_angle(&scenario.currents, &scenario.current_angles)))
    }

    pub fn cached_inn_angle(&self, index: usize) -> Option<f64> {
        self.inn_angles.get(index).and_then(|cell| cell.get().copied())
    }
}

impl From<Vec<Scenario>> for ScenarioSet {
    fn from(scenarios: Vec<Scenario>) -> Self {
        Self::new(scenarios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbalanced() -> Scenario {
        Scenario::new(
            vec![20.0, 10.0, 10.0],
            vec![0.0, 120.0, 240.0],
            vec![230.0, 230.0, 230.0],
            Some(4.0),
            5.0,
        )
    }

    #[test]
    fn angle_is_computed_lazily() {
        let set = ScenarioSet::new(vec![unbalanced()]);
        assert_eq!(set.cached_inn_angle(0), None);
        let angle = set.inn_angle(0).unwrap();
        assert!(angle.abs() < 1e-9);
        assert_eq!(set.cached_inn_angle(0), Some(angle));
    }

    #[test]
    fn cached_angle_survives_scenario_edits() {
        let mut set = ScenarioSet::new(vec![unbalanced()]);
        let first = set.inn_angle(0).unwrap();

        let scenario = set.scenario_mut(0).unwrap();
        scenario.currents = vec![10.0, 30.0, 10.0];

        assert_eq!(set.inn_angle(0).unwrap(), first);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let set = ScenarioSet::new(vec![unbalanced()]);
        assert!(matches!(
            set.inn_angle(3),
            Err(DiagramError::ScenarioIndex { index: 3, len: 1 })
        ));
    }

    #[test]
    fn malformed_scenario_is_not_cached() {
        let mut broken = unbalanced();
        broken.current_angles.pop();
        let set = ScenarioSet::new(vec![broken]);
        assert!(set.inn_angle(0).is_err());
        assert_eq!(set.cached_inn_angle(0), None);
    }
}
