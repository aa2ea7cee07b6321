use crate::prelude::{DiagramError, DiagramResult};
use serde::{Deserialize, Serialize};

/// One measurement set: line currents, line-to-line voltages and neutral quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Current magnitudes.
    pub currents: Vec<f64>,
    /// Current angles in degrees, one per entry of `currents`.
    pub current_angles: Vec<f64>,
    /// Magnitudes measured from N' to L1, L2 and L3.
    pub voltages: Vec<f64>,
    /// Displacement voltage between N and N'. Absent or zero disables displacement.
    #[serde(default)]
    pub u_nn: Option<f64>,
    /// Neutral current magnitude.
    #[serde(default)]
    pub inn: f64,
}

impl Scenario {
    pub fn new(
        currents: Vec<f64>,
        current_angles: Vec<f64>,
        voltages: Vec<f64>,
        u_nn: Option<f64>,
        inn: f64,
    ) -> Self {
        Self {
            currents,
            current_angles,
            voltages,
            u_nn,
            inn,
        }
    }

    /// Checks the array shapes; `index` only labels the error.
    pub fn validate(&self, index: usize) -> DiagramResult<()> {
        if self.currents.len() != self.current_angles.len() {
            return Err(DiagramError::MalformedScenario {
                index,
                reason: format!(
                    "{} currents but {} current angles",
                    self.currents.len(),
                    self.current_angles.len()
                ),
            });
        }
        if self.voltages.len() != 3 {
            return Err(DiagramError::MalformedScenario {
                index,
                reason: format!("expected 3 voltages, got {}", self.voltages.len()),
            });
        }
        Ok(())
    }

    pub fn phase_voltages(&self, index: usize) -> DiagramResult<[f64; 3]> {
        match self.voltages.as_slice() {
            &[l1, l2, l3] => Ok([l1, l2, l3]),
            other => Err(DiagramError::MalformedScenario {
                index,
                reason: format!("expected 3 voltages, got {}", other.len()),
            }),
        }
    }
}
