//! Sheet-shaped scenario source.
//!
//! A workbook carries five sheets. `Currents`, `Current Angles` and `Voltages`
//! hold one row per phase and one column per scenario; `UNN` and `INN` hold a
//! single value per scenario. Empty cells are `null`. Columns may end early
//! (trailing `null`s) when a scenario has fewer currents than the others.

use crate::prelude::{DiagramError, DiagramResult};
use crate::scenario::collection::ScenarioSet;
use crate::scenario::record::Scenario;
use serde::{Deserialize, Serialize};

pub type SheetRows = Vec<Vec<Option<f64>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(rename = "Currents")]
    pub currents: SheetRows,
    #[serde(rename = "Current Angles")]
    pub current_angles: SheetRows,
    #[serde(rename = "UNN")]
    pub unn: Vec<Option<f64>>,
    #[serde(rename = "Voltages")]
    pub voltages: SheetRows,
    #[serde(rename = "INN")]
    pub inn: Vec<Option<f64>>,
}

impl Workbook {
    pub fn from_json_str(contents: &str) -> DiagramResult<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn to_json_string(&self) -> DiagramResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Lays scenarios out column-wise, padding short columns with `null`.
    pub fn from_scenarios(scenarios: &[Scenario]) -> Self {
        Self {
            currents: to_rows(scenarios, |s| &s.currents),
            current_angles: to_rows(scenarios, |s| &s.current_angles),
            unn: scenarios.iter().map(|s| s.u_nn).collect(),
            voltages: to_rows(scenarios, |s| &s.voltages),
            inn: scenarios.iter().map(|s| Some(s.inn)).collect(),
        }
    }

    pub fn scenario_count(&self) -> usize {
        self.unn.len()
    }

    /// Transposes the sheets into per-scenario records.
    ///
    /// Shape checks that concern a single scenario (three voltages, matching
    /// current and angle counts) are left to render time so one bad column
    /// does not block the rest.
    pub fn into_scenarios(self) -> DiagramResult<ScenarioSet> {
        let count = self.scenario_count();
        if self.inn.len() != count {
            return Err(DiagramError::Workbook(format!(
                "sheet 'INN' has {} values but 'UNN' has {}",
                self.inn.len(),
                count
            )));
        }

        let currents = columns("Currents", &self.currents, count)?;
        let current_angles = columns("Current Angles", &self.current_angles, count)?;
        let voltages = columns("Voltages", &self.voltages, count)?;

        let scenarios = currents
            .into_iter()
            .zip(current_angles)
            .zip(voltages)
            .enumerate()
            .map(|(index, ((currents, current_angles), voltages))| Scenario {
                currents,
                current_angles,
                voltages,
                u_nn: self.unn[index],
                inn: self.inn[index].unwrap_or(0.0),
            })
            .collect();

        Ok(ScenarioSet::new(scenarios))
    }
}

fn to_rows(scenarios: &[Scenario], field: impl Fn(&Scenario) -> &Vec<f64>) -> SheetRows {
    let depth = scenarios.iter().map(|s| field(s).len()).max().unwrap_or(0);
    (0..depth)
        .map(|row| {
            scenarios
                .iter()
                .map(|s| field(s).get(row).copied())
                .collect()
        })
        .collect()
}

fn columns(sheet: &str, rows: &SheetRows, count: usize) -> DiagramResult<Vec<Vec<f64>>> {
    if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != count) {
        return Err(DiagramError::Workbook(format!(
            "sheet '{}' row {} has {} cells, expected {}",
            sheet,
            row + 1,
            cells.len(),
            count
        )));
    }

    (0..count)
        .map(|column| {
            let cells: Vec<Option<f64>> = rows.iter().map(|r| r[column]).collect();
            let filled = cells
                .iter()
                .rposition(Option::is_some)
                .map(|last| last + 1)
                .unwrap_or(0);
            cells[..filled]
                .iter()
                .enumerate()
                .map(|(row, cell)| {
                    cell.ok_or_else(|| {
                        DiagramError::Workbook(format!(
                            "sheet '{}' column {} has an empty cell at row {}",
                            sheet,
                            column + 1,
                            row + 1
                        ))
                    })
                })
                .collect::<DiagramResult<Vec<f64>>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SCENARIOS: &str = r#"{
        "Currents": [[10.0, 12.0], [10.0, 8.0], [10.0, null]],
        "Current Angles": [[0.0, 10.0], [120.0, 135.0], [240.0, null]],
        "UNN": [0.0, 4.5],
        "Voltages": [[230.0, 228.0], [230.0, 233.0], [230.0, 229.0]],
        "INN": [null, 3.2]
    }"#;

    #[test]
    fn columns_become_scenarios() {
        let set = Workbook::from_json_str(TWO_SCENARIOS)
            .unwrap()
            .into_scenarios()
            .unwrap();
        assert_eq!(set.len(), 2);

        let first = set.get(0).unwrap();
        assert_eq!(first.currents, vec![10.0, 10.0, 10.0]);
        assert_eq!(first.u_nn, Some(0.0));
        assert_eq!(first.inn, 0.0);

        let second = set.get(1).unwrap();
        assert_eq!(second.currents, vec![12.0, 8.0]);
        assert_eq!(second.current_angles, vec![10.0, 135.0]);
        assert_eq!(second.voltages, vec![228.0, 233.0, 229.0]);
        assert_eq!(second.u_nn, Some(4.5));
        assert_eq!(second.inn, 3.2);
    }

    #[test]
    fn mismatched_scenario_counts_are_rejected() {
        let mut workbook = Workbook::from_json_str(TWO_SCENARIOS).unwrap();
        workbook.inn.push(Some(1.0));
        assert!(matches!(
            workbook.into_scenarios(),
            Err(DiagramError::Workbook(_))
        ));
    }

    #[test]
    fn gaps_inside_a_column_are_rejected() {
        let mut workbook = Workbook::from_json_str(TWO_SCENARIOS).unwrap();
        workbook.currents[1][0] = None;
        let err = workbook.into_scenarios().unwrap_err();
        assert!(err.to_string().contains("column 1"), "{err}");
    }

    #[test]
    fn scenarios_lay_out_back_into_the_same_sheets() {
        let workbook = Workbook::from_json_str(TWO_SCENARIOS).unwrap();
        let set = workbook.clone().into_scenarios().unwrap();
        let rebuilt = Workbook::from_scenarios(set.scenarios());
        assert_eq!(rebuilt.currents, workbook.currents);
        assert_eq!(rebuilt.inn, vec![Some(0.0), Some(3.2)]);
    }
}
