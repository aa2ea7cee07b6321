use crate::workflow::config::WorkflowConfig;
use anyhow::{bail, Context};
use phasorcore::render::{render_diagram, render_svg, DisplayList, Rect, RenderOptions, SvgDocument};
use phasorcore::scenario::ScenarioSet;
use phasorcore::telemetry::MetricsSnapshot;
use phasorcore::{DiagramPipeline, RenderOutcome};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct WorkflowResult {
    pub scenario_files: Vec<PathBuf>,
    pub overview_file: Option<PathBuf>,
    /// Scenarios that could not be drawn, with the reason.
    pub failures: Vec<(usize, String)>,
    pub fallbacks: Vec<usize>,
    pub metrics: MetricsSnapshot,
}

pub struct Runner {
    config: WorkflowConfig,
    pipeline: DiagramPipeline,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> anyhow::Result<Self> {
        let pipeline = DiagramPipeline::new(config.to_diagram_config())
            .context("validating diagram configuration")?;
        Ok(Self { config, pipeline })
    }

    pub fn execute(
        &self,
        set: &ScenarioSet,
        selection: Option<usize>,
        output: &Path,
        overview: bool,
    ) -> anyhow::Result<WorkflowResult> {
        let indices: Vec<usize> = match selection {
            Some(index) if index >= set.len() => bail!(
                "scenario {} requested but the workbook holds {}",
                index + 1,
                set.len()
            ),
            Some(index) => vec![index],
            None => (0..set.len()).collect(),
        };
        fs::create_dir_all(output)
            .with_context(|| format!("creating output directory {}", output.display()))?;

        let size = self.config.panel_size;
        let mut scenario_files = Vec::new();
        let mut failures = Vec::new();
        let mut fallbacks = Vec::new();
        let mut outcomes: Vec<(usize, Option<RenderOutcome>)> = Vec::new();

        for index in indices {
            let mut list = DisplayList::new();
            match self.pipeline.render(set, index, &mut list) {
                Ok(outcome) => {
                    let title = format!("Scenario {}", index + 1);
                    let svg = render_svg(&list, size, size, Some(&title));
                    let path = output.join(format!("scenario_{:02}.svg", index + 1));
                    fs::write(&path, svg)
                        .with_context(|| format!("writing {}", path.display()))?;
                    if outcome.used_fallback() {
                        fallbacks.push(index);
                    }
                    scenario_files.push(path);
                    outcomes.push((index, Some(outcome)));
                }
                Err(err) => {
                    failures.push((index, err.to_string()));
                    outcomes.push((index, None));
                }
            }
        }

        let overview_file = if overview && outcomes.len() > 1 {
            let path = output.join("overview.svg");
            fs::write(&path, self.overview(&outcomes)?)
                .with_context(|| format!("writing {}", path.display()))?;
            Some(path)
        } else {
            None
        };

        let metrics = self.pipeline.metrics();
        append_log(output, set.len(), &metrics)?;

        Ok(WorkflowResult {
            scenario_files,
            overview_file,
            failures,
            fallbacks,
            metrics,
        })
    }

    /// Grid of every scenario drawn with the smaller overview font.
    /// Failed scenarios keep their cell with only the title.
    fn overview(&self, outcomes: &[(usize, Option<RenderOutcome>)]) -> anyhow::Result<String> {
        let (columns, rows) = self.config.overview_grid(outcomes.len());
        let size = self.config.panel_size;
        let options = RenderOptions {
            label_fontsize: self.config.overview_label_fontsize,
            ..RenderOptions::from(self.pipeline.config())
        };

        let mut document = SvgDocument::new(columns as f64 * size, rows as f64 * size);
        for (cell, (index, outcome)) in outcomes.iter().enumerate() {
            let area = Rect::new(
                (cell % columns) as f64 * size,
                (cell / columns) as f64 * size,
                size,
                size,
            );
            let mut list = DisplayList::new();
            if let Some(outcome) = outcome {
                render_diagram(&mut list, &outcome.plan.input(), &options)
                    .with_context(|| format!("drawing overview panel {}", index + 1))?;
            }
            document.panel(area, &list, Some(&format!("Scenario {}", index + 1)));
        }
        Ok(document.finish())
    }
}

fn append_log(output: &Path, total: usize, metrics: &MetricsSnapshot) -> anyhow::Result<()> {
    let line = format!(
        "scenarios={} rendered={} fallbacks={} clipped_arrows={} failed={}\n",
        total, metrics.rendered, metrics.solver_fallbacks, metrics.clipped_arrows, metrics.failed
    );
    let path = output.join("render.log");
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    file.write_all(line.as_bytes())
        .with_context(|| format!("appending to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::build_scenarios;
    use phasorcore::scenario::Scenario;
    use tempfile::tempdir;

    #[test]
    fn runner_writes_one_svg_per_scenario_and_overview() {
        let dir = tempdir().unwrap();
        let set = build_scenarios(5, 7).unwrap();
        let runner = Runner::new(WorkflowConfig::default()).unwrap();

        let result = runner.execute(&set, None, dir.path(), true).unwrap();

        assert_eq!(result.scenario_files.len(), 5);
        assert!(dir.path().join("scenario_01.svg").exists());
        assert!(dir.path().join("scenario_05.svg").exists());
        let overview = fs::read_to_string(result.overview_file.unwrap()).unwrap();
        assert!(overview.contains("width=\"1600\""));
        assert!(overview.contains("height=\"800\""));
        assert!(overview.contains("Scenario 5"));
        assert_eq!(result.metrics.rendered, 5);

        let log = fs::read_to_string(dir.path().join("render.log")).unwrap();
        assert!(log.starts_with("scenarios=5 rendered=5"));
    }

    #[test]
    fn malformed_scenario_is_reported_and_others_render() {
        let dir = tempdir().unwrap();
        let mut broken = Scenario::new(vec![1.0], vec![0.0, 1.0], vec![1.0, 1.0, 1.0], None, 0.0);
        broken.inn = 2.0;
        let good = Scenario::new(
            vec![10.0, 10.0, 10.0],
            vec![0.0, 120.0, 240.0],
            vec![28.9, 28.9, 28.9],
            None,
            0.0,
        );
        let set = ScenarioSet::new(vec![broken, good]);
        let runner = Runner::new(WorkflowConfig::default()).unwrap();

        let result = runner.execute(&set, None, dir.path(), false).unwrap();

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, 0);
        assert_eq!(result.scenario_files, vec![dir.path().join("scenario_02.svg")]);
        assert!(result.overview_file.is_none());
    }

    #[test]
    fn selection_outside_the_workbook_is_an_error() {
        let dir = tempdir().unwrap();
        let set = build_scenarios(2, 1).unwrap();
        let runner = Runner::new(WorkflowConfig::default()).unwrap();
        assert!(runner.execute(&set, Some(2), dir.path(), false).is_err());

        let result = runner.execute(&set, Some(1), dir.path(), true).unwrap();
        assert_eq!(result.scenario_files, vec![dir.path().join("scenario_02.svg")]);
        assert!(result.overview_file.is_none());
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = WorkflowConfig {
            current_scale: 0.0,
            ..WorkflowConfig::default()
        };
        assert!(Runner::new(config).is_err());
    }
}
