use crate::math::geometry::{angle_between, triangle_vertices, Point};
use crate::prelude::{DiagramConfig, DiagramResult};
use crate::render::engine::{render_diagram, DiagramInput, RenderOptions, RenderReport};
use crate::render::surface::DrawingSurface;
use crate::scenario::collection::ScenarioSet;
use crate::solver::star_point::{NeutralPoint, NeutralPointEstimate, StarPointSolver};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};

/// Everything the renderer needs for one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioPlan {
    pub index: usize,
    pub triangle: [Point; 3],
    pub estimate: NeutralPointEstimate,
    pub phase_angles: [f64; 3],
    pub voltages: [f64; 3],
    pub currents: Vec<f64>,
    pub current_angles: Vec<f64>,
    pub inn: f64,
    pub inn_angle: f64,
}

impl ScenarioPlan {
    pub fn build(
        set: &ScenarioSet,
        index: usize,
        config: &DiagramConfig,
        solver: &StarPointSolver,
    ) -> DiagramResult<Self> {
        let scenario = set.get(index)?;
        scenario.validate(index)?;
        let voltages = scenario.phase_voltages(index)?;
        let inn_angle = set.inn_angle(index)?;

        let triangle = triangle_vertices(config.triangle_amplitude);
        let estimate = solver.locate(&triangle, scenario.u_nn, &voltages);
        let neutral = estimate.neutral.position();
        let phase_angles = triangle.map(|vertex| angle_between(neutral, vertex));

        Ok(Self {
            index,
            triangle,
            estimate,
            phase_angles,
            voltages,
            currents: scenario.currents.clone(),
            current_angles: scenario.current_angles.clone(),
            inn: scenario.inn,
            inn_angle,
        })
    }

    pub fn neutral(&self) -> NeutralPoint {
        self.estimate.neutral
    }

    pub fn input(&self) -> DiagramInput<'_> {
        DiagramInput {
            scenario: self.index,
            triangle: self.triangle,
            neutral: self.estimate.neutral,
            phase_angles: self.phase_angles,
            currents: &self.currents,
            current_angles: &self.current_angles,
            inn: self.inn,
            inn_angle: self.inn_angle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub plan: ScenarioPlan,
    pub report: RenderReport,
}

impl RenderOutcome {
    pub fn used_fallback(&self) -> bool {
        self.plan.estimate.used_fallback()
    }
}

/// Plans and renders scenarios with one configuration, keeping session metrics.
pub struct DiagramPipeline {
    config: DiagramConfig,
    solver: StarPointSolver,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl DiagramPipeline {
    pub fn new(config: DiagramConfig) -> DiagramResult<Self> {
        Self::with_solver(config, StarPointSolver::new())
    }

    pub fn with_solver(config: DiagramConfig, solver: StarPointSolver) -> DiagramResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            solver,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("pipeline"),
        })
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn plan(&self, set: &ScenarioSet, index: usize) -> DiagramResult<ScenarioPlan> {
        ScenarioPlan::build(set, index, &self.config, &self.solver)
    }

    pub fn render<S: DrawingSurface + ?Sized>(
        &self,
        set: &ScenarioSet,
        index: usize,
        surface: &mut S,
    ) -> DiagramResult<RenderOutcome> {
        self.render_with(set, index, surface, &RenderOptions::from(&self.config))
    }

    pub fn render_with<S: DrawingSurface + ?Sized>(
        &self,
        set: &ScenarioSet,
        index: usize,
        surface: &mut S,
        options: &RenderOptions,
    ) -> DiagramResult<RenderOutcome> {
        let outcome = self.plan(set, index).and_then(|plan| {
            let report = render_diagram(surface, &plan.input(), options)?;
            Ok(RenderOutcome { plan, report })
        });

        match &outcome {
            Ok(outcome) => {
                if outcome.used_fallback() {
                    self.metrics.record_fallback();
                }
                self.metrics.record_rendered(outcome.report.clipped);
                self.logger.record(&format!(
                    "scenario {} rendered: {} current arrows, {} clipped, displaced {}",
                    index + 1,
                    outcome.report.current_arrows,
                    outcome.report.clipped,
                    outcome.plan.neutral().is_displaced()
                ));
            }
            Err(err) => {
                self.metrics.record_failure();
                self.logger
                    .warn(&format!("scenario {} not rendered: {}", index + 1, err));
            }
        }
        outcome
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for DiagramPipeline {
    fn default() -> Self {
        Self {
            config: DiagramConfig::default(),
            solver: StarPointSolver::new(),
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("pipeline"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geometry::centroid;
    use crate::prelude::DiagramError;
    use crate::render::display_list::DisplayList;
    use crate::render::style::palette;
    use crate::scenario::record::Scenario;

    fn balanced(u_nn: Option<f64>) -> Scenario {
        Scenario::new(
            vec![10.0, 10.0, 10.0],
            vec![0.0, 120.0, 240.0],
            vec![100.0, 100.0, 100.0],
            u_nn,
            0.0,
        )
    }

    fn calibrated() -> DiagramConfig {
        DiagramConfig {
            triangle_amplitude: 50.0,
            current_scale: 1.0,
            label_fontsize: 12.0,
        }
    }

    #[test]
    fn balanced_scenario_without_displacement_end_to_end() {
        let set = ScenarioSet::new(vec![balanced(Some(0.0))]);
        let pipeline = DiagramPipeline::new(calibrated()).unwrap();
        let mut surface = DisplayList::new();

        let outcome = pipeline.render(&set, 0, &mut surface).unwrap();

        assert_eq!(outcome.plan.neutral(), NeutralPoint::NotDisplaced);
        assert_eq!(outcome.plan.neutral().position(), Point::ORIGIN);
        assert_eq!(outcome.report.line_arrows, 3);
        assert_eq!(outcome.report.phase_arrows, 3);
        assert_eq!(outcome.report.current_arrows, 3);
        assert!(!outcome.report.neutral_current_drawn);
        assert_eq!(outcome.report.clipped, 0);
        assert_eq!(surface.arrows_colored(palette::NEUTRAL_CURRENT), 0);
        assert_eq!(set.cached_inn_angle(0), Some(0.0));
    }

    #[test]
    fn absent_displacement_ignores_voltages() {
        let mut scenario = balanced(None);
        scenario.voltages = vec![1.0, 900.0, 3.0];
        let set = ScenarioSet::new(vec![scenario]);
        let pipeline = DiagramPipeline::new(calibrated()).unwrap();

        let plan = pipeline.plan(&set, 0).unwrap();
        assert_eq!(plan.neutral(), NeutralPoint::NotDisplaced);
        assert!(plan.estimate.solution.is_none());
    }

    #[test]
    fn solver_fallback_is_counted_and_rendering_continues() {
        let mut scenario = balanced(Some(1e200));
        scenario.voltages = vec![1e200, 1e200, 1e200];
        let set = ScenarioSet::new(vec![scenario]);
        let pipeline = DiagramPipeline::new(calibrated()).unwrap();
        let mut surface = DisplayList::new();

        let outcome = pipeline.render(&set, 0, &mut surface).unwrap();

        assert!(outcome.used_fallback());
        let triangle = triangle_vertices(50.0);
        assert_eq!(
            outcome.plan.neutral(),
            NeutralPoint::Displaced(centroid(&triangle))
        );
        assert_eq!(pipeline.metrics().solver_fallbacks, 1);
        assert_eq!(pipeline.metrics().rendered, 1);
    }

    #[test]
    fn malformed_scenario_fails_only_itself() {
        let mut broken = balanced(None);
        broken.voltages.push(5.0);
        let set = ScenarioSet::new(vec![broken, balanced(None)]);
        let pipeline = DiagramPipeline::new(calibrated()).unwrap();
        let mut surface = DisplayList::new();

        let err = pipeline.render(&set, 0, &mut surface).unwrap_err();
        assert!(matches!(err, DiagramError::MalformedScenario { index: 0, .. }));
        assert!(pipeline.render(&set, 1, &mut surface).is_ok());

        let metrics = pipeline.metrics();
        assert_eq!(metrics.failed, 1);
        assert_eq!(metrics.rendered, 1);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = DiagramConfig {
            triangle_amplitude: -1.0,
            ..calibrated()
        };
        assert!(DiagramPipeline::new(config).is_err());
    }
}
