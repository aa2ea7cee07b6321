use iced::{
    event, keyboard,
    widget::{canvas::Canvas, column, text, Column, Container, Row},
    window, Element, Event, Length, Subscription, Task, Theme,
};
use phasorcore::render::{DisplayList, RenderOptions};
use phasorcore::scenario::{ScenarioCursor, ScenarioSet, Workbook};
use phasorcore::DiagramPipeline;
use std::fs;
use std::path::{Path, PathBuf};
use surface::DiagramCanvas;

mod surface;

const OVERVIEW_COLUMNS: usize = 4;
const OVERVIEW_LABEL_FONTSIZE: f64 = 10.0;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Viewer::boot, Viewer::update, Viewer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(state: &Viewer) -> String {
    if state.scenarios.is_empty() {
        "Phasor diagrams - no scenarios loaded".into()
    } else {
        format!(
            "Phasor diagrams - scenario {} of {} (arrow keys to navigate)",
            state.cursor.index() + 1,
            state.scenarios.len()
        )
    }
}

fn application_subscription(_: &Viewer) -> Subscription<Message> {
    event::listen_with(key_message)
}

fn application_theme(_: &Viewer) -> Theme {
    Theme::Light
}

fn key_message(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    let Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) = event else {
        return None;
    };
    match key.as_ref() {
        keyboard::Key::Named(keyboard::key::Named::ArrowRight) => Some(Message::Next),
        keyboard::Key::Named(keyboard::key::Named::ArrowLeft) => Some(Message::Previous),
        keyboard::Key::Character("o") | keyboard::Key::Character("O") => {
            Some(Message::ToggleOverview)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Message {
    Next,
    Previous,
    ToggleOverview,
}

struct Viewer {
    scenarios: ScenarioSet,
    pipeline: DiagramPipeline,
    cursor: ScenarioCursor,
    overview: bool,
    diagram: DisplayList,
    overview_panels: Vec<DisplayList>,
    status: String,
}

impl Viewer {
    fn boot() -> (Self, Task<Message>) {
        (
            Self::from_path(std::env::args_os().nth(1).map(PathBuf::from)),
            Task::none(),
        )
    }

    fn from_path(path: Option<PathBuf>) -> Self {
        let loaded = match &path {
            Some(path) => load_scenarios(path),
            None => Err("usage: visualizer <workbook.json>".to_string()),
        };
        let (scenarios, status) = match loaded {
            Ok(set) if set.is_empty() => (set, "Workbook holds no scenarios".to_string()),
            Ok(set) => (set, String::new()),
            Err(err) => {
                log::warn!("{err}");
                (ScenarioSet::default(), err)
            }
        };

        let mut viewer = Self {
            cursor: ScenarioCursor::new(scenarios.len()),
            scenarios,
            pipeline: DiagramPipeline::default(),
            overview: false,
            diagram: DisplayList::new(),
            overview_panels: Vec::new(),
            status,
        };
        viewer.refresh();
        viewer
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        if state.scenarios.is_empty() {
            return Task::none();
        }
        match message {
            Message::Next => {
                state.cursor.next();
            }
            Message::Previous => {
                state.cursor.previous();
            }
            Message::ToggleOverview => state.overview = !state.overview,
        }
        state.refresh();
        Task::none()
    }

    fn refresh(&mut self) {
        if self.scenarios.is_empty() {
            return;
        }
        if self.overview {
            self.refresh_overview();
            return;
        }

        let index = self.cursor.index();
        let mut list = DisplayList::new();
        self.status = match self.pipeline.render(&self.scenarios, index, &mut list) {
            Ok(outcome) if outcome.used_fallback() => format!(
                "Scenario {}: optimization unsuccessful, N' set to the triangle centroid",
                index + 1
            ),
            Ok(outcome) => {
                let mut status = format!(
                    "Scenario {}: N' {}",
                    index + 1,
                    if outcome.plan.neutral().is_displaced() {
                        "displaced"
                    } else {
                        "at the star point"
                    }
                );
                if outcome.report.clipped > 0 {
                    status.push_str(&format!(", {} arrows shortened", outcome.report.clipped));
                }
                status
            }
            Err(err) => format!("Scenario {} not drawn: {}", index + 1, err),
        };
        self.diagram = list;
    }

    fn refresh_overview(&mut self) {
        let options = RenderOptions {
            label_fontsize: OVERVIEW_LABEL_FONTSIZE,
            ..RenderOptions::from(self.pipeline.config())
        };
        let mut failed = Vec::new();
        let mut panels = Vec::with_capacity(self.scenarios.len());
        for index in 0..self.scenarios.len() {
            let mut list = DisplayList::new();
            if self
                .pipeline
                .render_with(&self.scenarios, index, &mut list, &options)
                .is_err()
            {
                failed.push((index + 1).to_string());
            }
            panels.push(list);
        }
        self.overview_panels = panels;
        self.status = if failed.is_empty() {
            format!("Overview of {} scenarios (O to return)", self.scenarios.len())
        } else {
            format!(
                "Overview of {} scenarios, not drawn: {} (O to return)",
                self.scenarios.len(),
                failed.join(", ")
            )
        };
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let body: Element<'_, Message> = if state.overview {
            overview_grid(&state.overview_panels)
        } else {
            Canvas::new(DiagramCanvas::new(&state.diagram))
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        };

        Container::new(column![body, text(&state.status).size(14)].spacing(8).padding(12))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn overview_grid(panels: &[DisplayList]) -> Element<'_, Message> {
    let columns = OVERVIEW_COLUMNS.min(panels.len()).max(1);
    panels
        .chunks(columns)
        .enumerate()
        .fold(Column::new().spacing(8), |grid, (row_index, chunk)| {
            let cells = chunk
                .iter()
                .enumerate()
                .fold(Row::new().spacing(8), |row, (column_index, list)| {
                    let number = row_index * columns + column_index + 1;
                    row.push(
                        column![
                            text(format!("Scenario {number}")).size(16),
                            Canvas::new(DiagramCanvas::new(list))
                                .width(Length::Fill)
                                .height(Length::Fill),
                        ]
                        .spacing(4)
                        .width(Length::FillPortion(1)),
                    )
                });
            let cells = (chunk.len()..columns).fold(cells, |row, _| {
                row.push(Column::new().width(Length::FillPortion(1)))
            });
            grid.push(cells.height(Length::Fill))
        })
        .into()
}

fn load_scenarios(path: &Path) -> Result<ScenarioSet, String> {
    let contents =
        fs::read_to_string(path).map_err(|err| format!("reading {}: {err}", path.display()))?;
    let workbook: Workbook = serde_json::from_str(&contents)
        .map_err(|err| format!("parsing {}: {err}", path.display()))?;
    workbook
        .into_scenarios()
        .map_err(|err| format!("loading {}: {err}", path.display()))
}
