use anyhow::Context;
use phasorcore::prelude::DiagramConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub triangle_amplitude: f64,
    pub current_scale: f64,
    pub label_fontsize: f64,
    pub overview_label_fontsize: f64,
    pub overview_columns: usize,
    /// Edge length in pixels of one diagram panel.
    pub panel_size: f64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let diagram = DiagramConfig::default();
        Self {
            triangle_amplitude: diagram.triangle_amplitude,
            current_scale: diagram.current_scale,
            label_fontsize: diagram.label_fontsize,
            overview_label_fontsize: 10.0,
            overview_columns: 4,
            panel_size: 400.0,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        triangle_amplitude: f64,
        current_scale: f64,
        label_fontsize: f64,
        overview_label_fontsize: f64,
        overview_columns: usize,
    ) -> Self {
        Self {
            triangle_amplitude,
            current_scale,
            label_fontsize,
            overview_label_fontsize,
            overview_columns,
            ..Self::default()
        }
    }

    pub fn to_diagram_config(&self) -> DiagramConfig {
        DiagramConfig {
            triangle_amplitude: self.triangle_amplitude,
            current_scale: self.current_scale,
            label_fontsize: self.label_fontsize,
        }
    }

    /// Grid shape `(columns, rows)` for an overview of `count` scenarios.
    pub fn overview_grid(&self, count: usize) -> (usize, usize) {
        if count == 0 {
            return (0, 0);
        }
        let columns = self.overview_columns.max(1).min(count);
        (columns, count.div_ceil(columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_diagram_config() {
        let cfg = WorkflowConfig::from_args(60.0, 2.0, 14.0, 9.0, 3);
        let diagram = cfg.to_diagram_config();
        assert_eq!(diagram.triangle_amplitude, 60.0);
        assert_eq!(diagram.current_scale, 2.0);
        assert_eq!(cfg.panel_size, 400.0);
    }

    #[test]
    fn config_load_reads_yaml_with_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"triangle_amplitude: 80.0\noverview_columns: 2\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.triangle_amplitude, 80.0);
        assert_eq!(cfg.overview_columns, 2);
        assert_eq!(cfg.current_scale, 1.5);
    }

    #[test]
    fn config_load_names_missing_file() {
        let err = WorkflowConfig::load("/nonexistent/workflow.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/workflow.yaml"));
    }

    #[test]
    fn overview_grid_caps_columns() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.overview_grid(0), (0, 0));
        assert_eq!(cfg.overview_grid(3), (3, 1));
        assert_eq!(cfg.overview_grid(4), (4, 1));
        assert_eq!(cfg.overview_grid(9), (4, 3));
    }
}
