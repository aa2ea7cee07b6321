use serde::{Deserialize, Serialize};

/// Tunables shared by every scenario rendered in one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramConfig {
    pub triangle_amplitude: f64,
    pub current_scale: f64,
    pub label_fontsize: f64,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            triangle_amplitude: 50.0,
            current_scale: 1.5,
            label_fontsize: 12.0,
        }
    }
}

impl DiagramConfig {
    pub fn validate(&self) -> DiagramResult<()> {
        if !self.triangle_amplitude.is_finite() || self.triangle_amplitude <= 0.0 {
            return Err(DiagramError::InvalidConfig(format!(
                "triangle amplitude must be positive, got {}",
                self.triangle_amplitude
            )));
        }
        if !self.current_scale.is_finite() || self.current_scale <= 0.0 {
            return Err(DiagramError::InvalidConfig(format!(
                "current scale must be positive, got {}",
                self.current_scale
            )));
        }
        if !self.label_fontsize.is_finite() || self.label_fontsize <= 0.0 {
            return Err(DiagramError::InvalidConfig(format!(
                "label font size must be positive, got {}",
                self.label_fontsize
            )));
        }
        Ok(())
    }
}

/// Common error type for scenario preparation and rendering.
#[derive(thiserror::Error, Debug)]
pub enum DiagramError {
    #[error("malformed scenario {index}: {reason}")]
    MalformedScenario { index: usize, reason: String },
    #[error("scenario index {index} out of range ({len} scenarios)")]
    ScenarioIndex { index: usize, len: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("workbook: {0}")]
    Workbook(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DiagramResult<T> = Result<T, DiagramError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DiagramConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_current_scale_is_rejected() {
        let config = DiagramConfig {
            current_scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DiagramError::InvalidConfig(_))
        ));
    }
}
