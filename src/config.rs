use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// Stroke index used when neither the tee nor the course carries one:
/// odd numbers on the front nine, even on the back.
pub const DEFAULT_STROKE_INDEX: [i32; 18] =
    [1, 3, 5, 7, 9, 11, 13, 15, 17, 2, 4, 6, 8, 10, 12, 14, 16, 18];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HandicapConfig {
    /// Slope of a tee of standard difficulty; the divisor in the course
    /// handicap formula.
    pub standard_slope: f64,
    /// Slope used when a tee has no rating at all.
    pub default_slope: i32,
    /// Course rating used when a tee has no rating at all. `None` means the
    /// course par.
    pub default_course_rating: Option<f64>,
    /// Course rating used when no par is known either.
    pub fallback_course_rating: f64,
    pub default_stroke_index: Vec<i32>,
}

impl Default for HandicapConfig {
    fn default() -> Self {
        Self {
            standard_slope: 113.0,
            default_slope: 113,
            default_course_rating: None,
            fallback_course_rating: 72.0,
            default_stroke_index: DEFAULT_STROKE_INDEX.to_vec(),
        }
    }
}

/// How net-mode ranking treats a participant with no net figure.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetFallback {
    /// Rank below everyone who has a net figure, ordered by gross among
    /// themselves.
    #[default]
    RankAfterNet,
    /// Compare the gross relative-to-par as if it were net.
    UseGross,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub handicap: HandicapConfig,
    pub net_fallback: NetFallback,
}

impl EngineConfig {
    /// # Errors
    ///
    /// Will return `Err` if the file can't be read or isn't a valid config
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.as_ref().display())))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Will return `Err` if a value can't be used by the calculator
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.handicap.standard_slope <= 0.0 {
            return Err(CoreError::Config(
                "standard_slope must be positive".to_string(),
            ));
        }
        if self.handicap.default_slope <= 0 {
            return Err(CoreError::Config(
                "default_slope must be positive".to_string(),
            ));
        }
        if !crate::score::strokes::is_valid_stroke_index(&self.handicap.default_stroke_index) {
            return Err(CoreError::Config(
                "default_stroke_index must be a permutation of 1..=18".to_string(),
            ));
        }
        Ok(())
    }
}
