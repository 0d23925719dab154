//! Process-wide aggregation configuration.

use crate::{CalibrationModel, Error, GridConfig, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything an aggregation run is parameterized by.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AggregationConfig {
    pub grid: GridConfig,
    pub calibration: CalibrationModel,
    /// Accept only readings integrated over exactly this many seconds.
    pub window_seconds: Option<u64>,
}

impl AggregationConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the grid configuration.
    #[must_use]
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the calibration model.
    #[must_use]
    pub fn with_calibration(mut self, calibration: CalibrationModel) -> Self {
        self.calibration = calibration;
        self
    }

    /// Restricts accumulation to one integration window length.
    #[must_use]
    pub fn with_window_seconds(mut self, seconds: u64) -> Self {
        self.window_seconds = Some(seconds);
        self
    }

    /// Validates every section.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] naming the offending section.
    pub fn validate(&self) -> Result<()> {
        self.grid
            .validate()
            .map_err(|e| Error::InvalidConfig(format!("grid: {e}")))?;
        self.calibration
            .validate()
            .map_err(|e| Error::InvalidConfig(format!("calibration: {e}")))?;
        if self.window_seconds == Some(0) {
            return Err(Error::InvalidConfig(
                "window_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AggregationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_sections_named() {
        let config = AggregationConfig::new()
            .with_grid(GridConfig::new().with_cell_size_m(-1.0, 80.0));
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("grid"), "{err}");

        let config = AggregationConfig::new().with_window_seconds(0);
        assert!(config.validate().is_err());
    }
}
