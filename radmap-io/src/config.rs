//! JSON configuration files.
//!
//! Every field is optional and falls back to the survey defaults:
//!
//! ```json
//! {
//!   "grid": {"reference_latitude_deg": 44.38, "cell_width_m": 100.0, "cell_height_m": 80.0},
//!   "calibration": {"slope_kev_per_channel": 2.7676, "intercept_kev": -201.57,
//!                   "kev_to_joule": 1.6021773e-16, "detector_mass_kg": 0.01353},
//!   "ingest": {"window_seconds": 1}
//! }
//! ```

use crate::Result;
use radmap_core::{AggregationConfig, CalibrationModel, GridConfig};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonConfig {
    grid: GridConfig,
    calibration: CalibrationModel,
    ingest: JsonIngest,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonIngest {
    window_seconds: Option<u64>,
}

impl From<JsonConfig> for AggregationConfig {
    fn from(json: JsonConfig) -> Self {
        Self {
            grid: json.grid,
            calibration: json.calibration,
            window_seconds: json.ingest.window_seconds,
        }
    }
}

/// Load and validate a configuration file.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid JSON, or
/// describes an unusable grid or calibration.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AggregationConfig> {
    let reader = BufReader::new(File::open(path)?);
    let json: JsonConfig = serde_json::from_reader(reader)?;
    finish(json)
}

/// Parse and validate a configuration from a JSON string.
///
/// # Errors
/// Returns an error if the string is not valid JSON or describes an
/// unusable grid or calibration.
pub fn parse_config(json: &str) -> Result<AggregationConfig> {
    finish(serde_json::from_str(json)?)
}

fn finish(json: JsonConfig) -> Result<AggregationConfig> {
    let config = AggregationConfig::from(json);
    config.validate()?;
    Ok(config)
}
