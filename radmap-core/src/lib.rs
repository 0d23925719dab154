//! radmap-core: Core types for geotagged radiation-log aggregation.
//!
//! This crate provides the data model shared by the ingestion, binning,
//! dose and rendering stages, together with the calibration model and the
//! traits behind which rendering collaborators sit.
//!

pub mod calibration;
pub mod cell;
pub mod config;
pub mod error;
pub mod reading;
pub mod render;
pub mod summary;

pub use calibration::{CalibrationModel, SECONDS_PER_HOUR};
pub use cell::{CellBounds, CellKey, GridConfig};
pub use config::AggregationConfig;
pub use error::{DegenerateInput, Error, Result};
pub use reading::{
    Location, Reading, Spectrum, Timestamp, CHANNEL_COUNT, MAX_ELAPSED_SECONDS,
    OVERFLOW_CHANNEL,
};
pub use render::{OverlayRenderer, SpectrumRenderer};
pub use summary::{CellDoseSummary, CellRecord, NormalizedCellSummary};
