//! radmap-algorithms: Binning, accumulation and dose derivation.
//!
//! This crate provides the stages of an aggregation run:
//! - **Spatial binning** - quantizes coordinates onto a fixed-footprint grid
//! - **Accumulation** - per-cell exposure time and summed spectra
//! - **Dose calculation** - calibrated dose rate per cell
//! - **Normalization** - relative intensity against the run maximum
//!
#![warn(missing_docs)]

mod accumulate;
mod aggregator;
mod dose;
mod normalize;
mod processing;
pub mod spatial;

pub use accumulate::{CellAccumulator, CellAccumulators};
pub use aggregator::{AggregationReport, Aggregator, DoseMap};
pub use dose::DoseCalculator;
pub use normalize::{normalize, ZeroDosePolicy};
pub use processing::{
    aggregate, aggregate_parallel, export_spectra, render_overlay, AggregationOutput,
    SpectrumExportReport,
};
pub use spatial::{meters_per_degree, SpatialBinner};
