//! Dose calculation for finalized cells.
#![allow(clippy::cast_precision_loss)]

use crate::{CellAccumulator, CellAccumulators};
use radmap_core::{
    CalibrationModel, CellDoseSummary, CellKey, CHANNEL_COUNT, OVERFLOW_CHANNEL, SECONDS_PER_HOUR,
};
use rayon::prelude::*;

/// Converts accumulated spectra to dose rates.
///
/// Per-channel energies are tabulated once; `finalize` is a pure function of
/// one cell and the calibration.
#[derive(Clone, Debug)]
pub struct DoseCalculator {
    calibration: CalibrationModel,
    channel_energy_kev: Vec<f64>,
}

impl DoseCalculator {
    /// Create a calculator for the given calibration.
    #[must_use]
    pub fn new(calibration: CalibrationModel) -> Self {
        let channel_energy_kev = (0..OVERFLOW_CHANNEL)
            .map(|channel| calibration.channel_energy_kev(channel))
            .collect();
        Self {
            calibration,
            channel_energy_kev,
        }
    }

    /// Dose summary of one cell.
    ///
    /// The overflow channel contributes to `total_counts` only; it has no
    /// well-defined energy.
    #[must_use]
    pub fn finalize(&self, cell: CellKey, accumulator: &CellAccumulator) -> CellDoseSummary {
        let histogram = accumulator.histogram_sum();
        debug_assert_eq!(histogram.len(), CHANNEL_COUNT);

        let mut weighted_kev = 0.0;
        let mut counts = 0u64;
        for (&count, &energy) in histogram[..OVERFLOW_CHANNEL]
            .iter()
            .zip(&self.channel_energy_kev)
        {
            weighted_kev += count as f64 * energy;
            counts += count;
        }
        counts += histogram[OVERFLOW_CHANNEL];

        let dose_usv = weighted_kev * self.calibration.dose_scale();
        let elapsed = accumulator.total_elapsed_seconds().max(1);

        CellDoseSummary {
            cell,
            dose_rate_usv_per_hour: dose_usv * SECONDS_PER_HOUR / elapsed as f64,
            total_counts: counts as f64,
            total_elapsed_seconds: elapsed,
            reading_count: accumulator.reading_count(),
        }
    }

    /// Finalizes every cell in parallel, sorted by (lat, lon).
    #[must_use]
    pub fn finalize_all(&self, cells: &CellAccumulators) -> Vec<CellDoseSummary> {
        let mut summaries: Vec<CellDoseSummary> = cells
            .par_iter()
            .map(|(key, accumulator)| self.finalize(*key, accumulator))
            .collect();
        summaries.sort_unstable_by(|a, b| a.cell.total_cmp(&b.cell));
        summaries
    }
}

impl Default for DoseCalculator {
    fn default() -> Self {
        Self::new(CalibrationModel::default())
    }
}
