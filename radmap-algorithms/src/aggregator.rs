//! Caller-owned aggregation lifecycle.
//!
//! construct -> accumulate every reading -> finalize -> normalize.
//! Finalization consumes the aggregator, so dose rates can only be derived
//! from complete per-cell totals.

use crate::normalize::{normalize, ZeroDosePolicy};
use crate::{CellAccumulator, CellAccumulators, DoseCalculator, SpatialBinner};
use radmap_core::{
    AggregationConfig, CellBounds, CellDoseSummary, CellKey, NormalizedCellSummary, Reading,
    Result,
};

/// Accumulation stage of a run.
#[derive(Debug)]
pub struct Aggregator {
    config: AggregationConfig,
    cells: CellAccumulators,
}

impl Aggregator {
    /// Validates `config` and starts an empty run.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: AggregationConfig) -> Result<Self> {
        config.validate()?;
        let binner = SpatialBinner::new(config.grid)?;
        Ok(Self {
            config,
            cells: CellAccumulators::new(binner),
        })
    }

    /// Configuration of this run.
    #[must_use]
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Adds one reading and returns its cell.
    pub fn accumulate(&mut self, reading: &Reading) -> CellKey {
        self.cells.accumulate(reading)
    }

    /// Adds every reading of `readings`.
    pub fn accumulate_all<I>(&mut self, readings: I)
    where
        I: IntoIterator<Item = Reading>,
    {
        for reading in readings {
            self.cells.accumulate(&reading);
        }
    }

    /// Adds a slice of readings using the rayon pool.
    pub fn accumulate_parallel(&mut self, readings: &[Reading]) {
        let shard = CellAccumulators::accumulate_parallel(*self.cells.binner(), readings);
        self.cells.absorb(shard);
    }

    /// Accumulated cells so far.
    #[must_use]
    pub fn cells(&self) -> &CellAccumulators {
        &self.cells
    }

    /// Ends accumulation and derives every cell's dose rate.
    #[must_use]
    pub fn finalize(self) -> DoseMap {
        let calculator = DoseCalculator::new(self.config.calibration);
        let summaries = calculator.finalize_all(&self.cells);
        log::info!(
            "finalized {} cells from {} readings",
            summaries.len(),
            self.cells.readings()
        );
        DoseMap {
            cells: self.cells,
            summaries,
        }
    }
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationReport {
    /// Readings accumulated.
    pub readings: u64,
    /// Distinct cells.
    pub cells: usize,
    /// Cell with the highest dose rate and that rate (uSv/h).
    pub max_dose: Option<(CellKey, f64)>,
}

/// Finalized dose rates of a run.
#[derive(Debug)]
pub struct DoseMap {
    cells: CellAccumulators,
    summaries: Vec<CellDoseSummary>,
}

impl DoseMap {
    /// Per-cell summaries sorted by (lat, lon).
    #[must_use]
    pub fn summaries(&self) -> &[CellDoseSummary] {
        &self.summaries
    }

    /// Accumulated spectrum of `cell`.
    #[must_use]
    pub fn accumulator(&self, cell: &CellKey) -> Option<&CellAccumulator> {
        self.cells.get(cell)
    }

    /// Rectangle covered by `cell`.
    #[must_use]
    pub fn bounds(&self, cell: CellKey) -> CellBounds {
        self.cells.binner().bounds(cell)
    }

    /// Scales dose rates against the run maximum.
    ///
    /// # Errors
    /// Returns `DegenerateInput` if there are no cells, or if every cell is
    /// zero under [`ZeroDosePolicy::Fail`].
    pub fn normalize(&self, policy: ZeroDosePolicy) -> Result<Vec<NormalizedCellSummary>> {
        normalize(&self.summaries, policy)
    }

    /// Run totals.
    #[must_use]
    pub fn report(&self) -> AggregationReport {
        let max_dose = self
            .summaries
            .iter()
            .max_by(|a, b| a.dose_rate_usv_per_hour.total_cmp(&b.dose_rate_usv_per_hour))
            .map(|s| (s.cell, s.dose_rate_usv_per_hour));
        AggregationReport {
            readings: self.cells.readings(),
            cells: self.summaries.len(),
            max_dose,
        }
    }
}
