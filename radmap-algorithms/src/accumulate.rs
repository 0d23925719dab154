//! Per-cell accumulation of exposure time and spectra.
//!
//! Accumulation is a commutative monoid: elapsed times and histograms are
//! added elementwise, so any partition of the readings into shards yields
//! the same result once the shards are merged.

use crate::SpatialBinner;
use radmap_core::{CellKey, Error, Reading, Result, Spectrum, CHANNEL_COUNT};
use rayon::prelude::*;
use std::collections::hash_map::{Entry, HashMap};

/// Running totals of one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAccumulator {
    total_elapsed_seconds: u64,
    reading_count: u64,
    histogram_sum: Vec<u64>,
}

impl CellAccumulator {
    /// Starts a cell from its first spectrum.
    #[must_use]
    pub fn from_spectrum(spectrum: &Spectrum) -> Self {
        Self {
            total_elapsed_seconds: spectrum.elapsed_seconds(),
            reading_count: 1,
            histogram_sum: spectrum.histogram().iter().map(|&c| u64::from(c)).collect(),
        }
    }

    /// Adds one spectrum. Totals saturate instead of wrapping.
    pub fn add(&mut self, spectrum: &Spectrum) {
        self.total_elapsed_seconds = self
            .total_elapsed_seconds
            .saturating_add(spectrum.elapsed_seconds());
        self.reading_count = self.reading_count.saturating_add(1);
        for (sum, &count) in self.histogram_sum.iter_mut().zip(spectrum.histogram()) {
            *sum = sum.saturating_add(u64::from(count));
        }
    }

    /// Adds another accumulator of the same cell.
    pub fn merge(&mut self, other: &CellAccumulator) {
        self.total_elapsed_seconds = self
            .total_elapsed_seconds
            .saturating_add(other.total_elapsed_seconds);
        self.reading_count = self.reading_count.saturating_add(other.reading_count);
        for (sum, &count) in self.histogram_sum.iter_mut().zip(&other.histogram_sum) {
            *sum = sum.saturating_add(count);
        }
    }

    /// Exposure time in seconds, at least 1.
    #[inline]
    #[must_use]
    pub fn total_elapsed_seconds(&self) -> u64 {
        self.total_elapsed_seconds
    }

    /// Number of readings added.
    #[inline]
    #[must_use]
    pub fn reading_count(&self) -> u64 {
        self.reading_count
    }

    /// Elementwise sum of all spectra, [`CHANNEL_COUNT`] long.
    #[inline]
    #[must_use]
    pub fn histogram_sum(&self) -> &[u64] {
        debug_assert_eq!(self.histogram_sum.len(), CHANNEL_COUNT);
        &self.histogram_sum
    }
}

/// All cells of one run, keyed by quantized coordinates.
#[derive(Debug, Clone)]
pub struct CellAccumulators {
    binner: SpatialBinner,
    cells: HashMap<CellKey, CellAccumulator>,
    readings: u64,
}

impl CellAccumulators {
    /// Creates an empty set on the given grid.
    #[must_use]
    pub fn new(binner: SpatialBinner) -> Self {
        Self {
            binner,
            cells: HashMap::new(),
            readings: 0,
        }
    }

    /// Grid the cells are keyed on.
    #[must_use]
    pub fn binner(&self) -> &SpatialBinner {
        &self.binner
    }

    /// Adds `reading` to its cell and returns the cell key.
    pub fn accumulate(&mut self, reading: &Reading) -> CellKey {
        let key = self
            .binner
            .bin(reading.location.lat, reading.location.lon);
        match self.cells.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().add(&reading.spectrum),
            Entry::Vacant(entry) => {
                entry.insert(CellAccumulator::from_spectrum(&reading.spectrum));
            }
        }
        self.readings += 1;
        key
    }

    /// Accumulates a slice of readings across the rayon pool.
    ///
    /// The result is identical to accumulating the slice sequentially.
    #[must_use]
    pub fn accumulate_parallel(binner: SpatialBinner, readings: &[Reading]) -> Self {
        readings
            .par_iter()
            .fold(
                || Self::new(binner),
                |mut shard, reading| {
                    shard.accumulate(reading);
                    shard
                },
            )
            .reduce(
                || Self::new(binner),
                |mut left, right| {
                    left.absorb(right);
                    left
                },
            )
    }

    /// Merges another accumulator set built on the same grid.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the grids differ.
    pub fn merge(&mut self, other: CellAccumulators) -> Result<()> {
        if self.binner != other.binner {
            return Err(Error::InvalidConfig(
                "cannot merge cells accumulated on different grids".to_string(),
            ));
        }
        self.absorb(other);
        Ok(())
    }

    /// Merge without the grid check; `other` must share this binner.
    pub(crate) fn absorb(&mut self, other: CellAccumulators) {
        self.readings += other.readings;
        for (key, cell) in other.cells {
            match self.cells.entry(key) {
                Entry::Occupied(mut entry) => entry.get_mut().merge(&cell),
                Entry::Vacant(entry) => {
                    entry.insert(cell);
                }
            }
        }
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no reading has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of readings accumulated.
    #[must_use]
    pub fn readings(&self) -> u64 {
        self.readings
    }

    /// Accumulator of `key`, if any reading landed there.
    #[must_use]
    pub fn get(&self, key: &CellKey) -> Option<&CellAccumulator> {
        self.cells.get(key)
    }

    /// Iterates over cells in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &CellAccumulator)> {
        self.cells.iter()
    }

    /// Parallel iterator over cells in unspecified order.
    pub fn par_iter(&self) -> impl ParallelIterator<Item = (&CellKey, &CellAccumulator)> {
        self.cells.par_iter()
    }
}

impl PartialEq for CellAccumulators {
    fn eq(&self, other: &Self) -> bool {
        self.binner == other.binner && self.readings == other.readings && self.cells == other.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radmap_core::{GridConfig, Location, Timestamp, MAX_ELAPSED_SECONDS};

    fn reading(lat: f64, lon: f64, elapsed: u64, first_channel: u32) -> Reading {
        let mut histogram = vec![0; CHANNEL_COUNT];
        histogram[0] = first_channel;
        Reading::new(
            Timestamp::default(),
            Location::fixed(lat, lon),
            Spectrum::new(elapsed, histogram).unwrap(),
        )
    }

    fn binner() -> SpatialBinner {
        SpatialBinner::new(GridConfig::default()).unwrap()
    }

    #[test]
    fn test_two_readings_same_cell() {
        let mut cells = CellAccumulators::new(binner());
        let a = cells.accumulate(&reading(44.35, 26.05, 1, 5));
        let b = cells.accumulate(&reading(44.35, 26.05, 2, 3));
        assert_eq!(a, b);
        assert_eq!(cells.len(), 1);

        let cell = cells.get(&a).unwrap();
        assert_eq!(cell.total_elapsed_seconds(), 3);
        assert_eq!(cell.histogram_sum()[0], 8);
        assert_eq!(cell.reading_count(), 2);
        assert_eq!(cells.readings(), 2);
    }

    #[test]
    fn test_zero_elapsed_counts_as_one() {
        let mut cells = CellAccumulators::new(binner());
        let key = cells.accumulate(&reading(44.35, 26.05, 0, 1));
        assert_eq!(cells.get(&key).unwrap().total_elapsed_seconds(), 1);
    }

    #[test]
    fn test_elapsed_saturates() {
        let mut cell = CellAccumulator {
            total_elapsed_seconds: u64::MAX - 1,
            reading_count: 1,
            histogram_sum: vec![u64::MAX; CHANNEL_COUNT],
        };
        let spectrum = Spectrum::new(MAX_ELAPSED_SECONDS, vec![1; CHANNEL_COUNT]).unwrap();
        cell.add(&spectrum);
        assert_eq!(cell.total_elapsed_seconds(), u64::MAX);
        assert_eq!(cell.histogram_sum()[0], u64::MAX);

        let other = CellAccumulator::from_spectrum(&spectrum);
        cell.merge(&other);
        assert_eq!(cell.total_elapsed_seconds(), u64::MAX);
        assert_eq!(cell.reading_count(), 3);
    }

    #[test]
    fn test_merge_rejects_different_grid() {
        let mut a = CellAccumulators::new(binner());
        let other = SpatialBinner::new(GridConfig::default().with_cell_size_m(50.0, 50.0)).unwrap();
        let b = CellAccumulators::new(other);
        assert!(a.merge(b).is_err());
    }

    #[test]
    fn test_merge_adds_cells() {
        let mut a = CellAccumulators::new(binner());
        a.accumulate(&reading(44.35, 26.05, 1, 5));
        let mut b = CellAccumulators::new(binner());
        let key = b.accumulate(&reading(44.35, 26.05, 2, 3));
        b.accumulate(&reading(44.40, 26.10, 1, 1));

        a.merge(b).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.readings(), 3);
        assert_eq!(a.get(&key).unwrap().histogram_sum()[0], 8);
    }
}
