//! Per-cell dose summaries.

use crate::CellKey;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Dose rate and counts of one finalized cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CellDoseSummary {
    pub cell: CellKey,
    /// Dose rate (uSv/h).
    pub dose_rate_usv_per_hour: f64,
    /// All counts, overflow channel included.
    pub total_counts: f64,
    /// Exposure time accumulated in the cell (seconds).
    pub total_elapsed_seconds: u64,
    /// Number of readings that landed in the cell.
    pub reading_count: u64,
}

/// A dose summary scaled against the maximum dose rate of its run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NormalizedCellSummary {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub summary: CellDoseSummary,
    /// `dose_rate / max_dose_rate`, in `[0, 1]`.
    pub relative_intensity: f64,
}

impl NormalizedCellSummary {
    /// The flat record handed to renderers and writers.
    #[must_use]
    pub fn record(&self) -> CellRecord {
        CellRecord {
            cell_lat: self.summary.cell.lat(),
            cell_lon: self.summary.cell.lon(),
            dose_rate_usv_per_hour: self.summary.dose_rate_usv_per_hour,
            total_counts: self.summary.total_counts,
            relative_intensity: self.relative_intensity,
        }
    }
}

/// Output schema for one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CellRecord {
    pub cell_lat: f64,
    pub cell_lon: f64,
    #[cfg_attr(feature = "serde", serde(rename = "dose_rate_uSv_per_hour"))]
    pub dose_rate_usv_per_hour: f64,
    pub total_counts: f64,
    pub relative_intensity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_flattens_summary() {
        let normalized = NormalizedCellSummary {
            summary: CellDoseSummary {
                cell: CellKey::new(44.35, 26.05),
                dose_rate_usv_per_hour: 0.12,
                total_counts: 340.0,
                total_elapsed_seconds: 3,
                reading_count: 2,
            },
            relative_intensity: 0.5,
        };
        let record = normalized.record();
        assert_eq!(record.cell_lat, 44.35);
        assert_eq!(record.cell_lon, 26.05);
        assert_eq!(record.dose_rate_usv_per_hour, 0.12);
        assert_eq!(record.total_counts, 340.0);
        assert_eq!(record.relative_intensity, 0.5);
    }
}
