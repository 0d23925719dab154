//! Relative-intensity normalization.

use radmap_core::{CellDoseSummary, DegenerateInput, NormalizedCellSummary, Result};

/// What to do when every cell reads zero dose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZeroDosePolicy {
    /// Fail with [`DegenerateInput::ZeroDose`].
    #[default]
    Fail,
    /// Report every cell with relative intensity 0.
    AllZero,
}

/// Scales every dose rate against the run maximum.
///
/// The maximal cell maps to exactly 1.0.
///
/// # Errors
/// Returns [`DegenerateInput::Empty`] for an empty input, and
/// [`DegenerateInput::ZeroDose`] when the maximum is zero under
/// [`ZeroDosePolicy::Fail`].
pub fn normalize(
    summaries: &[CellDoseSummary],
    policy: ZeroDosePolicy,
) -> Result<Vec<NormalizedCellSummary>> {
    let Some(max_dose) = summaries
        .iter()
        .map(|s| s.dose_rate_usv_per_hour)
        .reduce(f64::max)
    else {
        return Err(DegenerateInput::Empty.into());
    };

    if max_dose <= 0.0 {
        return match policy {
            ZeroDosePolicy::Fail => Err(DegenerateInput::ZeroDose.into()),
            ZeroDosePolicy::AllZero => {
                log::warn!("all {} cells read zero dose", summaries.len());
                Ok(summaries
                    .iter()
                    .map(|&summary| NormalizedCellSummary {
                        summary,
                        relative_intensity: 0.0,
                    })
                    .collect())
            }
        };
    }

    Ok(summaries
        .iter()
        .map(|&summary| NormalizedCellSummary {
            summary,
            relative_intensity: summary.dose_rate_usv_per_hour / max_dose,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use radmap_core::{CellKey, Error};

    fn summary(lat: f64, dose: f64) -> CellDoseSummary {
        CellDoseSummary {
            cell: CellKey::new(lat, 26.0),
            dose_rate_usv_per_hour: dose,
            total_counts: 100.0,
            total_elapsed_seconds: 1,
            reading_count: 1,
        }
    }

    #[test]
    fn test_max_maps_to_one() {
        let input = [summary(1.0, 0.3), summary(2.0, 0.7), summary(3.0, 0.1)];
        let out = normalize(&input, ZeroDosePolicy::Fail).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].relative_intensity, 1.0);
        for cell in &out {
            assert!((0.0..=1.0).contains(&cell.relative_intensity));
        }
        assert!((out[0].relative_intensity - 0.3 / 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_empty_is_degenerate() {
        let err = normalize(&[], ZeroDosePolicy::Fail).unwrap_err();
        assert!(matches!(
            err,
            Error::DegenerateInput(DegenerateInput::Empty)
        ));
        // the policy only concerns zero doses
        assert!(normalize(&[], ZeroDosePolicy::AllZero).is_err());
    }

    #[test]
    fn test_all_zero() {
        let input = [summary(1.0, 0.0), summary(2.0, 0.0)];
        let err = normalize(&input, ZeroDosePolicy::Fail).unwrap_err();
        assert!(matches!(
            err,
            Error::DegenerateInput(DegenerateInput::ZeroDose)
        ));

        let out = normalize(&input, ZeroDosePolicy::AllZero).unwrap();
        assert!(out.iter().all(|c| c.relative_intensity == 0.0));
    }

    #[test]
    fn test_single_cell() {
        let out = normalize(&[summary(1.0, 0.05)], ZeroDosePolicy::Fail).unwrap();
        assert_eq!(out[0].relative_intensity, 1.0);
    }
}
