//! Energy and dose calibration.
#![allow(clippy::cast_precision_loss)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gray (Sv for photons) to micro-units.
const MICRO: f64 = 1e6;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Linear channel-to-energy calibration plus the absorbed-dose denominator.
///
/// `keV = slope * channel + intercept`, clamped at zero. Dose in uSv is
/// `sum(counts * keV) * kev_to_joule * 1e6 / detector_mass_kg`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalibrationModel {
    /// Energy per channel (keV).
    pub slope_kev_per_channel: f64,
    /// Energy offset (keV); usually negative.
    pub intercept_kev: f64,
    /// Joules per keV.
    pub kev_to_joule: f64,
    /// Scintillator mass (kg).
    pub detector_mass_kg: f64,
}

impl Default for CalibrationModel {
    fn default() -> Self {
        Self::bgeigie_scint_defaults()
    }
}

impl CalibrationModel {
    /// Calibration of the CsI scintillator probe the logs were recorded with.
    ///
    /// Crystal: 4.51 g/cm^3 x 3.0 cm^3.
    #[must_use]
    pub fn bgeigie_scint_defaults() -> Self {
        Self {
            slope_kev_per_channel: 2.7676,
            intercept_kev: -201.57,
            kev_to_joule: 1.602_177_3e-16,
            detector_mass_kg: 4.51 * 3.0 * 1e-3,
        }
    }

    /// Set the linear energy calibration.
    #[must_use]
    pub fn with_energy_calibration(mut self, slope_kev_per_channel: f64, intercept_kev: f64) -> Self {
        self.slope_kev_per_channel = slope_kev_per_channel;
        self.intercept_kev = intercept_kev;
        self
    }

    /// Set the detector mass.
    #[must_use]
    pub fn with_detector_mass_kg(mut self, mass: f64) -> Self {
        self.detector_mass_kg = mass;
        self
    }

    /// Energy (keV) deposited by a count in `channel`, never negative.
    #[inline]
    #[must_use]
    pub fn channel_energy_kev(&self, channel: usize) -> f64 {
        self.slope_kev_per_channel
            .mul_add(channel as f64, self.intercept_kev)
            .max(0.0)
    }

    /// Combined factor turning energy-weighted counts (keV) into uSv.
    #[inline]
    #[must_use]
    pub fn dose_scale(&self) -> f64 {
        self.kev_to_joule * MICRO / self.detector_mass_kg
    }

    /// Checks the model can produce finite, non-negative doses.
    ///
    /// # Errors
    /// Returns a description of the first invalid parameter.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("slope_kev_per_channel", self.slope_kev_per_channel),
            ("intercept_kev", self.intercept_kev),
            ("kev_to_joule", self.kev_to_joule),
            ("detector_mass_kg", self.detector_mass_kg),
        ] {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }
        if self.kev_to_joule <= 0.0 {
            return Err(format!(
                "kev_to_joule must be positive, got {}",
                self.kev_to_joule
            ));
        }
        if self.detector_mass_kg <= 0.0 {
            return Err(format!(
                "detector_mass_kg must be positive, got {}",
                self.detector_mass_kg
            ));
        }
        Ok(())
    }
}
