//! Grid cell keys and grid configuration.

use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Quantized lower-left corner of a grid cell, in degrees.
///
/// Two keys are equal iff their quantized coordinates are bit-for-bit equal.
/// `-0.0` is folded into `0.0` on construction so the two zeros share a cell.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CellKey {
    lat: f64,
    lon: f64,
}

impl CellKey {
    /// Creates a key from already-quantized coordinates.
    #[inline]
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        // x + 0.0 maps -0.0 to +0.0 and leaves every other value unchanged
        Self {
            lat: lat + 0.0,
            lon: lon + 0.0,
        }
    }

    /// Quantized latitude (degrees).
    #[inline]
    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Quantized longitude (degrees).
    #[inline]
    #[must_use]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Total order by latitude, then longitude.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.lat
            .total_cmp(&other.lat)
            .then_with(|| self.lon.total_cmp(&other.lon))
    }
}

impl PartialEq for CellKey {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lon.to_bits() == other.lon.to_bits()
    }
}

impl Eq for CellKey {}

impl Hash for CellKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lat.to_bits().hash(state);
        self.lon.to_bits().hash(state);
    }
}

/// Rectangle covered by a cell, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Ground footprint of the binning grid.
///
/// The footprint is converted to angular steps once, at
/// `reference_latitude_deg`, for the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Latitude (degrees) at which meters-per-degree are evaluated.
    pub reference_latitude_deg: f64,
    /// East-west cell extent (meters).
    pub cell_width_m: f64,
    /// North-south cell extent (meters).
    pub cell_height_m: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            reference_latitude_deg: 44.382_441_9,
            cell_width_m: 100.0,
            cell_height_m: 80.0,
        }
    }
}

impl GridConfig {
    /// Creates a grid configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reference latitude.
    #[must_use]
    pub fn with_reference_latitude(mut self, degrees: f64) -> Self {
        self.reference_latitude_deg = degrees;
        self
    }

    /// Sets the cell footprint.
    #[must_use]
    pub fn with_cell_size_m(mut self, width_m: f64, height_m: f64) -> Self {
        self.cell_width_m = width_m;
        self.cell_height_m = height_m;
        self
    }

    /// Checks the footprint and reference latitude are usable.
    ///
    /// # Errors
    /// Returns a description of the first invalid parameter.
    pub fn validate(&self) -> Result<(), String> {
        let phi = self.reference_latitude_deg;
        if !phi.is_finite() || phi.abs() >= 90.0 {
            return Err(format!(
                "reference latitude must be within (-90, 90) degrees, got {phi}"
            ));
        }
        for (name, value) in [
            ("cell_width_m", self.cell_width_m),
            ("cell_height_m", self.cell_height_m),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be positive, got {value}"));
            }
        }
        Ok(())
    }
}
