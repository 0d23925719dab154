//! Spatial binning of geographic coordinates.
//!
//! The cell footprint is converted from meters to degrees once, at a fixed
//! reference latitude, so the grid is rectilinear in (lat, lon). This is a
//! flat-earth approximation: cells drift from their nominal footprint as
//! readings move away from the reference latitude, which is acceptable only
//! for the small extents a single survey covers.

use radmap_core::{CellBounds, CellKey, Error, GridConfig, Result};

/// Meters per degree of latitude and longitude at `latitude_deg`.
///
/// Uses the series expansion of the WGS84 meridian arc for latitude and
/// the spherical parallel length for longitude.
///
/// The latitude goes through the cosine terms in radians. Maps made by
/// scripts that pass degrees to the cosine use about 1.29 times more meters
/// per degree of longitude near 44.4 N, so their cells are correspondingly
/// narrower east-west than the cells produced here.
#[must_use]
pub fn meters_per_degree(latitude_deg: f64) -> (f64, f64) {
    let phi = latitude_deg.to_radians();
    let lat = 111_132.954 - 559.822 * (2.0 * phi).cos() + 1.175 * (4.0 * phi).cos();
    let lon = 111_132.954 * phi.cos();
    (lat, lon)
}

/// Quantizes coordinates onto a uniform angular grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialBinner {
    config: GridConfig,
    delta_lat: f64,
    delta_lon: f64,
}

impl SpatialBinner {
    /// Create a binner for the given footprint.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the footprint or reference
    /// latitude is unusable.
    pub fn new(config: GridConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;
        let (m_per_deg_lat, m_per_deg_lon) = meters_per_degree(config.reference_latitude_deg);
        Ok(Self {
            config,
            delta_lat: config.cell_height_m / m_per_deg_lat,
            delta_lon: config.cell_width_m / m_per_deg_lon,
        })
    }

    /// Cell height in degrees of latitude.
    #[must_use]
    pub fn delta_lat(&self) -> f64 {
        self.delta_lat
    }

    /// Cell width in degrees of longitude.
    #[must_use]
    pub fn delta_lon(&self) -> f64 {
        self.delta_lon
    }

    /// Cell containing `(lat, lon)`.
    #[inline]
    #[must_use]
    pub fn bin(&self, lat: f64, lon: f64) -> CellKey {
        CellKey::new(
            (lat / self.delta_lat).floor() * self.delta_lat,
            (lon / self.delta_lon).floor() * self.delta_lon,
        )
    }

    /// Rectangle covered by `cell`.
    #[must_use]
    pub fn bounds(&self, cell: CellKey) -> CellBounds {
        CellBounds {
            south: cell.lat(),
            west: cell.lon(),
            north: cell.lat() + self.delta_lat,
            east: cell.lon() + self.delta_lon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_meters_per_degree() {
        let (lat, lon) = meters_per_degree(0.0);
        assert_relative_eq!(lat, 110_574.307, epsilon = 1e-6);
        assert_relative_eq!(lon, 111_132.954, epsilon = 1e-6);

        // cos(90 deg) = 0, cos(180 deg) = -1
        let (lat, lon) = meters_per_degree(45.0);
        assert_relative_eq!(lat, 111_131.779, epsilon = 1e-6);
        assert_relative_eq!(lon, 111_132.954 * 45f64.to_radians().cos(), epsilon = 1e-6);
    }

    #[test]
    fn test_longitude_scale_uses_radians() {
        let latitude = 44.382_441_9_f64;
        let (_, lon) = meters_per_degree(latitude);
        let degrees_in_cosine = 111_132.954 * latitude.cos();
        assert_relative_eq!(lon, 79_425.283_671, epsilon = 1e-3);
        assert_relative_eq!(degrees_in_cosine / lon, 1.288_682, epsilon = 1e-5);
    }

    #[test]
    fn test_angular_deltas() {
        let binner = SpatialBinner::new(GridConfig::default()).unwrap();
        let (m_lat, m_lon) = meters_per_degree(44.382_441_9);
        assert_relative_eq!(binner.delta_lat(), 80.0 / m_lat);
        assert_relative_eq!(binner.delta_lon(), 100.0 / m_lon);
    }

    #[test]
    fn test_same_cell() {
        let binner = SpatialBinner::new(GridConfig::default()).unwrap();
        let origin = binner.bin(44.35, 26.05);
        let inside_lat = origin.lat() + binner.delta_lat() * 0.5;
        let inside_lon = origin.lon() + binner.delta_lon() * 0.5;

        assert_eq!(binner.bin(inside_lat, inside_lon), origin);
        assert_eq!(binner.bin(inside_lat, inside_lon), binner.bin(44.35, 26.05));
    }

    #[test]
    fn test_neighbouring_cells_differ() {
        let binner = SpatialBinner::new(GridConfig::default()).unwrap();
        let a = binner.bin(44.35, 26.05);
        let b = binner.bin(44.35 + binner.delta_lat() * 1.5, 26.05);
        let c = binner.bin(44.35, 26.05 + binner.delta_lon() * 1.5);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let binner = SpatialBinner::new(GridConfig::default()).unwrap();
        let key = binner.bin(-1e-7, -1e-7);
        assert_relative_eq!(key.lat(), -binner.delta_lat());
        assert_relative_eq!(key.lon(), -binner.delta_lon());

        let key = binner.bin(1e-7, 1e-7);
        assert_eq!(key, CellKey::new(0.0, 0.0));
    }

    #[test]
    fn test_bounds() {
        let binner = SpatialBinner::new(GridConfig::default()).unwrap();
        let key = binner.bin(44.35, 26.05);
        let bounds = binner.bounds(key);
        assert_eq!(bounds.south, key.lat());
        assert_eq!(bounds.west, key.lon());
        assert_relative_eq!(bounds.north - bounds.south, binner.delta_lat());
        assert_relative_eq!(bounds.east - bounds.west, binner.delta_lon());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GridConfig::default().with_cell_size_m(0.0, 80.0);
        assert!(SpatialBinner::new(config).is_err());
    }
}
