//! Reading types for geotagged spectrum logs.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// `Spectrum` and `Reading` are serialize-only: deserializing them would bypass
// the channel-count check in `Spectrum::new`.

/// Number of channels in a pulse-height spectrum.
pub const CHANNEL_COUNT: usize = 1024;

/// Overflow/pile-up channel: counted, but carries no energy.
pub const OVERFLOW_CHANNEL: usize = CHANNEL_COUNT - 1;

/// Time-of-day fields as logged by the device.
///
/// Every field is optional; the aggregation never depends on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp {
    pub year: Option<u16>,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
}

/// GPS position attached to a reading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// True if the receiver had a valid fix.
    pub fix: bool,
}

impl Location {
    /// Creates a location with a valid fix.
    #[inline]
    #[must_use]
    pub fn fixed(lat: f64, lon: f64) -> Self {
        Self { lat, lon, fix: true }
    }
}

/// Longest integration window a single record may carry (seconds).
pub const MAX_ELAPSED_SECONDS: u64 = 0xFFFF_FFFF;

/// A pulse-height spectrum integrated over `elapsed_seconds`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Spectrum {
    elapsed_seconds: u64,
    histogram: Vec<u32>,
}

impl Spectrum {
    /// Creates a spectrum, coercing a zero-length window to one second.
    ///
    /// # Errors
    /// Returns [`Error::InvalidHistogram`] if `histogram` does not have
    /// exactly [`CHANNEL_COUNT`] channels, and [`Error::InvalidElapsed`] if
    /// `elapsed_seconds` exceeds [`MAX_ELAPSED_SECONDS`].
    pub fn new(elapsed_seconds: u64, histogram: Vec<u32>) -> Result<Self> {
        if elapsed_seconds > MAX_ELAPSED_SECONDS {
            return Err(Error::InvalidElapsed(elapsed_seconds));
        }
        if histogram.len() != CHANNEL_COUNT {
            return Err(Error::InvalidHistogram {
                expected: CHANNEL_COUNT,
                actual: histogram.len(),
            });
        }
        Ok(Self {
            elapsed_seconds: elapsed_seconds.max(1),
            histogram,
        })
    }

    /// Integration window in seconds (always at least 1).
    #[inline]
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Channel counts, exactly [`CHANNEL_COUNT`] long.
    #[inline]
    #[must_use]
    pub fn histogram(&self) -> &[u32] {
        &self.histogram
    }
}

/// One geolocated spectrum record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Reading {
    pub timestamp: Timestamp,
    pub location: Location,
    pub spectrum: Spectrum,
}

impl Reading {
    /// Creates a reading.
    #[must_use]
    pub fn new(timestamp: Timestamp, location: Location, spectrum: Spectrum) -> Self {
        Self {
            timestamp,
            location,
            spectrum,
        }
    }
}
