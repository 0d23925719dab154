//! GeoJSON map overlay.
//!
//! Each cell becomes a rectangle polygon filled red with opacity equal to
//! its relative intensity and outlined with a thin black stroke. Any web
//! map that understands simplestyle properties can display the result.

use crate::{Error, Result};
use radmap_core::{CellBounds, CellKey, NormalizedCellSummary, OverlayRenderer};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes a GeoJSON `FeatureCollection` with one polygon per cell.
pub struct GeoJsonOverlay {
    path: PathBuf,
    images: HashMap<CellKey, PathBuf>,
}

impl GeoJsonOverlay {
    /// Overlay written to `path` on export.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            images: HashMap::new(),
        }
    }

    /// Attach spectrum plot paths; matching cells get an `image` property.
    #[must_use]
    pub fn with_images<I>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = (CellKey, PathBuf)>,
    {
        self.images.extend(images);
        self
    }

    /// Destination of the overlay file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OverlayRenderer for GeoJsonOverlay {
    type Marker = Value;
    type Artifact = PathBuf;
    type Error = Error;

    fn render(&mut self, cell: &NormalizedCellSummary, bounds: CellBounds) -> Result<Value> {
        let summary = &cell.summary;
        if !cell.relative_intensity.is_finite() {
            return Err(Error::InvalidFormat(format!(
                "non-finite intensity for cell ({}, {})",
                summary.cell.lat(),
                summary.cell.lon()
            )));
        }

        // GeoJSON positions are [lon, lat]; the ring is closed.
        let ring = [
            [bounds.west, bounds.south],
            [bounds.east, bounds.south],
            [bounds.east, bounds.north],
            [bounds.west, bounds.north],
            [bounds.west, bounds.south],
        ];

        let mut properties = json!({
            "cell_lat": summary.cell.lat(),
            "cell_lon": summary.cell.lon(),
            "dose_rate_uSv_per_hour": summary.dose_rate_usv_per_hour,
            "total_counts": summary.total_counts,
            "elapsed_seconds": summary.total_elapsed_seconds,
            "relative_intensity": cell.relative_intensity,
            "stroke": "#000000",
            "stroke-width": 0.5,
            "stroke-opacity": 1.0,
            "fill": "#ff0000",
            "fill-opacity": cell.relative_intensity,
            "tooltip": format!("{:.2} uSv/h", summary.dose_rate_usv_per_hour),
        });
        if let Some(image) = self.images.get(&summary.cell) {
            properties["image"] = json!(image.to_string_lossy());
        }

        Ok(json!({
            "type": "Feature",
            "geometry": {"type": "Polygon", "coordinates": [ring]},
            "properties": properties,
        }))
    }

    fn export(&mut self, markers: Vec<Value>) -> Result<PathBuf> {
        let collection = json!({
            "type": "FeatureCollection",
            "features": markers,
        });

        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &collection)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        log::info!(
            "wrote overlay with {} cells to {}",
            collection["features"].as_array().map_or(0, Vec::len),
            self.path.display()
        );
        Ok(self.path.clone())
    }
}
