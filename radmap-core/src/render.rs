//! Rendering collaborator traits.
//!
//! The aggregation core never draws anything itself. Map overlays and
//! per-cell spectrum plots are produced by implementations of these traits.

use crate::{CellBounds, CellKey, NormalizedCellSummary};

/// Builds a map overlay from normalized cells.
pub trait OverlayRenderer {
    /// One visual element per cell.
    type Marker;
    /// Finished overlay (file path, document, handle).
    type Artifact;
    /// Renderer-specific failure.
    type Error: std::error::Error;

    /// Renders one cell covering `bounds`.
    ///
    /// # Errors
    /// Implementation-defined.
    fn render(
        &mut self,
        cell: &NormalizedCellSummary,
        bounds: CellBounds,
    ) -> Result<Self::Marker, Self::Error>;

    /// Assembles the markers into the final overlay.
    ///
    /// # Errors
    /// Implementation-defined.
    fn export(&mut self, markers: Vec<Self::Marker>) -> Result<Self::Artifact, Self::Error>;
}

/// Produces an image of one cell's accumulated spectrum.
pub trait SpectrumRenderer {
    /// Handle to the produced image.
    type Artifact;
    /// Renderer-specific failure.
    type Error: std::error::Error;

    /// Renders the spectrum of `cell`.
    ///
    /// # Errors
    /// Implementation-defined. Callers treat failures as per-cell.
    fn export(
        &mut self,
        cell: CellKey,
        histogram: &[u64],
        total_counts: f64,
        elapsed_seconds: u64,
    ) -> Result<Self::Artifact, Self::Error>;
}
