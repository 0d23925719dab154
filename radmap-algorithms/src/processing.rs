//! High-level helpers that run a whole aggregation and drive renderers.

use crate::{Aggregator, DoseMap, ZeroDosePolicy};
use radmap_core::{
    AggregationConfig, CellKey, NormalizedCellSummary, OverlayRenderer, Reading, Result,
    SpectrumRenderer,
};

/// Finalized and normalized output of one run.
#[derive(Debug)]
pub struct AggregationOutput {
    /// Finalized dose rates and accumulated spectra.
    pub map: DoseMap,
    /// Normalized cells, sorted by (lat, lon).
    pub cells: Vec<NormalizedCellSummary>,
}

/// Accumulate, finalize and normalize `readings` sequentially.
///
/// # Errors
/// Returns an error for an invalid configuration or degenerate input.
pub fn aggregate<I>(
    readings: I,
    config: AggregationConfig,
    policy: ZeroDosePolicy,
) -> Result<AggregationOutput>
where
    I: IntoIterator<Item = Reading>,
{
    let mut aggregator = Aggregator::new(config)?;
    aggregator.accumulate_all(readings);
    let map = aggregator.finalize();
    let cells = map.normalize(policy)?;
    Ok(AggregationOutput { map, cells })
}

/// Same as [`aggregate`], accumulating across the rayon pool.
///
/// # Errors
/// Returns an error for an invalid configuration or degenerate input.
pub fn aggregate_parallel(
    readings: &[Reading],
    config: AggregationConfig,
    policy: ZeroDosePolicy,
) -> Result<AggregationOutput> {
    let mut aggregator = Aggregator::new(config)?;
    aggregator.accumulate_parallel(readings);
    let map = aggregator.finalize();
    let cells = map.normalize(policy)?;
    Ok(AggregationOutput { map, cells })
}

/// Renders every cell into an overlay and exports it.
///
/// # Errors
/// Returns the renderer's first error.
pub fn render_overlay<R: OverlayRenderer>(
    renderer: &mut R,
    map: &DoseMap,
    cells: &[NormalizedCellSummary],
) -> std::result::Result<R::Artifact, R::Error> {
    let markers = cells
        .iter()
        .map(|cell| renderer.render(cell, map.bounds(cell.summary.cell)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    renderer.export(markers)
}

/// Outcome of a spectrum export pass.
#[derive(Debug)]
pub struct SpectrumExportReport<A> {
    /// Cells whose spectrum was rendered.
    pub exported: Vec<(CellKey, A)>,
    /// Cells whose renderer call failed, with the error message.
    pub failed: Vec<(CellKey, String)>,
}

impl<A> SpectrumExportReport<A> {
    /// Artifact produced for `cell`, if its export succeeded.
    #[must_use]
    pub fn artifact(&self, cell: &CellKey) -> Option<&A> {
        self.exported
            .iter()
            .find(|(key, _)| key == cell)
            .map(|(_, artifact)| artifact)
    }
}

/// Renders the spectrum of every finalized cell.
///
/// A failure on one cell is logged and recorded; the remaining cells are
/// still exported.
pub fn export_spectra<R: SpectrumRenderer>(
    renderer: &mut R,
    map: &DoseMap,
) -> SpectrumExportReport<R::Artifact> {
    let mut report = SpectrumExportReport {
        exported: Vec::with_capacity(map.summaries().len()),
        failed: Vec::new(),
    };

    for summary in map.summaries() {
        let Some(accumulator) = map.accumulator(&summary.cell) else {
            continue;
        };
        match renderer.export(
            summary.cell,
            accumulator.histogram_sum(),
            summary.total_counts,
            summary.total_elapsed_seconds,
        ) {
            Ok(artifact) => report.exported.push((summary.cell, artifact)),
            Err(e) => {
                log::warn!(
                    "spectrum export failed for cell ({}, {}): {e}",
                    summary.cell.lat(),
                    summary.cell.lon()
                );
                report.failed.push((summary.cell, e.to_string()));
            }
        }
    }

    report
}
