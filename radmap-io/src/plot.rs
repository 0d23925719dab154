//! PNG spectrum plots.

use crate::{Error, Result};
use image::RgbImage;
use plotters::prelude::*;
use radmap_core::{CellKey, SpectrumRenderer};
use std::fs;
use std::path::{Path, PathBuf};

const WIDTH: u32 = 900;
const HEIGHT: u32 = 600;
/// Top-left corner of the counts/seconds annotation, in pixels.
const NOTE_POSITION: (i32, i32) = (630, 80);
const NOTE_LINE_HEIGHT: i32 = 24;

/// Draws each cell's accumulated spectrum as a line plot.
///
/// Counts on a linear y axis scaled to the tallest channel, channel number
/// on the x axis, with the cell's total counts and exposure time printed in
/// the upper right. Files are named `cell_<lat>_<lon>.png` after the cell's
/// south-west corner.
pub struct PngSpectrumPlotter {
    dir: PathBuf,
}

impl PngSpectrumPlotter {
    /// Plots into `dir`, creating it if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// File the plot of `cell` is written to.
    #[must_use]
    pub fn path_for(&self, cell: CellKey) -> PathBuf {
        self.dir
            .join(format!("cell_{:.6}_{:.6}.png", cell.lat(), cell.lon()))
    }
}

impl SpectrumRenderer for PngSpectrumPlotter {
    type Artifact = PathBuf;
    type Error = Error;

    fn export(
        &mut self,
        cell: CellKey,
        histogram: &[u64],
        total_counts: f64,
        elapsed_seconds: u64,
    ) -> Result<PathBuf> {
        if histogram.len() < 2 {
            return Err(Error::InvalidFormat(format!(
                "cannot plot a spectrum of {} channels",
                histogram.len()
            )));
        }

        let image = draw_spectrum(cell, histogram, total_counts, elapsed_seconds)?;
        let path = self.path_for(cell);
        image.save(&path)?;
        log::debug!("wrote spectrum plot {}", path.display());
        Ok(path)
    }
}

fn plot_error(e: impl std::fmt::Display) -> Error {
    Error::Plot(e.to_string())
}

fn draw_spectrum(
    cell: CellKey,
    histogram: &[u64],
    total_counts: f64,
    elapsed_seconds: u64,
) -> Result<RgbImage> {
    let mut buffer = vec![0u8; WIDTH as usize * HEIGHT as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        // Autoscale with headroom; an empty spectrum still gets a unit axis.
        let peak = histogram.iter().copied().max().unwrap_or(0).max(1);
        let y_max = peak.saturating_add(peak / 20 + 1);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(
                format!("Cell {:.6}, {:.6}", cell.lat(), cell.lon()),
                ("sans-serif", 22),
            )
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..histogram.len(), 0..y_max)
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("channel")
            .y_desc("counts")
            .draw()
            .map_err(plot_error)?;

        chart
            .draw_series(LineSeries::new(
                histogram.iter().copied().enumerate(),
                BLUE.stroke_width(1),
            ))
            .map_err(plot_error)?;

        let (x, y) = NOTE_POSITION;
        let note = ("sans-serif", 18).into_font();
        root.draw(&Text::new(
            format!("Counts: {total_counts}"),
            (x, y),
            note.clone(),
        ))
        .map_err(plot_error)?;
        root.draw(&Text::new(
            format!("Seconds: {elapsed_seconds}"),
            (x, y + NOTE_LINE_HEIGHT),
            note,
        ))
        .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
    }

    RgbImage::from_raw(WIDTH, HEIGHT, buffer)
        .ok_or_else(|| plot_error("plot buffer does not match image size"))
}
