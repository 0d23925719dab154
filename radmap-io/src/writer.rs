//! Writers for normalized cell summaries.

use crate::Result;
use radmap_core::NormalizedCellSummary;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column header of the CSV output.
pub const CSV_HEADER: &str = "cell_lat,cell_lon,dose_rate_uSv_per_hour,total_counts,relative_intensity";

/// Output layout, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// One JSON object per line.
    JsonLines,
}

impl SummaryFormat {
    /// `.jsonl` and `.json` select JSON lines; anything else is CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("json") => {
                Self::JsonLines
            }
            _ => Self::Csv,
        }
    }
}

/// Writer for the per-cell output table.
pub struct SummaryFileWriter {
    writer: BufWriter<File>,
}

impl SummaryFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Writes cells in `format`.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write(&mut self, cells: &[NormalizedCellSummary], format: SummaryFormat) -> Result<()> {
        match format {
            SummaryFormat::Csv => self.write_csv(cells),
            SummaryFormat::JsonLines => self.write_json_lines(cells),
        }
    }

    /// Writes cells as CSV.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_csv(&mut self, cells: &[NormalizedCellSummary]) -> Result<()> {
        writeln!(self.writer, "{CSV_HEADER}")?;

        for cell in cells {
            let r = cell.record();
            writeln!(
                self.writer,
                "{},{},{},{},{}",
                r.cell_lat, r.cell_lon, r.dose_rate_usv_per_hour, r.total_counts, r.relative_intensity
            )?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes cells as JSON lines.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_json_lines(&mut self, cells: &[NormalizedCellSummary]) -> Result<()> {
        for cell in cells {
            serde_json::to_writer(&mut self.writer, &cell.record())?;
            self.writer.write_all(b"\n")?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radmap_core::{CellDoseSummary, CellKey};
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn cells() -> Vec<NormalizedCellSummary> {
        let summary = |lat, lon, dose| CellDoseSummary {
            cell: CellKey::new(lat, lon),
            dose_rate_usv_per_hour: dose,
            total_counts: 120.0,
            total_elapsed_seconds: 2,
            reading_count: 2,
        };
        vec![
            NormalizedCellSummary {
                summary: summary(44.35, 26.05, 0.1),
                relative_intensity: 0.5,
            },
            NormalizedCellSummary {
                summary: summary(44.36, 26.05, 0.2),
                relative_intensity: 1.0,
            },
        ]
    }

    #[test]
    fn test_write_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = SummaryFileWriter::create(file.path()).unwrap();
        writer.write_csv(&cells()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "44.35,26.05,0.1,120,0.5");
        assert_eq!(lines[2], "44.36,26.05,0.2,120,1");
    }

    #[test]
    fn test_write_json_lines() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = SummaryFileWriter::create(file.path()).unwrap();
        writer.write_json_lines(&cells()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let rows: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["dose_rate_uSv_per_hour"], 0.2);
        assert_eq!(rows[1]["relative_intensity"], 1.0);
        assert_eq!(rows[0]["cell_lat"], 44.35);
    }

    #[test]
    fn test_empty_csv_has_header() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = SummaryFileWriter::create(file.path()).unwrap();
        writer.write(&[], SummaryFormat::Csv).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content.trim_end(), CSV_HEADER);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SummaryFormat::from_path(&PathBuf::from("out.jsonl")),
            SummaryFormat::JsonLines
        );
        assert_eq!(
            SummaryFormat::from_path(&PathBuf::from("out.JSON")),
            SummaryFormat::JsonLines
        );
        assert_eq!(
            SummaryFormat::from_path(&PathBuf::from("out.csv")),
            SummaryFormat::Csv
        );
        assert_eq!(SummaryFormat::from_path(&PathBuf::from("out")), SummaryFormat::Csv);
    }
}
