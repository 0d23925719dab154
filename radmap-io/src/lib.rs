//! radmap-io: Log ingestion and output for radmap.
//!
//! This crate reads newline-delimited JSON survey logs into validated
//! readings, loads JSON configuration, and writes cell summaries, GeoJSON
//! overlays and PNG spectrum plots.
//!

mod config;
mod error;
pub mod overlay;
pub mod plot;
mod reader;
pub mod scanner;
mod writer;

pub use config::{load_config, parse_config};
pub use error::{Error, Result};
pub use overlay::GeoJsonOverlay;
pub use plot::PngSpectrumPlotter;
pub use reader::{parse_record, read_all, IngestStatistics, ReadingStream, Record};
pub use scanner::LogScanner;
pub use writer::{SummaryFileWriter, SummaryFormat, CSV_HEADER};
