//! Newline-delimited JSON log readers.
//!
//! Each line of a log unit is one record:
//!
//! ```json
//! {"timestamp": {...}, "location": {"lat": 44.35, "lon": 26.05, "fix": 1},
//!  "spectrum": {"time": 1, "hist": [0, 3, ...]}}
//! ```
//!
//! Malformed records are skipped and counted, records without a GPS fix are
//! skipped, and a zero integration time is read as one second.

use crate::scanner::LogScanner;
use crate::{Error, Result};
use radmap_core::{Location, Reading, Spectrum, Timestamp};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    timestamp: Timestamp,
    location: RawLocation,
    spectrum: RawSpectrum,
}

#[derive(Deserialize)]
struct RawLocation {
    lat: f64,
    lon: f64,
    fix: i64,
}

#[derive(Deserialize)]
struct RawSpectrum {
    time: u64,
    hist: Vec<u32>,
}

/// A successfully decoded record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Record with a GPS fix.
    Reading {
        reading: Reading,
        /// The logged integration time was zero and was read as one second.
        zero_elapsed: bool,
    },
    /// Record without a GPS fix; carries no usable position.
    NoFix,
}

/// Decodes one log line.
///
/// # Errors
/// Returns an error if the line is not a valid record: bad JSON, missing
/// fields, negative counts, or a histogram of the wrong length.
pub fn parse_record(line: &[u8]) -> Result<Record> {
    let raw: RawRecord = serde_json::from_slice(line)?;
    if raw.location.fix != 1 {
        return Ok(Record::NoFix);
    }
    let zero_elapsed = raw.spectrum.time == 0;
    let spectrum = Spectrum::new(raw.spectrum.time, raw.spectrum.hist)?;
    Ok(Record::Reading {
        reading: Reading::new(
            raw.timestamp,
            Location::fixed(raw.location.lat, raw.location.lon),
            spectrum,
        ),
        zero_elapsed,
    })
}

/// Counters of one ingestion pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestStatistics {
    /// Log files opened.
    pub files: usize,
    /// Non-blank lines read.
    pub records: u64,
    /// Readings handed to the caller.
    pub accepted: u64,
    /// Lines that failed to decode.
    pub malformed: u64,
    /// Records without a GPS fix.
    pub no_fix: u64,
    /// Readings whose zero integration time was read as one second.
    pub zero_elapsed_coerced: u64,
    /// Readings outside the configured integration window.
    pub window_rejected: u64,
}

/// Lazy stream of readings over a list of log files.
///
/// Yields `Err` only when an enumerated file cannot be opened or read;
/// invalid records never end the stream.
pub struct ReadingStream {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<(PathBuf, BufReader<File>)>,
    line: Vec<u8>,
    line_number: u64,
    window_seconds: Option<u64>,
    stats: IngestStatistics,
}

impl ReadingStream {
    /// Streams the given files in order.
    #[must_use]
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files: files.into_iter(),
            current: None,
            line: Vec::new(),
            line_number: 0,
            window_seconds: None,
            stats: IngestStatistics::default(),
        }
    }

    /// Enumerates `sources` and streams every log file found.
    ///
    /// # Errors
    /// Returns [`Error::SourceUnavailable`] if any source is missing.
    pub fn open<P: AsRef<Path>>(sources: &[P]) -> Result<Self> {
        Ok(Self::new(LogScanner::scan(sources)?))
    }

    /// Only yield readings integrated over exactly `seconds`.
    #[must_use]
    pub fn with_window_seconds(mut self, seconds: Option<u64>) -> Self {
        self.window_seconds = seconds;
        self
    }

    /// Counters so far.
    #[must_use]
    pub fn statistics(&self) -> &IngestStatistics {
        &self.stats
    }

    fn open_next(&mut self) -> Option<Result<()>> {
        let path = self.files.next()?;
        match File::open(&path) {
            Ok(file) => {
                self.stats.files += 1;
                self.line_number = 0;
                self.current = Some((path, BufReader::new(file)));
                Some(Ok(()))
            }
            Err(source) => Some(Err(Error::SourceUnavailable { path, source })),
        }
    }

    fn accept(&mut self, path: &Path, line_number: u64) -> Option<Reading> {
        self.stats.records += 1;
        let reading = match parse_record(&self.line) {
            Ok(Record::Reading {
                reading,
                zero_elapsed,
            }) => {
                if zero_elapsed {
                    self.stats.zero_elapsed_coerced += 1;
                }
                reading
            }
            Ok(Record::NoFix) => {
                self.stats.no_fix += 1;
                return None;
            }
            Err(e) => {
                self.stats.malformed += 1;
                log::debug!("{}:{line_number}: skipping record: {e}", path.display());
                return None;
            }
        };

        if let Some(window) = self.window_seconds {
            if reading.spectrum.elapsed_seconds() != window {
                self.stats.window_rejected += 1;
                return None;
            }
        }
        self.stats.accepted += 1;
        Some(reading)
    }
}

impl Iterator for ReadingStream {
    type Item = Result<Reading>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some((path, mut reader)) = self.current.take() else {
                match self.open_next()? {
                    Ok(()) => continue,
                    Err(e) => return Some(Err(e)),
                }
            };

            self.line.clear();
            match reader.read_until(b'\n', &mut self.line) {
                Ok(0) => continue,
                Ok(_) => {
                    self.line_number += 1;
                    let line_number = self.line_number;
                    let blank = self.line.iter().all(u8::is_ascii_whitespace);
                    let reading = if blank {
                        None
                    } else {
                        self.accept(&path, line_number)
                    };
                    self.current = Some((path, reader));
                    if let Some(reading) = reading {
                        return Some(Ok(reading));
                    }
                }
                Err(e) => return Some(Err(Error::Io(e))),
            }
        }
    }
}

/// Reads every accepted reading of `sources` into memory.
///
/// # Errors
/// Returns an error if a source is missing or a file cannot be read.
pub fn read_all<P: AsRef<Path>>(
    sources: &[P],
    window_seconds: Option<u64>,
) -> Result<(Vec<Reading>, IngestStatistics)> {
    let mut stream = ReadingStream::open(sources)?.with_window_seconds(window_seconds);
    let readings = stream.by_ref().collect::<Result<Vec<_>>>()?;
    Ok((readings, stream.stats))
}
