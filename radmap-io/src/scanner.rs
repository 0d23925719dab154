//! Log source enumeration.
//!
//! A log source is a list of directories (or individual files). Every
//! regular file inside a directory is one log unit; subdirectories are not
//! descended into.

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Scanner for discovering log files.
pub struct LogScanner;

impl LogScanner {
    /// Lists the log files of `sources`, sorted by path within each source.
    ///
    /// # Errors
    /// Returns [`Error::SourceUnavailable`] for the first source that does
    /// not exist or cannot be listed. No file is opened before every source
    /// has been checked.
    pub fn scan<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for source in sources {
            let source = source.as_ref();
            let metadata = fs::metadata(source).map_err(|e| unavailable(source, e))?;

            if metadata.is_file() {
                files.push(source.to_path_buf());
                continue;
            }

            let mut found = Vec::new();
            for entry in fs::read_dir(source).map_err(|e| unavailable(source, e))? {
                let entry = entry.map_err(|e| unavailable(source, e))?;
                let path = entry.path();
                if entry
                    .file_type()
                    .map_err(|e| unavailable(&path, e))?
                    .is_file()
                {
                    found.push(path);
                }
            }
            found.sort();
            log::debug!("{}: {} log files", source.display(), found.len());
            files.extend(found);
        }
        Ok(files)
    }
}

fn unavailable(path: &Path, source: std::io::Error) -> Error {
    Error::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    }
}
