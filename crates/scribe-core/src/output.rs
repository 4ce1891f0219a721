//! Persisting processing records as one JSON file per image.
//!
//! File names are derived from the image stem and the record timestamp.
//! Files are opened with `create_new`, so an existing output is never
//! overwritten; a clash gets a numeric suffix instead.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, ScribeError};
use crate::types::ProcessingRecord;

/// Give up on suffixing after this many clashes for one base name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Writes each `ProcessingRecord` to its own pretty-printed JSON file.
pub struct RecordWriter {
    output_dir: PathBuf,
    records_written: usize,
}

impl RecordWriter {
    /// Create a writer. `output_dir` is created on the first write, so a run
    /// that fails before producing anything leaves no trace on disk.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            records_written: 0,
        }
    }

    /// Write one record and return the path of the new file.
    ///
    /// The record is serialized before any file is created, and a file whose
    /// write fails is removed, so a failed record leaves nothing behind.
    pub fn write(&mut self, record: &ProcessingRecord) -> Result<PathBuf> {
        let base = base_name(record);
        let mut bytes = serde_json::to_vec_pretty(record).map_err(|e| {
            output_error(
                &self.output_dir.join(format!("{base}.json")),
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
        })?;
        bytes.push(b'\n');

        let (path, mut file) = self.create_unique(&base)?;
        if let Err(e) = file.write_all(&bytes).and_then(|()| file.flush()) {
            drop(file);
            if let Err(remove_err) = std::fs::remove_file(&path) {
                tracing::warn!("Could not remove partial output {:?}: {}", path, remove_err);
            }
            return Err(output_error(&path, e));
        }

        self.records_written += 1;
        tracing::info!("Result saved to {:?}", path);
        Ok(path)
    }

    /// Get the number of records written.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn create_unique(&self, base: &str) -> Result<(PathBuf, File)> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| output_error(&self.output_dir, e))?;
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{base}.json")
            } else {
                format!("{base}-{attempt}.json")
            };
            let path = self.output_dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(output_error(&path, e)),
            }
        }
        let path = self.output_dir.join(format!("{base}.json"));
        Err(output_error(
            &path,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{MAX_NAME_ATTEMPTS} files named like this already exist"),
            ),
        ))
    }
}

/// `{image stem}_{YYYYMMDDTHHMMSSmmm}` for a record.
fn base_name(record: &ProcessingRecord) -> String {
    let stem = record
        .image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());
    format!("{stem}_{}", record.timestamp.format("%Y%m%dT%H%M%S%3f"))
}

fn output_error(path: &Path, source: io::Error) -> ScribeError {
    ScribeError::Output {
        path: path.to_path_buf(),
        source,
    }
}
