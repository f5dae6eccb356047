// src/storage/results.rs

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{error::AppError, models::result::ResultRecord};

/// Append-only destination for finished session records.
pub trait ResultSink: Send + Sync {
    /// Writes the record and returns where it landed.
    fn persist(&self, record: &ResultRecord) -> Result<PathBuf, AppError>;
}

/// Writes each record as `<timestamp>_<uuid>.json` into one directory.
///
/// The JSON is written to a hidden temp file in the same directory, flushed,
/// then renamed into place, so a reader never sees a partial result.
#[derive(Debug, Clone)]
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ResultSink for JsonDirSink {
    fn persist(&self, record: &ResultRecord) -> Result<PathBuf, AppError> {
        let io_err = |e: std::io::Error| AppError::PersistenceFailure(e.to_string());

        fs::create_dir_all(&self.dir).map_err(io_err)?;

        let file_name = record.file_name();
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(io_err)?;

        serde_json::to_writer_pretty(&mut temp, record)
            .map_err(|e| AppError::PersistenceFailure(e.to_string()))?;
        temp.flush().map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;

        let final_path = self.dir.join(&file_name);
        temp.persist(&final_path)
            .map_err(|e| AppError::PersistenceFailure(e.error.to_string()))?;

        Ok(final_path)
    }
}

/// Runs the blocking sink write off the async runtime.
pub async fn persist_record(
    sink: Arc<dyn ResultSink>,
    record: ResultRecord,
) -> Result<PathBuf, AppError> {
    tokio::task::spawn_blocking(move || sink.persist(&record))
        .await
        .map_err(|e| AppError::PersistenceFailure(e.to_string()))?
}

/// Reads a saved result file back.
pub fn load_result(path: &Path) -> Result<ResultRecord, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::NotFound(format!("{}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&content)?)
}

/// Result files in `dir`, skipping hidden temp files.
pub fn list_result_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            let visible = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with('.'));
            visible && path.extension().is_some_and(|ext| ext == "json")
        })
        .collect();
    files.sort();
    Ok(files)
}
