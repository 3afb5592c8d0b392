//! File I/O: reading input programs and persisting reports.

pub mod output;

use crate::analysis::result::AnalysisReport;
use crate::errors::JavaflowError;
use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Read an input program as UTF-8 source text.
pub fn read_source(path: &Path) -> Result<String, JavaflowError> {
    fs::read_to_string(path).map_err(|source| JavaflowError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Default report destination for an input file: `out/<stem>.json`.
pub fn default_out_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result".to_string());
    PathBuf::from("out").join(format!("{stem}.json"))
}

/// Serialize a report as pretty JSON, creating parent directories as needed.
pub fn save_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    info!("wrote report to {}", path.display());
    Ok(())
}
