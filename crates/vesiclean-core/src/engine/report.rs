use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

/// One row of the per-phase shell-statistics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellStatsRow {
    /// Phase label, e.g. "1A" or "2B".
    pub phase: String,
    /// The classified species group, e.g. "solvent" or "lipid".
    pub species: String,
    /// Assembly radius the shell was derived from, in Angstroms.
    pub radius: f64,
    /// Inward surface offsets that bounded the shell.
    pub d_inner: f64,
    pub d_outer: f64,
    /// Residues classified into the shell.
    pub members: usize,
    /// Midpoint split of the members, reporting only.
    pub inner: usize,
    pub outer: usize,
}

/// Appends a row to the shell-statistics CSV at `path`.
///
/// The header is written once, when the file is created or still empty, so
/// successive phases of one run (and successive runs on the same report)
/// accumulate under a single header line.
pub fn append_shell_stats(path: &Path, row: &ShellStatsRow) -> Result<(), EngineError> {
    let needs_header = match std::fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer
        .serialize(row)
        .and_then(|_| writer.flush().map_err(csv::Error::from))
        .map_err(|e| EngineError::Report(e.to_string()))?;

    debug!(path = %path.display(), phase = %row.phase, "Appended shell statistics row");
    Ok(())
}
