use thiserror::Error;

use crate::core::io::cell::CellError;
use crate::core::io::structure::StructureError;
use crate::core::models::residue::IonSpecies;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Selection for {context} matched no atoms (topology/species-table mismatch?)")]
    EmptySelection { context: &'static str },

    #[error(
        "Degenerate shell: offsets ({d_inner}, {d_outer}) against estimated radius {radius:.3} \
         leave a derived radius at or below zero"
    )]
    DegenerateShell {
        d_inner: f64,
        d_outer: f64,
        radius: f64,
    },

    #[error(
        "Charge balancing needs to remove {needed} {species} ion(s) but only {available} exist"
    )]
    InsufficientIons {
        needed: usize,
        available: usize,
        species: IonSpecies,
    },

    #[error("Expected artifact is missing: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Simulation engine failed in phase {phase}: {message}")]
    Simulation { phase: &'static str, message: String },

    #[error("Structure I/O failed: {source}")]
    Structure {
        #[from]
        source: StructureError,
    },

    #[error("Cell-info processing failed: {source}")]
    Cell {
        #[from]
        source: CellError,
    },

    #[error("Report writing failed: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
