//! Provides input/output functionality for the molecular file formats the
//! pipeline consumes.
//!
//! A structure snapshot is always persisted as a topology/coordinate pair:
//! an X-PLOR PSF file carrying segments, residues, charges, and bonds, and a
//! PDB file carrying coordinates. Trajectories are multi-model PDB files of
//! which only the last model is read. The [`cell`] module handles the
//! extended-system cell log used to rewrite per-phase simulation configs.

pub mod cell;
pub mod pdb;
pub mod psf;
pub mod structure;
pub mod traits;
