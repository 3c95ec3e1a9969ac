//! # Core Module
//!
//! This module provides the fundamental building blocks for representing and
//! persisting the molecular systems the vesicle-equilibration pipeline edits.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Data structures for atoms,
//!   residues, segments, bonds, and complete systems
//! - **File I/O** ([`io`]) - Reading/writing the topology/coordinate formats
//!   the pipeline consumes (PSF, PDB) and the extended-system cell log used
//!   to rewrite per-phase simulation configs
//!
//! The core layer is stateless: nothing here knows about phases, shells, or
//! the external simulation engine. Those concerns live in the `engine` and
//! `workflows` layers.

pub mod io;
pub mod models;
