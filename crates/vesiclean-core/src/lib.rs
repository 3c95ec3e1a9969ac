//! # Vesiclean Core Library
//!
//! A library for equilibrating large spherical lipid vesicle assemblies by
//! iteratively classifying mis-placed molecules against concentric spherical
//! shells, removing them, and handing the cleaned structure to an external
//! molecular-dynamics engine between phases.
//!
//! ## Architectural Philosophy
//!
//! The library keeps a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`)
//!   and file I/O for the topology/coordinate formats the pipeline consumes
//!   (PSF, PDB, extended-system cell logs).
//!
//! - **[`engine`]: The Logic Core.** The classification and editing machinery:
//!   geometry estimation, shell membership, bonded-fragment expansion, charge
//!   balancing, structure splitting, and the pipeline configuration.
//!
//! - **[`workflows`]: The Public API.** The phase state machine that sequences
//!   classification, editing, and external simulation runs across the five
//!   ordered equilibration phases.

pub mod core;
pub mod engine;
pub mod workflows;
