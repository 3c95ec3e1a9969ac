//! # Engine Module
//!
//! The classification and editing machinery of the pipeline.
//!
//! ## Architecture
//!
//! - **Selection** ([`predicate`]) - Typed predicates over residues and atoms
//! - **Geometry** ([`geometry`]) - Assembly center/radius estimation
//! - **Shell Classification** ([`shell`]) - Spherical-shell membership and
//!   split-shell statistics
//! - **Fragment Expansion** ([`fragments`]) - Whole-fragment closure of
//!   head-residue selections
//! - **Charge Balancing** ([`charge`]) - Randomized counter-ion removal that
//!   restores exact net neutrality
//! - **Structure Editing** ([`editor`]) - Retained/removed structure splits
//! - **Reporting** ([`report`]) - Per-phase shell statistics CSV
//! - **Simulation Boundary** ([`simulate`]) - The external MD engine seam
//! - **Configuration** ([`config`]) - Validated pipeline parameters and the
//!   derived naming state
//! - **Progress Monitoring** ([`progress`]) - Callback-based phase reporting
//! - **Error Handling** ([`error`]) - Engine-specific error taxonomy

pub mod charge;
pub mod config;
pub mod editor;
pub mod error;
pub mod fragments;
pub mod geometry;
pub mod predicate;
pub mod progress;
pub mod report;
pub mod shell;
pub mod simulate;
