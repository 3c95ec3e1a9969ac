//! # Core Models Module
//!
//! Fundamental data structures for representing the molecular systems the
//! pipeline classifies and edits.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom representation with coordinates and charge
//! - [`residue`] - Residue structure and species classification tables
//! - [`segment`] - Segment grouping as carried by PSF topology files
//! - [`system`] - Complete molecular system with connectivity and lookups
//! - [`topology`] - Bond records
//! - [`ids`] - Unique identifier types for atoms, residues, and segments

pub mod atom;
pub mod ids;
pub mod residue;
pub mod segment;
pub mod system;
pub mod topology;
