//! # Workflows Module
//!
//! The public entry points of the library. A workflow wires the engine
//! components into a complete operation: it owns the phase sequencing,
//! file staging, and progress reporting, and leaves policy (parameters,
//! run mode) to the caller-supplied configuration.

pub mod equilibrate;
