use crate::engine::fragments::FragmentStrategy;
use crate::engine::shell::ShellSpec;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Which part of the phase sequence a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// All phases, 1A through 5.
    #[default]
    Full,
    /// Phases 1A through 4, leaving phase 5 for a later run.
    #[serde(rename = "stop-after-4")]
    StopAfterPhase4,
    /// Phase 5 alone, resuming from the artifacts of a stop-after-4 run.
    #[serde(rename = "phase-5-only")]
    Phase5Only,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(RunMode::Full),
            "stop-after-4" => Ok(RunMode::StopAfterPhase4),
            "phase-5-only" => Ok(RunMode::Phase5Only),
            other => Err(format!(
                "unknown run mode '{other}' (expected full, stop-after-4, or phase-5-only)"
            )),
        }
    }
}

/// Validated parameters for one equilibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Input PSF topology.
    pub structure: PathBuf,
    /// Input coordinate/trajectory PDB; the last model is used.
    pub trajectory: PathBuf,
    /// NAMD extended-system file carrying the periodic cell.
    pub cell_info: PathBuf,
    /// Directory holding the per-phase engine configuration templates.
    pub source_dir: PathBuf,
    /// Directory the phase tree is built under.
    pub work_dir: PathBuf,
    /// Solvent shell offsets (d1, d2), applied in every solvent phase.
    pub solvent_shell: ShellSpec,
    /// Lipid shell offsets (d3, d4); present iff lipid removal is enabled.
    pub lipid_shell: Option<ShellSpec>,
    pub fragment_strategy: FragmentStrategy,
    pub run_mode: RunMode,
    /// Keep water in persisted per-phase trajectories instead of stripping it.
    pub keep_trajectories: bool,
    /// RNG seed for counter-ion selection; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl PipelineConfig {
    pub fn remove_lipids(&self) -> bool {
        self.lipid_shell.is_some()
    }
}

/// Derived file naming for a run, computed once from the config.
///
/// The source pipeline threaded the basename between stages through process
/// environment variables; deriving it up front makes every phase agree on
/// the names by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineNames {
    basename: String,
}

impl PipelineNames {
    pub fn derive(config: &PipelineConfig) -> Self {
        let stem = config
            .structure
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "system".to_string());
        let suffix = if config.remove_lipids() {
            "_shell_dl"
        } else {
            "_shell"
        };
        Self {
            basename: format!("{stem}{suffix}"),
        }
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Topology file name for edited structures written by the phases.
    pub fn psf_name(&self) -> String {
        format!("{}.psf", self.basename)
    }

    /// Coordinate file name paired with [`Self::psf_name`].
    pub fn pdb_name(&self) -> String {
        format!("{}.pdb", self.basename)
    }

    /// Coordinate file name for the removed half of a split, kept for
    /// inspection.
    pub fn removed_pdb_name(&self) -> String {
        format!("{}_removed.pdb", self.basename)
    }
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    structure: Option<PathBuf>,
    trajectory: Option<PathBuf>,
    cell_info: Option<PathBuf>,
    source_dir: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    d1: Option<f64>,
    d2: Option<f64>,
    remove_lipids: bool,
    d3: Option<f64>,
    d4: Option<f64>,
    fragment_strategy: Option<FragmentStrategy>,
    run_mode: Option<RunMode>,
    keep_trajectories: bool,
    seed: Option<u64>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure(mut self, path: PathBuf) -> Self {
        self.structure = Some(path);
        self
    }
    pub fn trajectory(mut self, path: PathBuf) -> Self {
        self.trajectory = Some(path);
        self
    }
    pub fn cell_info(mut self, path: PathBuf) -> Self {
        self.cell_info = Some(path);
        self
    }
    pub fn source_dir(mut self, path: PathBuf) -> Self {
        self.source_dir = Some(path);
        self
    }
    pub fn work_dir(mut self, path: PathBuf) -> Self {
        self.work_dir = Some(path);
        self
    }
    pub fn solvent_offsets(mut self, d1: f64, d2: f64) -> Self {
        self.d1 = Some(d1);
        self.d2 = Some(d2);
        self
    }
    pub fn remove_lipids(mut self, enabled: bool) -> Self {
        self.remove_lipids = enabled;
        self
    }
    pub fn lipid_offsets(mut self, d3: f64, d4: f64) -> Self {
        self.d3 = Some(d3);
        self.d4 = Some(d4);
        self
    }
    pub fn fragment_strategy(mut self, strategy: FragmentStrategy) -> Self {
        self.fragment_strategy = Some(strategy);
        self
    }
    pub fn run_mode(mut self, mode: RunMode) -> Self {
        self.run_mode = Some(mode);
        self
    }
    pub fn keep_trajectories(mut self, keep: bool) -> Self {
        self.keep_trajectories = keep;
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let solvent_shell = ShellSpec::new(
            self.d1.ok_or(ConfigError::MissingParameter("d1"))?,
            self.d2.ok_or(ConfigError::MissingParameter("d2"))?,
        );
        let lipid_shell = if self.remove_lipids {
            Some(ShellSpec::new(
                self.d3.ok_or(ConfigError::MissingParameter("d3"))?,
                self.d4.ok_or(ConfigError::MissingParameter("d4"))?,
            ))
        } else {
            None
        };
        Ok(PipelineConfig {
            structure: self
                .structure
                .ok_or(ConfigError::MissingParameter("structure"))?,
            trajectory: self
                .trajectory
                .ok_or(ConfigError::MissingParameter("trajectory"))?,
            cell_info: self
                .cell_info
                .ok_or(ConfigError::MissingParameter("cell_info"))?,
            source_dir: self
                .source_dir
                .ok_or(ConfigError::MissingParameter("source_dir"))?,
            work_dir: self
                .work_dir
                .ok_or(ConfigError::MissingParameter("work_dir"))?,
            solvent_shell,
            lipid_shell,
            fragment_strategy: self.fragment_strategy.unwrap_or_default(),
            run_mode: self.run_mode.unwrap_or_default(),
            keep_trajectories: self.keep_trajectories,
            seed: self.seed,
        })
    }
}
