use clap::Parser;
use std::path::PathBuf;
use vesiclean::engine::config::RunMode;
use vesiclean::engine::fragments::FragmentStrategy;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Marek Lindqvist",
    version,
    about = "vesiclean - Shell-based solvent and lipid pruning for equilibrating spherical vesicle systems.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    // --- Inputs ---
    /// PSF topology of the solvated assembly.
    #[arg(short = 's', long, value_name = "PATH")]
    pub structure: Option<PathBuf>,

    /// Coordinate or multi-model trajectory PDB; the last model is used.
    #[arg(short = 't', long, value_name = "PATH")]
    pub trajectory: Option<PathBuf>,

    /// NAMD extended-system (.xsc) file carrying the periodic cell.
    #[arg(long, value_name = "PATH")]
    pub cell_info: Option<PathBuf>,

    /// Directory holding the per-phase engine configuration templates
    /// (equil_1a.conf through equil_5.conf).
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Directory the phase tree is built under [default: current directory].
    #[arg(short = 'w', long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    // --- Shell Offsets ---
    /// Inner solvent-shell offset from the assembly surface, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub d1: Option<f64>,

    /// Outer solvent-shell offset from the assembly surface, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub d2: Option<f64>,

    /// Also prune lipids from their own shell during phase 1A.
    #[arg(long)]
    pub remove_lipids: bool,

    /// Inner lipid-shell offset; required with --remove-lipids.
    #[arg(long, value_name = "FLOAT", requires = "d4")]
    pub d3: Option<f64>,

    /// Outer lipid-shell offset; required with --remove-lipids.
    #[arg(long, value_name = "FLOAT", requires = "d3")]
    pub d4: Option<f64>,

    // --- Behavior ---
    /// How pruned lipid residues expand to whole covalent units
    /// [connectivity|offset-table].
    #[arg(long, value_name = "MODE")]
    pub fragment_strategy: Option<FragmentStrategy>,

    /// Which part of the phase sequence to run
    /// [full|stop-after-4|phase-5-only].
    #[arg(long, value_name = "MODE")]
    pub run_mode: Option<RunMode>,

    /// Keep water in the persisted per-phase trajectories instead of
    /// writing water-stripped copies.
    #[arg(long)]
    pub keep_trajectories: bool,

    /// RNG seed for counter-ion selection; omit for a fresh draw.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    // --- Engine ---
    /// External MD engine executable run in each phase directory.
    #[arg(long, value_name = "PATH")]
    pub engine: Option<PathBuf>,

    /// Extra argument passed to the engine before the phase config file.
    /// Can be used multiple times.
    #[arg(long = "engine-arg", value_name = "ARG")]
    pub engine_args: Vec<String>,

    // --- Configuration File ---
    /// TOML file supplying defaults for any of the options above.
    /// Command-line options take precedence.
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Logging ---
    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
