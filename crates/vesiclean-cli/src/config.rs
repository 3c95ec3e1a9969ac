use crate::cli::Cli;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use vesiclean::engine::config::{PipelineConfig, PipelineConfigBuilder, RunMode};
use vesiclean::engine::fragments::FragmentStrategy;

const DEFAULT_ENGINE: &str = "namd2";

/// The TOML-file mirror of the command line. Every field is optional; the
/// command line takes precedence over the file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub structure: Option<PathBuf>,
    pub trajectory: Option<PathBuf>,
    pub cell_info: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub d1: Option<f64>,
    pub d2: Option<f64>,
    pub remove_lipids: Option<bool>,
    pub d3: Option<f64>,
    pub d4: Option<f64>,
    pub fragment_strategy: Option<FragmentStrategy>,
    pub run_mode: Option<RunMode>,
    pub keep_trajectories: Option<bool>,
    pub seed: Option<u64>,
    pub engine: Option<PathBuf>,
    pub engine_args: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            CliError::Config(format!("failed to parse '{}': {e}", path.display()))
        })
    }
}

/// Everything a run needs, after merging the config file under the CLI.
#[derive(Debug)]
pub struct ResolvedRun {
    pub pipeline: PipelineConfig,
    pub engine_program: PathBuf,
    pub engine_args: Vec<String>,
}

/// Merges the optional config file under the command-line arguments and
/// validates the result.
pub fn resolve(cli: &Cli) -> Result<ResolvedRun> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let (d1, d2) = match (cli.d1.or(file.d1), cli.d2.or(file.d2)) {
        (Some(d1), Some(d2)) => (d1, d2),
        _ => {
            return Err(CliError::Argument(
                "both --d1 and --d2 are required (flags or config file)".to_string(),
            ));
        }
    };
    if d1 >= d2 {
        warn!(d1, d2, "d1 >= d2 classifies nothing; every solvent phase will be a no-op");
    }

    let remove_lipids = cli.remove_lipids || file.remove_lipids.unwrap_or(false);
    let mut builder = PipelineConfigBuilder::new()
        .solvent_offsets(d1, d2)
        .remove_lipids(remove_lipids)
        .keep_trajectories(
            cli.keep_trajectories || file.keep_trajectories.unwrap_or(false),
        )
        .seed(cli.seed.or(file.seed))
        .work_dir(
            cli.work_dir
                .clone()
                .or(file.work_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
        );
    if remove_lipids {
        let (d3, d4) = match (cli.d3.or(file.d3), cli.d4.or(file.d4)) {
            (Some(d3), Some(d4)) => (d3, d4),
            _ => {
                return Err(CliError::Argument(
                    "--remove-lipids requires both --d3 and --d4".to_string(),
                ));
            }
        };
        builder = builder.lipid_offsets(d3, d4);
    }
    if let Some(path) = cli.structure.clone().or(file.structure) {
        builder = builder.structure(path);
    }
    if let Some(path) = cli.trajectory.clone().or(file.trajectory) {
        builder = builder.trajectory(path);
    }
    if let Some(path) = cli.cell_info.clone().or(file.cell_info) {
        builder = builder.cell_info(path);
    }
    if let Some(path) = cli.source_dir.clone().or(file.source_dir) {
        builder = builder.source_dir(path);
    }
    if let Some(strategy) = cli.fragment_strategy.or(file.fragment_strategy) {
        builder = builder.fragment_strategy(strategy);
    }
    if let Some(mode) = cli.run_mode.or(file.run_mode) {
        builder = builder.run_mode(mode);
    }

    let pipeline = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let engine_program = cli
        .engine
        .clone()
        .or(file.engine)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE));
    let engine_args = if cli.engine_args.is_empty() {
        file.engine_args.unwrap_or_default()
    } else {
        cli.engine_args.clone()
    };

    Ok(ResolvedRun {
        pipeline,
        engine_program,
        engine_args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli_from(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vesiclean").chain(args.iter().copied())).unwrap()
    }

    const FULL_FILE: &str = r#"
structure = "vesicle.psf"
trajectory = "vesicle.pdb"
cell-info = "vesicle.xsc"
source-dir = "templates"
d1 = 16.0
d2 = 46.0
run-mode = "stop-after-4"
fragment-strategy = "offset-table"
engine = "/opt/namd/namd3"
engine-args = ["+p8"]
"#;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn file_alone_supplies_a_complete_run() {
        let (_dir, path) = write_config(FULL_FILE);
        let cli = cli_from(&["--config", path.to_str().unwrap()]);

        let resolved = resolve(&cli).unwrap();
        assert_eq!(resolved.pipeline.solvent_shell.d_inner, 16.0);
        assert_eq!(resolved.pipeline.run_mode, RunMode::StopAfterPhase4);
        assert_eq!(
            resolved.pipeline.fragment_strategy,
            FragmentStrategy::OffsetTable
        );
        assert_eq!(resolved.engine_program, PathBuf::from("/opt/namd/namd3"));
        assert_eq!(resolved.engine_args, vec!["+p8".to_string()]);
        assert_eq!(resolved.pipeline.work_dir, PathBuf::from("."));
    }

    #[test]
    fn flags_override_the_file() {
        let (_dir, path) = write_config(FULL_FILE);
        let cli = cli_from(&[
            "--config",
            path.to_str().unwrap(),
            "--d1",
            "20",
            "--run-mode",
            "full",
            "--engine",
            "md-stub",
        ]);

        let resolved = resolve(&cli).unwrap();
        assert_eq!(resolved.pipeline.solvent_shell.d_inner, 20.0);
        assert_eq!(resolved.pipeline.solvent_shell.d_outer, 46.0);
        assert_eq!(resolved.pipeline.run_mode, RunMode::Full);
        assert_eq!(resolved.engine_program, PathBuf::from("md-stub"));
    }

    #[test]
    fn missing_offsets_are_reported_up_front() {
        let cli = cli_from(&["--structure", "vesicle.psf"]);
        let result = resolve(&cli);
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn remove_lipids_from_file_still_demands_lipid_offsets() {
        let (_dir, path) = write_config(&format!("{FULL_FILE}remove-lipids = true\n"));
        let cli = cli_from(&["--config", path.to_str().unwrap()]);

        let result = resolve(&cli);
        assert!(matches!(result, Err(CliError::Argument(_))));

        let cli = cli_from(&[
            "--config",
            path.to_str().unwrap(),
            "--d3",
            "10",
            "--d4",
            "25",
        ]);
        let resolved = resolve(&cli).unwrap();
        assert!(resolved.pipeline.remove_lipids());
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let (_dir, path) = write_config("d1 = 16.0\nd2 = 46.0\nshell-width = 3.0\n");
        let cli = cli_from(&["--config", path.to_str().unwrap()]);
        assert!(matches!(resolve(&cli), Err(CliError::Config(_))));
    }
}
