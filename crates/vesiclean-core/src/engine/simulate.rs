use crate::engine::error::EngineError;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::info;

/// The boundary to the external MD engine.
///
/// The orchestrator stages a phase directory (structure pair, engine
/// configuration, cell info) and then hands it to an implementation of this
/// trait. The engine contract is that a successful run leaves a
/// `trajectory.pdb` in the phase directory; the orchestrator verifies the
/// artifact, not the engine.
pub trait SimulationEngine {
    fn run(&mut self, phase: &'static str, dir: &Path) -> Result<(), EngineError>;
}

/// Runs an external command in each phase directory.
///
/// The command is invoked with the directory as its working directory and
/// the phase's config file name appended to any fixed arguments. Stdout and
/// stderr are redirected to `sim.log` inside the directory.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl SimulationEngine for CommandEngine {
    fn run(&mut self, phase: &'static str, dir: &Path) -> Result<(), EngineError> {
        let log = File::create(dir.join("sim.log"))?;
        let err_log = log.try_clone()?;

        info!(phase, program = %self.program.display(), dir = %dir.display(), "Launching simulation engine");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(format!("{}.conf", phase_config_stem(phase)))
            .current_dir(dir)
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(err_log))
            .status()
            .map_err(|e| EngineError::Simulation {
                phase,
                message: format!("failed to launch {}: {e}", self.program.display()),
            })?;

        if !status.success() {
            return Err(EngineError::Simulation {
                phase,
                message: format!("engine exited with {status}, see sim.log"),
            });
        }
        Ok(())
    }
}

/// Maps a phase label to the stem of its staged engine config file.
pub fn phase_config_stem(phase: &str) -> String {
    format!("equil_{}", phase.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_stems_follow_the_phase_label() {
        assert_eq!(phase_config_stem("1A"), "equil_1a");
        assert_eq!(phase_config_stem("4"), "equil_4");
    }

    #[test]
    fn failing_command_reports_the_phase() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = CommandEngine::new("/bin/false", Vec::new());

        let result = engine.run("2B", dir.path());
        assert!(matches!(
            result,
            Err(EngineError::Simulation { phase: "2B", .. })
        ));
    }

    #[test]
    fn missing_program_reports_a_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = CommandEngine::new("/nonexistent/md-engine", Vec::new());

        let result = engine.run("1A", dir.path());
        assert!(matches!(result, Err(EngineError::Simulation { .. })));
    }
}
