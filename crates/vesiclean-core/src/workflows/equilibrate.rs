use crate::core::io::cell::{CellRecord, apply_cell_to_config, read_last_cell_record};
use crate::core::io::pdb::PdbFile;
use crate::core::io::structure::{StructureError, load_structure, write_structure_pair};
use crate::core::io::traits::MolecularFile;
use crate::core::models::residue::ResidueClass;
use crate::engine::charge::{assess_charge, select_counter_ions};
use crate::engine::config::{PipelineConfig, PipelineNames, RunMode};
use crate::engine::editor::split_by_residues;
use crate::engine::error::EngineError;
use crate::engine::fragments::expand_fragments;
use crate::engine::geometry::estimate_assembly;
use crate::engine::predicate::Selection;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::report::{ShellStatsRow, append_shell_stats};
use crate::engine::shell::{MembershipMode, ResidueSet, classify_shell, split_shell_counts};
use crate::engine::simulate::{SimulationEngine, phase_config_stem};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// File the external engine must leave in a phase directory.
const TRAJECTORY_FILE: &str = "trajectory.pdb";
/// Water-stripped trajectory copy kept alongside the full one.
const STRIPPED_TRAJECTORY_FILE: &str = "trajectory_nowater.pdb";
/// Accumulated shell statistics at the work-dir root.
const REPORT_FILE: &str = "shell_stats.csv";

/// One step of the equilibration sequence.
///
/// The shrink phases classify, edit, and then simulate; phases 4 and 5
/// simulate only. The two shrink rounds (A and B) run the same logic
/// against progressively compacted structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Shrink1A,
    Shrink2A,
    Shrink3A,
    Shrink1B,
    Shrink2B,
    Shrink3B,
    Phase4,
    Phase5,
}

impl Phase {
    pub const SEQUENCE: [Phase; 8] = [
        Phase::Shrink1A,
        Phase::Shrink2A,
        Phase::Shrink3A,
        Phase::Shrink1B,
        Phase::Shrink2B,
        Phase::Shrink3B,
        Phase::Phase4,
        Phase::Phase5,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Shrink1A => "1A",
            Phase::Shrink2A => "2A",
            Phase::Shrink3A => "3A",
            Phase::Shrink1B => "1B",
            Phase::Shrink2B => "2B",
            Phase::Shrink3B => "3B",
            Phase::Phase4 => "4",
            Phase::Phase5 => "5",
        }
    }

    /// Directory of the phase, relative to the work dir.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Phase::Shrink1A => "shrink_a/phase1",
            Phase::Shrink2A => "shrink_a/phase2",
            Phase::Shrink3A => "shrink_a/phase3",
            Phase::Shrink1B => "shrink_b/phase1",
            Phase::Shrink2B => "shrink_b/phase2",
            Phase::Shrink3B => "shrink_b/phase3",
            Phase::Phase4 => "phase4",
            Phase::Phase5 => "phase5",
        }
    }

    fn classifies(&self) -> bool {
        !matches!(self, Phase::Phase4 | Phase::Phase5)
    }

    /// Phases whose persisted trajectory gets a water-stripped copy.
    ///
    /// The first phase of each shrink round is skipped: its output is
    /// immediately reclassified, so the copy would only duplicate data.
    fn strips_water(&self) -> bool {
        matches!(
            self,
            Phase::Shrink2A | Phase::Shrink3A | Phase::Shrink2B | Phase::Shrink3B | Phase::Phase5
        )
    }
}

/// What one phase did to the structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Solvent residues removed by the shell classification.
    pub solvent_removed: usize,
    /// Lipid residues removed, after fragment expansion.
    pub lipids_removed: usize,
    /// Counter-ions removed to restore neutrality.
    pub ions_removed: usize,
    /// Atoms in the structure handed to the simulation engine.
    pub retained_atoms: usize,
}

/// The outcome of a complete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub reports: Vec<PhaseReport>,
    /// True when the run mode deliberately stopped before phase 5.
    pub stopped_early: bool,
}

/// Runs the equilibration sequence described by `config`.
///
/// Each phase stages its directory under the work dir, hands it to the
/// simulation engine, and verifies the engine left a trajectory behind.
/// Phase chaining is by files: the next phase loads the previous phase's
/// edited topology and the engine's trajectory.
///
/// # Errors
///
/// Fails fast at the first phase that cannot classify, edit, simulate, or
/// find its expected input artifacts.
#[instrument(skip_all, name = "equilibrate_workflow")]
pub fn run(
    config: &PipelineConfig,
    engine: &mut dyn SimulationEngine,
    reporter: &ProgressReporter,
) -> Result<RunSummary, EngineError> {
    let names = PipelineNames::derive(config);
    let cell = read_last_cell_record(&config.cell_info)?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let phases: &[Phase] = match config.run_mode {
        RunMode::Full => &Phase::SEQUENCE,
        RunMode::StopAfterPhase4 => &Phase::SEQUENCE[..7],
        RunMode::Phase5Only => &Phase::SEQUENCE[7..],
    };
    let (mut current_psf, mut current_pdb) = match config.run_mode {
        RunMode::Phase5Only => resume_inputs(config, &names)?,
        _ => (config.structure.clone(), config.trajectory.clone()),
    };

    stage_phase_dirs(config, phases, &cell)?;
    info!(
        phases = phases.len(),
        basename = names.basename(),
        "Staged phase directories"
    );

    reporter.report(Progress::RunStart {
        total_phases: phases.len() as u64,
    });
    let mut reports = Vec::with_capacity(phases.len());
    for &phase in phases {
        reporter.report(Progress::PhaseStart {
            label: phase.label(),
        });
        info!(phase = phase.label(), "Starting equilibration phase");
        let dir = config.work_dir.join(phase.dir_name());

        let report = if phase.classifies() {
            classify_and_stage(config, &names, phase, &current_psf, &current_pdb, &mut rng)?
        } else {
            // Simulation-only phases take the current structure verbatim,
            // renormalized to a single frame.
            let (system, metadata) = load_structure(&current_psf, &current_pdb)?;
            write_structure_pair(
                &system,
                &metadata,
                &dir.join(names.psf_name()),
                &dir.join(names.pdb_name()),
            )?;
            PhaseReport {
                phase,
                solvent_removed: 0,
                lipids_removed: 0,
                ions_removed: 0,
                retained_atoms: system.atom_count(),
            }
        };
        current_psf = dir.join(names.psf_name());
        if phase.classifies() {
            reporter.report(Progress::Classified {
                solvent_removed: report.solvent_removed,
                lipids_removed: report.lipids_removed,
                ions_removed: report.ions_removed,
            });
        }

        engine.run(phase.label(), &dir)?;

        let trajectory = dir.join(TRAJECTORY_FILE);
        if !trajectory.exists() {
            return Err(EngineError::MissingArtifact(trajectory));
        }
        current_pdb = trajectory;

        if phase.strips_water() && !config.keep_trajectories {
            strip_water_copy(&current_psf, &current_pdb, &dir.join(STRIPPED_TRAJECTORY_FILE))?;
        }

        reports.push(report);
        reporter.report(Progress::PhaseFinish {
            label: phase.label(),
        });
    }
    reporter.report(Progress::RunFinish);

    Ok(RunSummary {
        reports,
        stopped_early: config.run_mode == RunMode::StopAfterPhase4,
    })
}

/// Creates the phase directories and stages each phase's engine config
/// with the current periodic cell written in.
fn stage_phase_dirs(
    config: &PipelineConfig,
    phases: &[Phase],
    cell: &CellRecord,
) -> Result<(), EngineError> {
    for &phase in phases {
        let dir = config.work_dir.join(phase.dir_name());
        fs::create_dir_all(&dir)?;

        let template_name = format!("{}.conf", phase_config_stem(phase.label()));
        let template = config.source_dir.join(&template_name);
        if !template.exists() {
            return Err(EngineError::MissingArtifact(template));
        }
        let staged = dir.join(&template_name);
        fs::copy(&template, &staged)?;
        apply_cell_to_config(cell, &staged)?;
    }
    Ok(())
}

/// Locates the artifacts a phase-5-only run resumes from: the topology
/// edited by phase 3B and the trajectory written by phase 4.
fn resume_inputs(
    config: &PipelineConfig,
    names: &PipelineNames,
) -> Result<(PathBuf, PathBuf), EngineError> {
    let psf = config
        .work_dir
        .join(Phase::Shrink3B.dir_name())
        .join(names.psf_name());
    let pdb = config
        .work_dir
        .join(Phase::Phase4.dir_name())
        .join(TRAJECTORY_FILE);
    for path in [&psf, &pdb] {
        if !path.exists() {
            return Err(EngineError::MissingArtifact(path.clone()));
        }
    }
    Ok((psf, pdb))
}

/// Classifies the current structure, applies the removals, and writes the
/// edited pair into the phase directory.
fn classify_and_stage(
    config: &PipelineConfig,
    names: &PipelineNames,
    phase: Phase,
    psf: &Path,
    pdb: &Path,
    rng: &mut StdRng,
) -> Result<PhaseReport, EngineError> {
    let dir = config.work_dir.join(phase.dir_name());
    let report_path = config.work_dir.join(REPORT_FILE);
    let (system, metadata) = load_structure(psf, pdb)?;
    let estimate = estimate_assembly(&system, &Selection::lipid_reference())?;

    let solvent_selection = Selection::solvent();
    let solvent = classify_shell(
        &system,
        &estimate,
        &config.solvent_shell,
        &solvent_selection,
        MembershipMode::AnyAtom,
    )?;
    let counts = split_shell_counts(
        &system,
        &estimate,
        &config.solvent_shell,
        &solvent_selection,
        &solvent,
    );
    append_shell_stats(
        &report_path,
        &ShellStatsRow {
            phase: phase.label().to_string(),
            species: "solvent".to_string(),
            radius: estimate.radius,
            d_inner: config.solvent_shell.d_inner,
            d_outer: config.solvent_shell.d_outer,
            members: solvent.len(),
            inner: counts.inner,
            outer: counts.outer,
        },
    )?;

    let mut to_remove = solvent.clone();
    let mut lipids_removed = 0;
    let mut ions_removed = 0;
    if phase == Phase::Shrink1A {
        if let Some(lipid_shell) = &config.lipid_shell {
            // Head atoms seed the selection; expansion pulls in whatever
            // else belongs to the same covalent unit.
            let mut seeds = ResidueSet::new();
            for selection in [
                Selection::phospholipid_heads(),
                Selection::sterol_heads(),
                Selection::glycolipid_markers(),
            ] {
                seeds.extend(classify_shell(
                    &system,
                    &estimate,
                    lipid_shell,
                    &selection,
                    MembershipMode::HeadAtom,
                )?);
            }
            let expanded = expand_fragments(&system, &seeds, config.fragment_strategy);
            lipids_removed = expanded.len();
            append_shell_stats(
                &report_path,
                &ShellStatsRow {
                    phase: phase.label().to_string(),
                    species: "lipid".to_string(),
                    radius: estimate.radius,
                    d_inner: lipid_shell.d_inner,
                    d_outer: lipid_shell.d_outer,
                    members: expanded.len(),
                    inner: seeds.len(),
                    outer: expanded.len() - seeds.len(),
                },
            )?;
            to_remove.extend(expanded.iter().copied());

            // Neutrality is assessed on what survives the solvent and lipid
            // edits. The picked ions map back to the source structure and
            // join the same removal set, so the removed snapshot stays the
            // exact complement of the retained one.
            let provisional = split_by_residues(&system, &to_remove).retained;
            let state = assess_charge(&provisional);
            let ions = select_counter_ions(&provisional, &state, rng)?;
            ions_removed = ions.len();
            for &ion in &ions {
                let Some(residue) = provisional.residue(ion) else {
                    continue;
                };
                let Some(segment) = provisional.segment(residue.segment_id) else {
                    continue;
                };
                let original = system
                    .find_segment_by_name(&segment.name)
                    .and_then(|id| system.find_residue_by_number(id, residue.number));
                if let Some(id) = original {
                    to_remove.insert(id);
                }
            }
        }
    }

    let split = split_by_residues(&system, &to_remove);
    let retained = split.retained;

    write_structure_pair(
        &retained,
        &metadata,
        &dir.join(names.psf_name()),
        &dir.join(names.pdb_name()),
    )?;
    PdbFile::write_system_to_path(&split.removed, &dir.join(names.removed_pdb_name()))
        .map_err(StructureError::from)?;

    info!(
        phase = phase.label(),
        solvent_removed = solvent.len(),
        lipids_removed,
        ions_removed,
        retained_atoms = retained.atom_count(),
        "Classified and edited structure"
    );
    Ok(PhaseReport {
        phase,
        solvent_removed: solvent.len(),
        lipids_removed,
        ions_removed,
        retained_atoms: retained.atom_count(),
    })
}

/// Writes a water-free copy of a phase trajectory next to the original.
fn strip_water_copy(psf: &Path, pdb: &Path, dest: &Path) -> Result<(), EngineError> {
    let (system, _) = load_structure(psf, pdb)?;
    let waters: ResidueSet = system
        .residues_by_class(ResidueClass::Water)
        .map(|(id, _)| id)
        .collect();
    let stripped = split_by_residues(&system, &waters).retained;
    PdbFile::write_system_to_path(&stripped, dest).map_err(StructureError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::system::MolecularSystem;
    use crate::engine::config::PipelineConfigBuilder;
    use crate::engine::simulate::SimulationEngine;
    use nalgebra::Point3;
    use std::io::Write;
    use tempfile::TempDir;

    /// Behaves like the real engine contract: reads the staged coordinate
    /// file and emits it back as the phase trajectory.
    #[derive(Default)]
    struct RecordingEngine {
        phases: Vec<&'static str>,
    }

    impl SimulationEngine for RecordingEngine {
        fn run(&mut self, phase: &'static str, dir: &Path) -> Result<(), EngineError> {
            self.phases.push(phase);
            let input = fs::read_dir(dir)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .find(|p| {
                    p.extension().is_some_and(|ext| ext == "pdb")
                        && !p
                            .file_name()
                            .is_some_and(|n| n.to_string_lossy().contains("removed"))
                })
                .ok_or_else(|| EngineError::MissingArtifact(dir.join("*.pdb")))?;
            fs::copy(&input, dir.join(TRAJECTORY_FILE))?;
            Ok(())
        }
    }

    /// Six phosphate-bearing lipids on the axes at radius 10, one water in
    /// the removal shell, one water outside it, and a neutral charge.
    fn vesicle_fixture() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        let memb = system.add_segment("MEMB");
        let axes = [
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(-10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
            Point3::new(0.0, -10.0, 0.0),
            Point3::new(0.0, 0.0, 10.0),
            Point3::new(0.0, 0.0, -10.0),
        ];
        for (i, pos) in axes.into_iter().enumerate() {
            let res = system.add_residue(memb, i as isize + 1, "POPC").unwrap();
            let mut atom = Atom::new("P", res, pos);
            atom.mass = 30.97;
            atom.force_field_type = "PL".into();
            system.add_atom_to_residue(res, atom).unwrap();
        }

        // Estimated center is the origin, radius 10. Offsets (2, 8) derive
        // radii 8 and 2: the water at distance 5 is in the shell, the one
        // at distance 9 is not.
        let solv = system.add_segment("SOLV");
        for (i, x) in [5.0, 9.0].into_iter().enumerate() {
            let res = system.add_residue(solv, i as isize + 1, "TIP3").unwrap();
            let mut atom = Atom::new("OH2", res, Point3::new(x, 0.0, 0.0));
            atom.mass = 15.9994;
            atom.force_field_type = "OT".into();
            system.add_atom_to_residue(res, atom).unwrap();
        }
        system
    }

    /// The neutral vesicle plus two phosphate heads inside a (2, 8) lipid
    /// shell and one sodium ion outside every shell.
    fn charged_vesicle_fixture() -> MolecularSystem {
        let mut system = vesicle_fixture();
        let memb = system.find_segment_by_name("MEMB").unwrap();
        // Symmetric pair at distance 6, so the geometry estimate still sees
        // the origin and radius 10.
        for (i, x) in [6.0, -6.0].into_iter().enumerate() {
            let res = system.add_residue(memb, i as isize + 7, "POPC").unwrap();
            let mut atom = Atom::new("P", res, Point3::new(x, 0.0, 0.0));
            atom.mass = 30.97;
            atom.force_field_type = "PL".into();
            system.add_atom_to_residue(res, atom).unwrap();
        }
        let ions = system.add_segment("IONS");
        let res = system.add_residue(ions, 1, "SOD").unwrap();
        let mut sod = Atom::new("SOD", res, Point3::new(0.0, 9.0, 0.0));
        sod.partial_charge = 1.0;
        sod.mass = 22.99;
        sod.force_field_type = "SOD".into();
        system.add_atom_to_residue(res, sod).unwrap();
        system
    }

    fn write_inputs(dir: &Path) {
        write_inputs_with(dir, &vesicle_fixture());
    }

    fn write_inputs_with(dir: &Path, system: &MolecularSystem) {
        let psf = dir.join("vesicle.psf");
        let pdb = dir.join("vesicle.pdb");
        let xsc = dir.join("vesicle.xsc");
        let templates = dir.join("templates");

        write_structure_pair(system, &Default::default(), &psf, &pdb).unwrap();

        let mut xsc_file = fs::File::create(&xsc).unwrap();
        writeln!(xsc_file, "# extended system").unwrap();
        writeln!(
            xsc_file,
            "100 90.0 0.0 0.0 0.0 90.0 0.0 0.0 0.0 90.0 0.0 0.0 0.0"
        )
        .unwrap();

        fs::create_dir_all(&templates).unwrap();
        for phase in Phase::SEQUENCE {
            let path = templates.join(format!("{}.conf", phase_config_stem(phase.label())));
            fs::write(
                &path,
                "structure input.psf\ncellBasisVector1 1.0 0.0 0.0\ncellOrigin 0.0 0.0 0.0\nrun 1000\n",
            )
            .unwrap();
        }
    }

    fn config_for(dir: &Path, mode: RunMode) -> PipelineConfig {
        let (psf, pdb, xsc, templates) = (
            dir.join("vesicle.psf"),
            dir.join("vesicle.pdb"),
            dir.join("vesicle.xsc"),
            dir.join("templates"),
        );
        PipelineConfigBuilder::new()
            .structure(psf)
            .trajectory(pdb)
            .cell_info(xsc)
            .source_dir(templates)
            .work_dir(dir.join("work"))
            .solvent_offsets(2.0, 8.0)
            .run_mode(mode)
            .seed(Some(7))
            .build()
            .unwrap()
    }

    fn config_with_lipids(dir: &Path) -> PipelineConfig {
        PipelineConfigBuilder::new()
            .structure(dir.join("vesicle.psf"))
            .trajectory(dir.join("vesicle.pdb"))
            .cell_info(dir.join("vesicle.xsc"))
            .source_dir(dir.join("templates"))
            .work_dir(dir.join("work"))
            .solvent_offsets(2.0, 8.0)
            .remove_lipids(true)
            .lipid_offsets(2.0, 8.0)
            .seed(Some(7))
            .build()
            .unwrap()
    }

    #[test]
    fn full_run_chains_all_eight_phases() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        let config = config_for(dir.path(), RunMode::Full);
        let mut engine = RecordingEngine::default();

        let summary = run(&config, &mut engine, &ProgressReporter::new()).unwrap();

        assert_eq!(
            engine.phases,
            vec!["1A", "2A", "3A", "1B", "2B", "3B", "4", "5"]
        );
        assert!(!summary.stopped_early);
        assert_eq!(summary.reports.len(), 8);

        // Only the first pass finds solvent in the shell; later phases see
        // the already-pruned structure.
        assert_eq!(summary.reports[0].solvent_removed, 1);
        assert!(summary.reports[1..6].iter().all(|r| r.solvent_removed == 0));
        assert_eq!(summary.reports[0].retained_atoms, 7);

        assert!(config.work_dir.join("phase5").join(TRAJECTORY_FILE).exists());
        assert!(config.work_dir.join(REPORT_FILE).exists());
    }

    #[test]
    fn lipid_removal_prunes_heads_ions_and_fills_the_removed_snapshot() {
        let dir = TempDir::new().unwrap();
        write_inputs_with(dir.path(), &charged_vesicle_fixture());
        let config = config_with_lipids(dir.path());
        let mut engine = RecordingEngine::default();

        let summary = run(&config, &mut engine, &ProgressReporter::new()).unwrap();

        // One water in the solvent shell, two heads in the lipid shell, and
        // the sodium that balanced them.
        let first = &summary.reports[0];
        assert_eq!(first.solvent_removed, 1);
        assert_eq!(first.lipids_removed, 2);
        assert_eq!(first.ions_removed, 1);
        assert_eq!(first.retained_atoms, 7);

        let phase1 = config.work_dir.join("shrink_a/phase1");
        assert!(phase1.join("vesicle_shell_dl.psf").exists());

        // The removed snapshot is the exact complement of the retained one.
        let removed = fs::read_to_string(phase1.join("vesicle_shell_dl_removed.pdb")).unwrap();
        assert!(removed.contains("SOD"));
        assert!(removed.contains("POPC"));
        assert!(removed.contains("TIP3"));
        let atom_lines = removed.lines().filter(|l| l.starts_with("ATOM")).count();
        assert_eq!(atom_lines, 4);
    }

    #[test]
    fn counter_ions_survive_when_lipid_removal_is_off() {
        let dir = TempDir::new().unwrap();
        write_inputs_with(dir.path(), &charged_vesicle_fixture());
        let config = config_for(dir.path(), RunMode::Full);
        let mut engine = RecordingEngine::default();

        let summary = run(&config, &mut engine, &ProgressReporter::new()).unwrap();

        // Only the in-shell water goes; the sodium and both extra heads stay.
        let first = &summary.reports[0];
        assert_eq!(first.solvent_removed, 1);
        assert_eq!(first.lipids_removed, 0);
        assert_eq!(first.ions_removed, 0);
        assert_eq!(first.retained_atoms, 10);

        let retained = fs::read_to_string(
            config
                .work_dir
                .join("shrink_a/phase1")
                .join("vesicle_shell.pdb"),
        )
        .unwrap();
        assert!(retained.contains("SOD"));
    }

    #[test]
    fn progress_events_trace_the_phase_sequence() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        let config = config_for(dir.path(), RunMode::Full);

        let events = std::sync::Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        run(&config, &mut RecordingEngine::default(), &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let started: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Progress::PhaseStart { label } => Some(*label),
                _ => None,
            })
            .collect();
        assert_eq!(started, vec!["1A", "2A", "3A", "1B", "2B", "3B", "4", "5"]);

        // The two simulation-only phases report no classification.
        let classified = events
            .iter()
            .filter(|e| matches!(e, Progress::Classified { .. }))
            .count();
        assert_eq!(classified, 6);
        assert!(matches!(events.last(), Some(Progress::RunFinish)));
    }

    #[test]
    fn staged_configs_carry_the_current_cell() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        let config = config_for(dir.path(), RunMode::Full);
        let mut engine = RecordingEngine::default();
        run(&config, &mut engine, &ProgressReporter::new()).unwrap();

        let staged = config
            .work_dir
            .join("shrink_a/phase1")
            .join("equil_1a.conf");
        let contents = fs::read_to_string(staged).unwrap();
        assert!(contents.contains("cellBasisVector1 90.000000 0.000000 0.000000"));
        assert!(contents.contains("run 1000"));
    }

    #[test]
    fn water_stripped_copies_appear_after_the_flagged_phases() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        let config = config_for(dir.path(), RunMode::Full);
        run(&config, &mut RecordingEngine::default(), &ProgressReporter::new()).unwrap();

        assert!(
            config
                .work_dir
                .join("shrink_a/phase2")
                .join(STRIPPED_TRAJECTORY_FILE)
                .exists()
        );
        assert!(
            !config
                .work_dir
                .join("shrink_a/phase1")
                .join(STRIPPED_TRAJECTORY_FILE)
                .exists()
        );
    }

    #[test]
    fn stop_after_4_then_phase_5_only_resumes() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());

        let first = config_for(dir.path(), RunMode::StopAfterPhase4);
        let mut engine = RecordingEngine::default();
        let summary = run(&first, &mut engine, &ProgressReporter::new()).unwrap();
        assert!(summary.stopped_early);
        assert_eq!(engine.phases.len(), 7);
        assert!(!first.work_dir.join("phase5").exists());

        let second = config_for(dir.path(), RunMode::Phase5Only);
        let mut engine = RecordingEngine::default();
        let summary = run(&second, &mut engine, &ProgressReporter::new()).unwrap();
        assert!(!summary.stopped_early);
        assert_eq!(engine.phases, vec!["5"]);
        assert!(second.work_dir.join("phase5").join(TRAJECTORY_FILE).exists());
    }

    #[test]
    fn phase_5_only_without_prior_artifacts_fails() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        let config = config_for(dir.path(), RunMode::Phase5Only);

        let result = run(&config, &mut RecordingEngine::default(), &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::MissingArtifact(_))));
    }

    #[test]
    fn missing_config_template_fails_before_any_phase() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        fs::remove_file(dir.path().join("templates").join("equil_3b.conf")).unwrap();
        let config = config_for(dir.path(), RunMode::Full);

        let mut engine = RecordingEngine::default();
        let result = run(&config, &mut engine, &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::MissingArtifact(_))));
        assert!(engine.phases.is_empty());
    }
}
