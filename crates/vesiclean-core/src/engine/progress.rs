/// Progress events emitted while the equilibration sequence runs.
///
/// Every event maps to a concrete workflow step, so a front end can render
/// the sequence without knowing the phase logic.
#[derive(Debug, Clone)]
pub enum Progress {
    /// The phase directories are staged and the sequence is about to run.
    RunStart { total_phases: u64 },
    PhaseStart { label: &'static str },
    /// A shrink phase finished its classification and structure edit.
    Classified {
        solvent_removed: usize,
        lipids_removed: usize,
        ions_removed: usize,
    },
    /// The phase's simulation finished and its trajectory is in place.
    PhaseFinish { label: &'static str },
    RunFinish,
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
