use crate::episode::{Episode, ProgramType, SyncedEpisode};

/// Outcome for one program type.
#[derive(Debug, Clone)]
pub struct TypeReport {
    pub program_type: ProgramType,
    /// Library state before the run.
    pub prior: SyncedEpisode,
    /// New episodes, ascending, with internal numbers assigned.
    pub episodes: Vec<Episode>,
    /// How many of `episodes` reached the library.
    pub filed: usize,
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub season: i32,
    pub pretend: bool,
    pub types: Vec<TypeReport>,
}

impl SyncReport {
    pub fn total_planned(&self) -> usize {
        self.types.iter().map(|t| t.episodes.len()).sum()
    }

    pub fn total_filed(&self) -> usize {
        self.types.iter().map(|t| t.filed).sum()
    }

    pub fn is_up_to_date(&self) -> bool {
        self.total_planned() == 0
    }
}
