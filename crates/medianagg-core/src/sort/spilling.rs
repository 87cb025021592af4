//! Module: sort::spilling
//! Responsibility: default external sort session (run generation + k-way merge).
//! Does not own: frame encoding (see `sort::run`).
//! Boundary: only reachable through `SortSessionFactory`/`SortSession`.

use crate::{
    capability::ValueOrdering,
    config::SortConfig,
    error::{ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent},
    sort::{
        SortSession, SortSessionFactory,
        merge::{MergeSource, RunMerger},
        run::{RunWriter, SpilledRun},
    },
    value::Value,
};
use derive_more::{Deref, DerefMut};
use std::{mem, vec};

///
/// SpillingSortFactory
///

#[derive(Clone, Debug, Default)]
pub struct SpillingSortFactory {
    config: SortConfig,
}

impl SpillingSortFactory {
    #[must_use]
    pub const fn new(config: SortConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &SortConfig {
        &self.config
    }
}

impl SortSessionFactory for SpillingSortFactory {
    fn begin(&self, ordering: ValueOrdering) -> Result<Box<dyn SortSession>, InternalError> {
        self.config
            .validate()
            .map_err(|e| InternalError::sort_exhausted(e.to_string()))?;

        if let Some(dir) = &self.config.spill_dir
            && !dir.is_dir()
        {
            return Err(InternalError::sort_exhausted(format!(
                "spill directory {} is not available",
                dir.display()
            )));
        }

        Ok(Box::new(SpillingSortSession::new(ordering, self.config.clone())))
    }
}

///
/// Batch
///
/// Unsorted rows waiting to become the next run.
///

#[derive(Debug, Default, Deref, DerefMut)]
struct Batch(Vec<Value>);

impl Batch {
    fn into_sorted(mut self, ordering: ValueOrdering) -> Vec<Value> {
        self.sort_unstable_by(|a, b| ordering.compare(a, b));
        self.0
    }
}

///
/// SessionPhase
///

enum SessionPhase {
    Input { batch: Batch, runs: Vec<SpilledRun> },
    Output(SortedOutput),
    Ended,
}

///
/// SortedOutput
///

enum SortedOutput {
    Memory(vec::IntoIter<Value>),
    Merge(RunMerger),
}

///
/// SpillingSortSession
///
/// Holds at most `work_mem_rows` unsorted values in memory; each full batch
/// is sorted and written out as one run. Once `max_merge_fan_in` runs exist
/// they are merged into a single run, so open run files stay bounded.
/// Output merges the remaining runs.
///

pub struct SpillingSortSession {
    ordering: ValueOrdering,
    config: SortConfig,
    phase: SessionPhase,
}

impl SpillingSortSession {
    #[must_use]
    pub const fn new(ordering: ValueOrdering, config: SortConfig) -> Self {
        Self {
            ordering,
            config,
            phase: SessionPhase::Input {
                batch: Batch(Vec::new()),
                runs: Vec::new(),
            },
        }
    }

    /// Number of runs written to storage so far (input phase only).
    #[must_use]
    pub fn spilled_runs(&self) -> usize {
        match &self.phase {
            SessionPhase::Input { runs, .. } => runs.len(),
            SessionPhase::Output(_) | SessionPhase::Ended => 0,
        }
    }

    fn spill_batch(&self, batch: Batch) -> Result<SpilledRun, InternalError> {
        let sorted = batch.into_sorted(self.ordering);
        let run = SpilledRun::write(
            &sorted,
            self.config.spill_dir.as_deref(),
            self.config.max_frame_bytes,
        )?;

        sink::record(MetricsEvent::RunWritten {
            rows: run.rows(),
            bytes: run.bytes(),
        });

        Ok(run)
    }

    // Intermediate merge: collapse `runs` into one run on storage.
    fn merge_runs(&self, runs: Vec<SpilledRun>) -> Result<SpilledRun, InternalError> {
        let merged_runs = runs.len() as u64;
        let mut sources = Vec::with_capacity(runs.len());
        for run in runs {
            sources.push(MergeSource::Disk(
                run.into_reader(self.config.max_frame_bytes)?,
            ));
        }

        let mut merger = RunMerger::new(sources, self.ordering)?;
        let mut writer =
            RunWriter::create(self.config.spill_dir.as_deref(), self.config.max_frame_bytes)?;
        while let Some(value) = merger.next_value()? {
            writer.push(&value)?;
        }
        let merged = writer.finish()?;

        sink::record(MetricsEvent::RunsMerged {
            runs: merged_runs,
            rows: merged.rows(),
        });

        Ok(merged)
    }
}

impl SortSession for SpillingSortSession {
    fn put(&mut self, value: Value) -> Result<(), InternalError> {
        let work_mem_rows = self.config.work_mem_rows;
        let SessionPhase::Input { batch, .. } = &mut self.phase else {
            return Err(InternalError::invariant(
                ErrorOrigin::Sort,
                "sort session does not accept input after perform_sort",
            ));
        };

        batch.push(value);
        if batch.len() < work_mem_rows {
            return Ok(());
        }

        let full = mem::take(batch);
        let run = self.spill_batch(full)?;

        let fan_in = self.config.max_merge_fan_in;
        let SessionPhase::Input { runs, .. } = &mut self.phase else {
            return Ok(());
        };
        runs.push(run);
        if runs.len() < fan_in {
            return Ok(());
        }

        let pending = mem::take(runs);
        let merged = self.merge_runs(pending)?;
        if let SessionPhase::Input { runs, .. } = &mut self.phase {
            runs.push(merged);
        }

        Ok(())
    }

    fn perform_sort(&mut self) -> Result<(), InternalError> {
        let SessionPhase::Input { batch, runs } = mem::replace(&mut self.phase, SessionPhase::Ended)
        else {
            return Err(InternalError::invariant(
                ErrorOrigin::Sort,
                "perform_sort called twice or after end",
            ));
        };

        let tail = batch.into_sorted(self.ordering);
        if runs.is_empty() {
            self.phase = SessionPhase::Output(SortedOutput::Memory(tail.into_iter()));
            return Ok(());
        }

        let mut sources = Vec::with_capacity(runs.len() + 1);
        for run in runs {
            sources.push(MergeSource::Disk(
                run.into_reader(self.config.max_frame_bytes)?,
            ));
        }
        if !tail.is_empty() {
            sources.push(MergeSource::Memory(tail.into_iter()));
        }

        let merger = RunMerger::new(sources, self.ordering)?;
        self.phase = SessionPhase::Output(SortedOutput::Merge(merger));

        Ok(())
    }

    fn next_value(&mut self) -> Result<Option<Value>, InternalError> {
        match &mut self.phase {
            SessionPhase::Output(SortedOutput::Memory(values)) => Ok(values.next()),
            SessionPhase::Output(SortedOutput::Merge(merger)) => merger.next_value(),
            SessionPhase::Input { .. } => Err(InternalError::invariant(
                ErrorOrigin::Sort,
                "sort session read before perform_sort",
            )),
            SessionPhase::Ended => Err(InternalError::invariant(
                ErrorOrigin::Sort,
                "sort session read after end",
            )),
        }
    }

    fn end(&mut self) {
        self.phase = SessionPhase::Ended;
    }
}

impl Drop for SpillingSortSession {
    fn drop(&mut self) {
        self.end();
    }
}
