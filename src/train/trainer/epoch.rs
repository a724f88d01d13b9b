//! One pass over the batch schedule

use super::core::GanTrainer;
use crate::data::BatchSource;
use crate::generative::StepResult;
use crate::io::save_training_state;
use crate::train::callback::CallbackAction;
use crate::{Error, Result};

/// What happened during one epoch
#[derive(Debug)]
pub(crate) struct EpochOutcome {
    pub batches: usize,
    /// Summary step of the last batch
    pub last_step: u64,
    pub last: Option<StepResult>,
    pub stopped_early: bool,
}

impl GanTrainer {
    /// Rebuild the schedule and train on every batch it yields.
    ///
    /// The summary step of batch `b` is `batches_per_epoch · epoch + b` when
    /// the source knows its epoch length, and the state's step counter
    /// otherwise. An epoch that yields no batch at all is an error.
    pub(crate) fn train_epoch<S: BatchSource + ?Sized>(
        &mut self,
        source: &mut S,
        epoch: usize,
    ) -> Result<EpochOutcome> {
        source.reset()?;
        let steps_per_epoch = source.batches_per_epoch();
        let geometry = self.state.geometry();
        let mut outcome = EpochOutcome { batches: 0, last_step: self.state.step, last: None, stopped_early: false };

        loop {
            let batch_index = outcome.batches;
            let step = match steps_per_epoch {
                Some(n) => (n * epoch + batch_index) as u64,
                None => self.state.step,
            };

            let batch = match source.next_batch() {
                Ok(batch) => batch,
                Err(e) if e.is_end_of_data() => break,
                Err(e) => return Err(e),
            };

            let ctx = self.build_context(epoch, batch_index, steps_per_epoch, step);
            if self.callbacks.on_step_begin(&ctx) == CallbackAction::Stop {
                outcome.stopped_early = true;
                break;
            }
            batch.validate(&geometry)?;
            let result = self.state.train_step(batch.audio())?;

            for (name, value) in result.scalars() {
                self.write_scalar(name, value, step);
            }
            outcome.batches += 1;
            outcome.last_step = step;
            outcome.last = Some(result);

            let ctx = self.build_context(epoch, batch_index, steps_per_epoch, step);
            if self.callbacks.on_step_end(&ctx) == CallbackAction::Stop {
                outcome.stopped_early = true;
                break;
            }
        }

        if outcome.batches == 0 && !outcome.stopped_early {
            return Err(Error::ConfigError(format!(
                "batch source yielded no batches in epoch {epoch}; the dataset is smaller than one batch"
            )));
        }
        Ok(outcome)
    }

    /// Audio summary of the last fake batch, then snapshots of every network
    pub(crate) fn finish_epoch(&mut self, outcome: &EpochOutcome) {
        if let Some(last) = &outcome.last {
            let name = format!("G_Audio_{}", outcome.last_step);
            let sample_rate = self.options.sample_rate;
            if let Some(writer) = self.summary.as_mut() {
                if let Err(e) = writer.audio(&name, &last.fake, sample_rate, outcome.last_step) {
                    tracing::warn!(error = %e, name = %name, "Failed to write audio summary");
                }
            }
        }
        if let Some(writer) = self.summary.as_mut() {
            if let Err(e) = writer.flush() {
                tracing::warn!(error = %e, "Failed to flush summaries");
            }
        }

        if let Some(dir) = self.options.run_dir.clone() {
            match save_training_state(&self.state, &dir) {
                Ok(paths) => tracing::info!(step = self.state.step, files = paths.len(), dir = %dir.display(), "Saved snapshots"),
                Err(e) => tracing::warn!(error = %e, dir = %dir.display(), "Failed to save snapshots"),
            }
        }
    }

    fn write_scalar(&mut self, name: &str, value: f32, step: u64) {
        if let Some(writer) = self.summary.as_mut() {
            if let Err(e) = writer.scalar(name, value, step) {
                tracing::warn!(error = %e, name, step, "Failed to write scalar summary");
            }
        }
    }
}
