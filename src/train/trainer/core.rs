//! Core trainer struct and basic methods

use crate::generative::TrainingState;
use crate::summary::SummaryWriter;
use crate::train::callback::{CallbackContext, CallbackManager, TrainerCallback};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Run-level settings of the trainer
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    /// Number of passes over the batch schedule
    pub epochs: usize,
    /// Sample rate attached to audio summaries
    pub sample_rate: u32,
    /// Where snapshots are written at the end of each epoch
    pub run_dir: Option<PathBuf>,
}

impl TrainOptions {
    pub fn new(epochs: usize, sample_rate: u32) -> Self {
        Self { epochs, sample_rate, run_dir: None }
    }

    pub fn with_run_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.run_dir = Some(dir.into());
        self
    }
}

/// Drives a [`TrainingState`] through epochs of batches
///
/// Summary and snapshot failures are logged and never stop training. Errors
/// from the batch source or the training step end the run.
pub struct GanTrainer {
    /// Networks, optimizers and counters
    pub(crate) state: TrainingState,

    pub(crate) options: TrainOptions,

    pub(crate) callbacks: CallbackManager,

    /// Optional scalar/audio sink
    pub(crate) summary: Option<Box<dyn SummaryWriter>>,

    /// Training start time
    pub(crate) start_time: Option<Instant>,
}

impl GanTrainer {
    pub fn new(state: TrainingState, options: TrainOptions) -> Self {
        Self { state, options, callbacks: CallbackManager::new(), summary: None, start_time: None }
    }

    /// Route summaries to `writer`
    pub fn set_summary_writer(&mut self, writer: Box<dyn SummaryWriter>) {
        self.summary = Some(writer);
    }

    /// Add a callback to the trainer
    pub fn add_callback<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    pub fn state(&self) -> &TrainingState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TrainingState {
        &mut self.state
    }

    /// Give back the trained state
    pub fn into_state(self) -> TrainingState {
        self.state
    }

    pub fn options(&self) -> &TrainOptions {
        &self.options
    }

    pub fn run_dir(&self) -> Option<&Path> {
        self.options.run_dir.as_deref()
    }

    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    /// Build callback context from current state
    pub(crate) fn build_context(
        &self,
        epoch: usize,
        step: usize,
        steps_per_epoch: Option<usize>,
        global_step: u64,
    ) -> CallbackContext {
        let stats = &self.state.stats;
        CallbackContext {
            epoch,
            max_epochs: self.options.epochs,
            step,
            steps_per_epoch,
            global_step,
            g_loss: stats.gen_losses.back().copied().unwrap_or(0.0),
            d_loss: stats.disc_losses.back().copied().unwrap_or(0.0),
            q_loss: stats.q_losses.back().copied(),
            elapsed_secs: self.start_time.map_or(0.0, |t| t.elapsed().as_secs_f64()),
        }
    }
}
