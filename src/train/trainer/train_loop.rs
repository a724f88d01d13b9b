//! Multi-epoch training loop

use super::core::GanTrainer;
use super::result::TrainResult;
use crate::data::BatchSource;
use crate::train::callback::CallbackAction;
use crate::Result;
use std::time::Instant;

impl GanTrainer {
    /// Train for the configured number of epochs.
    ///
    /// Each epoch resets the source, runs one step per batch and ends with
    /// an audio summary and a snapshot of every network. A callback may stop
    /// training or skip an epoch.
    pub fn train<S: BatchSource + ?Sized>(&mut self, source: &mut S) -> Result<TrainResult> {
        self.start_time = Some(Instant::now());
        let max_epochs = self.options.epochs;
        let mut epochs_completed = 0;
        let mut stopped_early = false;

        tracing::info!(
            epochs = max_epochs,
            loss = %self.state.loss(),
            parameters = self.state.num_parameters(),
            callbacks = ?self.callbacks.names(),
            "Starting training"
        );

        let ctx = self.build_context(0, 0, source.batches_per_epoch(), self.state.step);
        if self.callbacks.on_train_begin(&ctx) == CallbackAction::Stop {
            return Ok(self.finalize(0, true));
        }

        for epoch in 0..max_epochs {
            let ctx = self.build_context(epoch, 0, source.batches_per_epoch(), self.state.step);
            match self.callbacks.on_epoch_begin(&ctx) {
                CallbackAction::Stop => {
                    stopped_early = true;
                    break;
                }
                CallbackAction::SkipEpoch => continue,
                CallbackAction::Continue => {}
            }

            let outcome = self.train_epoch(source, epoch)?;
            self.finish_epoch(&outcome);
            if outcome.stopped_early {
                stopped_early = true;
                break;
            }
            epochs_completed += 1;
            tracing::info!(
                epoch,
                batches = outcome.batches,
                g_loss = self.state.stats.avg_gen_loss(),
                d_loss = self.state.stats.avg_disc_loss(),
                "Epoch finished"
            );

            let ctx = self.build_context(epoch, outcome.batches, source.batches_per_epoch(), outcome.last_step);
            if self.callbacks.on_epoch_end(&ctx) == CallbackAction::Stop {
                stopped_early = true;
                break;
            }
        }

        Ok(self.finalize(epochs_completed, stopped_early))
    }

    fn finalize(&mut self, epochs_completed: usize, stopped_early: bool) -> TrainResult {
        let ctx = self.build_context(epochs_completed, 0, None, self.state.step);
        self.callbacks.on_train_end(&ctx);
        if let Some(writer) = self.summary.as_mut() {
            if let Err(e) = writer.flush() {
                tracing::warn!(error = %e, "Failed to flush summaries");
            }
        }
        TrainResult {
            epochs_completed,
            global_step: self.state.step,
            final_g_loss: ctx.g_loss,
            final_d_loss: ctx.d_loss,
            final_q_loss: ctx.q_loss,
            stopped_early,
            elapsed_secs: ctx.elapsed_secs,
        }
    }
}
