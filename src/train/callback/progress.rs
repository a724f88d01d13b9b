//! Progress callback for printing training progress

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Prints epoch boundaries and every Nth step's losses
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    /// Log every N steps
    log_interval: usize,
}

impl ProgressCallback {
    pub fn new(log_interval: usize) -> Self {
        Self { log_interval: log_interval.max(1) }
    }

    fn losses(ctx: &CallbackContext) -> String {
        let q = ctx.q_loss.map(|q| format!(", Q: {q:.4}")).unwrap_or_default();
        format!("G: {:.4}, D: {:.4}{q}", ctx.g_loss, ctx.d_loss)
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self { log_interval: 10 }
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_epoch_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        println!("Epoch {}/{} starting", ctx.epoch + 1, ctx.max_epochs);
        CallbackAction::Continue
    }

    fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        println!(
            "Epoch {}/{}: {} ({:.1}s)",
            ctx.epoch + 1,
            ctx.max_epochs,
            Self::losses(ctx),
            ctx.elapsed_secs
        );
        CallbackAction::Continue
    }

    fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        if ctx.global_step % self.log_interval as u64 == 0 {
            let total = ctx.steps_per_epoch.map(|n| format!("/{n}")).unwrap_or_default();
            println!("  Step {}{total} (global {}): {}", ctx.step + 1, ctx.global_step, Self::losses(ctx));
        }
        CallbackAction::Continue
    }

    fn name(&self) -> &'static str {
        "ProgressCallback"
    }
}
