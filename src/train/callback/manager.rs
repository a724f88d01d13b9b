//! Ordered dispatch of trainer events to registered callbacks.
//!
//! Callbacks run in registration order. For events that can interrupt the
//! run, the first callback asking for anything but `Continue` wins and later
//! callbacks do not see the event. `on_train_end` always reaches everyone, so
//! a callback can rely on it to release what it opened in `on_train_begin`.

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// The callbacks attached to a `GanTrainer`
#[derive(Default)]
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback after the existing ones
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Callback names in dispatch order
    pub fn names(&self) -> Vec<&'static str> {
        self.callbacks.iter().map(|cb| cb.name()).collect()
    }

    fn dispatch<F>(&mut self, mut event: F) -> CallbackAction
    where
        F: FnMut(&mut dyn TrainerCallback) -> CallbackAction,
    {
        self.callbacks
            .iter_mut()
            .map(|cb| event(cb.as_mut()))
            .find(|action| *action != CallbackAction::Continue)
            .unwrap_or(CallbackAction::Continue)
    }

    /// `Stop` ends the run before the first epoch
    pub fn on_train_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.stop_only(|cb| cb.on_train_begin(ctx))
    }

    pub fn on_train_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_train_end(ctx);
        }
    }

    /// The only event where `SkipEpoch` is honored
    pub fn on_epoch_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.dispatch(|cb| cb.on_epoch_begin(ctx))
    }

    /// Fired after the epoch's audio summary and snapshots are written
    pub fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.stop_only(|cb| cb.on_epoch_end(ctx))
    }

    pub fn on_step_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.stop_only(|cb| cb.on_step_begin(ctx))
    }

    /// `Stop` still lets the epoch close out with its summary and snapshots
    pub fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.stop_only(|cb| cb.on_step_end(ctx))
    }

    // SkipEpoch mid-epoch or outside an epoch reads as Continue
    fn stop_only<F>(&mut self, mut event: F) -> CallbackAction
    where
        F: FnMut(&mut dyn TrainerCallback) -> CallbackAction,
    {
        self.dispatch(|cb| match event(cb) {
            CallbackAction::Stop => CallbackAction::Stop,
            _ => CallbackAction::Continue,
        })
    }
}
