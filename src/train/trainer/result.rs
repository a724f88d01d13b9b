//! Training result types

/// Result of a training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainResult {
    /// Epochs that ran to completion
    pub epochs_completed: usize,
    /// Training steps taken by the state, across all runs
    pub global_step: u64,
    /// Last generator loss
    pub final_g_loss: f32,
    /// Last discriminator loss
    pub final_d_loss: f32,
    /// Last Q loss (wgan-gp only)
    pub final_q_loss: Option<f32>,
    /// Whether a callback stopped training
    pub stopped_early: bool,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}
