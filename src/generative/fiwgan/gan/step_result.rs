//! Outcome of one training step.

use ndarray::Array3;

/// Scalar name of the generator loss
pub const GENERATOR_LOSS: &str = "Generator_loss";
/// Scalar name of the discriminator loss
pub const DISCRIMINATOR_LOSS: &str = "Discriminator_loss";
/// Scalar name of the code reconstruction loss
pub const Q_LOSS: &str = "Q_loss";
/// Scalar name of the wgan-gp slope penalty
pub const GRADIENT_PENALTY: &str = "Gradient_penalty";

/// Losses and generated audio of a completed step
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Index of the step within the run, starting at 0
    pub step: u64,
    /// Generator loss
    pub g_loss: f32,
    /// Discriminator loss, penalty included
    pub d_loss: f32,
    /// Discriminator loss without the penalty
    pub d_loss_base: f32,
    /// Code reconstruction loss (wgan-gp only)
    pub q_loss: Option<f32>,
    /// Unweighted gradient penalty (wgan-gp only)
    pub gradient_penalty: Option<f32>,
    /// Fake batch produced during the step
    pub fake: Array3<f32>,
}

impl StepResult {
    /// Named scalars to log for this step
    pub fn scalars(&self) -> Vec<(&'static str, f32)> {
        let mut scalars = vec![(GENERATOR_LOSS, self.g_loss), (DISCRIMINATOR_LOSS, self.d_loss)];
        if let Some(q) = self.q_loss {
            scalars.push((Q_LOSS, q));
        }
        if let Some(gp) = self.gradient_penalty {
            scalars.push((GRADIENT_PENALTY, gp));
        }
        scalars
    }
}
