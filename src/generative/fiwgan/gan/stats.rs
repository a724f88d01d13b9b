//! Running loss statistics for GAN training.

use std::collections::VecDeque;

/// Number of recent steps kept per loss
const HISTORY: usize = 100;

/// Statistics from GAN training
#[derive(Debug, Clone)]
pub struct GanStats {
    /// Total training steps
    pub steps: u64,
    /// Generator losses (recent history)
    pub gen_losses: VecDeque<f32>,
    /// Discriminator losses (recent history)
    pub disc_losses: VecDeque<f32>,
    /// Code reconstruction losses (recent history, wgan-gp only)
    pub q_losses: VecDeque<f32>,
}

impl Default for GanStats {
    fn default() -> Self {
        Self {
            steps: 0,
            gen_losses: VecDeque::with_capacity(HISTORY),
            disc_losses: VecDeque::with_capacity(HISTORY),
            q_losses: VecDeque::with_capacity(HISTORY),
        }
    }
}

fn push_capped(history: &mut VecDeque<f32>, value: f32) {
    if history.len() >= HISTORY {
        history.pop_front();
    }
    history.push_back(value);
}

fn average(history: &VecDeque<f32>) -> f32 {
    if history.is_empty() {
        return 0.0;
    }
    history.iter().sum::<f32>() / history.len() as f32
}

impl GanStats {
    /// Record the losses of one step
    pub fn record(&mut self, g_loss: f32, d_loss: f32, q_loss: Option<f32>) {
        self.steps += 1;
        push_capped(&mut self.gen_losses, g_loss);
        push_capped(&mut self.disc_losses, d_loss);
        if let Some(q) = q_loss {
            push_capped(&mut self.q_losses, q);
        }
    }

    /// Average generator loss over recent history
    #[must_use]
    pub fn avg_gen_loss(&self) -> f32 {
        average(&self.gen_losses)
    }

    /// Average discriminator loss over recent history
    #[must_use]
    pub fn avg_disc_loss(&self) -> f32 {
        average(&self.disc_losses)
    }

    /// Average code loss over recent history, if Q is trained
    #[must_use]
    pub fn avg_q_loss(&self) -> Option<f32> {
        (!self.q_losses.is_empty()).then(|| average(&self.q_losses))
    }
}
