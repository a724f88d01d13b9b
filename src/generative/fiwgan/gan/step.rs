//! One training step: sample, forward, loss, backward, apply.

use super::state::TrainingState;
use super::step_result::StepResult;
use crate::autograd::{add, grad, scale, Tensor};
use crate::error::{Error, Result};
use crate::generative::fiwgan::generator::audio_array;
use crate::generative::fiwgan::latent::LatentBatch;
use crate::generative::fiwgan::loss::{
    adversarial_losses, code_loss, gradient_penalty, interpolate, LossTerms, GP_LAMBDA, WGAN_CLIP,
};
use crate::generative::fiwgan::network::Network;
use crate::optim::clip_by_value;
use ndarray::{Array1, Array3};
use rand::Rng;

/// The recorded forward pass of one step
pub struct StepForward {
    /// Latent batch fed to G
    pub latent: LatentBatch,
    /// G's output, attached to G's parameters
    pub fake: Tensor,
    /// Losses, attached to the graph
    pub terms: LossTerms,
}

impl TrainingState {
    /// Sample a latent batch and evaluate every loss on `real`.
    ///
    /// Nothing is updated besides the random sources and normalization
    /// moving averages. `real` must have exactly the run's batch shape.
    pub fn forward_losses(&mut self, real: &Array3<f32>) -> Result<StepForward> {
        self.check_batch_shape(real.shape())?;
        let batch = self.geometry.batch_size;

        let latent_dim = self.latent_dim();
        let latent = LatentBatch::sample(&mut self.rng, batch, latent_dim, self.num_categ);
        let real = Tensor::new(real.clone().into_dyn(), false);

        let fake = self.generator.forward(&latent.to_tensor(), &self.ctx);
        let d_fake = self.discriminator.forward(&fake, &self.ctx);
        let d_real = self.discriminator.forward(&real, &self.ctx);
        let (g_loss, d_loss_base) = adversarial_losses(self.loss, &d_real, &d_fake);

        let penalty = if self.loss.has_gradient_penalty() {
            let rng = &mut self.rng;
            let alpha = Array1::from_shape_simple_fn(batch, || rng.random_range(0.0f32..1.0));
            // The penalty only trains D, so the interpolate is a fresh leaf
            let interp = interpolate(&real, &fake.detach(), alpha).detach_requires_grad();
            let d_interp = self.discriminator.forward(&interp, &self.ctx);
            Some(gradient_penalty(&interp, &d_interp))
        } else {
            None
        };
        let d_loss = match &penalty {
            Some(gp) => add(&d_loss_base, &scale(gp, GP_LAMBDA)),
            None => d_loss_base.clone(),
        };

        let q_loss = self
            .loss
            .trains_q()
            .then(|| code_loss(&latent.code_tensor(), &self.q_network.forward(&fake, &self.ctx)));

        let terms = LossTerms { g_loss, d_loss, d_loss_base, q_loss, gradient_penalty: penalty };
        Ok(StepForward { latent, fake, terms })
    }

    /// Run one full step on a real batch and apply every update.
    ///
    /// All gradients come from a single forward record and are computed
    /// before any parameter changes. A NaN or infinite loss aborts the step
    /// before anything is applied.
    pub fn train_step(&mut self, real: &Array3<f32>) -> Result<StepResult> {
        let StepForward { fake, terms, .. } = self.forward_losses(real)?;

        let g_loss = self.finite("G_loss", &terms.g_loss)?;
        let d_loss = self.finite("D_loss", &terms.d_loss)?;
        let d_loss_base = terms.d_loss_base.item();
        let q_loss = terms.q_loss.as_ref().map(|q| self.finite("Q_loss", q)).transpose()?;
        let gp = terms.gradient_penalty.as_ref().map(Tensor::item);
        let geometry = self.geometry;
        let fake_audio = audio_array(&fake, [geometry.batch_size, geometry.slice_len, geometry.num_channels])?;

        let g_params = self.generator.parameters();
        let d_params = self.discriminator.parameters();
        let g_grads = grad(&terms.g_loss, &g_params, false);
        let d_grads = grad(&terms.d_loss, &d_params, false);
        let q_update = terms.q_loss.as_ref().map(|q| {
            let mut params = g_params.clone();
            params.extend(self.q_network.parameters());
            let grads = grad(q, &params, false);
            (params, grads)
        });

        self.g_opt.apply_gradients(&g_params, &g_grads);
        self.d_opt.apply_gradients(&d_params, &d_grads);
        if self.loss.clips_discriminator() {
            let clipped = clip_by_value(&d_params, -WGAN_CLIP, WGAN_CLIP);
            tracing::trace!(clipped, "Clipped discriminator weights");
        }
        if let (Some(opt), Some((params, grads))) = (self.q_opt.as_mut(), q_update) {
            opt.apply_gradients(&params, &grads);
        }

        let step = self.step;
        self.step += 1;
        self.stats.record(g_loss, d_loss, q_loss);
        tracing::debug!(step, g_loss, d_loss, ?q_loss, ?gp, "Training step");

        Ok(StepResult { step, g_loss, d_loss, d_loss_base, q_loss, gradient_penalty: gp, fake: fake_audio })
    }

    fn finite(&self, name: &str, loss: &Tensor) -> Result<f32> {
        let value = loss.item();
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::NonFinite { name: name.to_string(), step: self.step, value })
        }
    }
}
