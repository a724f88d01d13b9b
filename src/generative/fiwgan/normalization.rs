//! Optional normalization between layers, chosen when a network is built.

use crate::autograd::{
    add, add_scalar, broadcast_last, div, mul, scale, sqrt, square, sub, sum_to_last, Context,
    Tensor,
};

/// Batch normalization over every axis but the channel axis
///
/// Momentum 0.99 and ε = 1e-3. In training mode the batch statistics are
/// used and folded into the moving averages; in evaluation mode the moving
/// averages are used.
pub struct BatchNorm {
    gamma: Tensor,
    beta: Tensor,
    moving_mean: Tensor,
    moving_var: Tensor,
    momentum: f32,
    epsilon: f32,
}

impl BatchNorm {
    pub fn new(channels: usize) -> Self {
        Self {
            gamma: Tensor::ones(&[channels], true),
            beta: Tensor::zeros(&[channels], true),
            moving_mean: Tensor::zeros(&[channels], false),
            moving_var: Tensor::ones(&[channels], false),
            momentum: 0.99,
            epsilon: 1e-3,
        }
    }

    pub fn forward(&self, x: &Tensor, ctx: &Context) -> Tensor {
        let shape = x.shape();
        let normalized = if ctx.is_training() {
            let count = (x.len() / self.gamma.len().max(1)).max(1) as f32;
            let mean = scale(&sum_to_last(x), 1.0 / count);
            let centered = sub(x, &broadcast_last(&mean, &shape));
            let var = scale(&sum_to_last(&square(&centered)), 1.0 / count);
            self.update_moving(&mean, &var);
            let std = sqrt(&add_scalar(&var, self.epsilon));
            div(&centered, &broadcast_last(&std, &shape))
        } else {
            let std = self.moving_var.data().mapv(|v| (v + self.epsilon).sqrt());
            let centered = sub(x, &broadcast_last(&self.moving_mean.detach(), &shape));
            div(&centered, &broadcast_last(&Tensor::new(std, false), &shape))
        };
        add(
            &mul(&normalized, &broadcast_last(&self.gamma, &shape)),
            &broadcast_last(&self.beta, &shape),
        )
    }

    fn update_moving(&self, mean: &Tensor, var: &Tensor) {
        let m = self.momentum;
        let batch_mean = mean.to_array();
        let batch_var = var.to_array();
        self.moving_mean.update_data(|mm| mm.zip_mut_with(&batch_mean, |a, &b| *a = m * *a + (1.0 - m) * b));
        self.moving_var.update_data(|mv| mv.zip_mut_with(&batch_var, |a, &b| *a = m * *a + (1.0 - m) * b));
    }

    pub fn named_parameters(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![(format!("{prefix}.gamma"), self.gamma.clone()), (format!("{prefix}.beta"), self.beta.clone())]
    }

    pub fn named_buffers(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![
            (format!("{prefix}.moving_mean"), self.moving_mean.clone()),
            (format!("{prefix}.moving_var"), self.moving_var.clone()),
        ]
    }
}

/// Normalization slot of a layer
pub enum Normalization {
    Identity,
    BatchNorm(BatchNorm),
}

impl Normalization {
    /// Batch normalization when enabled, identity otherwise
    pub fn new(use_batchnorm: bool, channels: usize) -> Self {
        if use_batchnorm {
            Self::BatchNorm(BatchNorm::new(channels))
        } else {
            Self::Identity
        }
    }

    pub fn forward(&self, x: &Tensor, ctx: &Context) -> Tensor {
        match self {
            Self::Identity => x.clone(),
            Self::BatchNorm(bn) => bn.forward(x, ctx),
        }
    }

    pub fn named_parameters(&self, prefix: &str) -> Vec<(String, Tensor)> {
        match self {
            Self::Identity => Vec::new(),
            Self::BatchNorm(bn) => bn.named_parameters(prefix),
        }
    }

    pub fn named_buffers(&self, prefix: &str) -> Vec<(String, Tensor)> {
        match self {
            Self::Identity => Vec::new(),
            Self::BatchNorm(bn) => bn.named_buffers(prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{grad, sum};
    use approx::assert_abs_diff_eq;

    fn ramp() -> Tensor {
        Tensor::from_shape_vec(&[2, 3, 2], (0..12).map(|v| v as f32).collect(), true)
    }

    #[test]
    fn test_identity_passes_through() {
        let x = ramp();
        let y = Normalization::new(false, 2).forward(&x, &Context::with_seed(0));
        assert!(y.ptr_eq(&x));
    }

    #[test]
    fn test_training_output_is_standardized() {
        let bn = BatchNorm::new(2);
        let y = bn.forward(&ramp(), &Context::with_seed(0));
        let data = y.to_vec();
        for c in 0..2 {
            let channel: Vec<f32> = data.iter().skip(c).step_by(2).copied().collect();
            let mean = channel.iter().sum::<f32>() / channel.len() as f32;
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_moving_stats_update_in_training_only() {
        let bn = BatchNorm::new(2);
        let mut ctx = Context::with_seed(0);
        bn.forward(&ramp(), &ctx);
        // channel 0 mean is 5, so moving mean becomes 0.01 * 5
        assert_abs_diff_eq!(bn.moving_mean.to_vec()[0], 0.05, epsilon = 1e-6);
        ctx.eval();
        let before = bn.moving_mean.to_vec();
        bn.forward(&ramp(), &ctx);
        assert_eq!(bn.moving_mean.to_vec(), before);
    }

    #[test]
    fn test_gradients_reach_gamma_and_input() {
        let bn = BatchNorm::new(2);
        let x = ramp();
        let y = bn.forward(&x, &Context::with_seed(0));
        let loss = sum(&mul(&y, &y));
        let g = grad(&loss, &[x, bn.gamma.clone()], false);
        assert!(g[0].is_finite());
        assert!(g[1].to_vec().iter().all(|v| *v > 0.0));
    }

    #[test]
    fn test_buffers_are_named() {
        let norm = Normalization::new(true, 4);
        let names: Vec<String> = norm.named_buffers("bn").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["bn.moving_mean", "bn.moving_var"]);
    }
}
