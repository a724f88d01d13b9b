//! GAN objectives, the WGAN-GP slope penalty and the code reconstruction loss.

use super::discriminator::ScoreActivation;
use crate::autograd::{
    add, add_scalar, grad, mean, mul, scale, scale_rows, softplus, sqrt, square, sub, sum,
    sum_rows, Tensor,
};
use crate::error::Error;
use crate::optim::OptimizerSpec;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Weight of the gradient penalty in the wgan-gp critic loss
pub const GP_LAMBDA: f32 = 10.0;

/// Bound for discriminator weights under plain wgan
pub const WGAN_CLIP: f32 = 0.01;

/// Added under the square root of the slope norm so its gradient stays finite
const SLOPE_EPSILON: f32 = 1e-12;

/// GAN objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GanLoss {
    #[serde(rename = "dcgan")]
    Dcgan,
    #[serde(rename = "lsgan")]
    Lsgan,
    #[serde(rename = "wgan")]
    Wgan,
    #[serde(rename = "wgan-gp")]
    WganGp,
}

impl GanLoss {
    pub const ALL: [GanLoss; 4] = [Self::Dcgan, Self::Lsgan, Self::Wgan, Self::WganGp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dcgan => "dcgan",
            Self::Lsgan => "lsgan",
            Self::Wgan => "wgan",
            Self::WganGp => "wgan-gp",
        }
    }

    /// dcgan and lsgan squash D's output; the Wasserstein critics do not
    pub fn score_activation(&self) -> ScoreActivation {
        match self {
            Self::Dcgan | Self::Lsgan => ScoreActivation::Sigmoid,
            Self::Wgan | Self::WganGp => ScoreActivation::Linear,
        }
    }

    /// Whether the code reconstruction loss (and Q training) is active
    pub fn trains_q(&self) -> bool {
        matches!(self, Self::WganGp)
    }

    /// Whether D is scored on interpolates and penalized for its slope
    pub fn has_gradient_penalty(&self) -> bool {
        matches!(self, Self::WganGp)
    }

    /// Whether D's weights are clipped after every update
    pub fn clips_discriminator(&self) -> bool {
        matches!(self, Self::Wgan)
    }

    /// Optimizers for G, D and (wgan-gp only) Q
    pub fn optimizers(&self) -> OptimizerPlan {
        match self {
            Self::Dcgan => OptimizerPlan {
                generator: OptimizerSpec::adam(2e-4, 0.5, 0.999),
                discriminator: OptimizerSpec::adam(2e-4, 0.5, 0.999),
                q: None,
            },
            Self::Lsgan => OptimizerPlan {
                generator: OptimizerSpec::rmsprop(1e-4),
                discriminator: OptimizerSpec::rmsprop(1e-4),
                q: None,
            },
            Self::Wgan => OptimizerPlan {
                generator: OptimizerSpec::rmsprop(5e-5),
                discriminator: OptimizerSpec::rmsprop(5e-5),
                q: None,
            },
            Self::WganGp => OptimizerPlan {
                generator: OptimizerSpec::adam(1e-4, 0.5, 0.9),
                discriminator: OptimizerSpec::adam(1e-4, 0.5, 0.9),
                q: Some(OptimizerSpec::rmsprop(1e-4)),
            },
        }
    }
}

impl fmt::Display for GanLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GanLoss {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|loss| loss.as_str() == s)
            .ok_or_else(|| Error::NotImplemented(format!("loss variant '{s}'")))
    }
}

/// Optimizer descriptions for the three networks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerPlan {
    pub generator: OptimizerSpec,
    pub discriminator: OptimizerSpec,
    /// Optimizes G ∪ Q on the code loss
    pub q: Option<OptimizerSpec>,
}

/// Every loss of one training step, still attached to the graph
pub struct LossTerms {
    pub g_loss: Tensor,
    /// Full D objective, including the weighted penalty under wgan-gp
    pub d_loss: Tensor,
    /// D objective before the penalty
    pub d_loss_base: Tensor,
    pub q_loss: Option<Tensor>,
    pub gradient_penalty: Option<Tensor>,
}

/// Element-wise `max(x, 0) - x·z + ln(1 + e^{-|x|})` against constant labels
pub fn sigmoid_cross_entropy(logits: &Tensor, labels: &Tensor) -> Tensor {
    sub(&softplus(logits), &mul(logits, labels))
}

fn mean_cross_entropy(logits: &Tensor, label: f32) -> Tensor {
    let labels = Tensor::new(ndarray::ArrayD::from_elem(logits.data().raw_dim(), label), false);
    mean(&sigmoid_cross_entropy(logits, &labels))
}

/// Generator and discriminator objectives from the real and fake scores
pub fn adversarial_losses(loss: GanLoss, d_real: &Tensor, d_fake: &Tensor) -> (Tensor, Tensor) {
    match loss {
        GanLoss::Dcgan => {
            let g = mean_cross_entropy(d_fake, 1.0);
            let d = scale(&add(&mean_cross_entropy(d_fake, 0.0), &mean_cross_entropy(d_real, 1.0)), 0.5);
            (g, d)
        }
        GanLoss::Lsgan => {
            let g = mean(&square(&add_scalar(d_fake, -1.0)));
            let d = scale(&add(&mean(&square(&add_scalar(d_real, -1.0))), &mean(&square(d_fake))), 0.5);
            (g, d)
        }
        GanLoss::Wgan | GanLoss::WganGp => {
            let g = scale(&mean(d_fake), -1.0);
            let d = sub(&mean(d_fake), &mean(d_real));
            (g, d)
        }
    }
}

/// `real + α·(fake − real)` with one α per example
pub fn interpolate(real: &Tensor, fake: &Tensor, alpha: Array1<f32>) -> Tensor {
    add(real, &scale_rows(&sub(fake, real), Rc::new(alpha)))
}

/// `mean((‖∇ d_interp / ∇ interp‖₂ − 1)²)`, norm over every non-batch axis.
///
/// The gradient is taken with `create_graph`, so the penalty can be
/// differentiated with respect to D's parameters.
pub fn gradient_penalty(interp: &Tensor, d_interp: &Tensor) -> Tensor {
    let slopes_grad = grad(&sum(d_interp), &[interp.clone()], true).remove(0);
    let slopes = sqrt(&add_scalar(&sum_rows(&square(&slopes_grad)), SLOPE_EPSILON));
    mean(&square(&add_scalar(&slopes, -1.0)))
}

/// Mean sigmoid cross-entropy between the sampled code and Q's prediction.
///
/// Q already ends in a sigmoid and its output is treated as logits here as
/// well; the loss is kept in that form.
pub fn code_loss(code: &Tensor, q_fake: &Tensor) -> Tensor {
    mean(&sigmoid_cross_entropy(q_fake, code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_parse_known_variants() {
        for loss in GanLoss::ALL {
            assert_eq!(loss.as_str().parse::<GanLoss>().expect("parse"), loss);
        }
    }

    #[test]
    fn test_unknown_variant_is_not_implemented() {
        let err = "hinge".parse::<GanLoss>().unwrap_err();
        assert!(matches!(err, Error::NotImplemented(_)));
    }

    #[test]
    fn test_optimizer_table() {
        use crate::optim::OptimizerKind;
        let plan = GanLoss::WganGp.optimizers();
        assert_eq!(plan.generator.lr, 1e-4);
        assert_eq!(plan.generator.kind, OptimizerKind::Adam { beta1: 0.5, beta2: 0.9, epsilon: 1e-7 });
        assert_eq!(plan.q.map(|q| q.name()), Some("rmsprop"));
        assert_eq!(GanLoss::Wgan.optimizers().discriminator.lr, 5e-5);
        assert!(GanLoss::Dcgan.optimizers().q.is_none());
    }

    #[test]
    fn test_cross_entropy_matches_closed_form() {
        let logits = Tensor::from_vec(vec![0.0, 2.0, -3.0], false);
        let labels = Tensor::from_vec(vec![1.0, 0.0, 1.0], false);
        let ce = sigmoid_cross_entropy(&logits, &labels).to_vec();
        assert_abs_diff_eq!(ce[0], std::f32::consts::LN_2, epsilon = 1e-6);
        assert_abs_diff_eq!(ce[1], (1.0 + 2.0f32.exp()).ln(), epsilon = 1e-5);
        assert_abs_diff_eq!(ce[2], (1.0 + 3.0f32.exp()).ln(), epsilon = 1e-5);
    }

    #[test]
    fn test_wgan_losses() {
        let real = Tensor::from_vec(vec![1.0, 3.0], false);
        let fake = Tensor::from_vec(vec![-1.0, 0.0], false);
        let (g, d) = adversarial_losses(GanLoss::Wgan, &real, &fake);
        assert_abs_diff_eq!(g.item(), 0.5);
        assert_abs_diff_eq!(d.item(), -2.5);
    }

    #[test]
    fn test_interpolation_endpoints() {
        let real = Tensor::from_shape_vec(&[2, 2, 1], vec![1.0, 2.0, 3.0, 4.0], false);
        let fake = Tensor::from_shape_vec(&[2, 2, 1], vec![-1.0, -2.0, -3.0, -4.0], false);
        let at_real = interpolate(&real, &fake, Array1::from(vec![0.0, 0.0]));
        assert_eq!(at_real.to_vec(), real.to_vec());
        let at_fake = interpolate(&real, &fake, Array1::from(vec![1.0, 1.0]));
        assert_eq!(at_fake.to_vec(), fake.to_vec());
        let mixed = interpolate(&real, &fake, Array1::from(vec![0.0, 1.0]));
        assert_eq!(mixed.to_vec(), vec![1.0, 2.0, -3.0, -4.0]);
    }

    #[test]
    fn test_code_loss_uses_latent_code_as_labels() {
        use crate::generative::fiwgan::latent::LatentBatch;
        use ndarray::array;

        let latent = LatentBatch { code: array![[1.0, 0.0]], continuous: array![[0.5]] };
        let q_fake = Tensor::from_shape_vec(&[1, 2], vec![0.0, 2.0], false);
        // CE(0, 1) = ln 2, CE(2, 0) = 2 + ln(1 + e^-2)
        let expected = (2f32.ln() + 2.0 + (-2f32).exp().ln_1p()) / 2.0;
        assert_abs_diff_eq!(code_loss(&latent.code_tensor(), &q_fake).item(), expected, epsilon = 1e-5);
    }

    #[test]
    fn test_penalty_zero_for_unit_slope() {
        // d(x) = sum of x per row: gradient is all ones, norm is √n
        let interp = Tensor::from_shape_vec(&[2, 1, 1], vec![0.3, -0.7], true);
        let scores = sum_rows(&interp);
        let gp = gradient_penalty(&interp, &scores);
        assert_abs_diff_eq!(gp.item(), 0.0, epsilon = 1e-6);
    }

    proptest! {
        #[test]
        fn prop_lsgan_discriminator_loss_nonnegative(
            scores in prop::collection::vec((0.0f32..1.0, 0.0f32..1.0), 1..32)
        ) {
            let (r, f): (Vec<f32>, Vec<f32>) = scores.into_iter().unzip();
            let (g, d) = adversarial_losses(
                GanLoss::Lsgan,
                &Tensor::from_vec(r, false),
                &Tensor::from_vec(f, false),
            );
            prop_assert!(d.item() >= 0.0);
            prop_assert!(g.item() >= 0.0);
        }

        #[test]
        fn prop_dcgan_losses_nonnegative(
            scores in prop::collection::vec((0.0f32..1.0, 0.0f32..1.0), 1..32)
        ) {
            let (r, f): (Vec<f32>, Vec<f32>) = scores.into_iter().unzip();
            let (g, d) = adversarial_losses(
                GanLoss::Dcgan,
                &Tensor::from_vec(r, false),
                &Tensor::from_vec(f, false),
            );
            prop_assert!(d.item() >= 0.0 && d.item().is_finite());
            prop_assert!(g.item() >= 0.0);
        }

        #[test]
        fn prop_penalty_nonnegative(values in prop::collection::vec(-2.0f32..2.0, 6)) {
            let interp = Tensor::from_shape_vec(&[2, 3, 1], values, true);
            let scores = sum_rows(&square(&interp));
            prop_assert!(gradient_penalty(&interp, &scores).item() >= 0.0);
        }
    }
}
