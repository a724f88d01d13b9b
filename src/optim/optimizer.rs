//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// Gradients are passed explicitly, paired by position with the parameters.
/// Implementations keep per-parameter state indexed by that position, so a
/// given optimizer must always be called with the same parameter list.
pub trait Optimizer {
    /// Update every parameter in place from its gradient
    fn apply_gradients(&mut self, params: &[Tensor], grads: &[Tensor]);

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);

    /// Number of updates applied so far
    fn iterations(&self) -> u64;
}

/// Panics unless every gradient matches its parameter's shape.
pub(crate) fn check_pairing(params: &[Tensor], grads: &[Tensor]) {
    assert_eq!(params.len(), grads.len(), "one gradient per parameter");
    for (p, g) in params.iter().zip(grads) {
        assert_eq!(p.shape(), g.shape(), "gradient shape differs from parameter");
    }
}
