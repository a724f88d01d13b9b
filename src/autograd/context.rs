//! Execution context for forward passes

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;

/// Training/inference mode plus the random source used by stochastic layers
pub struct Context {
    training: bool,
    rng: RefCell<StdRng>,
}

impl Context {
    /// Create a training-mode context seeded from the OS
    pub fn new() -> Self {
        Self { training: true, rng: RefCell::new(StdRng::from_os_rng()) }
    }

    /// Create a training-mode context with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self { training: true, rng: RefCell::new(StdRng::seed_from_u64(seed)) }
    }

    /// Set training mode
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Set evaluation mode
    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Check if in training mode
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Borrow the random source
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        f(&mut self.rng.borrow_mut())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_context_default() {
        let ctx = Context::default();
        assert!(ctx.is_training());
    }

    #[test]
    fn test_context_train_mode() {
        let mut ctx = Context::new();
        ctx.eval();
        assert!(!ctx.is_training());

        ctx.train();
        assert!(ctx.is_training());
    }

    #[test]
    fn test_seeded_contexts_agree() {
        let a = Context::with_seed(7);
        let b = Context::with_seed(7);
        let x: u64 = a.with_rng(|r| r.random());
        let y: u64 = b.with_rng(|r| r.random());
        assert_eq!(x, y);
    }
}
