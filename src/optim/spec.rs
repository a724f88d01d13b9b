//! Declarative optimizer descriptions

use super::{Adam, Optimizer, RMSprop};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Optimizer family with its hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptimizerKind {
    Adam { beta1: f32, beta2: f32, epsilon: f32 },
    #[serde(rename = "rmsprop")]
    RMSprop { rho: f32, epsilon: f32 },
}

/// Optimizer description that can be turned into a fresh optimizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSpec {
    pub kind: OptimizerKind,
    pub lr: f32,
}

impl OptimizerSpec {
    /// Adam with explicit moments and ε = 1e-7
    pub fn adam(lr: f32, beta1: f32, beta2: f32) -> Self {
        Self { kind: OptimizerKind::Adam { beta1, beta2, epsilon: 1e-7 }, lr }
    }

    /// RMSprop with ρ = 0.9 and ε = 1e-7
    pub fn rmsprop(lr: f32) -> Self {
        Self { kind: OptimizerKind::RMSprop { rho: 0.9, epsilon: 1e-7 }, lr }
    }

    /// Build a fresh optimizer with empty state
    pub fn build(&self) -> Box<dyn Optimizer> {
        match self.kind {
            OptimizerKind::Adam { beta1, beta2, epsilon } => {
                Box::new(Adam::new(self.lr, beta1, beta2, epsilon))
            }
            OptimizerKind::RMSprop { rho, epsilon } => Box::new(RMSprop::new(self.lr, rho, epsilon)),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self.kind {
            OptimizerKind::Adam { .. } => "adam",
            OptimizerKind::RMSprop { .. } => "rmsprop",
        }
    }
}

impl fmt::Display for OptimizerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OptimizerKind::Adam { beta1, beta2, .. } => {
                write!(f, "adam (lr={}, beta1={beta1}, beta2={beta2})", self.lr)
            }
            OptimizerKind::RMSprop { rho, .. } => write!(f, "rmsprop (lr={}, rho={rho})", self.lr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_keeps_learning_rate() {
        let opt = OptimizerSpec::adam(2e-4, 0.5, 0.999).build();
        assert_eq!(opt.lr(), 2e-4);
        assert_eq!(opt.iterations(), 0);
        let opt = OptimizerSpec::rmsprop(5e-5).build();
        assert_eq!(opt.lr(), 5e-5);
    }

    #[test]
    fn test_yaml_round_trip() {
        let spec = OptimizerSpec::rmsprop(1e-4);
        let yaml = serde_yaml::to_string(&spec).expect("serialize");
        assert!(yaml.contains("rmsprop"));
        let back: OptimizerSpec = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back, spec);
    }

    #[test]
    fn test_display_names_family_and_rate() {
        assert_eq!(OptimizerSpec::rmsprop(5e-5).to_string(), "rmsprop (lr=0.00005, rho=0.9)");
        assert!(OptimizerSpec::adam(1e-4, 0.5, 0.9).to_string().starts_with("adam (lr=0.0001"));
    }
}
