//! Common interface of the three fiwGAN networks.

use crate::Tensor;

/// A network with named, persistable state
pub trait Network {
    /// Network name used for snapshots and logs
    fn name(&self) -> &'static str;

    /// Trainable parameters, in a fixed order
    fn named_parameters(&self) -> Vec<(String, Tensor)>;

    /// Non-trainable state such as normalization moving averages
    fn named_buffers(&self) -> Vec<(String, Tensor)> {
        Vec::new()
    }

    /// Trainable parameters without names
    fn parameters(&self) -> Vec<Tensor> {
        self.named_parameters().into_iter().map(|(_, t)| t).collect()
    }

    /// Everything a snapshot must hold: parameters, then buffers
    fn named_state(&self) -> Vec<(String, Tensor)> {
        let mut state = self.named_parameters();
        state.extend(self.named_buffers());
        state
    }

    /// Total number of trainable scalars
    fn num_parameters(&self) -> usize {
        self.named_parameters().iter().map(|(_, t)| t.len()).sum()
    }
}
