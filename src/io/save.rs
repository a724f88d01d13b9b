//! Snapshot writing

use super::model::{snapshot_path, SnapshotMetadata};
use crate::generative::{Network, TrainingState};
use crate::{Error, Result};
use safetensors::tensor::{Dtype, TensorView};
use std::path::{Path, PathBuf};

/// Write every parameter and buffer of `network` to `path`.
///
/// # Example
///
/// ```no_run
/// use fiwgan::generative::{Generator, ModelConfig};
/// use fiwgan::io::save_network;
///
/// let generator = Generator::new(ModelConfig::default().generator(16384, 1))?;
/// save_network(&generator, "generator.safetensors", 0)?;
/// # Ok::<(), fiwgan::Error>(())
/// ```
pub fn save_network(network: &dyn Network, path: impl AsRef<Path>, step: u64) -> Result<()> {
    let path = path.as_ref();
    let tensor_data: Vec<(String, Vec<u8>, Vec<usize>)> = network
        .named_state()
        .into_iter()
        .map(|(name, tensor)| {
            let values = tensor.to_vec();
            let bytes: Vec<u8> = bytemuck::cast_slice(&values).to_vec();
            (name, bytes, tensor.shape())
        })
        .collect();

    let views: Vec<(&str, TensorView<'_>)> = tensor_data
        .iter()
        .map(|(name, bytes, shape)| {
            let view = TensorView::new(Dtype::F32, shape.clone(), bytes)
                .expect("TensorView construction must not fail for valid F32 data");
            (name.as_str(), view)
        })
        .collect();

    let metadata = SnapshotMetadata::new(network.name(), step).to_map();
    let bytes = safetensors::serialize(views, &Some(metadata))
        .map_err(|e| Error::Serialization(format!("SafeTensors serialization failed: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("safetensors.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;

    tracing::debug!(network = network.name(), path = %path.display(), step, "Saved snapshot");
    Ok(())
}

/// Persist G, D and Q into `dir`, overwriting earlier snapshots
pub fn save_training_state(state: &TrainingState, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let networks: [&dyn Network; 3] = [&state.generator, &state.discriminator, &state.q_network];
    let mut written = Vec::with_capacity(networks.len());
    for network in networks {
        let path = snapshot_path(dir, network.name());
        save_network(network, &path, state.step)?;
        written.push(path);
    }
    Ok(written)
}
