//! Snapshot reading

use super::model::SnapshotMetadata;
use crate::generative::Network;
use crate::{Error, Result};
use ndarray::{ArrayD, IxDyn};
use safetensors::tensor::Dtype;
use safetensors::SafeTensors;
use std::path::Path;

/// Read only the metadata of a snapshot
pub fn read_metadata(path: impl AsRef<Path>) -> Result<SnapshotMetadata> {
    let data = std::fs::read(path.as_ref())?;
    metadata_of(&data)
}

fn metadata_of(data: &[u8]) -> Result<SnapshotMetadata> {
    let (_, st_metadata) = SafeTensors::read_metadata(data)
        .map_err(|e| Error::Serialization(format!("SafeTensors parsing failed: {e}")))?;
    let map = st_metadata
        .metadata()
        .as_ref()
        .ok_or_else(|| Error::Serialization("snapshot has no metadata".to_string()))?;
    SnapshotMetadata::from_map(map)
}

/// Restore `network` in place from a snapshot.
///
/// The snapshot must belong to a network of the same name and hold exactly
/// the network's tensors with matching shapes. Nothing is modified unless
/// every tensor validates.
pub fn load_network(network: &dyn Network, path: impl AsRef<Path>) -> Result<SnapshotMetadata> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let metadata = metadata_of(&data)?;
    if metadata.network != network.name() {
        return Err(Error::Serialization(format!(
            "{} holds a '{}' snapshot, expected '{}'",
            path.display(),
            metadata.network,
            network.name()
        )));
    }

    let safetensors = SafeTensors::deserialize(&data)
        .map_err(|e| Error::Serialization(format!("SafeTensors parsing failed: {e}")))?;
    let state = network.named_state();
    if safetensors.names().len() != state.len() {
        return Err(Error::Serialization(format!(
            "{} holds {} tensors, network has {}",
            path.display(),
            safetensors.names().len(),
            state.len()
        )));
    }

    let mut restored = Vec::with_capacity(state.len());
    for (name, tensor) in &state {
        let view = safetensors
            .tensor(name)
            .map_err(|e| Error::Serialization(format!("missing tensor '{name}': {e}")))?;
        if view.dtype() != Dtype::F32 {
            return Err(Error::Serialization(format!("tensor '{name}' is {:?}, expected F32", view.dtype())));
        }
        let expected = tensor.shape();
        if view.shape() != expected.as_slice() {
            return Err(Error::ShapeMismatch { expected, actual: view.shape().to_vec() });
        }
        let values: Vec<f32> = view
            .data()
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        let array = ArrayD::from_shape_vec(IxDyn(view.shape()), values)
            .map_err(|e| Error::Serialization(format!("tensor '{name}': {e}")))?;
        restored.push(array);
    }

    for ((_, tensor), array) in state.iter().zip(restored) {
        tensor.set_data(array);
    }
    tracing::debug!(network = network.name(), step = metadata.step, "Loaded snapshot");
    Ok(metadata)
}
