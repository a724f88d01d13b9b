//! Network snapshots in safetensors format
//!
//! Each network is written to its own `<name>.safetensors` file holding every
//! parameter and buffer by name, plus metadata (network name, step, time).
//! Snapshots are written to a temporary file first and then renamed, so a
//! reader never sees a half-written file.

mod load;
mod model;
mod save;

pub use load::{load_network, read_metadata};
pub use model::{snapshot_path, SnapshotMetadata, FORMAT_VERSION};
pub use save::{save_network, save_training_state};
