//! Training summaries
//!
//! Scalars and audio emitted by the training loop. Writers report failures
//! through `Result`; the trainer logs them and keeps going.

mod file;
mod memory;
mod traits;

pub use file::{flatten_batch, FileSummaryWriter, ScalarRecord, AUDIO_DIR, SCALARS_FILE};
pub use memory::{AudioRecord, MemorySummaryWriter};
pub use traits::SummaryWriter;
