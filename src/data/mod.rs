//! Real-audio batch sources
//!
//! - [`BatchSource`]: epoch-scheduled supplier of fixed-shape batches
//! - [`InMemorySource`]: slices already held in memory
//! - [`WavDirectorySource`]: WAV files discovered in a directory, decoded and
//!   sliced on demand
//! - [`Prefetcher`]: runs any source on a background thread behind a bounded
//!   queue

mod directory;
mod prefetch;
mod slicing;
mod source;
mod wav;

pub use directory::{DecodeOptions, WavDirectorySource, AUDIO_EXTENSIONS};
pub use prefetch::Prefetcher;
pub use slicing::{slice_audio, SliceOptions};
pub use source::{BatchSource, InMemorySource};
pub use wav::{convert_channels, peak_normalize, read_wav, write_wav, DecodedAudio};
