//! Cutting decoded audio into fixed-length training slices

use ndarray::{s, Array2, ArrayView2};
use rand::Rng;

/// How one decoded file becomes slices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceOptions {
    /// Samples per slice
    pub slice_len: usize,
    /// Keep only the first slice of each file
    pub first_slice: bool,
    /// Overlap between consecutive slices, in `[0, 1)`
    pub overlap_ratio: f32,
    /// Zero-pad a partial slice at the end instead of dropping it
    pub pad_end: bool,
    /// Skip a random number of leading samples (less than one slice)
    pub randomize_offset: bool,
}

impl SliceOptions {
    /// Options as used for training.
    ///
    /// With `first_slice` each file contributes exactly its zero-padded
    /// opening slice; otherwise the offset is randomized and `overlap_ratio`
    /// and `pad_end` apply.
    pub fn for_training(slice_len: usize, first_slice: bool, overlap_ratio: f32, pad_end: bool) -> Self {
        if first_slice {
            Self { slice_len, first_slice, overlap_ratio: 0.0, pad_end: true, randomize_offset: false }
        } else {
            Self { slice_len, first_slice, overlap_ratio, pad_end, randomize_offset: true }
        }
    }

    /// Distance between slice starts
    pub fn hop(&self) -> usize {
        ((self.slice_len as f32 * (1.0 - self.overlap_ratio)).round() as usize).max(1)
    }
}

/// Cut `(frames, channels)` audio into `(slice_len, channels)` slices
pub fn slice_audio<R: Rng>(audio: ArrayView2<'_, f32>, options: &SliceOptions, rng: &mut R) -> Vec<Array2<f32>> {
    let (frames, channels) = audio.dim();
    let offset = if options.randomize_offset && options.slice_len > 1 {
        rng.random_range(0..options.slice_len).min(frames)
    } else {
        0
    };
    let audio = audio.slice(s![offset.., ..]);
    let len = audio.nrows();
    let hop = options.hop();

    let mut count = if options.pad_end {
        len.div_ceil(hop)
    } else if len >= options.slice_len {
        1 + (len - options.slice_len) / hop
    } else {
        0
    };
    if options.first_slice {
        count = count.min(1);
    }

    (0..count)
        .map(|i| {
            let begin = i * hop;
            let end = (begin + options.slice_len).min(len);
            let mut slice = Array2::zeros((options.slice_len, channels));
            slice.slice_mut(s![..end - begin, ..]).assign(&audio.slice(s![begin..end, ..]));
            slice
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ramp(frames: usize) -> Array2<f32> {
        Array2::from_shape_fn((frames, 1), |(t, _)| t as f32 + 1.0)
    }

    fn fixed(slice_len: usize, overlap_ratio: f32, pad_end: bool) -> SliceOptions {
        SliceOptions { slice_len, first_slice: false, overlap_ratio, pad_end, randomize_offset: false }
    }

    #[test]
    fn test_drops_partial_tail_without_padding() {
        let slices = slice_audio(ramp(10).view(), &fixed(4, 0.0, false), &mut StdRng::seed_from_u64(0));
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[1][[0, 0]], 5.0);
    }

    #[test]
    fn test_pads_partial_tail() {
        let slices = slice_audio(ramp(10).view(), &fixed(4, 0.0, true), &mut StdRng::seed_from_u64(0));
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[2].column(0).to_vec(), vec![9.0, 10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_overlap_halves_hop() {
        let options = fixed(4, 0.5, false);
        assert_eq!(options.hop(), 2);
        let slices = slice_audio(ramp(8).view(), &options, &mut StdRng::seed_from_u64(0));
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[1][[0, 0]], 3.0);
    }

    #[test]
    fn test_first_slice_of_short_file_is_padded() {
        let options = SliceOptions::for_training(8, true, 0.5, false);
        let slices = slice_audio(ramp(3).view(), &options, &mut StdRng::seed_from_u64(0));
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].column(0).to_vec(), vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_short_file_without_padding_yields_nothing() {
        let slices = slice_audio(ramp(3).view(), &fixed(8, 0.0, false), &mut StdRng::seed_from_u64(0));
        assert!(slices.is_empty());
    }

    proptest! {
        #[test]
        fn prop_slices_have_fixed_shape(
            frames in 0usize..200,
            slice_len in 1usize..32,
            overlap in 0.0f32..0.9,
            pad_end in prop::bool::ANY,
            seed in 0u64..100,
        ) {
            let options = SliceOptions { slice_len, first_slice: false, overlap_ratio: overlap, pad_end, randomize_offset: true };
            let audio = Array2::<f32>::ones((frames, 2));
            for slice in slice_audio(audio.view(), &options, &mut StdRng::seed_from_u64(seed)) {
                prop_assert_eq!(slice.dim(), (slice_len, 2));
            }
        }
    }
}
