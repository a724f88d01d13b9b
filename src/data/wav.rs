//! WAV decoding and encoding

use crate::{Error, Result};
use ndarray::{Array2, ArrayView2, Axis};
use std::path::Path;

/// Decoded audio, `(frames, channels)` in `[-1, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Array2<f32>,
    pub sample_rate: u32,
}

/// Decode an integer or float PCM WAV file
pub fn read_wav(path: impl AsRef<Path>) -> Result<DecodedAudio> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| Error::Audio(format!("Failed to read WAV file '{}': {e}", path.display())))?;

    let spec = reader.spec();
    if spec.sample_rate == 0 || spec.channels == 0 {
        return Err(Error::Audio(format!("'{}' declares an empty format", path.display())));
    }

    let decode_err = |e: hound::Error| Error::Audio(format!("'{}': {e}", path.display()));
    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<_, _>>()
                .map_err(decode_err)?
        }
        hound::SampleFormat::Float => {
            reader.samples::<f32>().collect::<std::result::Result<_, _>>().map_err(decode_err)?
        }
    };

    let channels = spec.channels as usize;
    let frames = interleaved.len() / channels;
    let samples = Array2::from_shape_vec((frames, channels), interleaved[..frames * channels].to_vec())
        .map_err(|e| Error::Audio(format!("'{}': {e}", path.display())))?;
    Ok(DecodedAudio { samples, sample_rate: spec.sample_rate })
}

/// Average down to mono or duplicate mono into stereo.
///
/// Any other change of channel count is an error.
pub fn convert_channels(samples: Array2<f32>, num_channels: usize) -> Result<Array2<f32>> {
    let have = samples.ncols();
    if have == num_channels {
        return Ok(samples);
    }
    if num_channels == 1 {
        let mono = samples
            .mean_axis(Axis(1))
            .ok_or_else(|| Error::Audio("cannot downmix audio without channels".to_string()))?;
        return Ok(mono.insert_axis(Axis(1)));
    }
    if have == 1 && num_channels == 2 {
        let column = samples.column(0);
        return Ok(Array2::from_shape_fn((samples.nrows(), 2), |(t, _)| column[t]));
    }
    Err(Error::Audio(format!("cannot convert {have} channels to {num_channels}")))
}

/// Scale so the largest magnitude is 1; silent audio is left unchanged
pub fn peak_normalize(samples: &mut Array2<f32>) {
    let peak = samples.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    if peak > 0.0 {
        samples.mapv_inplace(|v| v / peak);
    }
}

/// Write `(frames, channels)` audio as 16-bit PCM, clipping to `[-1, 1]`
pub fn write_wav(path: impl AsRef<Path>, samples: ArrayView2<'_, f32>, sample_rate: u32) -> Result<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: samples.ncols() as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let encode_err = |e: hound::Error| Error::Audio(format!("'{}': {e}", path.display()));
    let mut writer = hound::WavWriter::create(path, spec).map_err(encode_err)?;
    for frame in samples.rows() {
        for &v in frame {
            let pcm = (v.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            writer.write_sample(pcm).map_err(encode_err)?;
        }
    }
    writer.finalize().map_err(encode_err)
}
