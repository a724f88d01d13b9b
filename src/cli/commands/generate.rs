//! Generate command implementation

use crate::autograd::Context;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{restore_generator, GenerateArgs};
use crate::data::write_wav;
use crate::generative::LatentBatch;
use ndarray::{s, Array3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// Render `num` clips from the run's generator with uniform latents
pub fn render(run_dir: &Path, num: usize, seed: u64) -> crate::Result<(Array3<f32>, u32)> {
    let (config, generator) = restore_generator(run_dir)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let z = LatentBatch::sample_uniform(&mut rng, num, config.model.latent_dim);
    let mut ctx = Context::with_seed(seed);
    ctx.eval();
    Ok((generator.generate(&z, &ctx)?, config.data.sample_rate))
}

/// Write each clip of `audio` as `<dir>/sample_<i>.wav`
pub fn write_clips(dir: &Path, audio: &Array3<f32>, sample_rate: u32) -> crate::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    (0..audio.dim().0)
        .map(|i| {
            let path = dir.join(format!("sample_{i:03}.wav"));
            write_wav(&path, audio.slice(s![i, .., ..]), sample_rate)?;
            Ok(path)
        })
        .collect()
}

pub fn run_generate(args: GenerateArgs, level: LogLevel) -> Result<(), String> {
    if args.num == 0 {
        return Err("Nothing to generate: -n must be at least 1".to_string());
    }
    log(level, LogLevel::Normal, &format!("Generating {} clip(s) from {}", args.num, args.run_dir.display()));

    let seed = args.seed.unwrap_or_else(rand::random);
    let (audio, sample_rate) = render(&args.run_dir, args.num, seed).map_err(|e| format!("Generation error: {e}"))?;
    let paths = write_clips(&args.output, &audio, sample_rate).map_err(|e| format!("Write error: {e}"))?;

    for path in &paths {
        log(level, LogLevel::Verbose, &format!("  {}", path.display()));
    }
    log(level, LogLevel::Normal, &format!("Wrote {} file(s) to {}", paths.len(), args.output.display()));
    Ok(())
}
