//! Snapshot round trips through the public API

use fiwgan::autograd::Context;
use fiwgan::generative::{BatchGeometry, ModelConfig, Network, TrainingState};
use fiwgan::io::{load_network, read_metadata, save_training_state, snapshot_path};
use ndarray::{Array2, Array3};
use tempfile::TempDir;

fn model() -> ModelConfig {
    ModelConfig { latent_dim: 4, num_categ: 2, dim: 2, use_batchnorm: true, ..Default::default() }
}

fn state(seed: u64) -> TrainingState {
    TrainingState::new(&model(), BatchGeometry::new(2, 16384, 1), Some(seed)).expect("state")
}

fn values(network: &dyn Network) -> Vec<(String, Vec<f32>)> {
    network.named_state().into_iter().map(|(n, t)| (n, t.to_vec())).collect()
}

#[test]
fn trained_state_restores_exactly() {
    let dir = TempDir::new().expect("temp dir");
    let mut trained = state(1);
    trained.train_step(&Array3::from_elem((2, 16384, 1), 0.1)).expect("step");
    let paths = save_training_state(&trained, dir.path()).expect("save");
    assert_eq!(paths.len(), 3);

    let fresh = state(99);
    assert_ne!(values(&fresh.generator), values(&trained.generator));
    let networks: [&dyn Network; 3] = [&fresh.generator, &fresh.discriminator, &fresh.q_network];
    for network in networks {
        let metadata = load_network(network, snapshot_path(dir.path(), network.name())).expect("load");
        assert_eq!(metadata.step, 1);
        assert_eq!(metadata.network, network.name());
    }
    assert_eq!(values(&fresh.generator), values(&trained.generator));
    assert_eq!(values(&fresh.discriminator), values(&trained.discriminator));
    assert_eq!(values(&fresh.q_network), values(&trained.q_network));

    let mut ctx = Context::with_seed(0);
    ctx.eval();
    let z = Array2::from_elem((1, 4), 0.5);
    assert_eq!(
        fresh.generator.generate(&z, &ctx).expect("generate"),
        trained.generator.generate(&z, &ctx).expect("generate")
    );
}

#[test]
fn later_snapshot_overwrites_earlier() {
    let dir = TempDir::new().expect("temp dir");
    let mut state = state(2);
    save_training_state(&state, dir.path()).expect("save");
    state.train_step(&Array3::zeros((2, 16384, 1))).expect("step");
    state.train_step(&Array3::zeros((2, 16384, 1))).expect("step");
    save_training_state(&state, dir.path()).expect("save again");

    let metadata = read_metadata(snapshot_path(dir.path(), "discriminator")).expect("metadata");
    assert_eq!(metadata.step, 2);
}
