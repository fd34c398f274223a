#![cfg(feature = "heavy")]
use ctc_forced_align::{spans::collapse, AlignEngine};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_log_probs(rng: &mut StdRng, frames: usize, classes: usize) -> Array2<f32> {
    Array2::from_shape_fn((frames, classes), |_| rng.gen_range(-9.0f32..-0.01))
}

fn random_targets(rng: &mut StdRng, len: usize, classes: usize) -> Vec<i64> {
    (0..len).map(|_| rng.gen_range(1..classes as i64)).collect()
}

#[test]
fn heavy_stress_long_utterance() {
    let mut rng = StdRng::seed_from_u64(123);
    let log_probs = random_log_probs(&mut rng, 20_000, 40);
    let targets = random_targets(&mut rng, 3_000, 40);
    let alignment = AlignEngine::new(log_probs.view(), &targets, 0).unwrap().run();
    assert_eq!(alignment.len(), 20_000);
    assert!(alignment.score().is_finite());
    assert_eq!(collapse(alignment.labels(), 0), targets);
}
