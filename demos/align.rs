//! Example: force-align a short utterance and print token spans.
//!
//! Run with:
//! `cargo run --example align`

use ctc_forced_align::{
    forced_align,
    spans::{collapse, merge_tokens},
};
use ndarray::array;

fn main() {
    // Vocabulary: 0 = blank, 1 = 'c', 2 = 'a', 3 = 't'.
    //
    // Each row is a log-probability distribution over the vocabulary for one
    // frame. In real use these come from a CTC acoustic model.
    let log_probs = array![
        [-0.05f32, -3.5, -4.0, -4.2],
        [-2.9, -0.08, -3.8, -4.1],
        [-2.2, -0.2, -3.0, -3.9],
        [-0.3, -2.4, -1.9, -4.0],
        [-3.1, -3.6, -0.07, -3.9],
        [-0.6, -3.9, -1.1, -2.7],
        [-3.3, -4.0, -3.7, -0.06],
        [-0.04, -4.1, -3.9, -3.6],
    ];
    let targets = array![1i32, 2, 3];
    let labels = ['∅', 'c', 'a', 't'];

    let out = forced_align(log_probs.view(), targets.view(), 8, 3, 0)
        .expect("cat fits in 8 frames");

    println!("Path log-probability: {:.3}", out.total_score());
    println!("Frame alignment:");
    for (t, (&label, &score)) in out.path.iter().zip(out.scores.iter()).enumerate() {
        println!("  t = {t}, label = {}, log p = {score:.3}", labels[label as usize]);
    }

    let path = out.path.to_vec();
    let decoded: String = collapse(&path, 0)
        .into_iter()
        .map(|l| labels[l as usize])
        .collect();
    println!("Decoded: {decoded}");

    let scores = out.scores.to_vec();
    println!("Token spans:");
    for span in merge_tokens(&path, &scores, 0) {
        println!(
            "  {} frames [{}, {}) score {:.3}",
            labels[span.token as usize], span.start, span.end, span.score
        );
    }
}
