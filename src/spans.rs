//! Post-processing of an aligned path.
//!
//! - [`collapse`] applies CTC decoding: merge runs of the same label, then
//!   drop blanks. For a forced alignment this gives back the target.
//! - [`merge_tokens`] turns the path into one [`TokenSpan`] per emitted
//!   label, with frame boundaries and a confidence score.

use crate::traits::{Label, LogProb};

/// A run of consecutive frames emitting the same non-blank label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenSpan<I> {
    pub token: I,
    /// First frame of the run.
    pub start: usize,
    /// One past the last frame of the run.
    pub end: usize,
    /// Mean per-frame probability over the run.
    pub score: f64,
}

impl<I> TokenSpan<I> {
    /// Number of frames covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// CTC-decode `path`: merge adjacent duplicates, then remove `blank`.
pub fn collapse<I: Label>(path: &[I], blank: I) -> Vec<I> {
    let mut out = Vec::new();
    let mut prev = None;
    for &label in path {
        if prev != Some(label) && label != blank {
            out.push(label);
        }
        prev = Some(label);
    }
    out
}

/// Group `path` into spans of identical non-blank labels.
///
/// `scores` are the per-frame log-probabilities returned alongside the path;
/// each span's score is the mean of their exponentials.
///
/// # Panics
/// Panics if `path` and `scores` differ in length.
pub fn merge_tokens<I: Label, F: LogProb>(path: &[I], scores: &[F], blank: I) -> Vec<TokenSpan<I>> {
    assert_eq!(
        path.len(),
        scores.len(),
        "path and scores must have the same length"
    );

    let mut spans = Vec::new();
    let mut start = 0;
    while start < path.len() {
        let token = path[start];
        let end = path[start..]
            .iter()
            .position(|&l| l != token)
            .map_or(path.len(), |offset| start + offset);
        if token != blank {
            let total: f64 = scores[start..end]
                .iter()
                .map(|s| s.to_f64_lossy().exp())
                .sum();
            spans.push(TokenSpan {
                token,
                start,
                end,
                score: total / (end - start) as f64,
            });
        }
        start = end;
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(frames = path.len(), spans = spans.len(), "merged token spans");

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_keeps_blank_separated_repeats() {
        assert_eq!(collapse(&[0i32, 3, 3, 0, 3, 5, 5, 0], 0), vec![3, 3, 5]);
        assert_eq!(collapse(&[0i64, 0, 0], 0), Vec::<i64>::new());
        assert_eq!(collapse::<i32>(&[], 0), Vec::<i32>::new());
    }

    #[test]
    fn spans_cover_label_runs() {
        let path = [0i32, 7, 7, 0, 7, 2];
        let scores = [0.0f64, 0.5f64.ln(), 1.0f64.ln(), 0.0, 0.25f64.ln(), 0.0];
        let spans = merge_tokens(&path, &scores, 0);
        assert_eq!(spans.len(), 3);
        assert_eq!((spans[0].token, spans[0].start, spans[0].end), (7, 1, 3));
        assert!((spans[0].score - 0.75).abs() < 1e-12);
        assert_eq!((spans[1].start, spans[1].end), (4, 5));
        assert!((spans[1].score - 0.25).abs() < 1e-12);
        assert_eq!(spans[2].len(), 1);
        assert_eq!(spans[2].token, 2);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn mismatched_lengths_panic() {
        merge_tokens(&[0i32, 1], &[0.0f32], 0);
    }
}
