//! Typed entry point: validate, run the engine, gather per-frame scores.
//!
//! [`forced_align`] is the boundary between callers holding arbitrary
//! `ndarray` views and the [`AlignEngine`], which assumes its inputs have
//! already been checked for layout and declared lengths.

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::{AlignError, Result};
use crate::traits::{Label, LogProb};
use crate::AlignEngine;

/// Output of [`forced_align`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForcedAlignment<I, F> {
    /// Label emitted at each timestep; blank or a target label.
    pub path: Array1<I>,
    /// `log_probs[t, path[t]]` for each timestep.
    pub scores: Array1<F>,
}

impl<I, F: LogProb> ForcedAlignment<I, F> {
    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Sum of the per-frame scores, i.e. the log-probability of the path.
    pub fn total_score(&self) -> F {
        self.scores.iter().fold(F::zero(), |acc, &s| acc + s)
    }
}

/// Align `log_probs` (T × C) to `targets` (L) with the given `blank` class.
///
/// `input_length` and `target_length` are the caller's declared extents and
/// must match the arrays exactly.
///
/// # Errors
/// - [`AlignError::NonContiguous`] if either array is not in standard layout.
/// - [`AlignError::InputLengthMismatch`] / [`AlignError::TargetLengthMismatch`]
///   if a declared length disagrees with the array.
/// - [`AlignError::BlankOutOfRange`] / [`AlignError::TargetOutOfRange`] for
///   class indices outside `[0, C)`.
/// - [`AlignError::InfeasibleLength`] if T < L + R.
pub fn forced_align<'a, F: LogProb, I: Label>(
    log_probs: ArrayView2<'a, F>,
    targets: ArrayView1<'a, I>,
    input_length: usize,
    target_length: usize,
    blank: usize,
) -> Result<ForcedAlignment<I, F>> {
    if !log_probs.is_standard_layout() {
        return Err(reject(AlignError::NonContiguous { name: "log_probs" }));
    }
    let targets = targets
        .to_slice()
        .ok_or_else(|| reject(AlignError::NonContiguous { name: "targets" }))?;
    if log_probs.nrows() != input_length {
        return Err(reject(AlignError::InputLengthMismatch {
            declared: input_length,
            actual: log_probs.nrows(),
        }));
    }
    if targets.len() != target_length {
        return Err(reject(AlignError::TargetLengthMismatch {
            declared: target_length,
            actual: targets.len(),
        }));
    }

    let engine = AlignEngine::new(log_probs, targets, blank).map_err(reject)?;
    let alignment = engine.run();

    let lattice = engine.lattice();
    let scores = alignment
        .states()
        .iter()
        .enumerate()
        .map(|(t, &state)| log_probs[[t, lattice.class(state)]])
        .collect::<Array1<F>>();

    Ok(ForcedAlignment {
        path: Array1::from(alignment.into_labels()),
        scores,
    })
}

#[inline]
fn reject(err: AlignError) -> AlignError {
    #[cfg(feature = "tracing")]
    tracing::debug!(error = %err, "rejecting alignment request");
    err
}
