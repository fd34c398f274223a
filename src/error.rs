//! Error type shared by the engine and the orchestration layer.

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, AlignError>;

/// Every way an alignment request can be rejected.
///
/// All variants are raised before any DP work starts; the engine itself is
/// total once its inputs pass these checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    #[error(
        "targets length is too long for CTC. Found input length: {input_len}, \
         targets length: {target_len}, and number of repeats: {repeats}"
    )]
    InfeasibleLength {
        input_len: usize,
        target_len: usize,
        repeats: usize,
    },

    #[error("blank must be within [0, {num_classes}), got {blank}")]
    BlankOutOfRange { blank: usize, num_classes: usize },

    #[error("target label {label} at position {position} is outside [0, {num_classes})")]
    TargetOutOfRange {
        position: usize,
        label: i64,
        num_classes: usize,
    },

    #[error("{name} must be contiguous")]
    NonContiguous { name: &'static str },

    #[error("{name} must be {expected}-D, got {actual}-D{hint}")]
    Dimensionality {
        name: &'static str,
        expected: usize,
        actual: usize,
        hint: &'static str,
    },

    #[error("input length mismatch: log_probs has {actual} frames, input length is {declared}")]
    InputLengthMismatch { declared: usize, actual: usize },

    #[error("target length mismatch: targets has {actual} labels, target length is {declared}")]
    TargetLengthMismatch { declared: usize, actual: usize },

    #[error("unsupported dtype '{dtype}' for {name}; expected one of {expected}")]
    UnsupportedDtype {
        name: &'static str,
        dtype: String,
        expected: &'static str,
    },
}
