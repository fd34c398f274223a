//! Runtime dtype dispatch over dynamically-shaped inputs.
//!
//! Callers that only know the element types at runtime (for example when
//! arrays come from a model runtime or a file) wrap them in [`LogProbs`] and
//! [`Targets`]. [`forced_align_dyn`] checks dimensionality, then forwards to
//! one of the six monomorphized [`forced_align`] instances:
//!
//! | log_probs            | targets        |
//! |----------------------|----------------|
//! | f16, f32, f64        | i32, i64       |
//!
//! The output path keeps the target's index width and the scores keep the
//! log-probability width.

use std::fmt;
use std::str::FromStr;

use half::f16;
use ndarray::{Array1, ArrayD, ArrayView1, ArrayView2, Ix1, Ix2};

use crate::align::forced_align;
use crate::error::{AlignError, Result};
use crate::traits::{Label, LogProb};

const BATCHED_HINT: &str = " (batched input is not supported)";

/// Floating-point width of log-probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatDType {
    F16,
    F32,
    F64,
}

impl FloatDType {
    pub fn name(self) -> &'static str {
        match self {
            FloatDType::F16 => "float16",
            FloatDType::F32 => "float32",
            FloatDType::F64 => "float64",
        }
    }
}

impl fmt::Display for FloatDType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FloatDType {
    type Err = AlignError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "float16" | "f16" | "half" => Ok(Self::F16),
            "float32" | "f32" | "float" => Ok(Self::F32),
            "float64" | "f64" | "double" => Ok(Self::F64),
            other => Err(AlignError::UnsupportedDtype {
                name: "log_probs",
                dtype: other.to_string(),
                expected: "float16, float32, float64",
            }),
        }
    }
}

/// Integer width of targets and output paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexDType {
    I32,
    I64,
}

impl IndexDType {
    pub fn name(self) -> &'static str {
        match self {
            IndexDType::I32 => i32::DTYPE,
            IndexDType::I64 => i64::DTYPE,
        }
    }
}

impl fmt::Display for IndexDType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndexDType {
    type Err = AlignError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "int32" | "i32" | "int" => Ok(Self::I32),
            "int64" | "i64" | "long" => Ok(Self::I64),
            other => Err(AlignError::UnsupportedDtype {
                name: "targets",
                dtype: other.to_string(),
                expected: "int32, int64",
            }),
        }
    }
}

/// Log-probabilities of any supported width and any rank.
#[derive(Debug, Clone, PartialEq)]
pub enum LogProbs {
    F16(ArrayD<f16>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl LogProbs {
    pub fn dtype(&self) -> FloatDType {
        match self {
            LogProbs::F16(_) => FloatDType::F16,
            LogProbs::F32(_) => FloatDType::F32,
            LogProbs::F64(_) => FloatDType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            LogProbs::F16(a) => a.shape(),
            LogProbs::F32(a) => a.shape(),
            LogProbs::F64(a) => a.shape(),
        }
    }
}

impl From<ArrayD<f16>> for LogProbs {
    fn from(value: ArrayD<f16>) -> Self {
        LogProbs::F16(value)
    }
}

impl From<ArrayD<f32>> for LogProbs {
    fn from(value: ArrayD<f32>) -> Self {
        LogProbs::F32(value)
    }
}

impl From<ArrayD<f64>> for LogProbs {
    fn from(value: ArrayD<f64>) -> Self {
        LogProbs::F64(value)
    }
}

/// Target labels of either supported width and any rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
}

impl Targets {
    pub fn dtype(&self) -> IndexDType {
        match self {
            Targets::I32(_) => IndexDType::I32,
            Targets::I64(_) => IndexDType::I64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Targets::I32(a) => a.shape(),
            Targets::I64(a) => a.shape(),
        }
    }
}

impl From<ArrayD<i32>> for Targets {
    fn from(value: ArrayD<i32>) -> Self {
        Targets::I32(value)
    }
}

impl From<ArrayD<i64>> for Targets {
    fn from(value: ArrayD<i64>) -> Self {
        Targets::I64(value)
    }
}

/// Aligned path, in the index width of the targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignedPath {
    I32(Array1<i32>),
    I64(Array1<i64>),
}

impl AlignedPath {
    pub fn dtype(&self) -> IndexDType {
        match self {
            AlignedPath::I32(_) => IndexDType::I32,
            AlignedPath::I64(_) => IndexDType::I64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AlignedPath::I32(p) => p.len(),
            AlignedPath::I64(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec_i64(&self) -> Vec<i64> {
        match self {
            AlignedPath::I32(p) => p.iter().map(|&v| i64::from(v)).collect(),
            AlignedPath::I64(p) => p.to_vec(),
        }
    }
}

/// Per-frame scores, in the float width of the log-probabilities.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameScores {
    F16(Array1<f16>),
    F32(Array1<f32>),
    F64(Array1<f64>),
}

impl FrameScores {
    pub fn dtype(&self) -> FloatDType {
        match self {
            FrameScores::F16(_) => FloatDType::F16,
            FrameScores::F32(_) => FloatDType::F32,
            FrameScores::F64(_) => FloatDType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FrameScores::F16(s) => s.len(),
            FrameScores::F32(s) => s.len(),
            FrameScores::F64(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec_f64(&self) -> Vec<f64> {
        match self {
            FrameScores::F16(s) => s.iter().map(|&v| f64::from(v)).collect(),
            FrameScores::F32(s) => s.iter().map(|&v| f64::from(v)).collect(),
            FrameScores::F64(s) => s.to_vec(),
        }
    }
}

/// Align inputs whose dtypes and ranks are only known at runtime.
///
/// `log_probs` must be 2-D (T, C) and `targets` 1-D (L). The remaining checks
/// are those of [`forced_align`].
pub fn forced_align_dyn(
    log_probs: &LogProbs,
    targets: &Targets,
    input_length: usize,
    target_length: usize,
    blank: usize,
) -> Result<(AlignedPath, FrameScores)> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "forced_align_dyn",
        log_probs = %log_probs.dtype(),
        targets = %targets.dtype()
    )
    .entered();

    match log_probs {
        // Accumulates in f16; see `LogProb` for the precision limit on totals.
        LogProbs::F16(lp) => align_with(lp, targets, input_length, target_length, blank)
            .map(|(path, scores)| (path, FrameScores::F16(scores))),
        LogProbs::F32(lp) => align_with(lp, targets, input_length, target_length, blank)
            .map(|(path, scores)| (path, FrameScores::F32(scores))),
        LogProbs::F64(lp) => align_with(lp, targets, input_length, target_length, blank)
            .map(|(path, scores)| (path, FrameScores::F64(scores))),
    }
}

fn align_with<F: LogProb>(
    log_probs: &ArrayD<F>,
    targets: &Targets,
    input_length: usize,
    target_length: usize,
    blank: usize,
) -> Result<(AlignedPath, Array1<F>)> {
    let matrix = as_matrix(log_probs)?;
    match targets {
        Targets::I32(t) => {
            let out = forced_align(matrix, as_sequence(t)?, input_length, target_length, blank)?;
            Ok((AlignedPath::I32(out.path), out.scores))
        }
        Targets::I64(t) => {
            let out = forced_align(matrix, as_sequence(t)?, input_length, target_length, blank)?;
            Ok((AlignedPath::I64(out.path), out.scores))
        }
    }
}

fn as_matrix<F>(array: &ArrayD<F>) -> Result<ArrayView2<'_, F>> {
    let err = AlignError::Dimensionality {
        name: "log_probs",
        expected: 2,
        actual: array.ndim(),
        hint: if array.ndim() == 3 { BATCHED_HINT } else { "" },
    };
    if array.ndim() != 2 {
        return Err(err);
    }
    array.view().into_dimensionality::<Ix2>().map_err(|_| err)
}

fn as_sequence<I>(array: &ArrayD<I>) -> Result<ArrayView1<'_, I>> {
    let err = AlignError::Dimensionality {
        name: "targets",
        expected: 1,
        actual: array.ndim(),
        hint: if array.ndim() == 2 { BATCHED_HINT } else { "" },
    };
    if array.ndim() != 1 {
        return Err(err);
    }
    array.view().into_dimensionality::<Ix1>().map_err(|_| err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn dtype_names_round_trip() {
        for dtype in [FloatDType::F16, FloatDType::F32, FloatDType::F64] {
            assert_eq!(dtype.name().parse::<FloatDType>().unwrap(), dtype);
        }
        for dtype in [IndexDType::I32, IndexDType::I64] {
            assert_eq!(dtype.to_string().parse::<IndexDType>().unwrap(), dtype);
        }
        assert!(matches!(
            "bfloat16".parse::<FloatDType>(),
            Err(AlignError::UnsupportedDtype { name: "log_probs", .. })
        ));
        assert!(matches!(
            "uint8".parse::<IndexDType>(),
            Err(AlignError::UnsupportedDtype { name: "targets", .. })
        ));
    }

    #[test]
    fn output_widths_follow_inputs() {
        let log_probs = LogProbs::from(
            array![[-0.1f32, -3.0], [-3.0, -0.1], [-0.1, -3.0]].into_dyn(),
        );
        let targets = Targets::from(array![1i64].into_dyn());
        let (path, scores) = forced_align_dyn(&log_probs, &targets, 3, 1, 0).unwrap();
        assert_eq!(path.dtype(), IndexDType::I64);
        assert_eq!(scores.dtype(), FloatDType::F32);
        assert_eq!(path.to_vec_i64(), vec![0, 1, 0]);
        assert_eq!(scores.len(), 3);
    }

    #[test]
    fn rejects_batched_inputs() {
        let log_probs = LogProbs::from(Array3::<f64>::zeros((2, 3, 4)).into_dyn());
        let targets = Targets::from(array![1i32].into_dyn());
        let err = forced_align_dyn(&log_probs, &targets, 3, 1, 0).unwrap_err();
        assert_eq!(
            err,
            AlignError::Dimensionality {
                name: "log_probs",
                expected: 2,
                actual: 3,
                hint: BATCHED_HINT
            }
        );

        let log_probs = LogProbs::from(ndarray::Array2::<f64>::zeros((3, 4)).into_dyn());
        let targets = Targets::from(array![[1i32]].into_dyn());
        let err = forced_align_dyn(&log_probs, &targets, 3, 1, 0).unwrap_err();
        assert!(err.to_string().starts_with("targets must be 1-D, got 2-D"));
    }

    #[test]
    fn rejects_scalar_log_probs() {
        let log_probs = LogProbs::from(ndarray::arr0(0.0f32).into_dyn());
        let targets = Targets::from(array![0i32].into_dyn());
        let err = forced_align_dyn(&log_probs, &targets, 1, 1, 0).unwrap_err();
        assert_eq!(err.to_string(), "log_probs must be 2-D, got 0-D");
    }
}
