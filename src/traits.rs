//! Numeric trait definitions for the alignment engine.
//!
//! The engine is generic over two independent axes:
//! - [`LogProb`]: the floating-point type of scores and log-probabilities
//!   (`f32`, `f64`, `half::f16`).
//! - [`Label`]: the integer type of target labels and of the output path
//!   (`i32`, `i64`).
//!
//! Each combination is monomorphized separately, so the inner DP loop never
//! branches on the numeric width at runtime.

use std::fmt::Debug;

use num_traits::Float;

/// Floating-point type usable for log-probabilities.
///
/// Any [`num_traits::Float`] qualifies; this covers `f32`, `f64` and
/// `half::f16`. Negative infinity is the log-domain zero and must survive
/// `-inf + finite = -inf`, which IEEE arithmetic guarantees for all three.
///
/// Path scores accumulate in `Self`. With `f16` the running sum stops moving
/// once its magnitude passes 2^14 (the spacing there exceeds twice a typical
/// per-frame log-probability), so long `f16` alignments report a truncated
/// total. The path is still exact; sum the per-frame scores in `f64` when the
/// total matters.
pub trait LogProb: Float + Debug + Send + Sync + 'static {
    /// Log-domain representation of an unreachable state.
    #[inline]
    fn unreachable() -> Self {
        Self::neg_infinity()
    }

    /// Returns true if this score marks an unreachable state.
    #[inline]
    fn is_unreachable(self) -> bool {
        self == Self::neg_infinity()
    }

    /// Widen to `f64`, e.g. for summaries and reporting.
    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl<T> LogProb for T where T: Float + Debug + Send + Sync + 'static {}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}

/// Integer type of target labels and output paths.
///
/// Sealed: only `i32` and `i64` are supported.
pub trait Label: Copy + Eq + Debug + Send + Sync + 'static + sealed::Sealed {
    /// Short dtype name, as used by [`crate::dispatch::IndexDType`].
    const DTYPE: &'static str;

    /// Class index of this label, or `None` if it is negative.
    fn to_index(self) -> Option<usize>;

    /// Label for a class index, or `None` if the index does not fit.
    fn from_index(index: usize) -> Option<Self>;

    /// Widen to `i64` for error messages.
    fn to_i64(self) -> i64;
}

impl Label for i32 {
    const DTYPE: &'static str = "int32";

    #[inline]
    fn to_index(self) -> Option<usize> {
        usize::try_from(self).ok()
    }

    #[inline]
    fn from_index(index: usize) -> Option<Self> {
        i32::try_from(index).ok()
    }

    #[inline]
    fn to_i64(self) -> i64 {
        i64::from(self)
    }
}

impl Label for i64 {
    const DTYPE: &'static str = "int64";

    #[inline]
    fn to_index(self) -> Option<usize> {
        usize::try_from(self).ok()
    }

    #[inline]
    fn from_index(index: usize) -> Option<Self> {
        i64::try_from(index).ok()
    }

    #[inline]
    fn to_i64(self) -> i64 {
        self
    }
}
