//! CTC Forced Alignment
//!
//! This crate finds the single most likely alignment between per-frame
//! class log-probabilities (e.g. the output of a CTC acoustic model) and a
//! known label sequence.
//!
//! ## Core idea
//! 1. Expand the L target labels into a lattice of 2L + 1 states that
//!    alternate blank and label ([`lattice::Lattice`]).
//! 2. Run a Viterbi forward pass over the T frames, keeping two rows of
//!    scores and a T × (2L + 1) table of back-pointers ([`AlignEngine`]).
//!    Only states that can still lie on a complete path are evaluated
//!    ([`window::AdmissibleWindow`]).
//! 3. Backtrack from the better terminal state to recover one label per
//!    frame.
//!
//! ## Quick start
//! ```
//! use ctc_forced_align::forced_align;
//! use ndarray::array;
//!
//! // 4 frames over the classes {blank, a, b}
//! let log_probs = array![
//!     [-0.2f32, -1.9, -2.5],
//!     [-2.1, -0.3, -1.6],
//!     [-1.2, -2.2, -0.4],
//!     [-0.1, -2.6, -2.9],
//! ];
//! let targets = array![1i32, 2];
//! let out = forced_align(log_probs.view(), targets.view(), 4, 2, 0).unwrap();
//! assert_eq!(out.path.to_vec(), vec![0, 1, 2, 0]);
//! assert_eq!(out.scores[1], -0.3);
//! ```
//!
//! ## Entry points
//! - [`forced_align`]: typed API over `ndarray` views, generic over the float
//!   width (`f16`, `f32`, `f64`) and index width (`i32`, `i64`).
//! - [`dispatch::forced_align_dyn`]: same, with dtypes and ranks chosen at
//!   runtime.
//! - [`AlignEngine`] / [`AlignEngineBuilder`]: the engine on its own, exposing
//!   lattice states and the path score.
//! - [`spans`]: CTC collapse and token span merging over a returned path.

pub mod align;
pub mod backptr;
pub mod builder;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod lattice;
pub mod spans;
pub mod traits;
pub mod utils;
pub mod window;

pub use crate::align::{forced_align, ForcedAlignment};
pub use crate::builder::AlignEngineBuilder;
pub use crate::engine::{AlignEngine, Alignment};
pub use crate::error::{AlignError, Result};
pub use crate::traits::{Label, LogProb};
