use ndarray::ArrayView2;

use crate::error::Result;
use crate::traits::{Label, LogProb};
use crate::AlignEngine;

/// Fluent construction of an [`AlignEngine`].
///
/// Defaults: blank = 0, pruning enabled.
pub struct AlignEngineBuilder<'a, F: LogProb, I: Label> {
    log_probs: ArrayView2<'a, F>,
    targets: &'a [I],
    blank: usize,
    pruning: bool,
}

impl<'a, F: LogProb, I: Label> AlignEngineBuilder<'a, F, I> {
    pub fn new(log_probs: ArrayView2<'a, F>, targets: &'a [I]) -> Self {
        Self {
            log_probs,
            targets,
            blank: 0,
            pruning: true,
        }
    }
    pub fn with_blank(mut self, blank: usize) -> Self {
        self.blank = blank;
        self
    }
    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }
    pub fn build(self) -> Result<AlignEngine<'a, F, I>> {
        AlignEngine::with_pruning(self.log_probs, self.targets, self.blank, self.pruning)
    }
}
