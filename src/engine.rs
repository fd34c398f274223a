//! Viterbi forced-alignment engine over the expanded CTC lattice.
//!
//! The engine runs in two phases:
//! 1. A forward pass that keeps two rows of scores (previous and current
//!    timestep) and a full T × S table of back-pointers.
//! 2. A backtrack from the better of the two terminal states that replays the
//!    back-pointers into one lattice state per timestep.
//!
//! The forward pass only touches states inside the [`AdmissibleWindow`] of
//! each timestep. Pruning can be switched off, in which case every state is
//! evaluated; both modes return the same alignment for finite inputs.

use ndarray::ArrayView2;

use crate::backptr::{BackPointers, Step};
use crate::error::Result;
use crate::lattice::Lattice;
use crate::traits::{Label, LogProb};
use crate::window::AdmissibleWindow;

/// Forced-alignment engine for one (log-probabilities, targets) pair.
///
/// Typical usage:
/// ```
/// use ctc_forced_align::AlignEngine;
/// use ndarray::array;
///
/// let log_probs = array![
///     [-0.1f32, -2.5, -3.0],
///     [-2.5, -0.1, -3.0],
///     [-0.1, -2.5, -3.0],
/// ];
/// let targets = [1i32];
/// let engine = AlignEngine::new(log_probs.view(), &targets, 0).unwrap();
/// let alignment = engine.run();
/// assert_eq!(alignment.labels(), &[0, 1, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct AlignEngine<'a, F: LogProb, I: Label> {
    log_probs: ArrayView2<'a, F>,
    lattice: Lattice<'a, I>,
    pruning: bool,
}

/// Result of a forward pass and backtrack.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment<I, F> {
    states: Vec<usize>,
    labels: Vec<I>,
    score: F,
}

impl<I, F: Copy> Alignment<I, F> {
    /// Lattice state visited at each timestep.
    pub fn states(&self) -> &[usize] {
        &self.states
    }

    /// Class label emitted at each timestep (blank or a target label).
    pub fn labels(&self) -> &[I] {
        &self.labels
    }

    /// Total log-probability of the path.
    pub fn score(&self) -> F {
        self.score
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn into_labels(self) -> Vec<I> {
        self.labels
    }
}

impl<'a, F: LogProb, I: Label> AlignEngine<'a, F, I> {
    /// Create an engine with window pruning enabled.
    ///
    /// # Errors
    /// - [`BlankOutOfRange`](crate::AlignError::BlankOutOfRange) /
    ///   [`TargetOutOfRange`](crate::AlignError::TargetOutOfRange) if a class
    ///   index falls outside the columns of `log_probs`.
    /// - [`InfeasibleLength`](crate::AlignError::InfeasibleLength) if the
    ///   timesteps cannot cover the targets (T < L + R).
    pub fn new(log_probs: ArrayView2<'a, F>, targets: &'a [I], blank: usize) -> Result<Self> {
        Self::with_pruning(log_probs, targets, blank, true)
    }

    /// Create an engine with explicit control over window pruning.
    pub fn with_pruning(
        log_probs: ArrayView2<'a, F>,
        targets: &'a [I],
        blank: usize,
        pruning: bool,
    ) -> Result<Self> {
        let (num_frames, num_classes) = log_probs.dim();
        let lattice = Lattice::new(targets, blank, num_classes)?;
        lattice.check_feasible(num_frames)?;
        Ok(Self {
            log_probs,
            lattice,
            pruning,
        })
    }

    pub fn lattice(&self) -> &Lattice<'a, I> {
        &self.lattice
    }

    /// Number of timesteps T.
    pub fn num_frames(&self) -> usize {
        self.log_probs.nrows()
    }

    pub fn pruning(&self) -> bool {
        self.pruning
    }

    /// Run the forward pass and backtrack.
    ///
    /// Returns an alignment of exactly T timesteps. With T = 0 (only possible
    /// for an empty target) the alignment is empty with score 0.
    pub fn run(&self) -> Alignment<I, F> {
        let num_frames = self.num_frames();
        if num_frames == 0 {
            return Alignment {
                states: Vec::new(),
                labels: Vec::new(),
                score: F::zero(),
            };
        }

        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!(
            "align_run",
            frames = num_frames,
            states = self.lattice.len(),
            pruning = self.pruning
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let (rows, back) = self.forward();

        let last = rows.row(num_frames - 1);
        let terminal = terminal_state(last);
        let score = last[terminal];

        let states = {
            #[cfg(feature = "tracing")]
            let _span = tracing::trace_span!("backtrack", terminal).entered();
            back.trace(terminal)
        };
        let labels = states.iter().map(|&s| self.lattice.label(s)).collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(terminal, score = score.to_f64_lossy(), "alignment complete");

        Alignment {
            states,
            labels,
            score,
        }
    }

    /// Fill the back-pointer table; return it with the final score rows.
    fn forward(&self) -> (ScoreRows<F>, BackPointers) {
        let num_frames = self.num_frames();
        let lattice = &self.lattice;
        let mut rows = ScoreRows::new(lattice.len());
        let mut back = BackPointers::new(num_frames, lattice.len());
        let mut window = AdmissibleWindow::initial(lattice, num_frames, self.pruning);

        let emit = self.log_probs.row(0);
        let seed = rows.row_mut(0);
        for state in window.range() {
            seed[state] = emit[lattice.class(state)];
        }

        let blank_class = lattice.class(0);
        for t in 1..num_frames {
            window.advance(t, lattice, num_frames);
            let emit = self.log_probs.row(t);
            let (prev, cur) = rows.split(t);
            cur.fill(F::unreachable());

            let mut from = window.start();
            if from == 0 {
                cur[0] = prev[0] + emit[blank_class];
                back.set(t, 0, Step::Stay);
                from = 1;
            }
            for state in from..window.end() {
                let (step, best) = best_predecessor(prev, state, lattice.skip_allowed(state));
                back.set(t, state, step);
                cur[state] = best + emit[lattice.class(state)];
            }
        }

        (rows, back)
    }
}

/// Pick the best of stay / advance / skip into `state` (state ≥ 1).
///
/// Ties resolve Skip > Advance > Stay. An unreachable candidate never beats
/// another one, so Stay is returned when nothing is reachable.
#[inline]
fn best_predecessor<F: LogProb>(prev: &[F], state: usize, skip_allowed: bool) -> (Step, F) {
    let stay = prev[state];
    let advance = prev[state - 1];
    if skip_allowed {
        let skip = prev[state - 2];
        if !skip.is_unreachable() && skip >= advance && skip >= stay {
            return (Step::Skip, skip);
        }
    }
    if !advance.is_unreachable() && advance >= stay {
        (Step::Advance, advance)
    } else {
        (Step::Stay, stay)
    }
}

/// Final state: the trailing blank or the last label, ties to the blank.
#[inline]
fn terminal_state<F: LogProb>(last: &[F]) -> usize {
    let n = last.len();
    if n == 1 || last[n - 1] >= last[n - 2] {
        n - 1
    } else {
        n - 2
    }
}

/// Two rows of forward scores, selected by timestep parity.
#[derive(Debug, Clone)]
struct ScoreRows<F> {
    width: usize,
    cells: Vec<F>,
}

impl<F: LogProb> ScoreRows<F> {
    fn new(width: usize) -> Self {
        Self {
            width,
            cells: vec![F::unreachable(); 2 * width],
        }
    }

    fn row(&self, t: usize) -> &[F] {
        let offset = (t % 2) * self.width;
        &self.cells[offset..offset + self.width]
    }

    fn row_mut(&mut self, t: usize) -> &mut [F] {
        let offset = (t % 2) * self.width;
        &mut self.cells[offset..offset + self.width]
    }

    /// `(row t - 1, row t)`.
    fn split(&mut self, t: usize) -> (&[F], &mut [F]) {
        let (even, odd) = self.cells.split_at_mut(self.width);
        if t % 2 == 0 {
            (&*odd, even)
        } else {
            (&*even, odd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AlignError;
    use ndarray::{array, Array2};

    fn ln(p: f64) -> f64 {
        p.ln()
    }

    #[test]
    fn peaked_example_aligns_blank_label_blank() {
        let log_probs = array![
            [ln(0.8), ln(0.1), ln(0.1)],
            [ln(0.1), ln(0.8), ln(0.1)],
            [ln(0.8), ln(0.1), ln(0.1)],
        ];
        let targets = [1i64];
        let alignment = AlignEngine::new(log_probs.view(), &targets, 0).unwrap().run();
        assert_eq!(alignment.labels(), &[0, 1, 0]);
        assert_eq!(alignment.states(), &[0, 1, 2]);
        let expected = ln(0.8) + ln(0.8) + ln(0.8);
        assert!((alignment.score() - expected).abs() < 1e-12);
    }

    #[test]
    fn repeated_label_needs_blank() {
        let log_probs = Array2::<f32>::from_elem((3, 3), (1.0f32 / 3.0).ln());
        let targets = [2i32, 2];
        let alignment = AlignEngine::new(log_probs.view(), &targets, 0).unwrap().run();
        assert_eq!(alignment.labels(), &[2, 0, 2]);

        let short = Array2::<f32>::from_elem((2, 3), (1.0f32 / 3.0).ln());
        let err = AlignEngine::new(short.view(), &targets, 0).unwrap_err();
        assert_eq!(
            err,
            AlignError::InfeasibleLength {
                input_len: 2,
                target_len: 2,
                repeats: 1
            }
        );
    }

    #[test]
    fn ties_prefer_skip_then_advance_and_final_blank() {
        let log_probs = Array2::<f64>::from_elem((3, 3), ln(1.0 / 3.0));
        let targets = [1i32, 2];
        let alignment = AlignEngine::new(log_probs.view(), &targets, 0).unwrap().run();
        assert_eq!(alignment.states(), &[1, 3, 4]);
        assert_eq!(alignment.labels(), &[1, 2, 0]);
    }

    #[test]
    fn zero_probabilities_are_respected() {
        let ninf = f64::NEG_INFINITY;
        let log_probs = array![[ln(0.5), ninf], [ln(0.5), ln(0.5)], [ln(0.5), ninf]];
        let targets = [1i64];
        let alignment = AlignEngine::new(log_probs.view(), &targets, 0).unwrap().run();
        assert_eq!(alignment.labels(), &[0, 1, 0]);
        assert!(alignment.score().is_finite());
    }

    #[test]
    fn empty_target_is_all_blank() {
        let log_probs = Array2::<f32>::from_elem((4, 2), -0.7);
        let alignment = AlignEngine::<f32, i32>::new(log_probs.view(), &[], 1)
            .unwrap()
            .run();
        assert_eq!(alignment.labels(), &[1, 1, 1, 1]);
        assert!((alignment.score() + 2.8).abs() < 1e-5);

        let no_frames = Array2::<f32>::zeros((0, 2));
        let alignment = AlignEngine::<f32, i32>::new(no_frames.view(), &[], 1)
            .unwrap()
            .run();
        assert!(alignment.is_empty());
        assert_eq!(alignment.score(), 0.0);
    }

    #[test]
    fn no_frames_with_targets_is_infeasible() {
        let no_frames = Array2::<f64>::zeros((0, 3));
        let targets = [1i32];
        assert!(matches!(
            AlignEngine::new(no_frames.view(), &targets, 0),
            Err(AlignError::InfeasibleLength { input_len: 0, .. })
        ));
    }

    #[test]
    fn best_predecessor_ignores_unreachable() {
        let ninf = f32::NEG_INFINITY;
        let prev = [ninf, ninf, ninf];
        assert_eq!(best_predecessor(&prev, 2, false), (Step::Stay, ninf));
        let prev = [-1.0f32, ninf, ninf];
        assert_eq!(best_predecessor(&prev, 2, false).0, Step::Stay);
        assert_eq!(best_predecessor(&prev, 2, true), (Step::Skip, -1.0));
        let prev = [-1.0f32, -1.0, -1.0];
        assert_eq!(best_predecessor(&prev, 2, false).0, Step::Advance);
    }

    #[test]
    fn score_rows_alternate() {
        let mut rows = ScoreRows::<f32>::new(3);
        rows.row_mut(0).copy_from_slice(&[1.0, 2.0, 3.0]);
        {
            let (prev, cur) = rows.split(1);
            assert_eq!(prev, &[1.0, 2.0, 3.0]);
            cur[1] = 7.0;
        }
        assert_eq!(rows.row(1)[1], 7.0);
        let (prev, _) = rows.split(2);
        assert_eq!(prev[1], 7.0);
    }
}
