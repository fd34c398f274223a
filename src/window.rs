//! Admissible-state window for the forward pass.
//!
//! At timestep t only states in `[start, end)` matter:
//! - `end` is one past the furthest state any path can have reached by t.
//! - `start` is the first state from which the remaining timesteps can still
//!   reach one of the two terminal states.
//!
//! Both bounds only move forward, one state per timestep, or two when the
//! state being dropped or entered sits next to a blank that may be skipped.

use std::ops::Range;

use crate::lattice::Lattice;
use crate::traits::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissibleWindow {
    start: usize,
    end: usize,
    pruned: bool,
}

impl AdmissibleWindow {
    /// Window at timestep 0.
    ///
    /// With `pruned == false` the window still seeds only the states a path
    /// can start in, but every later timestep covers the whole lattice.
    pub fn initial<I: Label>(lattice: &Lattice<'_, I>, num_frames: usize, pruned: bool) -> Self {
        let end = if lattice.len() == 1 { 1 } else { 2 };
        let start = if pruned && num_frames <= lattice.required_frames() {
            // no slack for a leading blank
            1
        } else {
            0
        };
        Self { start, end, pruned }
    }

    /// Move the window to timestep `t` (t ≥ 1).
    pub fn advance<I: Label>(&mut self, t: usize, lattice: &Lattice<'_, I>, num_frames: usize) {
        if !self.pruned {
            self.end = lattice.len();
            return;
        }

        let required = lattice.required_frames();
        if num_frames - t <= required {
            if self.start % 2 == 1 && lattice.skip_allowed(self.start + 2) {
                self.start += 1;
            }
            self.start += 1;
        }
        if t <= required {
            if self.end % 2 == 0 && lattice.skip_allowed(self.end + 1) {
                self.end += 1;
            }
            self.end += 1;
        }

        debug_assert!(self.start < self.end, "empty window at t={t}");
        debug_assert!(self.end <= lattice.len(), "window past lattice at t={t}");

        #[cfg(feature = "tracing")]
        tracing::trace!(t, start = self.start, end = self.end, "window advanced");
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::AdmissibleWindow;
    use crate::lattice::Lattice;

    fn windows(targets: &[i32], num_frames: usize) -> Vec<(usize, usize)> {
        let lattice = Lattice::new(targets, 0, 8).unwrap();
        let mut window = AdmissibleWindow::initial(&lattice, num_frames, true);
        let mut out = vec![(window.start(), window.end())];
        for t in 1..num_frames {
            window.advance(t, &lattice, num_frames);
            out.push((window.start(), window.end()));
        }
        out
    }

    #[test]
    fn tight_budget_walks_label_states() {
        // T = L: every frame must emit the next label, skipping every blank.
        assert_eq!(windows(&[1, 2, 3], 3), vec![(1, 2), (3, 4), (5, 6)]);
    }

    #[test]
    fn repeat_forces_blank_state() {
        // [a, a] with T = 3: a, blank, a.
        assert_eq!(windows(&[4, 4], 3), vec![(1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn slack_keeps_leading_blank() {
        let got = windows(&[1, 2], 4);
        assert_eq!(got[0], (0, 2));
        assert_eq!(got[1], (0, 4));
        assert_eq!(got[2], (1, 5));
        assert_eq!(got[3], (3, 5));
    }

    #[test]
    fn empty_target_keeps_single_state() {
        assert_eq!(windows(&[], 4), vec![(0, 1); 4]);
    }

    #[test]
    fn unpruned_window_spans_lattice() {
        let targets = [1, 2];
        let lattice = Lattice::new(&targets, 0, 3).unwrap();
        let mut window = AdmissibleWindow::initial(&lattice, 2, false);
        assert_eq!(window.range(), 0..2);
        window.advance(1, &lattice, 2);
        assert_eq!(window.range(), 0..5);
        assert_eq!(window.len(), 5);
    }
}
