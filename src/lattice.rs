//! The expanded CTC lattice.
//!
//! A target of L labels expands to S = 2L + 1 states that alternate blank
//! and label:
//!
//! ```text
//! state:  0   1    2   3    4  ...  2L-1      2L
//! symbol: ∅   y0   ∅   y1   ∅  ...  y(L-1)    ∅
//! ```
//!
//! Paths move forward by 0, 1 or 2 states per timestep. A step of 2 jumps
//! over a blank and is only legal between two different labels.

use crate::error::{AlignError, Result};
use crate::traits::Label;
use crate::utils::count_repeats;

/// Expanded lattice over a borrowed target sequence.
#[derive(Debug, Clone)]
pub struct Lattice<'a, I: Label> {
    targets: &'a [I],
    blank: I,
    /// Class index emitted by each state, length 2L + 1.
    classes: Vec<usize>,
    repeats: usize,
}

impl<'a, I: Label> Lattice<'a, I> {
    /// Build the lattice for `targets` over a vocabulary of `num_classes`.
    ///
    /// Fails if `blank` or any target label is outside `[0, num_classes)`.
    pub fn new(targets: &'a [I], blank: usize, num_classes: usize) -> Result<Self> {
        let out_of_range = AlignError::BlankOutOfRange { blank, num_classes };
        if blank >= num_classes {
            return Err(out_of_range);
        }
        let blank_label = I::from_index(blank).ok_or(out_of_range)?;

        let mut classes = Vec::with_capacity(2 * targets.len() + 1);
        classes.push(blank);
        for (position, &label) in targets.iter().enumerate() {
            let class = label
                .to_index()
                .filter(|&c| c < num_classes)
                .ok_or(AlignError::TargetOutOfRange {
                    position,
                    label: label.to_i64(),
                    num_classes,
                })?;
            classes.push(class);
            classes.push(blank);
        }

        Ok(Self {
            targets,
            blank: blank_label,
            classes,
            repeats: count_repeats(targets),
        })
    }

    /// Number of lattice states S = 2L + 1.
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false: even an empty target has the single blank state.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of target labels L.
    #[inline]
    pub fn num_labels(&self) -> usize {
        self.targets.len()
    }

    /// Adjacent repeated labels R.
    #[inline]
    pub fn repeats(&self) -> usize {
        self.repeats
    }

    /// Minimum path length L + R.
    #[inline]
    pub fn required_frames(&self) -> usize {
        self.targets.len() + self.repeats
    }

    #[inline]
    pub fn is_blank(&self, state: usize) -> bool {
        state % 2 == 0
    }

    /// Class index emitted at `state`.
    #[inline]
    pub fn class(&self, state: usize) -> usize {
        self.classes[state]
    }

    /// Label emitted at `state`, as it appears in the output path.
    #[inline]
    pub fn label(&self, state: usize) -> I {
        if self.is_blank(state) {
            self.blank
        } else {
            self.targets[state / 2]
        }
    }

    /// The blank as a label value.
    #[inline]
    pub fn blank(&self) -> I {
        self.blank
    }

    /// Whether `state` may be entered from `state - 2`, jumping a blank.
    ///
    /// Requires `state` to be a label other than the first, and its label to
    /// differ from the previous one. Out-of-range states return false.
    #[inline]
    pub fn skip_allowed(&self, state: usize) -> bool {
        state % 2 == 1
            && state != 1
            && state < self.len()
            && self.targets[state / 2] != self.targets[state / 2 - 1]
    }

    /// Fail unless `num_frames` timesteps can cover every label.
    pub fn check_feasible(&self, num_frames: usize) -> Result<()> {
        if num_frames < self.required_frames() {
            return Err(AlignError::InfeasibleLength {
                input_len: num_frames,
                target_len: self.num_labels(),
                repeats: self.repeats,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_alternates_blank_and_label() {
        let targets = [5i32, 7, 7];
        let lattice = Lattice::new(&targets, 0, 8).unwrap();
        assert_eq!(lattice.len(), 7);
        assert_eq!(lattice.repeats(), 1);
        assert_eq!(lattice.required_frames(), 4);
        let classes: Vec<usize> = (0..lattice.len()).map(|s| lattice.class(s)).collect();
        assert_eq!(classes, vec![0, 5, 0, 7, 0, 7, 0]);
        assert_eq!(lattice.label(3), 7);
        assert_eq!(lattice.label(4), 0);
    }

    #[test]
    fn empty_target_is_single_blank() {
        let lattice = Lattice::<i64>::new(&[], 2, 3).unwrap();
        assert_eq!(lattice.len(), 1);
        assert_eq!(lattice.class(0), 2);
        assert!(!lattice.skip_allowed(1));
        assert!(lattice.check_feasible(0).is_ok());
    }

    #[test]
    fn skip_rule() {
        let targets = [1i32, 2, 2, 3];
        let lattice = Lattice::new(&targets, 0, 4).unwrap();
        assert!(!lattice.skip_allowed(1), "first label has nothing to skip from");
        assert!(!lattice.skip_allowed(2), "blank states are never skipped into");
        assert!(lattice.skip_allowed(3));
        assert!(!lattice.skip_allowed(5), "repeat needs its blank");
        assert!(lattice.skip_allowed(7));
        assert!(!lattice.skip_allowed(9));
    }

    #[test]
    fn rejects_out_of_range_inputs() {
        assert_eq!(
            Lattice::<i32>::new(&[1], 3, 3).unwrap_err(),
            AlignError::BlankOutOfRange {
                blank: 3,
                num_classes: 3
            }
        );
        assert_eq!(
            Lattice::new(&[1i64, -1], 0, 3).unwrap_err(),
            AlignError::TargetOutOfRange {
                position: 1,
                label: -1,
                num_classes: 3
            }
        );
        assert!(Lattice::new(&[1i32, 3], 0, 3).is_err());
    }

    #[test]
    fn feasibility_boundary() {
        let targets = [4i32, 4];
        let lattice = Lattice::new(&targets, 0, 5).unwrap();
        assert!(lattice.check_feasible(3).is_ok());
        assert_eq!(
            lattice.check_feasible(2).unwrap_err(),
            AlignError::InfeasibleLength {
                input_len: 2,
                target_len: 2,
                repeats: 1
            }
        );
    }
}
