//! Assorted helpers over target sequences.

/// Number of adjacent equal labels in `targets`.
///
/// Each such pair needs a blank between its two labels, so it costs one
/// extra timestep on any valid CTC path.
#[inline]
pub fn count_repeats<I: PartialEq>(targets: &[I]) -> usize {
    targets.windows(2).filter(|w| w[0] == w[1]).count()
}

/// Minimum number of timesteps a CTC path over `targets` needs (L + R).
#[inline]
pub fn required_frames<I: PartialEq>(targets: &[I]) -> usize {
    targets.len() + count_repeats(targets)
}

#[cfg(test)]
mod tests {
    use super::{count_repeats, required_frames};

    #[test]
    fn empty_and_single() {
        assert_eq!(count_repeats::<i32>(&[]), 0);
        assert_eq!(count_repeats(&[4i32]), 0);
        assert_eq!(required_frames::<i64>(&[]), 0);
        assert_eq!(required_frames(&[4i64]), 1);
    }

    #[test]
    fn counts_only_adjacent_pairs() {
        assert_eq!(count_repeats(&[1, 1]), 1);
        assert_eq!(count_repeats(&[1, 2, 1]), 0);
        assert_eq!(count_repeats(&[1, 1, 1]), 2);
        assert_eq!(count_repeats(&[3, 3, 2, 2, 3]), 2);
        assert_eq!(required_frames(&[3, 3, 2, 2, 3]), 7);
    }
}
