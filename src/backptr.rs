//! Back-pointer storage for the forward pass.
//!
//! Every (timestep, state) cell records which predecessor won. The table is
//! kept for the full T × S extent because backtracking replays it after the
//! forward pass ends.

/// Predecessor transition into a lattice state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Step {
    /// Same state as the previous timestep.
    #[default]
    Stay = 0,
    /// One state back.
    Advance = 1,
    /// Two states back, jumping over a blank.
    Skip = 2,
}

impl Step {
    /// How many lattice states this step moves forward.
    #[inline]
    pub fn offset(self) -> usize {
        self as usize
    }
}

/// Dense T × S table of [`Step`]s, one byte per cell.
#[derive(Debug, Clone)]
pub struct BackPointers {
    width: usize,
    cells: Vec<Step>,
}

impl BackPointers {
    pub fn new(num_frames: usize, num_states: usize) -> Self {
        Self {
            width: num_states,
            cells: vec![Step::Stay; num_frames * num_states],
        }
    }

    /// Number of timesteps covered.
    #[inline]
    pub fn num_frames(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.cells.len() / self.width
        }
    }

    #[inline]
    pub fn get(&self, t: usize, state: usize) -> Step {
        self.cells[t * self.width + state]
    }

    #[inline]
    pub fn set(&mut self, t: usize, state: usize, step: Step) {
        self.cells[t * self.width + state] = step;
    }

    /// Follow the recorded steps back from `terminal` at the last timestep.
    ///
    /// Returns the visited lattice state for every timestep, in forward time
    /// order.
    pub fn trace(&self, terminal: usize) -> Vec<usize> {
        let num_frames = self.num_frames();
        let mut states = vec![0; num_frames];
        let mut state = terminal;
        for t in (0..num_frames).rev() {
            states[t] = state;
            if t > 0 {
                let step = self.get(t, state);
                debug_assert!(step.offset() <= state, "step leaves the lattice");
                state -= step.offset();
            }
        }
        states
    }
}
