use std::ops::Range;

use crate::data::FragmentIndex;

/// What the prober should do after observing a probe outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeDecision {
    /// The probe landed. Every index in the range is assumed present and should
    /// be fetched; the probed index itself is the range's `end` and is already
    /// stored.
    Dispatch(Range<FragmentIndex>),

    /// The probe missed. Probe again with a smaller window at the same base.
    Narrow,

    /// The boundary is known. The value is the number of fragments.
    Located(u64),
}

/// Doubling-then-halving search for the first missing fragment.
///
/// Starting from `base = 0`, the window `[base, base + step)` is tested by
/// probing its last index. A hit advances `base` by `step`; a miss halves
/// `step`. When the window shrinks to two, `base` itself is probed to settle
/// between `base` and `base + 1`.
///
/// For a sequence of `count` fragments the number of probes is about
/// `count / step` plus a few per halving level, so at most
/// `count / step + 3 * ceil(log2(step)) + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeState {
    base: FragmentIndex,
    step: u64,
    settling: bool,
    located: Option<u64>,
}

impl ProbeState {
    /// Start a search with the given window. A zero step is raised to one.
    pub fn new(initial_step: u64) -> Self {
        Self {
            base: 0,
            step: initial_step.max(1),
            settling: false,
            located: None,
        }
    }

    /// Lowest index not yet covered by a dispatched range or probe.
    pub fn base(&self) -> FragmentIndex {
        self.base
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// The boundary, once found.
    pub fn located(&self) -> Option<u64> {
        self.located
    }

    /// Index the next probe should fetch.
    pub fn next_probe(&self) -> FragmentIndex {
        if self.settling {
            self.base
        } else {
            self.base.saturating_add(self.step - 1)
        }
    }

    /// Feed the outcome of the probe at [`next_probe`](Self::next_probe).
    ///
    /// Calling this again after [`ProbeDecision::Located`] keeps returning the
    /// same result.
    pub fn observe(&mut self, present: bool) -> ProbeDecision {
        if let Some(count) = self.located {
            return ProbeDecision::Located(count);
        }

        if self.settling {
            let count = if present { self.base + 1 } else { self.base };
            self.located = Some(count);
            return ProbeDecision::Located(count);
        }

        if present {
            let probed = self.next_probe();
            let range = self.base..probed;
            self.base = probed.saturating_add(1);
            return ProbeDecision::Dispatch(range);
        }

        match self.step {
            // the probe was at base itself
            1 => {
                self.located = Some(self.base);
                ProbeDecision::Located(self.base)
            }
            2 => {
                self.settling = true;
                ProbeDecision::Narrow
            }
            _ => {
                self.step /= 2;
                ProbeDecision::Narrow
            }
        }
    }
}
