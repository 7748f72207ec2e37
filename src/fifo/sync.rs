//! Domain-crossing synchronizer primitives.
//!
//! Every signal generated in one clock domain and consumed in another goes
//! through a register chain clocked by the consuming domain. Two stages is
//! the metastability-safe minimum; the depth is configurable so the
//! latency it introduces can be explored in simulation.
//!
//! Two flavors are modeled:
//! - [`Synchronizer`]: brings a multi-bit Gray-coded pointer into the local
//!   domain. Safe only because Gray code changes one bit per increment.
//! - [`ResetSynchronizer`]: holds a domain in reset until the external
//!   reset's de-assertion has been re-sampled by the local clock.

use smallvec::SmallVec;

/// Register chain sampling a remote value into the local clock domain.
///
/// `sample()` models one local clock edge: the chain shifts by one stage
/// and the new input lands in the first stage. The output therefore lags
/// the source by `stages` local edges.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    /// Register stages, index 0 is closest to the source.
    stages: SmallVec<[u64; 4]>,
}

impl Synchronizer {
    /// Create a chain of `stages` registers, all cleared.
    pub fn new(stages: usize) -> Self {
        debug_assert!(stages >= 1);
        Self {
            stages: SmallVec::from_elem(0, stages),
        }
    }

    /// Value currently presented to the local domain (last stage).
    #[inline]
    pub fn output(&self) -> u64 {
        *self.stages.last().unwrap_or(&0)
    }

    /// One local clock edge: shift the chain, sampling `input` into the
    /// first stage. Returns the post-edge output.
    pub fn sample(&mut self, input: u64) -> u64 {
        for i in (1..self.stages.len()).rev() {
            self.stages[i] = self.stages[i - 1];
        }
        self.stages[0] = input;
        self.output()
    }

    /// Number of register stages.
    pub fn depth(&self) -> usize {
        self.stages.len()
    }

    /// Clear every stage (domain reset).
    pub fn reset(&mut self) {
        self.stages.fill(0);
    }
}

/// Per-domain reset synchronizer.
///
/// Asserting reset takes effect immediately (asynchronous assertion); the
/// domain then stays in reset for `stages` local ticks so that logic only
/// leaves reset after the de-assertion has been re-synchronized.
#[derive(Debug, Clone)]
pub struct ResetSynchronizer {
    /// Local ticks remaining before the domain leaves reset.
    pending: usize,
    /// Chain depth applied on each assertion.
    stages: usize,
}

impl ResetSynchronizer {
    /// Create a released reset synchronizer with the given chain depth.
    pub fn new(stages: usize) -> Self {
        debug_assert!(stages >= 1);
        Self { pending: 0, stages }
    }

    /// Assert reset in this domain.
    pub fn assert_reset(&mut self) {
        self.pending = self.stages;
    }

    /// Whether the domain is currently held in reset.
    #[inline]
    pub fn in_reset(&self) -> bool {
        self.pending > 0
    }

    /// One local clock edge. Returns true if the domain was in reset at
    /// this edge (logic must hold its reset values).
    pub fn tick(&mut self) -> bool {
        if self.pending > 0 {
            self.pending -= 1;
            true
        } else {
            false
        }
    }
}
