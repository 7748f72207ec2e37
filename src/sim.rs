//! Dual-clock simulation harness.
//!
//! Drives an [`AsyncFifo`]'s two domains from one scheduler loop, with a
//! configurable tick-interval per domain so unrelated clock rates can be
//! modeled (1:1, 3:1, 1:7, ...). The harness is an external driver that
//! respects the FIFO's flow-control flags the way a hardware producer and
//! consumer would; both domains advance on every one of their clock edges
//! whether or not an operation is offered.
//!
//! # Usage
//!
//! ```ignore
//! let fifo = AsyncFifo::new(4, 16)?;
//! let mut harness = DualClockHarness::new(fifo, 1, 3);
//! harness.push_source(0..100);
//! harness.run(10_000);
//! assert_eq!(harness.drained(), (0..100).collect::<Vec<u64>>());
//! ```

use std::collections::VecDeque;

use crate::fifo::AsyncFifo;

/// Scheduler driving both FIFO domains at fixed tick intervals.
///
/// An interval of 1 ticks the domain on every scheduler step; an interval
/// of N ticks it every Nth step. A write:read clock-rate ratio of 3:1 is
/// therefore `write_interval = 1, read_interval = 3`.
pub struct DualClockHarness {
    /// FIFO under simulation.
    pub fifo: AsyncFifo,
    /// Scheduler steps between write-clock edges.
    pub write_interval: u64,
    /// Scheduler steps between read-clock edges.
    pub read_interval: u64,
    /// Words waiting to be offered on the write side.
    source: VecDeque<u64>,
    /// Words the read side has produced, in arrival order.
    drained: Vec<u64>,
    /// Scheduler steps executed.
    pub total_steps: u64,
    /// Write-clock edges executed.
    pub write_ticks: u64,
    /// Read-clock edges executed.
    pub read_ticks: u64,
    /// Writes accepted by the FIFO.
    pub words_written: u64,
}

impl DualClockHarness {
    /// Create a harness around `fifo` with the given tick intervals.
    /// Intervals are clamped to at least 1.
    pub fn new(fifo: AsyncFifo, write_interval: u64, read_interval: u64) -> Self {
        Self {
            fifo,
            write_interval: write_interval.max(1),
            read_interval: read_interval.max(1),
            source: VecDeque::new(),
            drained: Vec::new(),
            total_steps: 0,
            write_ticks: 0,
            read_ticks: 0,
            words_written: 0,
        }
    }

    /// Queue words for the write side to offer in order.
    pub fn push_source<I: IntoIterator<Item = u64>>(&mut self, words: I) {
        self.source.extend(words);
    }

    /// One scheduler step: tick whichever domains are due at this step.
    pub fn step(&mut self) {
        self.total_steps += 1;

        if self.total_steps % self.write_interval == 0 {
            let offer = !self.source.is_empty() && !self.fifo.full();
            let data = self.source.front().copied().unwrap_or(0);
            let tick = self.fifo.tick_write(offer, data);
            if tick.accepted {
                self.source.pop_front();
                self.words_written += 1;
                log::trace!("harness: wrote {:#x} at step {}", data, self.total_steps);
            }
            self.write_ticks += 1;
        }

        if self.total_steps % self.read_interval == 0 {
            let tick = self.fifo.tick_read(!self.fifo.empty());
            if tick.read_valid {
                log::trace!(
                    "harness: read {:#x} at step {}",
                    tick.read_data,
                    self.total_steps
                );
                self.drained.push(tick.read_data);
            }
            self.read_ticks += 1;
        }
    }

    /// Run for `steps` scheduler steps.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Run until `expected` words have drained or `limit` steps elapse.
    ///
    /// Returns the number of steps executed.
    pub fn run_until_drained(&mut self, expected: usize, limit: u64) -> u64 {
        let start = self.total_steps;
        while self.drained.len() < expected && self.total_steps - start < limit {
            self.step();
        }
        self.total_steps - start
    }

    /// Words produced by the read side so far, in order.
    pub fn drained(&self) -> &[u64] {
        &self.drained
    }

    /// Words not yet accepted by the write side.
    pub fn source_remaining(&self) -> usize {
        self.source.len()
    }

    /// Print a status summary.
    pub fn print_status(&self) {
        println!("Harness Status:");
        println!(
            "  ratio (write:read)  {}:{}",
            self.read_interval, self.write_interval
        );
        println!("  scheduler steps     {}", self.total_steps);
        println!("  write-clock edges   {}", self.write_ticks);
        println!("  read-clock edges    {}", self.read_ticks);
        println!("  words written       {}", self.words_written);
        println!("  words drained       {}", self.drained.len());
        println!("  source remaining    {}", self.source.len());
        println!(
            "  flags               full={} empty={}",
            self.fifo.full(),
            self.fifo.empty()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    /// Deterministic scramble so the payload stream isn't a counter.
    fn scrambled(n: usize, width_mask: u64) -> Vec<u64> {
        (0..n as u64)
            .map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(17) & width_mask)
            .collect()
    }

    fn round_trip_at_ratio(write_interval: u64, read_interval: u64) {
        let fifo = AsyncFifo::new(2, 16).unwrap();
        let mut harness = DualClockHarness::new(fifo, write_interval, read_interval);

        // More items than the FIFO holds, so full/empty both get exercised
        let values = scrambled(64, 0xFFFF);
        harness.push_source(values.iter().copied());

        let limit = 64 * 64 * write_interval.max(read_interval);
        harness.run_until_drained(values.len(), limit);

        assert_eq!(harness.drained(), values.as_slice());
        assert_eq!(harness.source_remaining(), 0);
        assert_eq!(harness.words_written, values.len() as u64);
    }

    #[test]
    fn test_round_trip_ratio_1_to_1() {
        round_trip_at_ratio(1, 1);
    }

    #[test]
    fn test_round_trip_write_3x_faster() {
        round_trip_at_ratio(1, 3);
    }

    #[test]
    fn test_round_trip_read_7x_faster() {
        round_trip_at_ratio(7, 1);
    }

    #[test]
    fn test_flags_respected_under_pressure() {
        // Slow reader: the writer must hit full and back off without
        // losing or duplicating words.
        let fifo = AsyncFifo::new(1, 8).unwrap();
        let mut harness = DualClockHarness::new(fifo, 1, 5);
        let values = scrambled(16, 0xFF);
        harness.push_source(values.iter().copied());

        harness.run_until_drained(values.len(), 4096);
        assert_eq!(harness.drained(), values.as_slice());
    }

    #[test]
    fn test_tick_accounting() {
        let fifo = AsyncFifo::new(2, 8).unwrap();
        let mut harness = DualClockHarness::new(fifo, 1, 3);
        harness.run(9);
        assert_eq!(harness.write_ticks, 9);
        assert_eq!(harness.read_ticks, 3);
        assert_eq!(harness.total_steps, 9);
    }

    #[test]
    fn test_empty_source_runs_quietly() {
        let fifo = AsyncFifo::new(2, 8).unwrap();
        let mut harness = DualClockHarness::new(fifo, 1, 1);
        harness.run(100);
        assert!(harness.drained().is_empty());
        assert_eq!(harness.words_written, 0);
        assert!(harness.fifo.empty());
        assert!(!harness.fifo.full());
    }

    #[quickcheck]
    fn prop_round_trip_any_payload(values: Vec<u16>, ratio_sel: u8) -> bool {
        let (write_interval, read_interval) = match ratio_sel % 3 {
            0 => (1, 1),
            1 => (1, 3),
            _ => (7, 1),
        };
        let fifo = AsyncFifo::new(2, 16).unwrap();
        let mut harness = DualClockHarness::new(fifo, write_interval, read_interval);
        let expected: Vec<u64> = values.iter().map(|&v| v as u64).collect();
        harness.push_source(expected.iter().copied());

        let limit = 64 * (expected.len() as u64 + 8) * write_interval.max(read_interval);
        harness.run_until_drained(expected.len(), limit);
        harness.drained() == expected.as_slice()
    }
}
