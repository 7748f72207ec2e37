//! Pipelined ring-buffer memory shared by both FIFO variants.
//!
//! Write path: an accepted write lands in a capture register at one write
//! edge and is committed to the array at the following write edge, so a
//! word is present in the array two write edges after it was offered.
//! Read path: the array output is registered, visible one read edge after
//! the address is presented.
//!
//! ```text
//!  write edge N        write edge N+1        read edge M
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ addr/data   │ ──► │ array[addr]  │ ──► │ read_data   │
//! │ capture reg │     │   = data     │     │ register    │
//! └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! A third output, `write_addr_delayed`, carries the write pointer through
//! the same number of stages as the data pipeline. Control logic compares
//! against it to decide when a given write has actually become visible,
//! which is what lets the single-clock FIFO de-assert `empty` only once
//! the written word is guaranteed present.
//!
//! The memory is non-blocking and has no error conditions; not writing
//! past full and not reading past empty are control-logic responsibilities
//! layered on top.

use super::WRITE_PIPELINE_STAGES;

/// Fixed-size array of `2^addr_bits` words with pipelined access.
#[derive(Debug, Clone)]
pub struct RingMemory {
    /// Backing array, `2^addr_bits` words.
    words: Vec<u64>,
    /// Low-bits address mask.
    addr_mask: u64,
    /// Write-side capture register: (address, data) awaiting commit.
    capture: Option<(u64, u64)>,
    /// Registered read output.
    read_reg: u64,
    /// Delay chain for the post-edge write pointer, index 0 newest.
    wad: [u64; WRITE_PIPELINE_STAGES],
}

impl RingMemory {
    /// Create a zero-filled memory with `2^addr_bits` words.
    pub fn new(addr_bits: u32) -> Self {
        Self {
            words: vec![0; 1 << addr_bits],
            addr_mask: (1 << addr_bits) - 1,
            capture: None,
            read_reg: 0,
            wad: [0; WRITE_PIPELINE_STAGES],
        }
    }

    /// One write-clock edge.
    ///
    /// Commits the previous capture to the array, then captures
    /// `(addr, data)` if `write` is asserted. The delayed-pointer chain
    /// shifts every edge regardless of `write`.
    pub fn tick_write(&mut self, write: bool, addr: u64, data: u64) {
        if let Some((a, d)) = self.capture.take() {
            self.words[a as usize] = d;
        }
        if write {
            self.capture = Some((addr & self.addr_mask, data));
        }

        // Post-edge write pointer: the presented address, plus one if a
        // word was accepted at this edge.
        let ptr_next = (addr + write as u64) & self.addr_mask;
        for i in (1..WRITE_PIPELINE_STAGES).rev() {
            self.wad[i] = self.wad[i - 1];
        }
        self.wad[0] = ptr_next;
    }

    /// One read-clock edge: register and return the word at `addr`.
    pub fn tick_read(&mut self, addr: u64) -> u64 {
        self.read_reg = self.words[(addr & self.addr_mask) as usize];
        self.read_reg
    }

    /// Registered read output from the most recent read edge.
    #[inline]
    pub fn read_data(&self) -> u64 {
        self.read_reg
    }

    /// Write pointer delayed through the data pipeline. A read pointer
    /// equal to this value has consumed every word the array holds.
    #[inline]
    pub fn write_addr_delayed(&self) -> u64 {
        self.wad[WRITE_PIPELINE_STAGES - 1]
    }

    /// Number of words the array holds.
    pub fn depth(&self) -> usize {
        self.words.len()
    }

    /// Reset the write-side pipeline registers. Array contents are left
    /// alone, matching a hardware reset (RAM cells are not cleared).
    pub fn reset_write_path(&mut self) {
        self.capture = None;
        self.wad = [0; WRITE_PIPELINE_STAGES];
    }

    /// Reset the read-side output register.
    pub fn reset_read_path(&mut self) {
        self.read_reg = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_commits_one_edge_later() {
        let mut mem = RingMemory::new(2);

        mem.tick_write(true, 1, 0xAB);
        // Not yet committed: a read at this point sees the old word
        assert_eq!(mem.tick_read(1), 0);

        mem.tick_write(false, 2, 0);
        assert_eq!(mem.tick_read(1), 0xAB);
    }

    #[test]
    fn test_read_is_registered() {
        let mut mem = RingMemory::new(2);
        mem.tick_write(true, 0, 7);
        mem.tick_write(true, 1, 9);
        mem.tick_write(false, 2, 0);

        mem.tick_read(0);
        assert_eq!(mem.read_data(), 7);
        mem.tick_read(1);
        assert_eq!(mem.read_data(), 9);
    }

    #[test]
    fn test_back_to_back_writes() {
        let mut mem = RingMemory::new(2);
        for i in 0..4u64 {
            mem.tick_write(true, i, 0x10 + i);
        }
        mem.tick_write(false, 0, 0);

        for i in 0..4u64 {
            assert_eq!(mem.tick_read(i), 0x10 + i);
        }
    }

    #[test]
    fn test_write_addr_delayed_lags_by_pipeline_depth() {
        let mut mem = RingMemory::new(3);
        assert_eq!(mem.write_addr_delayed(), 0);

        // Pointer stream: 1, 2, 3 as three writes are accepted
        mem.tick_write(true, 0, 0);
        assert_eq!(mem.write_addr_delayed(), 0);
        mem.tick_write(true, 1, 0);
        assert_eq!(mem.write_addr_delayed(), 1);
        mem.tick_write(true, 2, 0);
        assert_eq!(mem.write_addr_delayed(), 2);

        // Idle edges hold the pointer steady
        mem.tick_write(false, 3, 0);
        assert_eq!(mem.write_addr_delayed(), 3);
        mem.tick_write(false, 3, 0);
        assert_eq!(mem.write_addr_delayed(), 3);
    }

    #[test]
    fn test_addresses_wrap_at_depth() {
        let mut mem = RingMemory::new(2);
        mem.tick_write(true, 5, 0xEE); // 5 & 0b11 == 1
        mem.tick_write(false, 0, 0);
        assert_eq!(mem.tick_read(1), 0xEE);
        assert_eq!(mem.depth(), 4);
    }

    #[test]
    fn test_reset_write_path_drops_capture() {
        let mut mem = RingMemory::new(2);
        mem.tick_write(true, 0, 0xFF);
        mem.reset_write_path();
        mem.tick_write(false, 0, 0);
        // Captured word never committed
        assert_eq!(mem.tick_read(0), 0);
    }
}
