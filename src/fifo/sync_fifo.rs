//! Single-clock FIFO engine.
//!
//! A ring buffer with registered memory access and a four-state control
//! machine. It establishes the baseline contract the dual-clock variant
//! mirrors: read data is valid one cycle after the read strobe, and
//! `empty` de-asserts only once a written word has traversed the memory
//! pipeline and is guaranteed present in the array.
//!
//! # States
//!
//! ```text
//!          clear (any state)
//!        ┌────────────────────┐
//!        ▼                    │
//!      INIT ──► EMPTY ──► ACTIVE ◄──► FULL
//!                 ▲          │
//!                 └──────────┘
//! ```
//!
//! - `Init`: one-shot reset of pointers and flags after a clear.
//! - `Empty` → `Active` on a write (including one still in the pipeline).
//! - `Active` → `Empty` when a read consumes the last visible word, judged
//!   against the *delayed* write pointer so pipeline latency is honored.
//! - `Active` → `Full` when a write leaves no free slot; `Full` → `Active`
//!   on a read with no concurrent write.
//!
//! Writing while full and reading while empty are silently ignored; flow
//! control is the caller's contract, policed only through the flags.

use super::memory::RingMemory;
use super::{mask_for, FifoBus, FifoError, MAX_ADDRESS_BITS, MAX_DATA_WIDTH};

/// Control state. `Empty`/`Full` are the flag-bearing states; occupancy in
/// between is `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// One-shot reset after a clear request.
    Init,
    /// No visible words.
    Empty,
    /// Somewhere between empty and full.
    Active,
    /// No free slots.
    Full,
}

/// Single-clock-domain FIFO with `2^address_bits` slots.
#[derive(Debug, Clone)]
pub struct SyncFifo {
    state: State,
    /// Write pointer, modulo `2^address_bits`.
    wptr: u64,
    /// Read pointer, modulo `2^address_bits`.
    rptr: u64,
    addr_mask: u64,
    data_mask: u64,
    data_width: u32,
    mem: RingMemory,
    /// Occupancy tracking is a debug aid only; the flags are derived from
    /// the pointers, so a divergence here signals a bug, not truth.
    track_occupancy: bool,
    occupancy: u64,
}

impl SyncFifo {
    /// Create a FIFO with `2^address_bits` slots of `data_width` bits.
    pub fn new(address_bits: u32, data_width: u32) -> Result<Self, FifoError> {
        if address_bits == 0 {
            return Err(FifoError::ZeroAddressWidth);
        }
        if address_bits > MAX_ADDRESS_BITS {
            return Err(FifoError::AddressWidthTooLarge(address_bits));
        }
        if data_width == 0 || data_width > MAX_DATA_WIDTH {
            return Err(FifoError::InvalidDataWidth(data_width));
        }
        Ok(Self {
            state: State::Empty,
            wptr: 0,
            rptr: 0,
            addr_mask: (1 << address_bits) - 1,
            data_mask: mask_for(data_width),
            data_width,
            mem: RingMemory::new(address_bits),
            track_occupancy: false,
            occupancy: 0,
        })
    }

    /// Create a FIFO sized for `bus`, validating that the bus payload
    /// width matches. This is the construction-time interface check.
    pub fn attached(address_bits: u32, bus: &FifoBus) -> Result<Self, FifoError> {
        Self::new(address_bits, bus.data_width())
    }

    /// Enable the occupancy counter (surfaced via `bus.count`).
    pub fn with_occupancy(mut self) -> Self {
        self.track_occupancy = true;
        self
    }

    /// Payload width in bits.
    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.mem.depth()
    }

    /// Validate that `bus` can drive this FIFO.
    pub fn check_bus(&self, bus: &FifoBus) -> Result<(), FifoError> {
        if bus.data_width() != self.data_width {
            return Err(FifoError::WidthMismatch {
                bus: bus.data_width(),
                fifo: self.data_width,
            });
        }
        Ok(())
    }

    /// One clock edge. Samples `clear`/`write`/`write_data`/`read` from
    /// the bus and drives `read_data`/`read_valid`/`empty`/`full`/`count`
    /// with the post-edge register values.
    pub fn tick(&mut self, bus: &mut FifoBus) {
        debug_assert_eq!(bus.data_width(), self.data_width);

        if bus.clear {
            log::debug!("sync_fifo: clear requested, entering INIT");
            self.state = State::Init;
            self.drive_reset_outputs(bus);
            return;
        }

        if self.state == State::Init {
            // One-shot reset; operations at this edge are ignored.
            self.wptr = 0;
            self.rptr = 0;
            self.occupancy = 0;
            self.mem.reset_write_path();
            self.mem.reset_read_path();
            self.state = State::Empty;
            self.drive_reset_outputs(bus);
            return;
        }

        // Pre-edge view of the delayed write pointer and the flags.
        let wad = self.mem.write_addr_delayed();
        let empty = match self.state {
            State::Init | State::Empty => true,
            State::Active => self.rptr == wad,
            State::Full => false,
        };
        let full = self.state == State::Full;

        // A write concurrent with a read is honored even when full: the
        // read frees the slot the write claims, so occupancy is unchanged
        // and the state stays Full.
        let accepted_read = bus.read && !empty;
        let accepted_write = bus.write && (!full || accepted_read);

        let wptr_next = (self.wptr + accepted_write as u64) & self.addr_mask;
        let rptr_next = (self.rptr + accepted_read as u64) & self.addr_mask;

        let next_state = match self.state {
            State::Init => State::Empty,
            State::Empty => {
                if accepted_write || self.rptr != wad {
                    State::Active
                } else {
                    State::Empty
                }
            }
            State::Active => {
                if accepted_read && !accepted_write && rptr_next == wad {
                    State::Empty
                } else if accepted_write && !accepted_read && wptr_next == self.rptr {
                    State::Full
                } else {
                    State::Active
                }
            }
            State::Full => {
                if accepted_read && !accepted_write {
                    State::Active
                } else {
                    State::Full
                }
            }
        };

        if next_state != self.state {
            log::trace!("sync_fifo: {:?} -> {:?}", self.state, next_state);
        }

        // Write pipeline shifts before the read samples, so a word that
        // commits at this edge is readable at this edge.
        self.mem
            .tick_write(accepted_write, self.wptr, bus.write_data & self.data_mask);
        let read_data = self.mem.tick_read(self.rptr);

        self.wptr = wptr_next;
        self.rptr = rptr_next;
        self.state = next_state;
        if self.track_occupancy {
            self.occupancy += accepted_write as u64;
            self.occupancy -= accepted_read as u64;
        }

        // Post-edge outputs.
        let wad = self.mem.write_addr_delayed();
        bus.empty = match self.state {
            State::Init | State::Empty => true,
            State::Active => self.rptr == wad,
            State::Full => false,
        };
        bus.full = self.state == State::Full;
        bus.read_valid = accepted_read;
        bus.read_data = read_data & self.data_mask;
        bus.count = self.track_occupancy.then_some(self.occupancy);
    }

    fn drive_reset_outputs(&self, bus: &mut FifoBus) {
        bus.empty = true;
        bus.full = false;
        bus.read_valid = false;
        bus.read_data = 0;
        bus.count = self.track_occupancy.then_some(0);
    }
}
