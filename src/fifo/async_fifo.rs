//! Dual-clock (cross-clock-domain) FIFO engine.
//!
//! The write and read sides live in independent, free-running clock
//! domains with no phase or frequency relationship. Each domain keeps an
//! `address_bits + 1`-bit pointer in binary and Gray form; only the Gray
//! image crosses into the opposite domain, through a multi-stage
//! synchronizer clocked by the consumer. Because Gray code changes one bit
//! per increment, a mid-transition sample yields either the old or the new
//! pointer value, never a torn address.
//!
//! ```text
//!  write domain                              read domain
//! ┌─────────────────┐                      ┌─────────────────┐
//! │ wbin/wgray      │── wgray ──► sync ───►│ empty compare   │
//! │ full compare    │◄─── sync ◄── rgray ──│ rbin/rgray      │
//! └───────┬─────────┘                      └────────┬────────┘
//!         │ write addr = wbin[ASZ-1:0]              │ read addr
//!         ▼                                         ▼
//!               shared ring-buffer memory
//! ```
//!
//! # Flag derivation
//!
//! - `empty` (read domain): the next read Gray pointer equals the
//!   synchronized write Gray pointer. The write side exports its pointer
//!   delayed by one write edge so the export tracks the array commit, not
//!   the acceptance; however fast the read clock runs relative to the
//!   write clock, a word becomes visible only after it is in the array.
//! - `full` (write domain): the next write Gray pointer equals the
//!   synchronized read Gray pointer *with its top two bits inverted*. The
//!   inversion is what distinguishes "equal because empty" from "equal
//!   because the read pointer has wrapped exactly one fewer time"; compare
//!   low bits plus a wrap flag instead and full detection is off by a full
//!   wrap of slack.
//!
//! Writing while full or reading while empty never corrupts state: the
//! accepted-operation guards absorb the request and the pointers stand
//! still. Callers detect the non-effect through the flags.

use super::gray::GrayCounter;
use super::memory::RingMemory;
use super::sync::{ResetSynchronizer, Synchronizer};
use super::{
    mask_for, FifoBus, FifoError, DEFAULT_SYNC_STAGES, MAX_ADDRESS_BITS, MAX_DATA_WIDTH,
};

/// Post-edge outputs of one write-clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTick {
    /// Registered full flag after this edge.
    pub full: bool,
    /// Whether the offered write advanced the pointer at this edge.
    pub accepted: bool,
}

/// Post-edge outputs of one read-clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTick {
    /// Registered memory output; meaningful when `read_valid` is set.
    pub read_data: u64,
    /// The data above answers the read accepted at this edge.
    pub read_valid: bool,
    /// Registered empty flag after this edge.
    pub empty: bool,
    /// Whether the offered read advanced the pointer at this edge.
    pub accepted: bool,
}

/// Write-domain registers.
#[derive(Debug, Clone)]
struct WriteDomain {
    ptr: GrayCounter,
    full: bool,
    /// Gray pointer exported to the read domain. Trails `ptr` by one
    /// write edge, the same lag as the capture-to-commit step in
    /// [`RingMemory`], so a word is never advertised before it is
    /// actually in the array.
    gray_export: u64,
    /// Read-domain Gray pointer, re-synchronized into this domain.
    rgray_sync: Synchronizer,
    reset: ResetSynchronizer,
}

/// Read-domain registers.
#[derive(Debug, Clone)]
struct ReadDomain {
    ptr: GrayCounter,
    empty: bool,
    /// Write-domain Gray pointer, re-synchronized into this domain.
    wgray_sync: Synchronizer,
    reset: ResetSynchronizer,
}

/// Dual-clock FIFO with `2^address_bits` slots of `data_width` bits.
///
/// Call [`tick_write`](Self::tick_write) once per write-clock edge and
/// [`tick_read`](Self::tick_read) once per read-clock edge, in whatever
/// relative order the two clocks dictate.
#[derive(Debug, Clone)]
pub struct AsyncFifo {
    write: WriteDomain,
    read: ReadDomain,
    mem: RingMemory,
    address_bits: u32,
    data_width: u32,
    data_mask: u64,
    sync_stages: usize,
    /// XOR mask inverting the top two bits of an `address_bits + 1`-bit
    /// Gray pointer, for the full comparison.
    wrap_mask: u64,
}

impl AsyncFifo {
    /// Create a FIFO with the default two-stage synchronizers.
    pub fn new(address_bits: u32, data_width: u32) -> Result<Self, FifoError> {
        Self::with_sync_stages(address_bits, data_width, DEFAULT_SYNC_STAGES)
    }

    /// Create a FIFO with an explicit synchronizer chain depth.
    pub fn with_sync_stages(
        address_bits: u32,
        data_width: u32,
        sync_stages: usize,
    ) -> Result<Self, FifoError> {
        if address_bits == 0 {
            return Err(FifoError::ZeroAddressWidth);
        }
        if address_bits > MAX_ADDRESS_BITS {
            return Err(FifoError::AddressWidthTooLarge(address_bits));
        }
        if data_width == 0 || data_width > MAX_DATA_WIDTH {
            return Err(FifoError::InvalidDataWidth(data_width));
        }
        if sync_stages == 0 {
            return Err(FifoError::ZeroSyncStages);
        }
        if sync_stages < DEFAULT_SYNC_STAGES {
            log::warn!(
                "async_fifo: {} synchronizer stage(s) is below the metastability-safe minimum of {}",
                sync_stages,
                DEFAULT_SYNC_STAGES
            );
        }

        Ok(Self {
            write: WriteDomain {
                ptr: GrayCounter::new(address_bits),
                full: false,
                gray_export: 0,
                rgray_sync: Synchronizer::new(sync_stages),
                reset: ResetSynchronizer::new(sync_stages),
            },
            read: ReadDomain {
                ptr: GrayCounter::new(address_bits),
                empty: true,
                wgray_sync: Synchronizer::new(sync_stages),
                reset: ResetSynchronizer::new(sync_stages),
            },
            mem: RingMemory::new(address_bits),
            address_bits,
            data_width,
            data_mask: mask_for(data_width),
            sync_stages,
            wrap_mask: 0b11 << (address_bits - 1),
        })
    }

    /// Create a FIFO sized for `bus`, validating the payload width at
    /// construction.
    pub fn attached(address_bits: u32, bus: &FifoBus) -> Result<Self, FifoError> {
        Self::new(address_bits, bus.data_width())
    }

    /// One write-clock edge.
    ///
    /// The write is accepted iff `write` is asserted and the FIFO was not
    /// full at this edge; an unaccepted write is silently absorbed.
    pub fn tick_write(&mut self, write: bool, write_data: u64) -> WriteTick {
        if self.write.reset.tick() {
            self.apply_write_reset();
            return WriteTick {
                full: false,
                accepted: false,
            };
        }

        let accepted = write && !self.write.full;
        let wgray_next = if accepted {
            self.write.ptr.next_gray()
        } else {
            self.write.ptr.gray()
        };

        // Memory pipeline shifts every edge; the capture register loads
        // only on an accepted write.
        self.mem
            .tick_write(accepted, self.write.ptr.addr(), write_data & self.data_mask);

        // Full is judged against the synchronized read pointer as it stood
        // before this edge, with the top two bits inverted.
        let rgray = self.write.rgray_sync.output();
        let full_next = wgray_next == (rgray ^ self.wrap_mask);

        // This edge's sample of the opposite domain: the registered Gray
        // export only, never the binary pointer.
        self.write.rgray_sync.sample(self.read.ptr.gray());

        // The export picks up the pre-advance pointer, so a write accepted
        // at this edge reaches the read domain one write edge later, in
        // step with its array commit.
        self.write.gray_export = self.write.ptr.gray();

        if accepted {
            self.write.ptr.advance();
        }
        if full_next != self.write.full {
            log::trace!("async_fifo: full {} -> {}", self.write.full, full_next);
        }
        self.write.full = full_next;

        WriteTick {
            full: full_next,
            accepted,
        }
    }

    /// One read-clock edge.
    ///
    /// The read is accepted iff `read` is asserted and the FIFO was not
    /// empty at this edge. `read_data` carries the registered memory
    /// output, one edge behind the address, so an accepted read's payload
    /// appears in this edge's returned tick.
    pub fn tick_read(&mut self, read: bool) -> ReadTick {
        if self.read.reset.tick() {
            self.apply_read_reset();
            return ReadTick {
                read_data: 0,
                read_valid: false,
                empty: true,
                accepted: false,
            };
        }

        let accepted = read && !self.read.empty;
        let rgray_next = if accepted {
            self.read.ptr.next_gray()
        } else {
            self.read.ptr.gray()
        };

        let read_data = self.mem.tick_read(self.read.ptr.addr());

        // Empty is a read-domain-local predicate: next read pointer vs the
        // synchronized write pointer as it stood before this edge.
        let wgray = self.read.wgray_sync.output();
        let empty_next = rgray_next == wgray;

        // Sample the commit-aligned export, not the live pointer: a word
        // still in the write capture register must look like empty space.
        self.read.wgray_sync.sample(self.write.gray_export);

        if accepted {
            self.read.ptr.advance();
        }
        if empty_next != self.read.empty {
            log::trace!("async_fifo: empty {} -> {}", self.read.empty, empty_next);
        }
        self.read.empty = empty_next;

        ReadTick {
            read_data: read_data & self.data_mask,
            read_valid: accepted,
            empty: empty_next,
            accepted,
        }
    }

    /// Reset the write domain. Takes effect immediately and holds the
    /// domain in reset for `sync_stages` write ticks while the
    /// de-assertion re-synchronizes.
    pub fn reset_write_domain(&mut self) {
        log::debug!("async_fifo: write-domain reset");
        self.write.reset.assert_reset();
        self.apply_write_reset();
    }

    /// Reset the read domain; the counterpart of
    /// [`reset_write_domain`](Self::reset_write_domain). A full clear of
    /// the FIFO requires both calls; there is no atomic combined reset.
    pub fn reset_read_domain(&mut self) {
        log::debug!("async_fifo: read-domain reset");
        self.read.reset.assert_reset();
        self.apply_read_reset();
    }

    fn apply_write_reset(&mut self) {
        self.write.ptr.reset();
        self.write.full = false;
        self.write.gray_export = 0;
        self.write.rgray_sync.reset();
        self.mem.reset_write_path();
    }

    fn apply_read_reset(&mut self) {
        self.read.ptr.reset();
        self.read.empty = true;
        self.read.wgray_sync.reset();
        self.mem.reset_read_path();
    }

    /// Registered full flag (write-domain view).
    #[inline]
    pub fn full(&self) -> bool {
        self.write.full
    }

    /// Registered empty flag (read-domain view).
    #[inline]
    pub fn empty(&self) -> bool {
        self.read.empty
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.mem.depth()
    }

    /// Address width in bits.
    pub fn address_bits(&self) -> u32 {
        self.address_bits
    }

    /// Payload width in bits.
    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    /// Synchronizer chain depth per crossing.
    pub fn sync_stages(&self) -> usize {
        self.sync_stages
    }
}
