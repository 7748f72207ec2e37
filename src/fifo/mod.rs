//! FIFO building blocks.
//!
//! Two engines share one memory abstraction:
//!
//! - [`SyncFifo`]: single-clock ring buffer with a four-state control
//!   machine, driven through a [`FifoBus`].
//! - [`AsyncFifo`]: dual-clock ring buffer whose write and read domains
//!   exchange Gray-coded pointers through per-domain synchronizers. The
//!   two domains may be ticked in any relative order; correctness under
//!   arbitrary interleaving is the whole point of the design.
//!
//! Both engines sit on [`memory::RingMemory`]; the dual-clock one adds
//! [`gray::GrayCounter`] pointers and [`sync::Synchronizer`] chains.

pub mod async_fifo;
pub mod gray;
pub mod memory;
pub mod sync;
pub mod sync_fifo;

pub use async_fifo::{AsyncFifo, ReadTick, WriteTick};
pub use sync_fifo::SyncFifo;

use thiserror::Error;

/// Write-side pipeline depth: capture register plus array commit.
pub const WRITE_PIPELINE_STAGES: usize = 2;

/// Read-side pipeline depth: one registered output stage.
pub const READ_PIPELINE_STAGES: usize = 1;

/// Default depth of the cross-domain synchronizer chains.
pub const DEFAULT_SYNC_STAGES: usize = 2;

/// Widest payload a bus can carry (words are modeled as `u64`).
pub const MAX_DATA_WIDTH: u32 = 64;

/// Widest address supported (bounds the backing array allocation).
pub const MAX_ADDRESS_BITS: u32 = 24;

/// Construction-time errors. No FIFO operation fails at runtime; flow
/// violations are absorbed silently and observable via the flags only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FifoError {
    /// Address width of zero would make an empty ring buffer.
    #[error("address width must be at least 1 bit")]
    ZeroAddressWidth,

    /// Address width beyond the supported maximum.
    #[error("address width {0} exceeds the maximum of {MAX_ADDRESS_BITS} bits")]
    AddressWidthTooLarge(u32),

    /// Data width outside 1..=64.
    #[error("data width must be between 1 and {MAX_DATA_WIDTH} bits, got {0}")]
    InvalidDataWidth(u32),

    /// A synchronizer chain needs at least one register.
    #[error("synchronizer depth must be at least 1 stage")]
    ZeroSyncStages,

    /// Bus and FIFO disagree on the payload width.
    #[error("bus data width {bus} does not match FIFO data width {fifo}")]
    WidthMismatch { bus: u32, fifo: u32 },
}

/// Signal set of a FIFO interface.
///
/// Pure data contract: the write side drives `write`/`write_data` and
/// watches `full`; the read side drives `read` and watches `read_data`/
/// `read_valid`/`empty`; `clear` is a synchronous-clear request sampled by
/// whichever clock owns the FIFO. `count` is populated only when the
/// attached FIFO tracks occupancy.
#[derive(Debug, Clone)]
pub struct FifoBus {
    /// Synchronous-clear request.
    pub clear: bool,
    /// Write strobe.
    pub write: bool,
    /// Write payload, masked to `data_width` bits.
    pub write_data: u64,
    /// Read (acknowledge) strobe.
    pub read: bool,
    /// Read payload, valid when `read_valid` is set.
    pub read_data: u64,
    /// The data on the bus this cycle is the result of the most recent
    /// read request.
    pub read_valid: bool,
    /// No occupied slots.
    pub empty: bool,
    /// No free slots.
    pub full: bool,
    /// Instantaneous occupancy, when tracking is enabled.
    pub count: Option<u64>,
    /// Payload width in bits; write and read paths share it by
    /// construction.
    data_width: u32,
}

impl FifoBus {
    /// Create a quiescent bus carrying `data_width`-bit payloads.
    ///
    /// Fails fast on an unusable width; this is the construction-time
    /// equivalent of the interface check the flags cannot express.
    pub fn new(data_width: u32) -> Result<Self, FifoError> {
        if data_width == 0 || data_width > MAX_DATA_WIDTH {
            return Err(FifoError::InvalidDataWidth(data_width));
        }
        Ok(Self {
            clear: false,
            write: false,
            write_data: 0,
            read: false,
            read_data: 0,
            read_valid: false,
            empty: true,
            full: false,
            count: None,
            data_width,
        })
    }

    /// Payload width in bits.
    #[inline]
    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    /// Mask covering `data_width` bits.
    #[inline]
    pub fn data_mask(&self) -> u64 {
        mask_for(self.data_width)
    }
}

/// Bit mask for a `width`-bit value, `width` in 1..=64.
#[inline]
pub(crate) fn mask_for(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}
