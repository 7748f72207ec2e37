//! cdcsim library
//!
//! Cycle-level models of synchronous and asynchronous (dual-clock) FIFOs
//! with Gray-code pointer synchronization across the clock-domain crossing.

pub mod config;
pub mod fifo;
pub mod sim;

pub use fifo::{AsyncFifo, FifoBus, FifoError, ReadTick, SyncFifo, WriteTick};
pub use sim::DualClockHarness;
