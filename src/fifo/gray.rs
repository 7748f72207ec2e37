//! Gray-code transforms and the dual-representation FIFO pointer.
//!
//! Cross-domain pointers are kept in two forms: a binary counter used for
//! arithmetic and memory addressing, and its Gray image used for export to
//! the opposite clock domain. Gray code changes exactly one bit per
//! increment, so a synchronizer that samples the export mid-transition
//! observes either the old or the new value, never a torn mix of both.

/// Convert a binary value to its Gray-code image.
#[inline]
pub fn encode(bin: u64) -> u64 {
    (bin >> 1) ^ bin
}

/// Convert a Gray-code value back to binary.
///
/// Inverse of [`encode`] for values up to 64 bits.
#[inline]
pub fn decode(gray: u64) -> u64 {
    let mut bin = gray;
    let mut shift = 1;
    while shift < 64 {
        bin ^= bin >> shift;
        shift <<= 1;
    }
    bin
}

/// A FIFO pointer held in binary and Gray form, one bit wider than the
/// memory address so that a full FIFO is distinguishable from an empty one.
#[derive(Debug, Clone, Copy)]
pub struct GrayCounter {
    /// Binary counter, `addr_bits + 1` significant bits.
    bin: u64,
    /// Gray image of `bin`, updated in lockstep.
    gray: u64,
    /// Mask for the full pointer width (`addr_bits + 1` bits).
    ptr_mask: u64,
    /// Mask for the memory address (low `addr_bits` bits).
    addr_mask: u64,
}

impl GrayCounter {
    /// Create a zeroed pointer for a FIFO with `addr_bits`-bit addresses.
    pub fn new(addr_bits: u32) -> Self {
        debug_assert!(addr_bits >= 1 && addr_bits < 63);
        Self {
            bin: 0,
            gray: 0,
            ptr_mask: (1 << (addr_bits + 1)) - 1,
            addr_mask: (1 << addr_bits) - 1,
        }
    }

    /// Binary pointer value after one increment, modulo `2^(addr_bits+1)`.
    #[inline]
    pub fn next_bin(&self) -> u64 {
        (self.bin + 1) & self.ptr_mask
    }

    /// Gray image of [`Self::next_bin`].
    #[inline]
    pub fn next_gray(&self) -> u64 {
        encode(self.next_bin())
    }

    /// Advance the pointer by one accepted operation.
    #[inline]
    pub fn advance(&mut self) {
        self.bin = self.next_bin();
        self.gray = encode(self.bin);
    }

    /// Current binary value (full `addr_bits + 1` width).
    #[inline]
    pub fn bin(&self) -> u64 {
        self.bin
    }

    /// Current Gray image. This is the only representation that may cross
    /// into the opposite clock domain.
    #[inline]
    pub fn gray(&self) -> u64 {
        self.gray
    }

    /// Memory address derived from the low `addr_bits` bits of the binary
    /// pointer. Addresses never need to be Gray-coded, only the exported
    /// pointers do.
    #[inline]
    pub fn addr(&self) -> u64 {
        self.bin & self.addr_mask
    }

    /// Reset the pointer to zero.
    pub fn reset(&mut self) {
        self.bin = 0;
        self.gray = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_values() {
        // Classic 3-bit Gray sequence
        let expected = [0b000, 0b001, 0b011, 0b010, 0b110, 0b111, 0b101, 0b100];
        for (bin, &gray) in expected.iter().enumerate() {
            assert_eq!(encode(bin as u64), gray);
        }
    }

    #[test]
    fn test_decode_inverts_encode() {
        for bin in 0..4096u64 {
            assert_eq!(decode(encode(bin)), bin);
        }
    }

    #[test]
    fn test_single_bit_change_over_full_wrap() {
        // The whole point of Gray coding: consecutive values differ in
        // exactly one bit, including the wrap back to zero.
        let bits = 5;
        let modulus = 1u64 << bits;
        for bin in 0..modulus {
            let a = encode(bin);
            let b = encode((bin + 1) & (modulus - 1));
            assert_eq!((a ^ b).count_ones(), 1, "bin={}", bin);
        }
    }

    #[test]
    fn test_counter_advance_and_wrap() {
        let mut ptr = GrayCounter::new(2);
        // 3-bit pointer wraps at 8
        for expected in 1..=8u64 {
            ptr.advance();
            assert_eq!(ptr.bin(), expected & 0b111);
            assert_eq!(ptr.gray(), encode(expected & 0b111));
        }
        assert_eq!(ptr.bin(), 0);
    }

    #[test]
    fn test_counter_addr_uses_low_bits_only() {
        let mut ptr = GrayCounter::new(2);
        for i in 0..16u64 {
            assert_eq!(ptr.addr(), i % 4);
            ptr.advance();
        }
    }

    #[test]
    fn test_counter_reset() {
        let mut ptr = GrayCounter::new(3);
        ptr.advance();
        ptr.advance();
        ptr.reset();
        assert_eq!(ptr.bin(), 0);
        assert_eq!(ptr.gray(), 0);
        assert_eq!(ptr.addr(), 0);
    }
}
