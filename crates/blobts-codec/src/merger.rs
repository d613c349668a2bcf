use num_bigint::{BigInt, BigUint};

/// Reversibly packs two integers into one.
///
/// The high integer may be negative; the low integer is unsigned and at most
/// `width` bits wide. In the merged integer the low `width` bits hold the low
/// integer and everything above holds the high integer, so
/// `merge(h, l) == (h << width) | l` with two's-complement semantics.
#[derive(Clone, Debug)]
pub struct IntegerMerger {
    width: u32,
    mask: BigInt,
}

impl IntegerMerger {
    /// Create a merger whose low integer is `width` bits wide.
    pub fn new(width: u32) -> Self {
        let mask = (BigInt::from(1u8) << width) - 1u8;
        Self { width, mask }
    }

    /// Bit width reserved for the low integer.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Merge `high` and `low`.
    ///
    /// `low` must be below `2^width`; callers own nonce generation, so this
    /// is only checked in debug builds.
    pub fn merge(&self, high: &BigInt, low: &BigUint) -> BigInt {
        debug_assert!(
            low.bits() <= u64::from(self.width),
            "low integer wider than {} bits",
            self.width
        );
        (high << self.width) | BigInt::from(low.clone())
    }

    /// Split a merged integer back into `(high, low)`.
    ///
    /// The shift is arithmetic, so the sign of `high` survives.
    pub fn split(&self, merged: &BigInt) -> (BigInt, BigUint) {
        let low = merged & &self.mask;
        let high = merged >> self.width;
        (high, low.magnitude().clone())
    }
}
