//! A hasher which hands integer keys back as their own digest. Handy when the slot or
//! bucket a key lands in has to be predictable, e.g. in layout-sensitive tests.

use std::hash::{BuildHasher, Hasher};

/// Digest of an integer key of up to 64 bits is the integer itself (signed keys are
/// sign-extended). A 128-bit key digests to the xor of its high and low halves, so it is
/// still the identity below `2^64`. Other input is folded in by rotate-and-xor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityHasher(u64);

impl IdentityHasher {
    /// Folds `bits` worth of `value` into the running state
    fn fold(&mut self, value: u64, bits: u32) {
        self.0 = self.0.rotate_left(bits) ^ value;
    }
}

impl Hasher for IdentityHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.fold(u64::from(byte), u8::BITS);
        }
    }

    fn write_u8(&mut self, n: u8) {
        self.fold(u64::from(n), u8::BITS);
    }

    fn write_u16(&mut self, n: u16) {
        self.fold(u64::from(n), u16::BITS);
    }

    fn write_u32(&mut self, n: u32) {
        self.fold(u64::from(n), u32::BITS);
    }

    fn write_u64(&mut self, n: u64) {
        self.fold(n, u64::BITS);
    }

    #[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]
    fn write_u128(&mut self, n: u128) {
        self.fold((n >> u64::BITS) as u64, u64::BITS);
        self.fold(n as u64, u64::BITS);
    }

    fn write_usize(&mut self, n: usize) {
        self.fold(n as u64, usize::BITS);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_i8(&mut self, n: i8) {
        self.fold(i64::from(n) as u64, u8::BITS);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_i16(&mut self, n: i16) {
        self.fold(i64::from(n) as u64, u16::BITS);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_i32(&mut self, n: i32) {
        // sign-extended, so -1 digests to u64::MAX
        self.fold(i64::from(n) as u64, u32::BITS);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_i64(&mut self, n: i64) {
        self.fold(n as u64, u64::BITS);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_i128(&mut self, n: i128) {
        self.write_u128(n as u128);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_isize(&mut self, n: isize) {
        self.fold(n as u64, usize::BITS);
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// Builds fresh [`IdentityHasher`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildIdentityHasher;

impl BuildHasher for BuildIdentityHasher {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_hash_to_themselves() {
        let build = BuildIdentityHasher;
        assert_eq!(build.hash_one(0_usize), 0);
        assert_eq!(build.hash_one(42_u32), 42);
        assert_eq!(build.hash_one(0xc8c8_c8c8_c8c8_c8c8_u64), 0xc8c8_c8c8_c8c8_c8c8);
        assert_eq!(build.hash_one(7_i32), 7);
        assert_eq!(build.hash_one(-1_i32), u64::MAX);
    }

    #[test]
    fn test_wide_and_narrow_integers() {
        let build = BuildIdentityHasher;
        assert_eq!(build.hash_one(5_u128), 5);
        assert_eq!(build.hash_one(u128::from(u64::MAX)), u64::MAX);
        assert_eq!(build.hash_one((1_u128 << 64) | 3), 2);
        assert_eq!(build.hash_one(5_i128), 5);
        assert_eq!(build.hash_one(-1_i128), 0);
        assert_eq!(build.hash_one(-1_i8), u64::MAX);
        assert_eq!(build.hash_one(300_i16), 300);
    }

    #[test]
    fn test_bytes_fold_in_order() {
        let mut hasher = IdentityHasher::default();
        hasher.write(&[0x01, 0x02]);
        assert_eq!(hasher.finish(), 0x0102);
    }

    #[test]
    fn test_strings_are_deterministic() {
        let build = BuildIdentityHasher;
        assert_eq!(build.hash_one("apple"), build.hash_one("apple"));
        assert_ne!(build.hash_one("apple"), build.hash_one("banana"));
    }
}
