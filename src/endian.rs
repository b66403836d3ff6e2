//! Byte order handling.
//!
//! Files are always written in the host's byte order, but may be read on a
//! machine with the opposite one. [`swap`] and [`swapped`] reverse the bytes
//! of a single scalar; for one-byte scalars they are the identity.

use std::fmt;
use std::sync::OnceLock;

/// Byte order declared on the `format` line of a binary PLY header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

static HOST: OnceLock<Endianness> = OnceLock::new();

impl Endianness {
    /// Byte order of the running machine.
    ///
    /// Detected once from the in-memory layout of a known value and cached for
    /// the lifetime of the process.
    pub fn host() -> Self {
        *HOST.get_or_init(|| {
            let marker = 0x0102_0304u32.to_ne_bytes();
            if marker[0] == 0x04 {
                Endianness::Little
            } else {
                Endianness::Big
            }
        })
    }

    /// Whether data in this byte order must be swapped to be read on the host.
    pub fn needs_swap(self) -> bool {
        self != Self::host()
    }

    pub fn opposite(self) -> Self {
        match self {
            Endianness::Little => Endianness::Big,
            Endianness::Big => Endianness::Little,
        }
    }

    /// The `format` keyword used in the PLY header.
    pub fn format_keyword(self) -> &'static str {
        match self {
            Endianness::Little => "binary_little_endian",
            Endianness::Big => "binary_big_endian",
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_keyword())
    }
}

/// Reverse the byte order of one scalar in place.
pub fn swap(bytes: &mut [u8]) {
    bytes.reverse();
}

/// Reverse the byte order of one scalar into a new array.
pub fn swapped<const N: usize>(mut bytes: [u8; N]) -> [u8; N] {
    swap(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_matches_target() {
        let expected = if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        };
        assert_eq!(Endianness::host(), expected);
        assert_eq!(Endianness::host(), Endianness::host());
        assert!(!Endianness::host().needs_swap());
        assert!(Endianness::host().opposite().needs_swap());
    }

    #[test]
    fn swap_is_involution() {
        assert_eq!(swapped(swapped([7u8])), [7u8]);
        assert_eq!(swapped(swapped([1u8, 2])), [1, 2]);
        assert_eq!(swapped(swapped([1u8, 2, 3, 4])), [1, 2, 3, 4]);
        assert_eq!(
            swapped(swapped([1u8, 2, 3, 4, 5, 6, 7, 8])),
            [1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn swap_reverses_bytes() {
        assert_eq!(swapped([0xAAu8]), [0xAA]);
        assert_eq!(swapped([1u8, 2, 3, 4]), [4, 3, 2, 1]);

        let value = 1.0f32;
        let mut bytes = value.to_le_bytes();
        swap(&mut bytes);
        assert_eq!(bytes, value.to_be_bytes());
    }
}
