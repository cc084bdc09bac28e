use crate::ADDRESS_BITS;
use serde::Serialize;
use std::num::NonZeroUsize;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("associativity must be at least 1 line per set")]
    ZeroAssociativity,
    #[error(
        "{set_bits} set index bits and {block_bits} block offset bits exceed the {} bit address",
        ADDRESS_BITS
    )]
    FieldsExceedAddress { set_bits: u32, block_bits: u32 },
    #[error("cache with 2^{set_bits} sets of {associativity} lines does not fit into memory")]
    TooLarge { set_bits: u32, associativity: usize },
}

/// Structural parameters of a set-associative cache.
///
/// An address is split (high to low) into `tag_bits()` tag bits,
/// `set_bits()` set index bits and `block_bits()` block offset bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Cache {
    /// Number of set index bits (`s`).
    set_bits: u32,
    /// Number of lines per set (`E`).
    associativity: NonZeroUsize,
    /// Number of block offset bits (`b`).
    block_bits: u32,
}

impl Cache {
    /// Validates the structural parameters.
    ///
    /// # Errors
    /// When `associativity` is zero, when the set index and block offset
    /// fields do not fit into an address, or when the total number of
    /// lines is not addressable on this host.
    pub fn new(set_bits: u32, associativity: usize, block_bits: u32) -> Result<Self, Error> {
        let ways = NonZeroUsize::new(associativity).ok_or(Error::ZeroAssociativity)?;
        match set_bits.checked_add(block_bits) {
            Some(bits) if bits <= ADDRESS_BITS => {}
            _ => {
                return Err(Error::FieldsExceedAddress {
                    set_bits,
                    block_bits,
                })
            }
        }
        let too_large = Error::TooLarge {
            set_bits,
            associativity,
        };
        let num_sets = 1usize.checked_shl(set_bits).ok_or(too_large.clone())?;
        num_sets.checked_mul(associativity).ok_or(too_large)?;

        Ok(Self {
            set_bits,
            associativity: ways,
            block_bits,
        })
    }

    #[inline]
    #[must_use]
    pub fn set_bits(&self) -> u32 {
        self.set_bits
    }

    #[inline]
    #[must_use]
    pub fn block_bits(&self) -> u32 {
        self.block_bits
    }

    #[inline]
    #[must_use]
    pub fn associativity(&self) -> usize {
        self.associativity.get()
    }

    #[inline]
    #[must_use]
    pub fn ways(&self) -> NonZeroUsize {
        self.associativity
    }

    #[inline]
    #[must_use]
    pub fn tag_bits(&self) -> u32 {
        ADDRESS_BITS - self.set_bits - self.block_bits
    }

    #[inline]
    #[must_use]
    pub fn num_sets(&self) -> usize {
        1 << self.set_bits
    }

    #[inline]
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.num_sets() * self.associativity()
    }

    /// Block size in bytes, if it can be represented.
    #[inline]
    #[must_use]
    pub fn line_size(&self) -> Option<u64> {
        1u64.checked_shl(self.block_bits)
    }
}

impl std::fmt::Display for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} sets x {} ways (s={}, E={}, b={}, t={})",
            self.num_sets(),
            self.associativity,
            self.set_bits,
            self.associativity,
            self.block_bits,
            self.tag_bits()
        )
    }
}
