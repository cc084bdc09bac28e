use crate::{address, config, ADDRESS_BITS};

/// Mask with the lowest `width` bits set.
///
/// Total for `width >= 64`, where a plain `(1 << width) - 1` would overflow.
#[inline]
#[must_use]
pub fn mask(width: u32) -> address {
    if width >= ADDRESS_BITS {
        address::MAX
    } else {
        (1 << width) - 1
    }
}

/// Extracts the `width` bit field starting at bit `low`, right-aligned.
///
/// Fields of width zero, or starting at or above bit 64, are empty and yield 0.
#[inline]
#[must_use]
pub fn field(addr: address, low: u32, width: u32) -> address {
    if width == 0 {
        return 0;
    }
    addr.checked_shr(low).unwrap_or(0) & mask(width)
}

/// Splits an address into `(tag, set_index)`.
///
/// The tag is the top `64 - s - b` bits and the set index is the `s` bits
/// directly below it. The low `b` block offset bits are dropped.
/// Callers guarantee `s + b <= 64`.
#[inline]
#[must_use]
pub fn decode(addr: address, s: u32, b: u32) -> (address, u64) {
    debug_assert!(s + b <= ADDRESS_BITS);
    let t = ADDRESS_BITS - s - b;
    let tag = field(addr, s + b, t);
    let set_index = field(addr, b, s);
    (tag, set_index)
}

/// The low `b` bits of an address.
#[inline]
#[must_use]
pub fn block_offset(addr: address, b: u32) -> address {
    field(addr, 0, b)
}

/// Rebuilds the block address (offset bits cleared) from a tag and set index.
#[inline]
#[must_use]
pub fn compose(tag: address, set_index: u64, s: u32, b: u32) -> address {
    let tag_part = tag.checked_shl(s + b).unwrap_or(0);
    let set_part = (set_index & mask(s)).checked_shl(b).unwrap_or(0);
    tag_part | set_part
}

pub trait AddressTranslation: std::fmt::Debug + Send + Sync + 'static {
    /// Compute cache line tag for an address.
    #[must_use]
    fn tag(&self, addr: address) -> address;

    /// Compute set index for an address.
    #[must_use]
    fn set_index(&self, addr: address) -> u64;

    /// Compute block address for an address.
    #[must_use]
    fn block_addr(&self, addr: address) -> address;

    /// Compute `(tag, set_index)` in one step.
    #[must_use]
    fn decode(&self, addr: address) -> (address, u64) {
        (self.tag(addr), self.set_index(addr))
    }
}

/// Linear tag / set / offset decoding for a given cache geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decoder {
    set_bits: u32,
    block_bits: u32,
}

impl Decoder {
    #[must_use]
    pub fn new(config: &config::Cache) -> Self {
        Self {
            set_bits: config.set_bits(),
            block_bits: config.block_bits(),
        }
    }
}

impl From<&config::Cache> for Decoder {
    fn from(config: &config::Cache) -> Self {
        Self::new(config)
    }
}

impl AddressTranslation for Decoder {
    #[inline]
    fn tag(&self, addr: address) -> address {
        decode(addr, self.set_bits, self.block_bits).0
    }

    #[inline]
    fn set_index(&self, addr: address) -> u64 {
        decode(addr, self.set_bits, self.block_bits).1
    }

    #[inline]
    fn block_addr(&self, addr: address) -> address {
        addr & !mask(self.block_bits)
    }

    #[inline]
    fn decode(&self, addr: address) -> (address, u64) {
        decode(addr, self.set_bits, self.block_bits)
    }
}
