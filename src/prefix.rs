//! Description of the generic key type `BitPrefix`, the only seam between the trie and the
//! address representation.

use std::cmp::Ordering;

#[cfg(feature = "ipnet")]
use ipnet::{Ipv4Net, Ipv6Net};
#[cfg(feature = "ipnetwork")]
use ipnetwork::{Ipv4Network, Ipv6Network};
use num_traits::{CheckedShr, PrimInt, Unsigned, Zero};

/// Result of matching one prefix against another, starting from a given bit offset. This is the
/// contract the trie walk is built on: either the keys agree on all bits of the shorter prefix, or
/// they diverge at a specific bit before either prefix ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitMatch {
    /// Both prefixes have the same bits and the same prefix length.
    Equal,
    /// `self` is a proper prefix of the other key; the walk continues at `self.prefix_len()`.
    Contains,
    /// The other key is a proper prefix of `self`.
    Within,
    /// The keys disagree at bit `bit`, which lies before the end of both prefixes.
    Diverge {
        /// The first bit (counted from the left, starting at 0) where the keys differ.
        bit: u8,
    },
}

/// Trait for defining trie keys: fixed-size bit sequences of which only the first `prefix_len`
/// bits are meaningful (a CIDR block, with a full address being the special case of a full-length
/// prefix).
pub trait BitPrefix: Sized {
    /// How the bits are represented. This must be one of `u8`, `u16`, `u32`, `u64`, or `u128`.
    type R: Unsigned + PrimInt + Zero + CheckedShr;

    /// Get the raw representation of the bits, ignoring the prefix length. This function must
    /// return the representation with the mask already applied.
    fn repr(&self) -> Self::R;

    /// Prefix length.
    fn prefix_len(&self) -> u8;

    /// Create a new prefix from the representation and the prefix length.
    fn from_repr_len(repr: Self::R, len: u8) -> Self;

    /// Total number of bits in the representation.
    fn bits() -> u8 {
        Self::R::zero().count_zeros() as u8
    }

    /// mask `self.repr()` using `self.prefix_len()`. If you can guarantee that `repr` is already
    /// masked, then simply re-implement this function for your type.
    fn mask(&self) -> Self::R {
        self.repr() & mask_from_prefix_len(self.prefix_len())
    }

    /// Create a prefix that matches everything.
    fn zero() -> Self {
        Self::from_repr_len(Self::R::zero(), 0)
    }

    /// Match `self` against `other`, assuming all bits before `start` are already known to
    /// agree. The result distinguishes full agreement (`Equal`), one key being a proper prefix of
    /// the other (`Contains`/`Within`), and divergence at a specific bit.
    fn match_from(&self, other: &Self, start: u8) -> BitMatch {
        let diff = (self.mask() ^ other.mask()).leading_zeros() as u8;
        let min_len = self.prefix_len().min(other.prefix_len());
        debug_assert!(diff >= start.min(min_len));
        if diff < min_len {
            BitMatch::Diverge { bit: diff }
        } else {
            match self.prefix_len().cmp(&other.prefix_len()) {
                Ordering::Equal => BitMatch::Equal,
                Ordering::Less => BitMatch::Contains,
                Ordering::Greater => BitMatch::Within,
            }
        }
    }

    /// Check if `self` contains `other` in its prefix range. This function also returns `true` if
    /// `self` is identical to `other`.
    fn contains(&self, other: &Self) -> bool {
        matches!(
            self.match_from(other, 0),
            BitMatch::Equal | BitMatch::Contains
        )
    }

    /// The longest common prefix of `self` and `other`.
    fn longest_common_prefix(&self, other: &Self) -> Self {
        match self.match_from(other, 0) {
            BitMatch::Diverge { bit } => {
                Self::from_repr_len(self.mask() & mask_from_prefix_len(bit), bit)
            }
            BitMatch::Equal | BitMatch::Contains => {
                Self::from_repr_len(self.mask(), self.prefix_len())
            }
            BitMatch::Within => Self::from_repr_len(other.mask(), other.prefix_len()),
        }
    }

    /// Reproduce the prefix with a new prefix length, masking away any bits beyond it.
    fn with_prefix_len(&self, len: u8) -> Self {
        Self::from_repr_len(self.mask() & mask_from_prefix_len(len), len)
    }

    /// The smallest representation within the prefix range (all wildcard bits zero).
    fn lowest(&self) -> Self::R {
        self.mask()
    }

    /// The largest representation within the prefix range (all wildcard bits one).
    fn highest(&self) -> Self::R {
        self.mask() | !mask_from_prefix_len::<Self::R>(self.prefix_len())
    }

    /// Check if a specific bit is set (counted from the left, where 0 is the first bit from the
    /// left).
    fn is_bit_set(&self, bit: u8) -> bool {
        let mask = (!Self::R::zero())
            .checked_shr(bit as u32)
            .unwrap_or_else(Self::R::zero)
            ^ (!Self::R::zero())
                .checked_shr(1u32 + bit as u32)
                .unwrap_or_else(Self::R::zero);
        mask & self.mask() != Self::R::zero()
    }

    /// Compare two prefixes together.
    fn eq(&self, other: &Self) -> bool {
        self.mask() == other.mask() && self.prefix_len() == other.prefix_len()
    }

    /// Total order of prefixes as the trie enumerates them: by bits from the left, with a block
    /// sorting before every key it contains.
    fn cmp_prefixes(&self, other: &Self) -> Ordering {
        self.mask()
            .cmp(&other.mask())
            .then(self.prefix_len().cmp(&other.prefix_len()))
    }
}

pub(crate) fn mask_from_prefix_len<R>(len: u8) -> R
where
    R: PrimInt + Zero,
{
    if len as u32 == R::zero().count_zeros() {
        !R::zero()
    } else if len == 0 {
        R::zero()
    } else {
        !((!R::zero()) >> len as usize)
    }
}

#[cfg(feature = "ipnet")]
impl BitPrefix for Ipv4Net {
    type R = u32;

    fn repr(&self) -> u32 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn from_repr_len(repr: u32, len: u8) -> Self {
        Ipv4Net::new(repr.into(), len).unwrap()
    }

    fn eq(&self, other: &Self) -> bool {
        self == other
    }

    fn mask(&self) -> u32 {
        self.network().into()
    }

    fn zero() -> Self {
        Default::default()
    }
}

#[cfg(feature = "ipnet")]
impl BitPrefix for Ipv6Net {
    type R = u128;

    fn repr(&self) -> u128 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn from_repr_len(repr: u128, len: u8) -> Self {
        Ipv6Net::new(repr.into(), len).unwrap()
    }

    fn eq(&self, other: &Self) -> bool {
        self == other
    }

    fn mask(&self) -> u128 {
        self.network().into()
    }

    fn zero() -> Self {
        Default::default()
    }
}

#[cfg(feature = "ipnetwork")]
impl BitPrefix for Ipv4Network {
    type R = u32;

    fn repr(&self) -> u32 {
        self.ip().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }

    fn from_repr_len(repr: u32, len: u8) -> Self {
        Ipv4Network::new(repr.into(), len).unwrap()
    }

    fn eq(&self, other: &Self) -> bool {
        self == other
    }

    fn mask(&self) -> u32 {
        self.network().into()
    }
}

#[cfg(feature = "ipnetwork")]
impl BitPrefix for Ipv6Network {
    type R = u128;

    fn repr(&self) -> u128 {
        self.ip().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }

    fn from_repr_len(repr: u128, len: u8) -> Self {
        Ipv6Network::new(repr.into(), len).unwrap()
    }

    fn eq(&self, other: &Self) -> bool {
        self == other
    }

    fn mask(&self) -> u128 {
        self.network().into()
    }
}

impl<R> BitPrefix for (R, u8)
where
    R: Unsigned + PrimInt + Zero + CheckedShr,
{
    type R = R;

    fn repr(&self) -> R {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }

    fn from_repr_len(repr: R, len: u8) -> Self {
        (repr, len)
    }

    fn eq(&self, other: &Self) -> bool {
        self == other
    }
}
