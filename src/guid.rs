//! Stable 128-bit entity identity values.
//!
//! A [`Guid`] is the only reference to an entity that survives a save/load
//! cycle. Runtime [`Entity`](crate::Entity) handles are recycled and mean
//! nothing across runs; every serialized cross-reference goes through a Guid
//! and is resolved back via the [`IdentityRegistry`](crate::IdentityRegistry).

use std::fmt;
use std::str::FromStr;

/// A 128-bit stable identity value, formatted as 32 hex digits.
///
/// `Guid::NIL` (all zero bits) is the invalid sentinel; freshly minted
/// identities are never nil.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid {
    high: u64,
    low: u64,
}

impl Guid {
    /// The invalid sentinel identity (all zero bits).
    pub const NIL: Guid = Guid { high: 0, low: 0 };

    /// Creates a Guid from its two 64-bit halves.
    pub const fn from_parts(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    /// Mints a fresh random identity. Never returns [`Guid::NIL`].
    pub fn generate() -> Self {
        loop {
            let guid = Guid {
                high: fastrand::u64(..),
                low: fastrand::u64(..),
            };
            if !guid.is_nil() {
                return guid;
            }
        }
    }

    /// Returns `true` for the invalid sentinel.
    pub fn is_nil(&self) -> bool {
        self.high == 0 && self.low == 0
    }

    /// Formats this identity as 32 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        format!("{:016x}{:016x}", self.high, self.low)
    }
}

/// Error returned when parsing a malformed identity string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGuidError {
    input: String,
}

impl fmt::Display for ParseGuidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid identity string '{}'", self.input)
    }
}

impl std::error::Error for ParseGuidError {}

impl FromStr for Guid {
    type Err = ParseGuidError;

    /// Parses 32 hex digits (either case). Anything else is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseGuidError { input: s.to_owned() });
        }
        let high = u64::from_str_radix(&s[..16], 16).map_err(|_| ParseGuidError {
            input: s.to_owned(),
        })?;
        let low = u64::from_str_radix(&s[16..], 16).map_err(|_| ParseGuidError {
            input: s.to_owned(),
        })?;
        Ok(Guid { high, low })
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.high, self.low)
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({:016x}{:016x})", self.high, self.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_is_default() {
        assert_eq!(Guid::default(), Guid::NIL);
        assert!(Guid::NIL.is_nil());
    }

    #[test]
    fn generate_not_nil() {
        for _ in 0..64 {
            assert!(!Guid::generate().is_nil());
        }
    }

    #[test]
    fn hex_round_trip() {
        let guid = Guid::from_parts(0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210);
        let hex = guid.to_hex();
        assert_eq!(hex, "0123456789abcdeffedcba9876543210");
        assert_eq!(hex.parse::<Guid>().unwrap(), guid);
    }

    #[test]
    fn parse_accepts_uppercase() {
        let guid: Guid = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
        assert_eq!(guid, Guid::from_parts(0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("".parse::<Guid>().is_err());
        assert!("1234".parse::<Guid>().is_err());
        assert!("zz23456789abcdeffedcba9876543210".parse::<Guid>().is_err());
        assert!("0123456789abcdeffedcba98765432100".parse::<Guid>().is_err());
    }

    #[test]
    fn display_matches_hex() {
        let guid = Guid::generate();
        assert_eq!(format!("{guid}"), guid.to_hex());
    }
}
