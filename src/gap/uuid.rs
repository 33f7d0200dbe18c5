use std::fmt::{Debug, Display, Formatter};
use std::num::{NonZeroU128, NonZeroU16};
use std::str::FromStr;

/// Bluetooth base UUID ([Vol 3] Part B, Section 2.5.1).
const BASE: u128 = 0x00000000_0000_1000_8000_00805F9B34FB;
const SHORT_SHIFT: u32 = 96;
const SHORT_MASK: u128 = (u16::MAX as u128) << SHORT_SHIFT;

/// 128-bit service or characteristic UUID.
///
/// 16-bit SIG UUIDs are widened onto the Bluetooth base UUID, so two UUIDs
/// match if and only if both their base and short parts are equal. Service,
/// characteristic, and callback lookups all use this equality.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Uuid(NonZeroU128);

impl Uuid {
    /// Length of the ASCII representation accepted by [`Uuid::from_ascii`].
    pub const ASCII_LEN: usize = 16;

    /// Creates a UUID from a non-zero `u128`.
    #[inline]
    #[must_use]
    pub const fn new(v: u128) -> Option<Self> {
        match NonZeroU128::new(v) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Creates a UUID from the first 16 bytes of an ASCII string, taken in
    /// order as the big-endian UUID value. Returns `None` if the string is
    /// shorter than 16 bytes or all bytes are zero.
    #[must_use]
    pub fn from_ascii(s: &str) -> Option<Self> {
        let b: [u8; Self::ASCII_LEN] = s.as_bytes().get(..Self::ASCII_LEN)?.try_into().ok()?;
        Self::new(u128::from_be_bytes(b))
    }

    /// Returns the 16-bit SIG UUID if this UUID is on the base UUID.
    #[must_use]
    pub fn as_uuid16(self) -> Option<Uuid16> {
        if self.0.get() & !SHORT_MASK != BASE {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let v = (self.0.get() >> SHORT_SHIFT) as u16;
        Uuid16::new(v)
    }

    /// Returns the UUID as a big-endian byte array, which is the order used by
    /// the iBeacon payload.
    #[inline]
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 16] {
        self.0.get().to_be_bytes()
    }
}

impl From<Uuid16> for Uuid {
    #[inline]
    fn from(u: Uuid16) -> Self {
        u.as_uuid()
    }
}

impl From<Uuid> for u128 {
    #[inline]
    fn from(u: Uuid) -> Self {
        u.0.get()
    }
}

impl Debug for Uuid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(u) = self.as_uuid16() {
            return Debug::fmt(&u, f);
        }
        let b = self.to_be_bytes();
        for (i, v) in b.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{v:02X}")?;
        }
        Ok(())
    }
}

impl Display for Uuid {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

/// Error returned when a UUID string cannot be parsed.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid UUID: {0:?}")]
pub struct ParseUuidError(String);

impl FromStr for Uuid {
    type Err = ParseUuidError;

    /// Parses either a 16-bit SIG UUID (`180F` or `0x180F`) or a 128-bit UUID
    /// with or without hyphens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseUuidError(s.to_owned());
        let hex: String = (s.strip_prefix("0x").unwrap_or(s).chars())
            .filter(|&c| c != '-')
            .collect();
        if !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        match hex.len() {
            4 => (u16::from_str_radix(&hex, 16).ok())
                .and_then(Uuid16::new)
                .map(Uuid16::as_uuid),
            32 => (u128::from_str_radix(&hex, 16).ok()).and_then(Uuid::new),
            _ => None,
        }
        .ok_or_else(err)
    }
}

impl serde::Serialize for Uuid {
    #[inline]
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Uuid {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 16-bit Bluetooth SIG UUID.
#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Uuid16(NonZeroU16);

impl Uuid16 {
    /// Creates a SIG UUID from a non-zero `u16`.
    #[inline]
    #[must_use]
    pub const fn new(v: u16) -> Option<Self> {
        match NonZeroU16::new(v) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Returns the UUID widened onto the base UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(self) -> Uuid {
        // SAFETY: BASE is non-zero
        Uuid(unsafe { NonZeroU128::new_unchecked((self.0.get() as u128) << SHORT_SHIFT | BASE) })
    }
}

impl Debug for Uuid16 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06X}", self.0.get())
    }
}

impl Display for Uuid16 {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl From<Uuid16> for u16 {
    #[inline]
    fn from(u: Uuid16) -> Self {
        u.0.get()
    }
}

impl PartialEq<Uuid> for Uuid16 {
    #[inline]
    fn eq(&self, rhs: &Uuid) -> bool {
        self.as_uuid() == *rhs
    }
}

impl PartialEq<Uuid16> for Uuid {
    #[inline]
    fn eq(&self, rhs: &Uuid16) -> bool {
        *self == rhs.as_uuid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_forms() {
        let bas = Uuid16::new(0x180F).unwrap();
        let long = Uuid::new(0x0000180F_0000_1000_8000_00805F9B34FB).unwrap();
        assert_eq!(bas.as_uuid(), long);
        assert_eq!(bas, long);
        assert_eq!(long.as_uuid16(), Some(bas));
        assert_eq!(u16::from(bas), 0x180F);
        assert_eq!(format!("{long}"), "0x180F");

        // Same short part on a different base is a different UUID
        let other = Uuid::new(0x0000180F_0000_1000_8000_00805F9B34FC).unwrap();
        assert_ne!(other, long);
        assert_eq!(other.as_uuid16(), None);
    }

    #[test]
    fn from_ascii() {
        let u = Uuid::from_ascii("bftj light      ").unwrap();
        assert_eq!(&u.to_be_bytes(), b"bftj light      ");
        assert_eq!(u, Uuid::from_ascii("bftj light      plus extra").unwrap());
        assert_ne!(u, Uuid::from_ascii("bftj light colo ").unwrap());
        assert_eq!(Uuid::from_ascii("too short"), None);
        assert_eq!(Uuid::from_ascii("\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0"), None);
    }

    #[test]
    fn debug_format() {
        let u = Uuid::new(0xE20A39F4_73F5_4BC4_A12F_17D1AD07A961).unwrap();
        assert_eq!(format!("{u:?}"), "E20A39F4-73F5-4BC4-A12F-17D1AD07A961");
        let ascii = Uuid::from_ascii("bftj light color").unwrap();
        assert_eq!(format!("{ascii}"), "6266746A-206C-6967-6874-20636F6C6F72");
    }

    #[test]
    fn parse() {
        let u = Uuid::new(0xE20A39F4_73F5_4BC4_A12F_17D1AD07A961).unwrap();
        assert_eq!("E20A39F4-73F5-4BC4-A12F-17D1AD07A961".parse::<Uuid>(), Ok(u));
        assert_eq!("e20a39f473f54bc4a12f17d1ad07a961".parse::<Uuid>(), Ok(u));
        assert_eq!(u.to_string().parse::<Uuid>(), Ok(u));
        let bas = Uuid16::new(0x180F).unwrap().as_uuid();
        assert_eq!("0x180F".parse::<Uuid>(), Ok(bas));
        assert_eq!("180f".parse::<Uuid>(), Ok(bas));
        assert!("0x0000".parse::<Uuid>().is_err());
        assert!("xyz".parse::<Uuid>().is_err());
        assert!("E20A39F4-73F5".parse::<Uuid>().is_err());
    }
}
