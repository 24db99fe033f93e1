//! Pure, non-cryptographic 128-bit hashing used throughout the identifier
//! engine.

use std::cmp::Ordering;
use std::fmt;

use xxhash_rust::xxh3::Xxh3;

/// A 128-bit task identifier, derived purely from flow content.
///
/// Internally just a byte array; comparisons and ordering operate on the
/// raw bytes so sorting a set of ids never depends on how they are
/// rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId([u8; 16]);

#[cfg(feature = "serde")]
impl serde::Serialize for TaskId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TaskId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        TaskId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl TaskId {
    /// Wraps a raw 16-byte digest.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Parses a 32-character lowercase hex string back into an id.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is not exactly 32 hex characters.
    pub fn from_hex(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let array: [u8; 16] = bytes.try_into().map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(array))
    }

    /// Returns the raw bytes backing this id.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Renders the id as lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Renders the id as unpadded base32 (RFC 4648 alphabet).
    #[must_use]
    pub fn to_base32(&self) -> String {
        const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
        let mut out = String::with_capacity(26);
        let mut buf = 0u64;
        let mut bits = 0u32;
        for &byte in &self.0 {
            buf = (buf << 8) | u64::from(byte);
            bits += 8;
            while bits >= 5 {
                bits -= 5;
                let idx = ((buf >> bits) & 0x1f) as usize;
                out.push(ALPHABET[idx] as char);
            }
        }
        if bits > 0 {
            let idx = ((buf << (5 - bits)) & 0x1f) as usize;
            out.push(ALPHABET[idx] as char);
        }
        out
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl PartialOrd for TaskId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaskId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Hashes an ordered sequence of byte strings into a 128-bit digest.
///
/// Each part is fed to the underlying hasher as a length-prefixed frame (an
/// 8-byte little-endian length, then the part's bytes) so that
/// `digest(["ab", "c"])` and `digest(["a", "bc"])` never collide purely
/// because of where a boundary falls.
#[must_use]
pub fn digest<I, P>(parts: I) -> TaskId
where
    I: IntoIterator<Item = P>,
    P: AsRef<[u8]>,
{
    let mut hasher = Xxh3::new();
    for part in parts {
        let bytes = part.as_ref();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    TaskId::from_bytes(hasher.digest128().to_le_bytes())
}
