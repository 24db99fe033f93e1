//! A placeholder symmetric wrapper for serialized registry bytes.
//!
//! This is deliberately not a real cipher. The wire format of an
//! encryption-wrapped registry is outside this crate's scope. What is
//! specified is the contract: wrapping with a key and unwrapping with a
//! *different* key must fail detectably rather than silently returning
//! garbage. This is achieved the same way [`dagid_graph`]'s
//! content-addressable storage verifies blob integrity on read: a keyed
//! digest travels alongside the payload and is checked before the
//! payload is trusted.

use sha2::{Digest, Sha256};

const MAGIC: &[u8; 4] = b"DGC1";

/// Wraps `plaintext` with `key`, XOR-ing it against a key-derived stream
/// and appending a keyed checksum.
#[must_use]
pub fn wrap(plaintext: &[u8], key: &str) -> Vec<u8> {
    let keystream = derive_keystream(key, plaintext.len());
    let mut ciphertext: Vec<u8> = plaintext
        .iter()
        .zip(keystream.iter())
        .map(|(b, k)| b ^ k)
        .collect();

    let checksum = keyed_checksum(key, &ciphertext);

    let mut out = Vec::with_capacity(4 + 32 + ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&checksum);
    out.append(&mut ciphertext);
    out
}

/// Returns `true` if `bytes` carries this module's wrapped-payload header.
///
/// Used to tell a genuinely wrapped blob apart from plain JSON when no key
/// is configured to unwrap it.
#[must_use]
pub(crate) fn looks_wrapped(bytes: &[u8]) -> bool {
    bytes.len() >= MAGIC.len() && &bytes[..MAGIC.len()] == MAGIC
}

/// Unwraps bytes previously produced by [`wrap`].
///
/// # Errors
///
/// Returns an error string if the magic header is missing, the payload is
/// truncated, or the checksum does not match `key`. That wrong-key case
/// is what this format exists to make detectable.
pub fn unwrap(wrapped: &[u8], key: &str) -> Result<Vec<u8>, String> {
    if wrapped.len() < 4 + 32 {
        return Err("wrapped registry payload is truncated".to_string());
    }
    if &wrapped[0..4] != MAGIC {
        return Err("wrapped registry payload has an unrecognized header".to_string());
    }

    let checksum = &wrapped[4..36];
    let ciphertext = &wrapped[36..];

    let expected = keyed_checksum(key, ciphertext);
    if expected.as_slice() != checksum {
        return Err("wrong key: checksum mismatch".to_string());
    }

    let keystream = derive_keystream(key, ciphertext.len());
    let plaintext = ciphertext
        .iter()
        .zip(keystream.iter())
        .map(|(b, k)| b ^ k)
        .collect();

    Ok(plaintext)
}

fn derive_keystream(key: &str, len: usize) -> Vec<u8> {
    let mut stream = Vec::with_capacity(len);
    let mut counter: u64 = 0;
    while stream.len() < len {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hasher.update(counter.to_le_bytes());
        stream.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    stream.truncate(len);
    stream
}

fn keyed_checksum(key: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(data);
    hasher.finalize().into()
}
