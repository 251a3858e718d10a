// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

use crate::error::Error;
use std::{fmt, ops::Deref};
use zeroize::Zeroize;

pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;

/// Symmetric key material: the SHA3-256 digest of an encapsulated point.
///
/// Both the AES key and the GCM nonce are cut from this digest, see
/// `cipher_key` and `nonce`.
#[derive(Clone, PartialEq, Eq)]
pub struct Key([u8; KEY_SIZE]);

impl Key {
    pub(crate) fn new(xs: [u8; KEY_SIZE]) -> Self {
        Key(xs)
    }

    /// The AES-256 key: the first 32 characters of the lowercase hex digest,
    /// taken as ASCII bytes. Only 128 bits of the digest end up in the key.
    pub(crate) fn cipher_key(&self) -> [u8; KEY_SIZE] {
        let mut h = hex::encode(self.0);
        let mut k = [0; KEY_SIZE];
        k.copy_from_slice(&h.as_bytes()[.. KEY_SIZE]);
        h.zeroize();
        k
    }

    /// The GCM nonce: the first 12 raw bytes of the digest.
    /// Not independent of the key; uniqueness rests on fresh ephemeral scalars.
    pub fn nonce(&self) -> Nonce {
        let mut n = [0; NONCE_SIZE];
        n.copy_from_slice(&self.0[.. NONCE_SIZE]);
        Nonce(n)
    }
}

impl Deref for Key {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0[..]
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Key(..)")
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.0.zeroize()
    }
}


/// A value which must only be used once for an encryption key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    pub fn new(xs: [u8; NONCE_SIZE]) -> Self {
        Nonce(xs)
    }

    pub fn into_bytes(self) -> [u8; NONCE_SIZE] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let b = hex::decode(s)?;
        if b.len() != NONCE_SIZE {
            return Err(Error::decode(format!("nonce of {} bytes, expected {}", b.len(), NONCE_SIZE)))
        }
        let mut n = [0; NONCE_SIZE];
        n.copy_from_slice(&b);
        Ok(Nonce(n))
    }
}

impl Deref for Nonce {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest() -> Key {
        let mut k = [0; KEY_SIZE];
        k.copy_from_slice(&hex::decode("f1f0b1376cb52accea355c5ec03ed0c041f71a6df06b84f351d84dc0fd813ced").unwrap());
        Key::new(k)
    }

    #[test]
    fn cipher_key_is_hex_prefix() {
        assert_eq!(&digest().cipher_key()[..], b"f1f0b1376cb52accea355c5ec03ed0c0");
    }

    #[test]
    fn nonce_is_digest_prefix() {
        assert_eq!(digest().nonce().to_hex(), "f1f0b1376cb52accea355c5e");
        assert_eq!(Nonce::from_hex("f1f0b1376cb52accea355c5e").unwrap(), digest().nonce());
        assert!(Nonce::from_hex("f1f0").is_err());
    }

    #[test]
    fn debug_is_redacted() {
        assert_eq!(format!("{:?}", digest()), "Key(..)");
    }
}
