// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

//! AES-256-GCM around the encapsulated key.
//!
//! The output layout is `ciphertext || tag` with empty associated data.

use crate::{capsule::Capsule, delegation::DelegationKey, error::Error, key::Key};
use ring::aead::{self, Aad, LessSafeKey, UnboundKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

pub const TAG_SIZE: usize = 16;

fn aead_key(k: &Key) -> Result<LessSafeKey, Error> {
    let mut bytes = k.cipher_key();
    let unbound = UnboundKey::new(&aead::AES_256_GCM, &bytes);
    bytes.zeroize();
    Ok(LessSafeKey::new(unbound?))
}

pub fn seal(k: &Key, msg: &[u8]) -> Result<Vec<u8>, Error> {
    let sk = aead_key(k)?;
    let nonce = aead::Nonce::assume_unique_for_key(k.nonce().into_bytes());
    let mut out = Vec::with_capacity(msg.len() + TAG_SIZE);
    out.extend_from_slice(msg);
    sk.seal_in_place_append_tag(nonce, Aad::empty(), &mut out)?;
    Ok(out)
}

/// Fails with `Error::Cipher` on a wrong key or any modification of `cipher`.
pub fn open(k: &Key, cipher: &[u8]) -> Result<Vec<u8>, Error> {
    if cipher.len() < TAG_SIZE {
        return Err(Error::Cipher)
    }
    let ok = aead_key(k)?;
    let nonce = aead::Nonce::assume_unique_for_key(k.nonce().into_bytes());
    let mut buf = cipher.to_vec();
    let n = ok.open_in_place(nonce, Aad::empty(), &mut buf)?.len();
    buf.truncate(n);
    Ok(buf)
}


/// One produced message: the sealed bytes and the capsule they were sealed under.
///
/// Re-encryption replaces the capsule; the ciphertext is never touched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub ciphertext: Vec<u8>,
    pub capsule: Capsule
}

impl EncryptedEnvelope {
    pub fn new(ciphertext: Vec<u8>, capsule: Capsule) -> Self {
        EncryptedEnvelope { ciphertext, capsule }
    }

    /// Transform the capsule for the delegatee of `dk`.
    pub fn reencrypt(&self, dk: &DelegationKey) -> Result<EncryptedEnvelope, Error> {
        Ok(EncryptedEnvelope {
            ciphertext: self.ciphertext.clone(),
            capsule: dk.re_encapsulate(&self.capsule)?
        })
    }
}
