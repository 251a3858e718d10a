// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

//! Observation records as they travel between producers, storage and consumers.
//!
//! The ciphertext field is the pipe-delimited triple
//! `hex(ciphertext) | hex(nonce) | attribute`; the capsule travels as three hex
//! strings next to it.

use crate::{
    capsule::Capsule,
    delegation::DelegationKey,
    envelope::{self, EncryptedEnvelope},
    error::Error,
    key::{Key, Nonce},
    keypair::{PublicKey, SecretKey}
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const SEPARATOR: char = '|';

/// The pipe-delimited ciphertext field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireCiphertext {
    pub ciphertext: Vec<u8>,
    pub nonce: Nonce,
    pub attribute: String
}

impl fmt::Display for WireCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}{}{}{}", hex::encode(&self.ciphertext), SEPARATOR, self.nonce.to_hex(), SEPARATOR, self.attribute)
    }
}

impl FromStr for WireCiphertext {
    type Err = Error;

    /// The attribute is everything after the second separator and may itself contain one.
    fn from_str(s: &str) -> Result<Self, Error> {
        let mut parts = s.splitn(3, SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(n), Some(a)) => Ok(WireCiphertext {
                ciphertext: hex::decode(c)?,
                nonce: Nonce::from_hex(n)?,
                attribute: a.to_owned()
            }),
            _ => Err(Error::decode("ciphertext is not a `ciphertext|nonce|attribute` triple"))
        }
    }
}

/// Opens `wire` under `k`, insisting that the transmitted nonce is the one `k` implies.
fn open_wire(k: &Key, wire: &WireCiphertext) -> Result<Vec<u8>, Error> {
    if k.nonce() != wire.nonce {
        return Err(Error::Cipher)
    }
    envelope::open(k, &wire.ciphertext)
}


/// An encrypted observation as written by its producer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub attribute: String,
    pub ciphertext: String,
    pub capsule_e: String,
    pub capsule_v: String,
    pub capsule_s: String,
    /// The producer's public key, which the capsule was made for.
    pub pk: String
}

impl Observation {
    /// Encrypt `message` for `producer` and lay it out for storage.
    pub fn produce(producer: &PublicKey, attribute: &str, message: &[u8]) -> Result<Self, Error> {
        let (k, cap) = producer.encapsulate()?;
        let wire = WireCiphertext {
            ciphertext: envelope::seal(&k, message)?,
            nonce: k.nonce(),
            attribute: attribute.to_owned()
        };
        let [capsule_e, capsule_v, capsule_s] = cap.to_hex_components();
        Ok(Observation {
            attribute: attribute.to_owned(),
            ciphertext: wire.to_string(),
            capsule_e,
            capsule_v,
            capsule_s,
            pk: producer.to_hex()
        })
    }

    pub fn producer(&self) -> Result<PublicKey, Error> {
        PublicKey::from_hex(&self.pk)
    }

    pub fn capsule(&self) -> Result<Capsule, Error> {
        Capsule::from_hex_components(&self.capsule_e, &self.capsule_v, &self.capsule_s)
    }

    /// The parsed ciphertext field. Its attribute must agree with `attribute`.
    pub fn wire(&self) -> Result<WireCiphertext, Error> {
        let wire: WireCiphertext = self.ciphertext.parse()?;
        if wire.attribute != self.attribute {
            return Err(Error::decode("attribute does not match ciphertext"))
        }
        Ok(wire)
    }

    pub fn envelope(&self) -> Result<EncryptedEnvelope, Error> {
        Ok(EncryptedEnvelope::new(self.wire()?.ciphertext, self.capsule()?))
    }

    /// Decrypt as the producer.
    pub fn open(&self, producer: &SecretKey) -> Result<Vec<u8>, Error> {
        let k = producer.decapsulate(&self.capsule()?)?;
        open_wire(&k, &self.wire()?)
    }
}


/// An observation as handed to a consumer.
///
/// `reencryption_metadata` holds `[rk, pkX]` whenever the observation was not
/// produced under the consumer's own key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationResponse {
    pub ciphertext: String,
    pub capsule_e: String,
    pub capsule_v: String,
    pub capsule_s: String,
    pub pk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reencryption_metadata: Option<[String; 2]>
}

impl ObservationResponse {
    pub fn new(o: &Observation, dk: Option<&DelegationKey>) -> Self {
        ObservationResponse {
            ciphertext: o.ciphertext.clone(),
            capsule_e: o.capsule_e.clone(),
            capsule_v: o.capsule_v.clone(),
            capsule_s: o.capsule_s.clone(),
            pk: o.pk.clone(),
            reencryption_metadata: dk.map(DelegationKey::to_hex_pair)
        }
    }

    pub fn delegation_key(&self) -> Result<Option<DelegationKey>, Error> {
        match &self.reencryption_metadata {
            Some([rk, pk_x]) => DelegationKey::from_hex_pair(rk, pk_x).map(Some),
            None => Ok(None)
        }
    }

    /// Decrypt as `reader`, re-encrypting the capsule first if metadata is attached.
    pub fn open(&self, reader: &SecretKey) -> Result<Vec<u8>, Error> {
        let cap = Capsule::from_hex_components(&self.capsule_e, &self.capsule_v, &self.capsule_s)?;
        let wire: WireCiphertext = self.ciphertext.parse()?;
        let k = match self.delegation_key()? {
            Some(dk) => reader.decapsulate_reencrypted(&dk.re_encapsulate(&cap)?, dk.pk_x()),
            None => reader.decapsulate(&cap)?
        };
        open_wire(&k, &wire)
    }
}
