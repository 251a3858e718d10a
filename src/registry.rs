// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

//! Vendor registration and the delegation table.
//!
//! Persistence is left to a `DelegationStore`. The registry derives keys and
//! hands values to the store; it keeps no state of its own and never sees a
//! secret key after returning it.

use crate::{
    capsule::Capsule,
    delegation::DelegationKey,
    error::Error,
    keypair::{Keypair, PublicKey, SecretKey},
    observation::{Observation, ObservationResponse}
};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use tracing::{debug, info, warn};

/// Storage of vendor public keys and of the `(delegator, delegatee) -> (rk, pkX)` table.
pub trait DelegationStore {
    /// Public keys of all registered vendors.
    fn vendors(&self) -> Result<Vec<PublicKey>, Error>;

    fn insert_vendor(&self, pk: &PublicKey) -> Result<(), Error>;

    /// Store `key` for the ordered pair, superseding any previous entry.
    fn put_delegation_key(&self, delegator: &PublicKey, delegatee: &PublicKey, key: &DelegationKey) -> Result<(), Error>;

    fn delegation_key(&self, delegator: &PublicKey, delegatee: &PublicKey) -> Result<Option<DelegationKey>, Error>;
}


/// In-process `DelegationStore`. Entries are kept in their hex wire form.
#[derive(Default)]
pub struct MemoryStore {
    vendors: RwLock<Vec<String>>,
    keys: RwLock<HashMap<(String, String), [String; 2]>>
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of stored delegation keys.
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

impl DelegationStore for MemoryStore {
    fn vendors(&self) -> Result<Vec<PublicKey>, Error> {
        self.vendors.read().iter().map(|pk| PublicKey::from_hex(pk)).collect()
    }

    fn insert_vendor(&self, pk: &PublicKey) -> Result<(), Error> {
        let pk = pk.to_hex();
        let mut vendors = self.vendors.write();
        if !vendors.contains(&pk) {
            vendors.push(pk)
        }
        Ok(())
    }

    fn put_delegation_key(&self, delegator: &PublicKey, delegatee: &PublicKey, key: &DelegationKey) -> Result<(), Error> {
        self.keys.write().insert((delegator.to_hex(), delegatee.to_hex()), key.to_hex_pair());
        Ok(())
    }

    fn delegation_key(&self, delegator: &PublicKey, delegatee: &PublicKey) -> Result<Option<DelegationKey>, Error> {
        match self.keys.read().get(&(delegator.to_hex(), delegatee.to_hex())) {
            Some([rk, pk_x]) => DelegationKey::from_hex_pair(rk, pk_x).map(Some),
            None => Ok(None)
        }
    }
}


/// What a newly registered vendor receives, once.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorCredentials {
    pub pk: String,
    pub sk: String
}

impl fmt::Debug for VendorCredentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("VendorCredentials")
            .field("pk", &self.pk)
            .field("sk", &"..")
            .finish()
    }
}


/// Derive one delegation key from `delegator` to each of `delegatees`, in parallel.
/// The delegator's own public key is skipped.
pub fn derive_delegation_keys(delegator: &SecretKey, delegatees: &[PublicKey]) -> Result<Vec<(PublicKey, DelegationKey)>, Error> {
    let pk = delegator.public_key();
    delegatees.par_iter()
        .filter(|pk_b| **pk_b != pk)
        .map(|pk_b| delegator.rekey(pk_b).map(|dk| (*pk_b, dk)))
        .collect()
}


pub struct Registry<S> {
    store: S
}

impl<S: DelegationStore> Registry<S> {
    pub fn new(store: S) -> Self {
        Registry { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a vendor: a fresh keypair plus a delegation key from it to every
    /// existing vendor. Only the public key is stored.
    pub fn register_vendor(&self) -> Result<VendorCredentials, Error> {
        let keypair = Keypair::new()?;
        let peers = self.store.vendors()?;
        let n = self.add_delegation_keys(keypair.secret(), &peers)?;
        self.store.insert_vendor(keypair.public())?;
        let pk = keypair.public().to_hex();
        info!(%pk, delegations = n, "registered vendor");
        Ok(VendorCredentials { pk, sk: keypair.secret().to_hex() })
    }

    /// Let `delegatees` read what is produced for `delegator`. Existing entries
    /// for the same pairs are replaced by freshly derived keys.
    pub fn add_delegation_keys(&self, delegator: &SecretKey, delegatees: &[PublicKey]) -> Result<usize, Error> {
        let pk = delegator.public_key();
        let keys = derive_delegation_keys(delegator, delegatees)?;
        for (pk_b, dk) in &keys {
            self.store.put_delegation_key(&pk, pk_b, dk)?
        }
        debug!(delegator = %pk.to_hex(), count = keys.len(), "stored delegation keys");
        Ok(keys.len())
    }

    /// Proxy step: transform `cap`, made for `producer`, for `reader`.
    ///
    /// Returns `None` if `producer` never delegated to `reader`. Otherwise the
    /// transformed capsule and the `pkX` the reader needs to open it.
    pub fn reencrypt_for(&self, producer: &PublicKey, reader: &PublicKey, cap: &Capsule) -> Result<Option<(Capsule, PublicKey)>, Error> {
        match self.store.delegation_key(producer, reader)? {
            Some(dk) => Ok(Some((dk.re_encapsulate(cap)?, *dk.pk_x()))),
            None => Ok(None)
        }
    }

    /// Build what `reader` gets for `observations`: own observations as they are,
    /// others with their `[rk, pkX]` attached. Observations of producers which
    /// never delegated to `reader` are left out.
    pub fn consume(&self, reader: &PublicKey, observations: &[Observation]) -> Result<Vec<ObservationResponse>, Error> {
        let mut out = Vec::with_capacity(observations.len());
        for o in observations {
            let producer = o.producer()?;
            if producer == *reader {
                out.push(ObservationResponse::new(o, None));
                continue
            }
            match self.store.delegation_key(&producer, reader)? {
                Some(dk) => out.push(ObservationResponse::new(o, Some(&dk))),
                None => warn!(producer = %o.pk, "no delegation key for reader, skipping observation")
            }
        }
        Ok(out)
    }
}
