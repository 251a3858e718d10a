// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

use crate::{key::Key, scalar::Scalar};
use sha3::{Digest, Sha3_256};

/// Map the concatenation of `inputs` to a scalar.
///
/// This is not a hash: the bytes are read as one big-endian integer and reduced
/// mod the group order. Capsule checks and re-encryption keys of every deployed
/// party depend on this exact mapping, so replacing it with a hash-then-reduce
/// is a protocol version change.
pub fn derive_scalar<I, T>(inputs: I) -> Scalar
where
    I: IntoIterator<Item=T>,
    T: AsRef<[u8]>
{
    let mut bytes = Vec::new();
    for i in inputs {
        bytes.extend_from_slice(i.as_ref())
    }
    Scalar::from_bytes_mod_order(&bytes)
}

/// SHA3-256 of the marshalled shared point.
pub(crate) fn kdf(input: &[u8]) -> Key {
    let mut k = [0; 32];
    k.copy_from_slice(&Sha3_256::digest(input));
    Key::new(k)
}
