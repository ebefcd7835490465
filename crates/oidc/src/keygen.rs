// SPDX-License-Identifier: MIT

//! Generates the workspace's 2048-bit RSA keypair, stored PEM-encoded in
//! [`cirun_core::WorkspaceMetadata`].

use crate::error::OidcError;
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

pub const KEY_BITS: usize = 2048;

pub struct Keypair {
    pub private_key_pem: String,
    pub public_key_pem: String,
}

/// Generates a fresh 2048-bit RSA keypair, PEM-encoded in PKCS#1 form
/// (the shape `jsonwebtoken`'s RSA loaders expect).
pub fn generate_keypair() -> Result<Keypair, OidcError> {
    let mut rng = rsa::rand_core::OsRng;
    let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_key_pem = private_key.to_pkcs1_pem(LineEnding::LF)?.to_string();
    let public_key_pem = public_key.to_pkcs1_pem(LineEnding::LF)?;

    Ok(Keypair {
        private_key_pem,
        public_key_pem,
    })
}

#[cfg(test)]
#[path = "keygen_tests.rs"]
mod tests;
