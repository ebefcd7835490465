// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OidcError {
    #[error("key generation failed: {0}")]
    KeyGen(#[from] rsa::errors::Error),
    #[error("key encoding failed: {0}")]
    Pkcs1(#[from] rsa::pkcs1::Error),
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
