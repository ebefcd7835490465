// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cirun-oidc: mints and verifies the RS256 JWTs a step uses as
//! `BITBUCKET_STEP_OIDC_TOKEN` (spec.md §4.4).

pub mod error;
pub mod keygen;
pub mod token;

pub use error::OidcError;
pub use keygen::{generate_keypair, Keypair};
pub use token::{mint, verify, Claims, MintParams};
