// SPDX-License-Identifier: MIT

//! RS256 JWT minting for `BITBUCKET_STEP_OIDC_TOKEN` (spec.md §4.4).

use crate::error::OidcError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// uuid values are serialized wrapped in curly braces, matching the
/// upstream format this runner's tokens are modeled on.
fn braced(id: Uuid) -> String {
    format!("{{{id}}}")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub account_uuid: String,
    pub workspace_uuid: String,
    pub repository_uuid: String,
    pub pipeline_uuid: String,
    pub step_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_environment_uuid: Option<String>,
    pub branch_name: String,
    pub sub: String,
}

pub struct MintParams {
    pub issuer: String,
    pub audience: String,
    pub now: i64,
    pub account_uuid: Uuid,
    pub workspace_uuid: Uuid,
    pub repository_uuid: Uuid,
    pub pipeline_uuid: Uuid,
    pub step_uuid: Uuid,
    pub branch_name: String,
    pub deployment_name: Option<String>,
}

fn build_claims(params: &MintParams) -> Claims {
    let deployment_environment_uuid = params
        .deployment_name
        .as_ref()
        .map(|name| Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()));

    let sub = match &deployment_environment_uuid {
        Some(dep) => format!("{}:{}:{}", params.pipeline_uuid, dep, params.step_uuid),
        None => format!("{}:{}", params.pipeline_uuid, params.step_uuid),
    };

    Claims {
        iss: params.issuer.clone(),
        aud: params.audience.clone(),
        iat: params.now,
        exp: params.now + 3600,
        account_uuid: braced(params.account_uuid),
        workspace_uuid: braced(params.workspace_uuid),
        repository_uuid: braced(params.repository_uuid),
        pipeline_uuid: braced(params.pipeline_uuid),
        step_uuid: braced(params.step_uuid),
        deployment_environment_uuid: deployment_environment_uuid.map(braced),
        branch_name: params.branch_name.clone(),
        sub,
    }
}

fn kid_for(public_key_pem: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, public_key_pem.as_bytes())
}

/// Mints and signs a token for `params`, using `private_key_pem` (PKCS#1)
/// to sign and derive the `kid` header from the corresponding public key.
pub fn mint(params: &MintParams, private_key_pem: &str) -> Result<String, OidcError> {
    let private_key = RsaPrivateKey::from_pkcs1_pem(private_key_pem)?;
    let public_key = RsaPublicKey::from(&private_key);
    let public_key_pem = public_key.to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid_for(&public_key_pem).to_string());

    let claims = build_claims(params);
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?;
    Ok(encode(&header, &claims, &encoding_key)?)
}

/// Verifies `token` against `public_key_pem` and returns its claims.
pub fn verify(token: &str, public_key_pem: &str) -> Result<(Claims, Header), OidcError> {
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;
    let validation = Validation::new(Algorithm::RS256);
    let data = decode::<Claims>(token, &decoding_key, &validation)?;
    Ok((data.claims, data.header))
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
