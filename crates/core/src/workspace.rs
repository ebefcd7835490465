// SPDX-License-Identifier: MIT

//! Once-per-user workspace identity, including the OIDC signing key.

use crate::id::{OwnerUuid, WorkspaceUuid};
use serde::{Deserialize, Serialize};

/// Persisted once per user at `<data-dir>/workspace.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceMetadata {
    pub owner_uuid: OwnerUuid,
    pub workspace_uuid: WorkspaceUuid,
    /// PEM-encoded 2048-bit RSA private key used to sign OIDC tokens.
    pub oidc_private_key_pem: String,
}

impl WorkspaceMetadata {
    pub fn new(owner_uuid: OwnerUuid, workspace_uuid: WorkspaceUuid, oidc_private_key_pem: String) -> Self {
        Self {
            owner_uuid,
            workspace_uuid,
            oidc_private_key_pem,
        }
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
