// SPDX-License-Identifier: MIT

//! Strongly-typed identifiers and the generator trait used to mint them.
//!
//! Runners take an `IdGen` rather than calling `Uuid::new_v4()` directly so
//! tests can substitute a deterministic sequence.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(u: Uuid) -> Self {
                Self(u)
            }
        }
    };
}

uuid_newtype!(PipelineUuid);
uuid_newtype!(StepUuid);
uuid_newtype!(ProjectUuid);
uuid_newtype!(RepoUuid);
uuid_newtype!(OwnerUuid);
uuid_newtype!(WorkspaceUuid);
uuid_newtype!(DeploymentEnvironmentUuid);

/// Generates the uuids a pipeline run needs. A real run uses
/// [`UuidIdGen`]; tests can implement this trait for a fixed sequence.
pub trait IdGen: Send + Sync {
    fn new_pipeline_uuid(&self) -> PipelineUuid;
    fn new_step_uuid(&self) -> StepUuid;
}

/// Generates fresh random (v4) uuids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn new_pipeline_uuid(&self) -> PipelineUuid {
        PipelineUuid(Uuid::new_v4())
    }

    fn new_step_uuid(&self) -> StepUuid {
        StepUuid(Uuid::new_v4())
    }
}
