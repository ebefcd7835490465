// SPDX-License-Identifier: MIT

//! The typed pipeline specification model (spec.md §3).
//!
//! Deserialization accepts the same YAML shapes Bitbucket Pipelines does:
//! `parallel` as either a bare list or `{steps, fail-fast}`, `clone.depth`
//! as either an integer or the literal `"full"`, and script lines as
//! either raw strings or `{pipe, variables}` objects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root of a parsed pipeline specification file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub definitions: Definitions,
    #[serde(default)]
    pub clone: CloneSettings,
    #[serde(default)]
    pub options: Options,
    pub pipelines: Pipelines,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    #[serde(default)]
    pub docker: bool,
    #[serde(default)]
    pub size: Option<StepSize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Definitions {
    #[serde(default)]
    pub caches: IndexMap<String, String>,
    #[serde(default)]
    pub services: IndexMap<String, Service>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pipelines {
    #[serde(default)]
    pub default: Option<Pipeline>,
    #[serde(default)]
    pub branches: IndexMap<String, Pipeline>,
    #[serde(default)]
    pub pull_requests: IndexMap<String, Pipeline>,
    #[serde(default)]
    pub tags: IndexMap<String, Pipeline>,
    #[serde(default)]
    pub bookmarks: IndexMap<String, Pipeline>,
    #[serde(default)]
    pub custom: IndexMap<String, Pipeline>,
}

/// An ordered sequence of pipeline elements. `Variables` may only appear
/// as the first element; this is enforced in `parser::validate`, not at
/// the type level, so a malformed document can still be parsed and then
/// reported with a precise location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline(pub Vec<PipelineElement>);

impl Pipeline {
    pub fn elements(&self) -> &[PipelineElement] {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PipelineElement {
    Variables { variables: Vec<Variable> },
    Stage { stage: Stage },
    Parallel { parallel: ParallelStep },
    Step { step: Step },
}

/// Raw deserialization target; `untagged` tries each variant in order and
/// the first with all required fields present wins, which works here
/// because `variables`/`stage`/`parallel`/`step` are mutually exclusive
/// top-level keys.
#[derive(Deserialize)]
#[serde(untagged)]
enum PipelineElementRaw {
    Variables { variables: Vec<Variable> },
    Stage { stage: Stage },
    Parallel { parallel: ParallelStepRaw },
    Step { step: Step },
}

impl<'de> Deserialize<'de> for PipelineElement {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match PipelineElementRaw::deserialize(d)? {
            PipelineElementRaw::Variables { variables } => PipelineElement::Variables { variables },
            PipelineElementRaw::Stage { stage } => PipelineElement::Stage { stage },
            PipelineElementRaw::Parallel { parallel } => PipelineElement::Parallel {
                parallel: parallel.into(),
            },
            PipelineElementRaw::Step { step } => PipelineElement::Step { step },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default, rename = "allowed-values")]
    pub allowed_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<StepWrapper>,
    #[serde(default)]
    pub trigger: Trigger,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepWrapper {
    pub step: Step,
}

/// Accepts both `parallel: [step, step]` and
/// `parallel: {steps: [...], fail-fast: bool}`.
#[derive(Debug, Clone, Serialize)]
pub struct ParallelStep {
    pub steps: Vec<StepWrapper>,
    pub fail_fast: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParallelStepRaw {
    Bare(Vec<StepWrapper>),
    Wrapped {
        steps: Vec<StepWrapper>,
        #[serde(default, rename = "fail-fast")]
        fail_fast: bool,
    },
}

impl From<ParallelStepRaw> for ParallelStep {
    fn from(raw: ParallelStepRaw) -> Self {
        match raw {
            ParallelStepRaw::Bare(steps) => ParallelStep {
                steps,
                fail_fast: false,
            },
            ParallelStepRaw::Wrapped { steps, fail_fast } => ParallelStep { steps, fail_fast },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    #[default]
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepSize {
    #[serde(rename = "1x")]
    #[default]
    X1,
    #[serde(rename = "2x")]
    X2,
    #[serde(rename = "4x")]
    X4,
    #[serde(rename = "8x")]
    X8,
}

impl StepSize {
    pub fn multiplier(self) -> u32 {
        match self {
            StepSize::X1 => 1,
            StepSize::X2 => 2,
            StepSize::X4 => 4,
            StepSize::X8 => 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub name: Option<String>,
    pub script: Vec<Line>,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub caches: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub artifacts: Vec<String>,
    #[serde(default, rename = "after-script")]
    pub after_script: Vec<Line>,
    #[serde(default)]
    pub size: StepSize,
    #[serde(default)]
    pub clone: Option<CloneSettings>,
    #[serde(default)]
    pub deployment: Option<Deployment>,
    #[serde(default)]
    pub trigger: Trigger,
    #[serde(default, rename = "max-time")]
    pub max_time: Option<u32>,
    #[serde(default)]
    pub condition: Option<serde_yaml::Value>,
    #[serde(default)]
    pub oidc: bool,
}

/// A script line: a raw shell fragment, or a `{pipe, variables}` call.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Line {
    Raw(String),
    Pipe(Pipe),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LineRaw {
    Pipe(Pipe),
    Raw(String),
}

impl<'de> Deserialize<'de> for Line {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match LineRaw::deserialize(d)? {
            LineRaw::Pipe(p) => Line::Pipe(p),
            LineRaw::Raw(s) => Line::Raw(s),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipe {
    pub pipe: String,
    #[serde(default)]
    pub variables: IndexMap<String, String>,
}

impl Pipe {
    /// `atlassian/*` pipe images are mirrored under `bitbucketpipelines/*`.
    pub fn resolved_image(&self) -> String {
        let (spec, tag) = match self.pipe.rsplit_once(':') {
            Some((s, t)) => (s, Some(t)),
            None => (self.pipe.as_str(), None),
        };
        let (owner, name) = spec.split_once('/').unwrap_or(("", spec));
        let rewritten = if owner == "atlassian" {
            format!("bitbucketpipelines/{name}")
        } else {
            spec.to_string()
        };
        match tag {
            Some(t) => format!("{rewritten}:{t}"),
            None => rewritten,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "run-as-user")]
    pub run_as_user: Option<String>,
    #[serde(default)]
    pub aws: Option<AwsCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AwsCredentials {
    Keys {
        #[serde(rename = "access-key")]
        access_key_id: String,
        #[serde(rename = "secret-key")]
        secret_access_key: String,
    },
    OidcRole {
        #[serde(rename = "oidc-role")]
        oidc_role: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub variables: IndexMap<String, String>,
    #[serde(default)]
    pub memory: Option<u64>,
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloneSettings {
    pub depth: Option<CloneDepth>,
    pub lfs: Option<bool>,
    pub enabled: Option<bool>,
}

impl Default for CloneSettings {
    fn default() -> Self {
        CloneSettings {
            depth: None,
            lfs: None,
            enabled: None,
        }
    }
}

#[derive(Deserialize)]
struct CloneSettingsRaw {
    #[serde(default)]
    depth: Option<CloneDepth>,
    #[serde(default)]
    lfs: Option<bool>,
    #[serde(default)]
    enabled: Option<bool>,
}

impl<'de> Deserialize<'de> for CloneSettings {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = CloneSettingsRaw::deserialize(d)?;
        Ok(CloneSettings {
            depth: raw.depth,
            lfs: raw.lfs,
            enabled: raw.enabled,
        })
    }
}

/// `clone.depth`: either a positive integer, or the literal `"full"`
/// (represented internally as depth 0, meaning unbounded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloneDepth {
    Full,
    N(u32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CloneDepthRaw {
    Full(String),
    N(u32),
}

impl<'de> Deserialize<'de> for CloneDepth {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        match CloneDepthRaw::deserialize(d)? {
            CloneDepthRaw::N(n) => Ok(CloneDepth::N(n)),
            CloneDepthRaw::Full(s) if s == "full" => Ok(CloneDepth::Full),
            CloneDepthRaw::Full(s) => Err(serde::de::Error::custom(format!(
                "invalid clone.depth: {s:?} (expected an integer or \"full\")"
            ))),
        }
    }
}

/// `CloneSettings` with every field defaulted, used for the effective
/// settings a step actually runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveCloneSettings {
    pub depth: CloneDepth,
    pub lfs: bool,
    pub enabled: bool,
}

impl Default for EffectiveCloneSettings {
    fn default() -> Self {
        EffectiveCloneSettings {
            depth: CloneDepth::N(50),
            lfs: false,
            enabled: true,
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
