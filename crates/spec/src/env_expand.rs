// SPDX-License-Identifier: MIT

//! `$VAR` / `${VAR}` substitution, applied only to the whitelisted fields
//! spec.md §4.1 names: image `username`/`password`/`email`, image
//! `aws.access-key`/`secret-key`/`oidc-role`, and service `variables`
//! values. `image.name` and script lines are deliberately left alone —
//! the shell inside the container expands those, not the parser.

use crate::error::SpecError;
use crate::model::{AwsCredentials, Image, PipelineSpec, Service};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex"));

/// Substitutes every `$VAR`/`${VAR}` reference found in `value` using
/// `env`. References to variables absent from `env` are left untouched.
fn substitute(value: &str, env: &HashMap<String, String>) -> String {
    VAR_PATTERN
        .replace_all(value, |caps: &regex::Captures| {
            let name = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or("");
            match env.get(name) {
                Some(v) => v.clone(),
                None => caps.get(0).expect("whole match always present").as_str().to_string(),
            }
        })
        .into_owned()
}

/// Substitutes `value` and fails if a `$` remains afterwards, per
/// spec.md §4.1's "Missing envvars" contract.
fn expand_required(value: &str, env: &HashMap<String, String>) -> Result<String, SpecError> {
    let expanded = substitute(value, env);
    if expanded.contains('$') {
        return Err(SpecError::MissingEnvVars(value.to_string()));
    }
    Ok(expanded)
}

fn expand_image(image: &mut Image, env: &HashMap<String, String>) -> Result<(), SpecError> {
    if let Some(username) = &image.username {
        image.username = Some(expand_required(username, env)?);
    }
    if let Some(password) = &image.password {
        image.password = Some(expand_required(password, env)?);
    }
    if let Some(email) = &image.email {
        image.email = Some(expand_required(email, env)?);
    }
    if let Some(aws) = &mut image.aws {
        expand_aws(aws, env)?;
    }
    Ok(())
}

fn expand_aws(aws: &mut AwsCredentials, env: &HashMap<String, String>) -> Result<(), SpecError> {
    match aws {
        AwsCredentials::Keys {
            access_key_id,
            secret_access_key,
        } => {
            *access_key_id = expand_required(access_key_id, env)?;
            *secret_access_key = expand_required(secret_access_key, env)?;
        }
        AwsCredentials::OidcRole { oidc_role } => {
            *oidc_role = expand_required(oidc_role, env)?;
        }
    }
    Ok(())
}

fn expand_service(service: &mut Service, env: &HashMap<String, String>) -> Result<(), SpecError> {
    if let Some(image) = &mut service.image {
        expand_image(image, env)?;
    }
    for value in service.variables.values_mut() {
        *value = expand_required(value, env)?;
    }
    Ok(())
}

/// Walks `spec` and expands every whitelisted field in place.
pub fn expand_env_vars(spec: &mut PipelineSpec, env: &HashMap<String, String>) -> Result<(), SpecError> {
    if let Some(image) = &mut spec.image {
        expand_image(image, env)?;
    }
    for service in spec.definitions.services.values_mut() {
        expand_service(service, env)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "env_expand_tests.rs"]
mod tests;
