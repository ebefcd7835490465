// SPDX-License-Identifier: MIT

//! `get_image_authentication` (spec.md §4.5): resolves registry
//! credentials for a step's image, preferring an OIDC-assumed AWS role
//! over static AWS keys over plain username/password.

use base64::Engine;
use cirun_oidc::MintParams;
use cirun_spec::{AwsCredentials, Image};

use crate::engine::RegistryCredentials;
use crate::error::ContainerError;

/// What's needed to mint an OIDC token for the step requesting
/// authentication, if its image declares an `oidc-role`.
pub struct OidcMintContext<'a> {
    pub mint_params: MintParams,
    pub private_key_pem: &'a str,
}

pub async fn get_image_authentication(
    image: &Image,
    oidc: Option<&OidcMintContext<'_>>,
) -> Result<Option<RegistryCredentials>, ContainerError> {
    let Some(aws) = &image.aws else {
        return Ok(plain_credentials(image));
    };

    match aws {
        AwsCredentials::OidcRole { oidc_role } => {
            let ctx = oidc.ok_or_else(|| {
                ContainerError::Auth("image declares aws.oidc-role but no step oidc context was provided".into())
            })?;
            let token = cirun_oidc::mint(&ctx.mint_params, ctx.private_key_pem)
                .map_err(|e| ContainerError::Auth(e.to_string()))?;
            let session_name = format!("pipeline-runner-step-{}", ctx.mint_params.step_uuid);

            let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let sts = aws_sdk_sts::Client::new(&config);
            let assumed = sts
                .assume_role_with_web_identity()
                .role_arn(oidc_role)
                .role_session_name(session_name)
                .web_identity_token(token)
                .duration_seconds(3600)
                .send()
                .await
                .map_err(|e| ContainerError::Auth(e.to_string()))?;
            let creds = assumed
                .credentials()
                .ok_or_else(|| ContainerError::Auth("assume-role-with-web-identity returned no credentials".into()))?;

            ecr_authorization_token(creds.access_key_id(), creds.secret_access_key(), Some(creds.session_token())).await
        }
        AwsCredentials::Keys {
            access_key_id,
            secret_access_key,
        } => {
            let session_token = std::env::var("AWS_SESSION_TOKEN").ok();
            ecr_authorization_token(access_key_id, secret_access_key, session_token.as_deref()).await
        }
    }
}

fn plain_credentials(image: &Image) -> Option<RegistryCredentials> {
    match (&image.username, &image.password) {
        (Some(username), Some(password)) => Some(RegistryCredentials {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    }
}

async fn ecr_authorization_token(
    access_key_id: &str,
    secret_access_key: &str,
    session_token: Option<&str>,
) -> Result<Option<RegistryCredentials>, ContainerError> {
    let region = std::env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "us-east-1".to_string());
    let credentials = aws_sdk_ecr::config::Credentials::new(
        access_key_id,
        secret_access_key,
        session_token.map(str::to_string),
        None,
        "cirun-step",
    );
    let config = aws_sdk_ecr::Config::builder()
        .region(aws_sdk_ecr::config::Region::new(region))
        .credentials_provider(credentials)
        .behavior_version(aws_config::BehaviorVersion::latest())
        .build();

    let client = aws_sdk_ecr::Client::from_conf(config);
    let response = client
        .get_authorization_token()
        .send()
        .await
        .map_err(|e| ContainerError::Auth(e.to_string()))?;

    let Some(auth_data) = response.authorization_data().first() else {
        return Ok(None);
    };
    let Some(token) = auth_data.authorization_token() else {
        return Ok(None);
    };

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(token)
        .map_err(|e| ContainerError::Auth(e.to_string()))?;
    let decoded = String::from_utf8(decoded).map_err(|e| ContainerError::Auth(e.to_string()))?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| ContainerError::Auth("malformed ecr authorization token".into()))?;

    Ok(Some(RegistryCredentials {
        username: username.to_string(),
        password: password.to_string(),
    }))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
