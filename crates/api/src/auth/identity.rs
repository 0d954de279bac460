//! HS256 bearer tokens issued by the identity provider.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an identity-provider token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the provider's identifier for the user (`users.external_id`).
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Settings for verifying identity-provider tokens.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Shared HMAC secret configured on the identity provider.
    pub jwt_secret: String,
    /// Required `iss` claim, when set.
    pub issuer: Option<String>,
    /// Required `aud` claim, when set.
    pub audience: Option<String>,
}

impl IdentityConfig {
    /// Load from environment variables.
    ///
    /// | Env Var          | Required | Default |
    /// |------------------|----------|---------|
    /// | `IDP_JWT_SECRET` | **yes**  | --      |
    /// | `IDP_ISSUER`     | no       | unset   |
    /// | `IDP_AUDIENCE`   | no       | unset   |
    ///
    /// # Panics
    ///
    /// Panics if `IDP_JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("IDP_JWT_SECRET")
            .expect("IDP_JWT_SECRET must be set in the environment");
        assert!(!jwt_secret.is_empty(), "IDP_JWT_SECRET must not be empty");

        Self {
            jwt_secret,
            issuer: std::env::var("IDP_ISSUER").ok().filter(|v| !v.is_empty()),
            audience: std::env::var("IDP_AUDIENCE").ok().filter(|v| !v.is_empty()),
        }
    }
}

/// Verify the signature, expiry and (when configured) issuer and audience.
pub fn validate_token(
    token: &str,
    config: &IdentityConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    match &config.audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }
    if let Some(iss) = &config.issuer {
        validation.set_issuer(&[iss]);
    }

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}
