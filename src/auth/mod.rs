//! # Authentication
//!
//! Authentication settings a REST API resource can carry. The mode is stored
//! under the `Authentication` key and selects which credential fields are
//! present next to it:
//!
//! - `none`: no extra fields
//! - `basic`: username and password
//! - `OAuth2`: client credentials, endpoints and token settings

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const AUTHENTICATION_FIELD: &str = "Authentication";

/// Discriminator values for the `Authentication` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    None,
    Basic,
    OAuth2,
}

impl AuthMode {
    pub const ALL: [AuthMode; 3] = [AuthMode::None, AuthMode::Basic, AuthMode::OAuth2];

    pub const OPTIONS: [&'static str; 3] = ["none", "basic", "OAuth2"];

    /// The value stored in the configuration payload.
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMode::None => "none",
            AuthMode::Basic => "basic",
            AuthMode::OAuth2 => "OAuth2",
        }
    }
}

impl Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthMode::None => "None",
            AuthMode::Basic => "Basic Auth",
            AuthMode::OAuth2 => "OAuth 2.0",
        };
        write!(f, "{label}")
    }
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AuthMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown authentication mode `{value}`"))
    }
}

/// Authentication settings of a REST API resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "Authentication")]
pub enum RestAuth {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "basic")]
    Basic(BasicAuth),
    #[serde(rename = "OAuth2")]
    OAuth2(OAuth2Auth),
}

impl RestAuth {
    pub fn mode(&self) -> AuthMode {
        match self {
            RestAuth::None => AuthMode::None,
            RestAuth::Basic(_) => AuthMode::Basic,
            RestAuth::OAuth2(_) => AuthMode::OAuth2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BasicAuth {
    #[serde(rename = "BasicAuthUsername", default)]
    pub username: String,
    #[serde(rename = "BasicAuthPassword", default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OAuth2Auth {
    #[serde(rename = "UseClientCredentialsAuth", default)]
    pub use_client_credentials: bool,
    #[serde(rename = "OAuth2AuthorizationURL", default)]
    pub authorization_url: String,
    #[serde(rename = "OAuth2AccessTokenURL", default)]
    pub access_token_url: String,
    #[serde(rename = "OAuth2ClientID", default)]
    pub client_id: String,
    #[serde(rename = "OAuth2ClientSecret", default)]
    pub client_secret: String,
    #[serde(rename = "OAuth2Scopes", default)]
    pub scopes: String,
    #[serde(rename = "OAuth2Audience", default)]
    pub audience: String,
    #[serde(rename = "OAuth2AccessToken", default)]
    pub access_token: String,
    #[serde(rename = "OAuth2RefreshToken", default)]
    pub refresh_token: String,
    #[serde(rename = "OAuth2AccessTokenLifespanSeconds", default)]
    pub access_token_lifespan_seconds: String,
    #[serde(rename = "ShareOAuth2CredentialsBetweenUsers", default)]
    pub share_credentials_between_users: bool,
    #[serde(rename = "EnableAuthVerificationEndpoint", default)]
    pub enable_auth_verification_endpoint: bool,
}
