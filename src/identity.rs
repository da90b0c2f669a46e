//! Identity Exchange (§4.7): trades an upstream GitHub access token for a
//! registry token via a thin `reqwest` client, grounded in `routes/auth.py`.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ApiError;

const GITHUB_USER_ENDPOINT: &str = "https://api.github.com/user";
const USER_AGENT: &str = "clawhub-registry/0.1";

/// The subset of the GitHub `/user` response the registry cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamProfile {
    pub id: i64,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UpstreamProfile {
    /// Display name falls back to the login when GitHub has none on file.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.login.clone())
    }
}

/// Client for the external identity provider. Never persists the upstream
/// token — it is used for exactly one outbound call.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
}

impl IdentityClient {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .expect("reqwest client builds with static configuration");
        Self { http }
    }

    /// Exchange an upstream access token for the caller's profile.
    pub async fn fetch_profile(&self, upstream_token: &str) -> Result<UpstreamProfile, ApiError> {
        let response = self
            .http
            .get(GITHUB_USER_ENDPOINT)
            .bearer_auth(upstream_token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "identity exchange request failed");
                ApiError::Unauthorized
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Unauthorized);
        }

        let profile: UpstreamProfile = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "identity exchange response was not a valid profile");
            ApiError::BadRequest("Could not retrieve upstream user ID".to_string())
        })?;

        Ok(profile)
    }
}

impl Default for IdentityClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Mint a new registry token: `ask-` followed by 48 hex characters (24
/// CSPRNG bytes), per §4.7 step 5.
pub fn generate_api_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("ask-{}", hex_encode(&bytes))
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(s, "{:02x}", b).expect("writing to a String cannot fail");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_login() {
        let profile = UpstreamProfile {
            id: 1,
            login: "dev".to_string(),
            name: None,
            avatar_url: None,
        };
        assert_eq!(profile.display_name(), "dev");
    }

    #[test]
    fn display_name_prefers_name_field() {
        let profile = UpstreamProfile {
            id: 1,
            login: "dev".to_string(),
            name: Some("Dev Person".to_string()),
            avatar_url: None,
        };
        assert_eq!(profile.display_name(), "Dev Person");
    }

    #[test]
    fn generated_token_has_ask_prefix_and_48_hex_chars() {
        let token = generate_api_token();
        assert!(token.starts_with("ask-"));
        let hex_part = &token[4..];
        assert_eq!(hex_part.len(), 48);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_tokens_are_not_constant() {
        assert_ne!(generate_api_token(), generate_api_token());
    }
}
