//! App Configuration connection string parsing

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::domain::DomainError;

/// Parsed `Endpoint=...;Id=...;Secret=...` connection string
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    endpoint: reqwest::Url,
    credential: String,
    secret: Vec<u8>,
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint.as_str())
            .field("credential", &self.credential)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl ConnectionString {
    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Decoded HMAC key
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl FromStr for ConnectionString {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut endpoint = None;
        let mut credential = None;
        let mut secret = None;

        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            // Secrets are base64 and may end in '=', so split on the first one only
            let (name, value) = part.split_once('=').ok_or_else(|| {
                DomainError::configuration("Malformed App Configuration connection string")
            })?;

            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim()),
                "id" => credential = Some(value.trim()),
                "secret" => secret = Some(value.trim()),
                _ => {}
            }
        }

        let endpoint = endpoint.ok_or_else(|| {
            DomainError::configuration("App Configuration connection string has no Endpoint")
        })?;
        let credential = credential.ok_or_else(|| {
            DomainError::configuration("App Configuration connection string has no Id")
        })?;
        let secret = secret.ok_or_else(|| {
            DomainError::configuration("App Configuration connection string has no Secret")
        })?;

        let endpoint = reqwest::Url::parse(endpoint).map_err(|e| {
            DomainError::configuration(format!("Invalid App Configuration endpoint: {}", e))
        })?;
        let secret = STANDARD.decode(secret).map_err(|e| {
            DomainError::configuration(format!("App Configuration secret is not base64: {}", e))
        })?;

        Ok(Self {
            endpoint,
            credential: credential.to_string(),
            secret,
        })
    }
}
