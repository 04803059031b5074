#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SheetsError, api_error};
use crate::constants::SPREADSHEETS_SCOPE;

/// Token endpoint used when the token file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed ahead of time.
const EXPIRY_SKEW_SECS: i64 = 60;

/// `expiry` in the shape Google's client libraries write it: microseconds
/// and a `Z` suffix.
mod expiry_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Format written to the token file.
    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

    /// Writes the expiry, or `null`.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.serialize_str(&at.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Reads an RFC 3339 timestamp, or the naive UTC form without an offset.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };

        if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(at.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Some(naive.and_utc()))
            .map_err(de::Error::custom)
    }
}

/// Contents of an authorized-user token file.
///
/// Fields this crate does not use are kept in `extra` and written back
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    /// current access token
    #[serde(default)]
    pub token:         Option<String>,
    /// long-lived token used to mint new access tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// OAuth token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri:     String,
    /// OAuth client id
    pub client_id:     String,
    /// OAuth client secret
    pub client_secret: String,
    /// granted scopes
    #[serde(default)]
    pub scopes:        Vec<String>,
    /// when `token` stops being accepted
    #[serde(default, with = "expiry_format")]
    pub expiry:        Option<DateTime<Utc>>,
    /// anything else found in the file
    #[serde(flatten)]
    pub extra:         serde_json::Map<String, serde_json::Value>,
}

/// Serde default for [`AuthorizedUser::token_uri`].
fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// When a token issued at `now` and living `secs` seconds expires, or `None`
/// when that instant cannot be represented.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(secs).and_then(|lifetime| now.checked_add_signed(lifetime))
}

/// Successful answer from the token endpoint.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    /// the new access token
    access_token:  String,
    /// lifetime of the new token in seconds
    #[serde(default)]
    expires_in:    Option<i64>,
    /// rotated refresh token, rarely sent
    #[serde(default)]
    refresh_token: Option<String>,
}

impl AuthorizedUser {
    /// Whether the access token can be used at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, self.expiry) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(_), Some(expiry)) => TimeDelta::try_seconds(EXPIRY_SKEW_SECS)
                .and_then(|skew| expiry.checked_sub_signed(skew))
                .is_some_and(|refresh_at| refresh_at > now),
        }
    }

    /// Exchanges the refresh token for a new access token.
    async fn refresh(&mut self, http: &Client, path: &Path) -> Result<(), SheetsError> {
        let refresh_token = self
            .refresh_token
            .clone()
            .ok_or_else(|| SheetsError::NoRefreshToken(path.to_path_buf()))?;

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
        ];
        let response = http
            .post(&self.token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|source| SheetsError::Http {
                url: self.token_uri.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let refreshed: RefreshResponse =
            response.json().await.map_err(|source| SheetsError::Http {
                url: self.token_uri.clone(),
                source,
            })?;

        self.token = Some(refreshed.access_token);
        self.expiry = refreshed
            .expires_in
            .and_then(|secs| expiry_after(Utc::now(), secs));
        if let Some(rotated) = refreshed.refresh_token {
            self.refresh_token = Some(rotated);
        }

        Ok(())
    }
}

/// A token file on disk.
#[derive(Debug, Clone)]
pub struct TokenStore {
    /// location of the token file
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the token file.
    pub fn load(&self) -> Result<AuthorizedUser, SheetsError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SheetsError::MissingToken(self.path.clone())
            } else {
                SheetsError::TokenIo {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&raw).map_err(|source| SheetsError::TokenFormat {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes `user` back to the token file.
    pub fn save(&self, user: &AuthorizedUser) -> Result<(), SheetsError> {
        let json = serde_json::to_string(user).map_err(|source| SheetsError::TokenFormat {
            path: self.path.clone(),
            source,
        })?;

        std::fs::write(&self.path, json).map_err(|source| SheetsError::TokenIo {
            path: self.path.clone(),
            source,
        })
    }

    /// Returns a usable access token, refreshing and saving the token file
    /// first when the stored one is missing or about to expire.
    pub async fn access_token(&self, http: &Client) -> Result<String, SheetsError> {
        let mut user = self.load()?;

        if !user.scopes.is_empty() && !user.scopes.iter().any(|s| s == SPREADSHEETS_SCOPE) {
            tracing::warn!(
                "Token at {} was not granted {SPREADSHEETS_SCOPE}; writes will likely be refused",
                self.path.display()
            );
        }

        if !user.is_valid_at(Utc::now()) {
            tracing::info!("Refreshing access token from {}", user.token_uri);
            user.refresh(http, &self.path).await?;
            self.save(&user)?;
        }

        user.token
            .ok_or_else(|| SheetsError::NoRefreshToken(self.path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(token: Option<&str>, expiry: Option<DateTime<Utc>>) -> AuthorizedUser {
        AuthorizedUser {
            token: token.map(str::to_string),
            refresh_token: Some("refresh".into()),
            token_uri: default_token_uri(),
            client_id: "id".into(),
            client_secret: "secret".into(),
            scopes: vec![],
            expiry,
            extra: Default::default(),
        }
    }

    #[test]
    fn validity_accounts_for_skew() {
        let now = Utc::now();
        assert!(!user(None, None).is_valid_at(now));
        assert!(user(Some("t"), None).is_valid_at(now));
        assert!(user(Some("t"), Some(now + TimeDelta::minutes(10))).is_valid_at(now));
        assert!(!user(Some("t"), Some(now + TimeDelta::seconds(30))).is_valid_at(now));
        assert!(!user(Some("t"), Some(now - TimeDelta::minutes(1))).is_valid_at(now));
    }

    #[test]
    fn expiry_round_trips_in_google_format() {
        let json = r#"{
            "token": "abc",
            "refresh_token": "def",
            "client_id": "id",
            "client_secret": "secret",
            "scopes": ["https://www.googleapis.com/auth/spreadsheets"],
            "universe_domain": "googleapis.com",
            "expiry": "2024-05-01T12:00:00.123456Z"
        }"#;

        let parsed: AuthorizedUser = serde_json::from_str(json).expect("parse token");
        assert_eq!(parsed.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(parsed.extra["universe_domain"], "googleapis.com");

        let written = serde_json::to_value(&parsed).expect("serialize token");
        assert_eq!(written["expiry"], "2024-05-01T12:00:00.123456Z");
        assert_eq!(written["universe_domain"], "googleapis.com");
    }

    #[test]
    fn oversized_lifetime_leaves_expiry_unset() {
        let now = Utc::now();
        assert_eq!(expiry_after(now, 3599), Some(now + TimeDelta::seconds(3599)));
        assert_eq!(expiry_after(now, i64::MAX), None);
        assert_eq!(expiry_after(DateTime::<Utc>::MAX_UTC, 1), None);
    }

    #[test]
    fn earliest_expiry_is_not_valid() {
        assert!(!user(Some("t"), Some(DateTime::<Utc>::MIN_UTC)).is_valid_at(Utc::now()));
    }
}
