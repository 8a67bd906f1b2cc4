//! LDAP sync configuration
//!
//! Configuration types for reaching the directory server and for the rules
//! that classify what it returns.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use ldapsync_core::error::{DirectoryError, DirectoryResult};
use ldapsync_core::rules::SyncRules;

/// Transport security for the directory connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain LDAP.
    #[default]
    None,
    /// Implicit TLS (LDAPS).
    Tls,
    /// Plain connection upgraded with STARTTLS.
    #[serde(alias = "startTLS", alias = "StartTLS")]
    Starttls,
}

impl TlsMode {
    /// URL scheme for this mode.
    pub fn scheme(self) -> &'static str {
        match self {
            TlsMode::Tls => "ldaps",
            TlsMode::None | TlsMode::Starttls => "ldap",
        }
    }

    /// Whether the connection ends up encrypted.
    pub fn is_encrypted(self) -> bool {
        !matches!(self, TlsMode::None)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TlsMode::None => "none",
            TlsMode::Tls => "tls",
            TlsMode::Starttls => "starttls",
        }
    }
}

impl fmt::Display for TlsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TlsMode {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(TlsMode::None),
            "tls" | "ldaps" => Ok(TlsMode::Tls),
            "starttls" => Ok(TlsMode::Starttls),
            other => Err(DirectoryError::InvalidConfiguration {
                message: format!("unknown tls mode '{other}', expected none, tls or starttls"),
            }),
        }
    }
}

/// Configuration for a directory sync.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdapSyncConfig {
    /// Directory server hostname or IP address.
    pub server: String,

    /// Directory server port (389 for LDAP, 636 for LDAPS).
    #[serde(default = "default_ldap_port", deserialize_with = "deserialize_port")]
    pub port: u16,

    /// Transport security.
    #[serde(default)]
    pub tls: TlsMode,

    /// Bind as the sync account before searching.
    #[serde(default)]
    pub sync_requires_auth: bool,

    /// DN of the sync account.
    #[serde(default)]
    pub sync_user_name: String,

    /// Password of the sync account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_user_password: Option<String>,

    /// Search bases, searched in order.
    #[serde(rename = "baseDNs", alias = "baseDns", default)]
    pub base_dns: Vec<String>,

    /// Page size for search operations.
    #[serde(default = "default_page_size")]
    pub page_size: i32,

    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Verify the server certificate when TLS is in use.
    #[serde(default = "default_true")]
    pub verify_certificate: bool,

    /// User filter, group filter and membership rules.
    #[serde(flatten)]
    pub rules: SyncRules,
}

impl fmt::Debug for LdapSyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LdapSyncConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("sync_requires_auth", &self.sync_requires_auth)
            .field("sync_user_name", &self.sync_user_name)
            .field(
                "sync_user_password",
                &self.sync_user_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("base_dns", &self.base_dns)
            .field("page_size", &self.page_size)
            .field("connection_timeout_secs", &self.connection_timeout_secs)
            .field("verify_certificate", &self.verify_certificate)
            .field("rules", &self.rules)
            .finish()
    }
}

pub(crate) fn default_ldap_port() -> u16 {
    389
}

fn default_page_size() -> i32 {
    5
}

pub(crate) fn default_connection_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Accept the port as a number or as a numeric string ("389").
pub(crate) fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u16),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(port) => Ok(port),
        Repr::Text(text) if text.trim().is_empty() => Ok(default_ldap_port()),
        Repr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{text}'"))),
    }
}

/// Escape hook applied to configured DNs before they reach the server.
///
/// Configured DNs are trusted and passed through unchanged.
// TODO: apply RFC 4514 escaping once DNs can come from untrusted input.
pub fn sanitize_dn(dn: &str) -> String {
    dn.to_string()
}

impl LdapSyncConfig {
    /// Create a config with required fields and default rules.
    pub fn new(server: impl Into<String>, base_dns: Vec<String>) -> Self {
        Self {
            server: server.into(),
            port: default_ldap_port(),
            tls: TlsMode::None,
            sync_requires_auth: false,
            sync_user_name: String::new(),
            sync_user_password: None,
            base_dns,
            page_size: default_page_size(),
            connection_timeout_secs: default_connection_timeout(),
            verify_certificate: true,
            rules: SyncRules::default(),
        }
    }

    /// Bind as `user_name` before searching.
    pub fn with_sync_user(
        mut self,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.sync_requires_auth = true;
        self.sync_user_name = user_name.into();
        self.sync_user_password = Some(password.into());
        self
    }

    /// Set transport security.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    /// Set the classification rules.
    #[must_use]
    pub fn with_rules(mut self, rules: SyncRules) -> Self {
        self.rules = rules;
        self
    }

    /// Get the LDAP URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.tls.scheme(), self.server, self.port)
    }

    /// Copy of this config with every base DN passed through [`sanitize_dn`].
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        config.base_dns = self.base_dns.iter().map(|dn| sanitize_dn(dn)).collect();
        config
    }

    /// Check the configuration before connecting.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.server.trim().is_empty() {
            return Err(DirectoryError::invalid_configuration("server is required"));
        }

        if self.base_dns.is_empty() {
            return Err(DirectoryError::invalid_configuration(
                "at least one base DN is required",
            ));
        }

        if let Some(blank) = self.base_dns.iter().position(|dn| dn.trim().is_empty()) {
            return Err(DirectoryError::invalid_configuration(format!(
                "base DN #{} is empty",
                blank + 1
            )));
        }

        if self.sync_requires_auth && self.sync_user_name.trim().is_empty() {
            return Err(DirectoryError::invalid_configuration(
                "syncUserName is required when syncRequiresAuth is set",
            ));
        }

        if self.page_size <= 0 {
            return Err(DirectoryError::invalid_configuration(
                "pageSize must be greater than zero",
            ));
        }

        if self.connection_timeout_secs == 0 {
            return Err(DirectoryError::invalid_configuration(
                "connectionTimeoutSecs must be greater than zero",
            ));
        }

        Ok(())
    }
}
