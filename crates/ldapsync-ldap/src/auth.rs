//! One-shot credential check by simple bind.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use ldapsync_core::error::DirectoryResult;

use crate::config::{
    default_connection_timeout, default_ldap_port, deserialize_port, sanitize_dn, TlsMode,
};
use crate::connection::{self, BindOutcome, ConnectTarget};

/// Credentials to check and the server to check them against.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub server: String,

    #[serde(default = "default_ldap_port", deserialize_with = "deserialize_port")]
    pub port: u16,

    #[serde(default)]
    pub tls: TlsMode,

    /// Naming attribute of user entries (e.g. "uid").
    #[serde(alias = "uid")]
    pub uid_attribute: String,

    /// DN of the container holding user entries.
    #[serde(alias = "urdns")]
    pub base_dn: String,

    #[serde(alias = "user")]
    pub username: String,

    #[serde(alias = "pwd")]
    pub password: String,

    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    #[serde(default = "default_verify")]
    pub verify_certificate: bool,
}

fn default_verify() -> bool {
    true
}

impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("uid_attribute", &self.uid_attribute)
            .field("base_dn", &self.base_dn)
            .field("username", &self.username)
            .field("password", &"***REDACTED***")
            .field("connection_timeout_secs", &self.connection_timeout_secs)
            .field("verify_certificate", &self.verify_certificate)
            .finish()
    }
}

impl AuthRequest {
    /// Create a request with default port, timeout and no TLS.
    pub fn new(
        server: impl Into<String>,
        uid_attribute: impl Into<String>,
        base_dn: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            port: default_ldap_port(),
            tls: TlsMode::None,
            uid_attribute: uid_attribute.into(),
            base_dn: base_dn.into(),
            username: username.into(),
            password: password.into(),
            connection_timeout_secs: default_connection_timeout(),
            verify_certificate: true,
        }
    }

    /// DN to bind as: `{uid_attribute}={username},{base_dn}`.
    pub fn bind_dn(&self) -> String {
        format!(
            "{}={},{}",
            self.uid_attribute,
            self.username,
            sanitize_dn(&self.base_dn)
        )
    }
}

/// Outcome of a credential check that reached the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AuthResult {
    pub fn accepted() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
        }
    }
}

/// Check a user's credentials by binding as them.
///
/// A rejected bind is `Ok` with `success: false`. Connection, TLS and protocol
/// failures are `Err`.
#[instrument(skip(request), fields(server = %request.server, user = %request.username))]
pub async fn authenticate(request: &AuthRequest) -> DirectoryResult<AuthResult> {
    // An empty password would be an unauthenticated bind, which servers accept.
    if request.password.is_empty() {
        warn!("Refusing bind with empty password");
        return Ok(AuthResult::rejected("empty password"));
    }

    let target = ConnectTarget {
        server: &request.server,
        port: request.port,
        tls: request.tls,
        timeout_secs: request.connection_timeout_secs,
        verify_certificate: request.verify_certificate,
    };
    let mut ldap = connection::connect(&target).await?;

    let bind_dn = request.bind_dn();
    let outcome = connection::simple_bind(&mut ldap, &bind_dn, &request.password).await;
    connection::close(ldap).await;

    match outcome? {
        BindOutcome::Accepted => {
            info!(bind_dn = %bind_dn, "Credentials accepted");
            Ok(AuthResult::accepted())
        }
        BindOutcome::Rejected(result) => {
            let message = connection::describe_rejection(&result);
            info!(bind_dn = %bind_dn, rc = result.rc, "Credentials rejected");
            Ok(AuthResult::rejected(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AuthRequest {
        AuthRequest::new(
            "ipa.demo1.freeipa.org",
            "uid",
            "cn=users,cn=accounts,dc=demo1,dc=freeipa,dc=org",
            "admin",
            "Secret123",
        )
    }

    #[test]
    fn test_bind_dn() {
        assert_eq!(
            request().bind_dn(),
            "uid=admin,cn=users,cn=accounts,dc=demo1,dc=freeipa,dc=org"
        );
    }

    #[test]
    fn test_request_from_short_field_names() {
        let request: AuthRequest = serde_json::from_str(
            r#"{"server":"ldap.example.com","port":"636","tls":"tls","uid":"cn",
                "urdns":"ou=people,dc=example,dc=com","user":"jane","pwd":"pw"}"#,
        )
        .unwrap();

        assert_eq!(request.port, 636);
        assert_eq!(request.tls, TlsMode::Tls);
        assert_eq!(request.bind_dn(), "cn=jane,ou=people,dc=example,dc=com");
        assert!(request.verify_certificate);
    }

    #[test]
    fn test_debug_redacts_password() {
        assert!(!format!("{:?}", request()).contains("Secret123"));
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(AuthResult::rejected("invalid credentials")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "errorMessage": "invalid credentials"})
        );
        let json = serde_json::to_value(AuthResult::accepted()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }

    #[tokio::test]
    async fn test_empty_password_is_rejected_without_connecting() {
        let mut request = request();
        request.server = "127.0.0.1".to_string();
        request.port = 1;
        request.password = String::new();

        let result = authenticate(&request).await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let mut request = request();
        request.server = "127.0.0.1".to_string();
        request.port = 1;
        request.connection_timeout_secs = 2;

        assert!(authenticate(&request).await.is_err());
    }
}
