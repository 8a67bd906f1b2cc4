//! Connection setup shared by the sync source and authenticate.

use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, LdapResult};
use std::time::Duration;
use tracing::{debug, warn};

use ldapsync_core::error::{DirectoryError, DirectoryResult};

use crate::config::TlsMode;

/// Result code for invalidCredentials (RFC 4511).
pub(crate) const RC_INVALID_CREDENTIALS: u32 = 49;

/// Where and how to connect.
#[derive(Debug, Clone)]
pub(crate) struct ConnectTarget<'a> {
    pub server: &'a str,
    pub port: u16,
    pub tls: TlsMode,
    pub timeout_secs: u64,
    pub verify_certificate: bool,
}

impl ConnectTarget<'_> {
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.tls.scheme(), self.server, self.port)
    }
}

/// Open a connection and spawn its driver on the tokio runtime.
pub(crate) async fn connect(target: &ConnectTarget<'_>) -> DirectoryResult<Ldap> {
    let url = target.url();

    debug!(url = %url, tls = %target.tls, "Connecting to LDAP server");

    let settings = LdapConnSettings::new()
        .set_conn_timeout(Duration::from_secs(target.timeout_secs))
        .set_starttls(target.tls == TlsMode::Starttls)
        .set_no_tls_verify(!target.verify_certificate);

    let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
        .await
        .map_err(|e| map_connect_error(target, &url, e))?;

    // Spawn the connection driver
    tokio::spawn(async move {
        if let Err(e) = conn.drive().await {
            warn!(error = %e, "LDAP connection driver error");
        }
    });

    Ok(ldap)
}

fn map_connect_error(target: &ConnectTarget<'_>, url: &str, err: LdapError) -> DirectoryError {
    match err {
        LdapError::Timeout { .. } => DirectoryError::ConnectionTimeout {
            timeout_secs: target.timeout_secs,
        },
        LdapError::Io { .. } => DirectoryError::connection_failed_with_source(
            format!("Failed to connect to LDAP server at {url}"),
            err,
        ),
        e if target.tls.is_encrypted() => DirectoryError::tls_failed_with_source(
            format!("{} negotiation with {url} failed", target.tls),
            e,
        ),
        e => DirectoryError::connection_failed_with_source(
            format!("Failed to connect to LDAP server at {url}"),
            e,
        ),
    }
}

/// Outcome of a simple bind that reached the server.
pub(crate) enum BindOutcome {
    Accepted,
    Rejected(LdapResult),
}

/// Perform a simple bind. Transport failures are errors; a non-zero result
/// code is a [`BindOutcome::Rejected`].
pub(crate) async fn simple_bind(
    ldap: &mut Ldap,
    bind_dn: &str,
    password: &str,
) -> DirectoryResult<BindOutcome> {
    debug!(bind_dn = %bind_dn, "Performing LDAP bind");

    let result = ldap.simple_bind(bind_dn, password).await.map_err(|e| {
        DirectoryError::connection_failed_with_source(format!("LDAP bind failed for {bind_dn}"), e)
    })?;

    if result.rc == 0 {
        Ok(BindOutcome::Accepted)
    } else {
        Ok(BindOutcome::Rejected(result))
    }
}

/// Describe a rejected bind for logs and error messages.
pub(crate) fn describe_rejection(result: &LdapResult) -> String {
    if result.rc == RC_INVALID_CREDENTIALS {
        "invalid credentials".to_string()
    } else if result.text.is_empty() {
        format!("bind rejected with result code {}", result.rc)
    } else {
        format!("bind rejected with result code {}: {}", result.rc, result.text)
    }
}

/// Unbind, logging instead of failing; the result is already in hand.
pub(crate) async fn close(mut ldap: Ldap) {
    if let Err(e) = ldap.unbind().await {
        debug!(error = %e, "LDAP unbind failed");
    }
}
