//! LDAP Directory Source
//!
//! Fetches every entry under the configured base DNs with paged subtree
//! searches.

use async_trait::async_trait;
use ldap3::adapters::{Adapter, EntriesOnly, PagedResults};
use ldap3::{Ldap, Scope, SearchEntry};
use tracing::{debug, info, instrument, warn};

use ldapsync_core::entry::{Attribute, Entry};
use ldapsync_core::error::{DirectoryError, DirectoryResult};
use ldapsync_core::source::DirectorySource;

use crate::config::LdapSyncConfig;
use crate::connection::{self, BindOutcome, ConnectTarget};

/// Filter matching every entry.
const MATCH_ALL_FILTER: &str = "(objectClass=*)";

/// Directory Source backed by an LDAP server.
pub struct LdapSource {
    /// Configuration, with base DNs already sanitized.
    config: LdapSyncConfig,

    /// Display name for this source.
    display_name: String,
}

impl LdapSource {
    /// Create a new LDAP source with the given configuration.
    pub fn new(config: LdapSyncConfig) -> DirectoryResult<Self> {
        config.validate()?;

        let display_name = format!("LDAP: {}", config.server);

        Ok(Self {
            config: config.sanitized(),
            display_name,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &LdapSyncConfig {
        &self.config
    }

    fn target(&self) -> ConnectTarget<'_> {
        ConnectTarget {
            server: &self.config.server,
            port: self.config.port,
            tls: self.config.tls,
            timeout_secs: self.config.connection_timeout_secs,
            verify_certificate: self.config.verify_certificate,
        }
    }

    /// Connect and, when configured, bind as the sync account.
    async fn open(&self) -> DirectoryResult<Ldap> {
        let mut ldap = connection::connect(&self.target()).await?;

        if self.config.sync_requires_auth {
            let bind_dn = &self.config.sync_user_name;
            let password = self.config.sync_user_password.as_deref().unwrap_or("");

            if let BindOutcome::Rejected(result) =
                connection::simple_bind(&mut ldap, bind_dn, password).await?
            {
                connection::close(ldap).await;
                return Err(DirectoryError::authentication_failed(
                    bind_dn.as_str(),
                    connection::describe_rejection(&result),
                ));
            }
        }

        info!(server = %self.config.server, "LDAP connection established successfully");

        Ok(ldap)
    }

    /// Paged whole-subtree search under one base DN.
    #[instrument(skip(self, ldap))]
    async fn search_base(&self, ldap: &mut Ldap, base_dn: &str) -> DirectoryResult<Vec<Entry>> {
        let adapters: Vec<Box<dyn Adapter<_, _>>> = vec![
            Box::new(EntriesOnly::new()),
            Box::new(PagedResults::new(self.config.page_size)),
        ];

        let mut search = ldap
            .streaming_search_with(
                adapters,
                base_dn,
                Scope::Subtree,
                MATCH_ALL_FILTER,
                vec!["*"],
            )
            .await
            .map_err(|e| DirectoryError::search_failed_with_source(base_dn, "search failed", e))?;

        let mut entries = Vec::new();
        while let Some(raw) = search.next().await.map_err(|e| {
            DirectoryError::search_failed_with_source(base_dn, "failed to read result page", e)
        })? {
            entries.push(map_entry(SearchEntry::construct(raw)));
        }

        search
            .finish()
            .await
            .success()
            .map_err(|e| DirectoryError::search_failed_with_source(base_dn, "search failed", e))?;

        debug!(count = entries.len(), "Search under base DN completed");

        Ok(entries)
    }
}

/// Convert a search result into an [`Entry`], keeping text attributes only.
fn map_entry(entry: SearchEntry) -> Entry {
    if !entry.bin_attrs.is_empty() {
        debug!(
            dn = %entry.dn,
            skipped = entry.bin_attrs.len(),
            "Skipping binary attributes"
        );
    }

    let mut attributes: Vec<Attribute> = entry
        .attrs
        .into_iter()
        .map(|(name, values)| Attribute { name, values })
        .collect();
    // HashMap order is arbitrary; keep output stable across runs.
    attributes.sort_by(|a, b| a.name.cmp(&b.name));

    Entry {
        dn: entry.dn,
        attributes,
    }
}

#[async_trait]
impl DirectorySource for LdapSource {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self), fields(server = %self.config.server))]
    async fn fetch_entries(&self) -> DirectoryResult<Vec<Entry>> {
        let mut ldap = self.open().await?;

        let mut entries = Vec::new();
        for base_dn in &self.config.base_dns {
            match self.search_base(&mut ldap, base_dn).await {
                Ok(found) => entries.extend(found),
                Err(e) => {
                    warn!(base_dn = %base_dn, error = %e, "LDAP search failed");
                    connection::close(ldap).await;
                    return Err(e);
                }
            }
        }

        connection::close(ldap).await;

        info!(
            bases = self.config.base_dns.len(),
            entries = entries.len(),
            "LDAP fetch completed"
        );

        Ok(entries)
    }
}

impl std::fmt::Debug for LdapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapSource")
            .field("display_name", &self.display_name)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> LdapSyncConfig {
        LdapSyncConfig::new("ldap.example.com", vec!["dc=example,dc=com".to_string()])
    }

    #[test]
    fn test_new_validates() {
        let source = LdapSource::new(config()).unwrap();
        assert_eq!(source.display_name(), "LDAP: ldap.example.com");

        let err = LdapSource::new(LdapSyncConfig::new("", vec![])).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_debug_does_not_leak_password() {
        let source =
            LdapSource::new(config().with_sync_user("cn=sync,dc=example,dc=com", "hunter2"))
                .unwrap();
        assert!(!format!("{source:?}").contains("hunter2"));
    }

    #[test]
    fn test_map_entry_skips_binary_attributes() {
        let mut attrs = HashMap::new();
        attrs.insert("uid".to_string(), vec!["johnd".to_string()]);
        attrs.insert(
            "memberOf".to_string(),
            vec!["cn=a,dc=x".to_string(), "cn=b,dc=x".to_string()],
        );
        let mut bin_attrs = HashMap::new();
        bin_attrs.insert("jpegPhoto".to_string(), vec![vec![0xff, 0xd8]]);

        let entry = map_entry(SearchEntry {
            dn: "uid=johnd,dc=x".to_string(),
            attrs,
            bin_attrs,
        });

        assert_eq!(entry.dn, "uid=johnd,dc=x");
        assert_eq!(entry.attributes.len(), 2);
        assert_eq!(entry.attributes[0].name, "memberOf");
        assert_eq!(entry.values("memberOf").count(), 2);
        assert!(entry.attribute("jpegPhoto").is_none());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_server() {
        let mut config = LdapSyncConfig::new("127.0.0.1", vec!["dc=example,dc=com".to_string()]);
        config.port = 1;
        config.connection_timeout_secs = 2;

        let source = LdapSource::new(config).unwrap();
        let err = source.fetch_entries().await.unwrap_err();
        assert!(err.is_transient());
    }
}
