//! Sync configuration file loading
//!
//! `.json` files are read as JSON; anything else as YAML.

use std::path::Path;

use ldapsync_ldap::LdapSyncConfig;

use crate::error::{CliError, CliResult};

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Parse a sync configuration from text.
pub fn parse_sync_config(content: &str, format: ConfigFormat) -> CliResult<LdapSyncConfig> {
    match format {
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| CliError::Config(format!("invalid JSON configuration: {e}"))),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| CliError::Config(format!("invalid YAML configuration: {e}"))),
    }
}

/// Read and parse a sync configuration file.
pub fn load_sync_config(path: &Path) -> CliResult<LdapSyncConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("cannot read {}: {e}", path.display())))?;

    let config = parse_sync_config(&content, ConfigFormat::from_path(path))?;
    tracing::debug!(path = %path.display(), config = ?config, "Loaded sync configuration");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldapsync_ldap::TlsMode;
    use std::io::Write;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("sync.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("sync.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("sync.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("sync")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_load_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"server": "ldap.example.com", "tls": "starttls", "baseDNs": ["dc=example,dc=com"]}}"#
        )
        .unwrap();

        let config = load_sync_config(file.path()).unwrap();
        assert_eq!(config.tls, TlsMode::Starttls);
        assert_eq!(config.port, 389);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = load_sync_config(Path::new("/nonexistent/sync.yaml")).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = parse_sync_config("server: [unterminated", ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
