//! Log level definitions for CLI verbose/debug output
//!
//! Levels are cumulative: Debug includes Verbose, Trace includes Debug.

/// Verbosity level for CLI output
///
/// Levels are ordered: Normal < Verbose < Debug < Trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Warnings and errors only (default)
    #[default]
    Normal = 0,
    /// Connection and sync progress
    Verbose = 1,
    /// Binds, searches and per-base counts
    Debug = 2,
    /// Everything, including dependency internals
    Trace = 3,
}

impl LogLevel {
    /// Create LogLevel from CLI flags
    ///
    /// Order of precedence: trace > debug > verbose > normal
    pub fn from_flags(verbose: bool, debug: bool, trace: bool) -> Self {
        if trace {
            Self::Trace
        } else if debug {
            Self::Debug
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// `EnvFilter` directive for this level
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "warn,ldapsync_core=info,ldapsync_ldap=info,ldapsync_cli=info",
            Self::Debug => "info,ldapsync_core=debug,ldapsync_ldap=debug,ldapsync_cli=debug",
            Self::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Normal < LogLevel::Verbose);
        assert!(LogLevel::Verbose < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_log_level_from_flags() {
        assert_eq!(LogLevel::from_flags(false, false, false), LogLevel::Normal);
        assert_eq!(LogLevel::from_flags(true, false, false), LogLevel::Verbose);
        assert_eq!(LogLevel::from_flags(false, true, false), LogLevel::Debug);
        assert_eq!(LogLevel::from_flags(false, false, true), LogLevel::Trace);
    }

    #[test]
    fn test_log_level_from_flags_trace_takes_precedence() {
        assert_eq!(LogLevel::from_flags(true, true, true), LogLevel::Trace);
        assert_eq!(LogLevel::from_flags(true, true, false), LogLevel::Debug);
    }

    #[test]
    fn test_directive_scopes_workspace_crates() {
        assert_eq!(LogLevel::Normal.directive(), "warn");
        assert!(LogLevel::Debug.directive().contains("ldapsync_ldap=debug"));
        assert!(LogLevel::Verbose.directive().contains("ldapsync_core=info"));
    }
}
