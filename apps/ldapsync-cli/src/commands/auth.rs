//! Auth command - check a user's credentials with a simple bind

use clap::Args;

use ldapsync_ldap::{authenticate, AuthRequest, TlsMode};

use crate::error::{CliError, CliResult};
use crate::output::{print_failure, print_success};

/// Arguments for the auth command
#[derive(Args)]
pub struct AuthArgs {
    /// Directory server hostname
    #[arg(long)]
    pub server: String,

    /// Directory server port
    #[arg(long, default_value_t = 389)]
    pub port: u16,

    /// Transport security: none, tls or starttls
    #[arg(long, default_value = "none")]
    pub tls: TlsMode,

    /// Naming attribute of user entries
    #[arg(long = "uid", default_value = "uid")]
    pub uid_attribute: String,

    /// DN of the container holding user entries
    #[arg(long)]
    pub base_dn: String,

    /// User to authenticate
    #[arg(long)]
    pub user: String,

    /// Password (prefer the environment variable)
    #[arg(long, env = "LDAPSYNC_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Skip server certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<AuthArgs> for AuthRequest {
    fn from(args: AuthArgs) -> Self {
        let mut request = AuthRequest::new(
            args.server,
            args.uid_attribute,
            args.base_dn,
            args.user,
            args.password,
        );
        request.port = args.port;
        request.tls = args.tls;
        request.connection_timeout_secs = args.timeout;
        request.verify_certificate = !args.insecure;
        request
    }
}

/// Execute the auth command
pub async fn execute(args: AuthArgs) -> CliResult<()> {
    let json = args.json;
    let request = AuthRequest::from(args);
    let bind_dn = request.bind_dn();

    let result = authenticate(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.success {
        print_success(&format!("Authenticated as {bind_dn}"));
    } else {
        print_failure(&format!("Rejected {bind_dn}"));
    }

    if result.success {
        Ok(())
    } else {
        Err(CliError::AuthenticationRejected(
            result
                .error_message
                .unwrap_or_else(|| "credentials rejected".to_string()),
        ))
    }
}
