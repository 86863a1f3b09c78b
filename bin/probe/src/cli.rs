//! Command-line arguments.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "zcode-probe",
    version,
    about = "Run the Zcode navigation guard against a live backend"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Guard one or more navigation targets and print each decision.
    Check(CheckArgs),

    /// Resolve the session and print who the backend thinks we are.
    Whoami(Credentials),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Navigation targets, e.g. `/admin/userManage`.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,

    #[command(flatten)]
    pub credentials: Credentials,

    /// Sign out after the last target and check them all again.
    #[arg(long)]
    pub then_logout: bool,
}

/// Optional sign-in before probing.
#[derive(Debug, Args)]
pub struct Credentials {
    /// Account to sign in with first.
    #[arg(long, requires = "password")]
    pub account: Option<String>,

    /// Password for `--account`.
    #[arg(long, requires = "account", env = "ZCODE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl Credentials {
    /// Returns the account and password when both were given.
    pub fn pair(&self) -> Option<(&str, &str)> {
        self.account.as_deref().zip(self.password.as_deref())
    }
}
