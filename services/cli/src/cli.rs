use crate::audit::{run_audit, AuditArgs};
use crate::provision::{run_provision, ProvisionArgs};
use clap::{Parser, Subcommand};
use compliance_bundler::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "compliance-bundler",
    about = "Provision regulatory compliance bundles across telephony sub-accounts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk every sub-account and provision bundles where needed (default command)
    Provision(ProvisionArgs),
    /// List sub-accounts and their bundle statuses without writing anything
    Audit(AuditArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Provision(ProvisionArgs::default()));

    match command {
        Command::Provision(args) => run_provision(args).await,
        Command::Audit(args) => run_audit(args).await,
    }
}
