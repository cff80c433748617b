use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use compliance_bundler::config::ProvisionerConfig;
use compliance_bundler::error::AppError;
use compliance_bundler::telemetry;
use compliance_bundler::workflows::bundles::{
    AccountDisposition, AccountWalker, ProvisionReceipt, RunSummary, TwilioClient,
};
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct ProvisionArgs {
    /// Override the configured documents directory
    #[arg(long)]
    pub(crate) documents_dir: Option<PathBuf>,
    /// Emit the run summary as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_provision(args: ProvisionArgs) -> Result<(), AppError> {
    let mut config = ProvisionerConfig::load()?;
    if let Some(directory) = args.documents_dir {
        config.documents.directory = directory;
    }
    telemetry::init(&config.telemetry)?;

    let gateway = Arc::new(TwilioClient::new(config.endpoints.clone())?);
    let walker = AccountWalker::new(gateway, config);
    let summary = walker.run().await?;

    info!(
        provisioned = summary.provisioned(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        "walk finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        render_summary(&summary);
    }

    Ok(())
}

fn render_summary(summary: &RunSummary) {
    println!(
        "Provisioning run started {}",
        summary.started_at.to_rfc2822()
    );

    for outcome in &summary.outcomes {
        match &outcome.disposition {
            AccountDisposition::AlreadyApproved { bundle } => println!(
                "- {} [{}]: skipped, approved bundle {} already present",
                outcome.friendly_name, outcome.account_sid, bundle
            ),
            AccountDisposition::Provisioned { receipt } => println!(
                "- {} [{}]: bundle {} submitted for review",
                outcome.friendly_name,
                outcome.account_sid,
                bundle_label(receipt)
            ),
            AccountDisposition::Failed {
                step,
                reason,
                receipt,
            } => {
                println!(
                    "- {} [{}]: failed at {}: {}",
                    outcome.friendly_name,
                    outcome.account_sid,
                    step.label(),
                    reason
                );
                let orphans = created_before_failure(receipt);
                if !orphans.is_empty() {
                    println!("    created before failure: {}", orphans.join(", "));
                }
            }
            AccountDisposition::ListingFailed { reason } => println!(
                "- {} [{}]: bundle listing failed: {}",
                outcome.friendly_name, outcome.account_sid, reason
            ),
        }
    }

    println!(
        "\n{} provisioned, {} skipped, {} failed",
        summary.provisioned(),
        summary.skipped(),
        summary.failed()
    );
}

fn bundle_label(receipt: &ProvisionReceipt) -> &str {
    receipt
        .bundle
        .as_ref()
        .map(|sid| sid.as_str())
        .unwrap_or("-")
}

/// Remote records are never rolled back, so a failed account may leave
/// orphans behind; list them for manual cleanup.
fn created_before_failure(receipt: &ProvisionReceipt) -> Vec<String> {
    let mut sids = Vec::new();
    if let Some(sid) = &receipt.business_address {
        sids.push(format!("business address {sid}"));
    }
    if let Some(sid) = &receipt.personal_address {
        sids.push(format!("personal address {sid}"));
    }
    if let Some(sid) = &receipt.bundle {
        sids.push(format!("bundle {sid}"));
    }
    if let Some(sid) = &receipt.end_user {
        sids.push(format!("end-user {sid}"));
    }
    if let Some(sid) = &receipt.corporate_registry {
        sids.push(format!("corporate registry {sid}"));
    }
    if let Some(sid) = &receipt.power_of_attorney {
        sids.push(format!("power of attorney {sid}"));
    }
    if let Some(sid) = &receipt.drivers_license {
        sids.push(format!("driver's license {sid}"));
    }
    sids
}
