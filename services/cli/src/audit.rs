use std::sync::Arc;

use clap::Args;
use compliance_bundler::config::ProvisionerConfig;
use compliance_bundler::error::AppError;
use compliance_bundler::telemetry;
use compliance_bundler::workflows::bundles::{AccountSurvey, AccountWalker, TwilioClient};

#[derive(Args, Debug, Default)]
pub(crate) struct AuditArgs {
    /// Emit the audit as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let config = ProvisionerConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let gateway = Arc::new(TwilioClient::new(config.endpoints.clone())?);
    let walker = AccountWalker::new(gateway, config);
    let surveys = walker.survey().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&surveys)?);
    } else {
        render_surveys(&surveys);
    }

    Ok(())
}

fn render_surveys(surveys: &[AccountSurvey]) {
    println!("Sub-account bundle audit");

    for survey in surveys {
        println!("\n{} [{}]", survey.friendly_name, survey.account_sid);

        if let Some(reason) = &survey.listing_error {
            println!("  bundle listing failed: {reason}");
            continue;
        }

        if survey.bundles.is_empty() {
            println!("  no bundles");
        }
        for bundle in &survey.bundles {
            println!("  {} => {}", bundle.sid, bundle.status);
        }

        if survey.has_approved_bundle() {
            println!("  a provisioning run would skip this sub-account");
        } else {
            println!("  a provisioning run would submit a new bundle");
        }
    }
}
