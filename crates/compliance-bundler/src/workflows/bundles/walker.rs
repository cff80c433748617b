use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{error, info};

use super::domain::{AccountCredentials, AccountSid, SubAccount};
use super::gateway::{ComplianceGateway, GatewayError};
use super::provisioner::BundleProvisioner;
use super::report::{AccountDisposition, AccountOutcome, AccountSurvey, RunSummary};
use crate::config::ProvisionerConfig;

/// Listing caps applied to both account and bundle enumeration.
pub const MAX_SUBACCOUNTS: usize = 100;
pub const MAX_BUNDLES: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("sub-account listing failed: {0}")]
    Listing(GatewayError),
}

/// Walks every sub-account of the parent account, provisioning a bundle for
/// each one that does not already hold an approved one. Sub-accounts are
/// visited strictly sequentially in listing order; one sub-account's failure
/// never stops the walk.
pub struct AccountWalker<G> {
    gateway: Arc<G>,
    config: Arc<ProvisionerConfig>,
    provisioner: BundleProvisioner<G>,
    started_at: DateTime<Local>,
}

impl<G: ComplianceGateway> AccountWalker<G> {
    pub fn new(gateway: Arc<G>, config: ProvisionerConfig) -> Self {
        Self::with_started_at(gateway, config, Local::now())
    }

    /// Pin the run timestamp; friendly names derived from it become
    /// deterministic, which the tests rely on.
    pub fn with_started_at(
        gateway: Arc<G>,
        config: ProvisionerConfig,
        started_at: DateTime<Local>,
    ) -> Self {
        let config = Arc::new(config);
        let run_label = started_at.to_rfc2822();
        let provisioner = BundleProvisioner::new(gateway.clone(), config.clone(), run_label);
        Self {
            gateway,
            config,
            provisioner,
            started_at,
        }
    }

    fn parent_credentials(&self) -> AccountCredentials {
        AccountCredentials {
            account_sid: AccountSid(self.config.account_sid.clone()),
            auth_token: self.config.auth_token.clone(),
        }
    }

    /// Provision every sub-account that needs it and aggregate one outcome
    /// per sub-account.
    pub async fn run(&self) -> Result<RunSummary, WalkError> {
        let accounts = self.list_subaccounts().await?;

        let mut outcomes = Vec::with_capacity(accounts.len());
        for account in &accounts {
            outcomes.push(self.visit(account).await);
        }

        Ok(RunSummary {
            started_at: self.started_at,
            outcomes,
        })
    }

    /// Read-only walk for the audit command: lists bundles, creates nothing.
    pub async fn survey(&self) -> Result<Vec<AccountSurvey>, WalkError> {
        let accounts = self.list_subaccounts().await?;

        let mut surveys = Vec::with_capacity(accounts.len());
        for account in &accounts {
            let credentials = account.credentials();
            let (bundles, listing_error) =
                match self.gateway.list_bundles(&credentials, MAX_BUNDLES).await {
                    Ok(bundles) => (bundles, None),
                    Err(err) => (Vec::new(), Some(err.to_string())),
                };
            surveys.push(AccountSurvey {
                account_sid: account.sid.clone(),
                friendly_name: account.friendly_name.clone(),
                bundles,
                listing_error,
            });
        }

        Ok(surveys)
    }

    async fn list_subaccounts(&self) -> Result<Vec<SubAccount>, WalkError> {
        let accounts = self
            .gateway
            .list_subaccounts(&self.parent_credentials(), MAX_SUBACCOUNTS)
            .await
            .map_err(|err| {
                error!(error = %err, "sub-account listing failed");
                WalkError::Listing(err)
            })?;
        info!(count = accounts.len(), "listed sub-accounts");
        Ok(accounts)
    }

    async fn visit(&self, account: &SubAccount) -> AccountOutcome {
        info!(account = %account.sid, name = %account.friendly_name, "inspecting sub-account");
        let credentials = account.credentials();

        let bundles = match self.gateway.list_bundles(&credentials, MAX_BUNDLES).await {
            Ok(bundles) => bundles,
            Err(err) => {
                error!(account = %account.sid, error = %err, "bundle listing failed");
                return self.outcome(
                    account,
                    AccountDisposition::ListingFailed {
                        reason: err.to_string(),
                    },
                );
            }
        };

        for bundle in &bundles {
            info!(bundle = %bundle.sid, status = %bundle.status, "existing bundle");
        }

        if let Some(approved) = bundles.iter().find(|bundle| bundle.status.is_approved()) {
            info!(account = %account.sid, bundle = %approved.sid, "approved bundle present, skipping");
            return self.outcome(
                account,
                AccountDisposition::AlreadyApproved {
                    bundle: approved.sid.clone(),
                },
            );
        }

        let (receipt, result) = self.provisioner.provision(&credentials).await;
        match result {
            Ok(()) => self.outcome(account, AccountDisposition::Provisioned { receipt }),
            Err(err) => {
                error!(account = %account.sid, error = %err, "provisioning failed");
                self.outcome(
                    account,
                    AccountDisposition::Failed {
                        step: err.step,
                        reason: err.to_string(),
                        receipt,
                    },
                )
            }
        }
    }

    fn outcome(&self, account: &SubAccount, disposition: AccountDisposition) -> AccountOutcome {
        AccountOutcome {
            account_sid: account.sid.clone(),
            friendly_name: account.friendly_name.clone(),
            disposition,
        }
    }
}
