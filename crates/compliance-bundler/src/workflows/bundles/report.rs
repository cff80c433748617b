use chrono::{DateTime, Local};
use serde::Serialize;

use super::domain::{AccountSid, BundleSid, BundleSummary};
use super::provisioner::{ProvisionReceipt, ProvisionStep};

/// How one sub-account fared during a walk.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountDisposition {
    /// An approved bundle already exists; nothing was created.
    AlreadyApproved { bundle: BundleSid },
    Provisioned { receipt: ProvisionReceipt },
    /// A provisioning step failed; the receipt lists what was created before
    /// the failure (those remote records are not cleaned up).
    Failed {
        step: ProvisionStep,
        reason: String,
        receipt: ProvisionReceipt,
    },
    /// The bundle listing for this sub-account failed; provisioning was not
    /// attempted.
    ListingFailed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountOutcome {
    pub account_sid: AccountSid,
    pub friendly_name: String,
    pub disposition: AccountDisposition,
}

/// Machine-inspectable result of one full walk.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub outcomes: Vec<AccountOutcome>,
}

impl RunSummary {
    pub fn provisioned(&self) -> usize {
        self.count(|disposition| matches!(disposition, AccountDisposition::Provisioned { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|disposition| matches!(disposition, AccountDisposition::AlreadyApproved { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|disposition| {
            matches!(
                disposition,
                AccountDisposition::Failed { .. } | AccountDisposition::ListingFailed { .. }
            )
        })
    }

    fn count(&self, predicate: impl Fn(&AccountDisposition) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.disposition))
            .count()
    }
}

/// Read-only view of one sub-account for the audit command.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSurvey {
    pub account_sid: AccountSid,
    pub friendly_name: String,
    pub bundles: Vec<BundleSummary>,
    pub listing_error: Option<String>,
}

impl AccountSurvey {
    /// Whether a walk would skip this sub-account.
    pub fn has_approved_bundle(&self) -> bool {
        self.bundles.iter().any(|bundle| bundle.status.is_approved())
    }
}
